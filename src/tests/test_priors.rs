use approx::{assert_abs_diff_eq, assert_relative_eq};

use crate::matrix::BinaryCsr;
use crate::priors::Priors;

fn tiny_matrix() -> BinaryCsr {
    // item 0: {a, b}, item 1: {a}, item 2: {c}
    BinaryCsr::from_pairs(3, 3, &[0, 0, 1, 2], &[0, 1, 0, 2])
}

#[test]
fn hyperparameters_from_column_sums() {
    let priors = Priors::from_matrix(&tiny_matrix(), 2.0);

    assert_eq!(priors.col_freq(), &[2, 1, 1]);
    assert_relative_eq!(priors.alpha()[0], 4.0 / 3.0);
    assert_relative_eq!(priors.alpha()[1], 2.0 / 3.0);
    assert_relative_eq!(priors.alpha()[2], 2.0 / 3.0);
    assert_relative_eq!(priors.beta()[0], 2.0 / 3.0);
    assert_relative_eq!(priors.beta()[1], 4.0 / 3.0);
    assert_relative_eq!(priors.beta()[2], 4.0 / 3.0);
}

#[test]
fn alpha_plus_beta_equals_smoothing_constant() {
    for c in [0.5, 2.0, 8.0] {
        let priors = Priors::from_matrix(&tiny_matrix(), c);
        for j in 0..priors.len() {
            assert_relative_eq!(priors.alpha()[j] + priors.beta()[j], c, epsilon = 1e-12);
            assert_relative_eq!(priors.log_alpha_plus_beta()[j], c.ln(), epsilon = 1e-12);
        }
    }
}

#[test]
fn smoothing_scales_linearly() {
    let base = Priors::from_matrix(&tiny_matrix(), 2.0);
    let doubled = Priors::from_matrix(&tiny_matrix(), 4.0);
    for j in 0..base.len() {
        assert_relative_eq!(doubled.alpha()[j], 2.0 * base.alpha()[j]);
        assert_relative_eq!(doubled.beta()[j], 2.0 * base.beta()[j]);
    }
}

#[test]
fn zero_columns_are_inert() {
    // Column 3 never occurs.
    let m = BinaryCsr::from_pairs(3, 4, &[0, 0, 1, 2], &[0, 1, 0, 2]);
    let priors = Priors::from_matrix(&m, 2.0);

    assert!(!priors.is_active(3));
    assert_eq!(priors.alpha()[3], 0.0);
    assert_eq!(priors.presence_ratio(3, 0), 0.0);
    // Pinned log placeholder never leaks a -inf anywhere.
    assert!(priors.log_alpha()[3].is_finite());
}

#[test]
fn full_column_absence_is_pinned() {
    // Every item carries column 0, so beta_0 = 0 and nothing can lack it.
    let m = BinaryCsr::from_pairs(2, 2, &[0, 1, 0], &[0, 0, 1]);
    let priors = Priors::from_matrix(&m, 2.0);

    assert_eq!(priors.beta()[0], 0.0);
    assert_eq!(priors.absence_ratio(0, 1, 1), 0.0);
    assert!(priors.presence_ratio(0, 1).is_finite());
}

#[test]
fn presence_and_absence_ratios_match_definitions() {
    let priors = Priors::from_matrix(&tiny_matrix(), 2.0);

    // Feature a: alpha = 4/3, beta = 2/3.
    assert_abs_diff_eq!(
        priors.presence_ratio(0, 1),
        (4.0f64 / 3.0 + 1.0).ln() - (4.0f64 / 3.0).ln(),
        epsilon = 1e-12
    );
    assert_abs_diff_eq!(
        priors.absence_ratio(0, 2, 1),
        (2.0f64 / 3.0 + 1.0).ln() - (2.0f64 / 3.0).ln(),
        epsilon = 1e-12
    );
    assert_abs_diff_eq!(
        priors.shrinkage(0, 1),
        2.0f64.ln() - 3.0f64.ln(),
        epsilon = 1e-12
    );
}

#[test]
fn empty_index_has_no_parameters() {
    let m = BinaryCsr::from_pairs(0, 0, &[], &[]);
    let priors = Priors::from_matrix(&m, 2.0);
    assert!(priors.is_empty());
}
