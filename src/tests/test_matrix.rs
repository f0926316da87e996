use crate::matrix::BinaryCsr;

fn assert_canonical(m: &BinaryCsr) {
    let ptr = m.row_ptr();
    assert_eq!(ptr[0], 0);
    assert_eq!(ptr[m.nrows()], m.nnz());
    assert!(ptr.windows(2).all(|w| w[0] <= w[1]), "row_ptr must be non-decreasing");
    for i in 0..m.nrows() {
        let row = m.row(i);
        assert!(
            row.windows(2).all(|w| w[0] < w[1]),
            "row {} not strictly ascending: {:?}",
            i,
            row
        );
    }
}

#[test]
fn builds_canonical_form_from_unsorted_pairs() {
    // Columns arrive out of order and with a repeat on row 0.
    let xco = [0, 1, 0, 0, 2, 0];
    let yco = [2, 1, 0, 2, 3, 1];
    let m = BinaryCsr::from_pairs(3, 4, &xco, &yco);

    assert_canonical(&m);
    assert_eq!(m.nnz(), 5);
    assert_eq!(m.row(0), &[0, 1, 2]);
    assert_eq!(m.row(1), &[1]);
    assert_eq!(m.row(2), &[3]);
}

#[test]
fn membership_matches_added_pairs() {
    let xco = [0, 0, 1, 2];
    let yco = [0, 1, 0, 2];
    let m = BinaryCsr::from_pairs(3, 3, &xco, &yco);

    for (r, c) in xco.iter().zip(yco.iter()) {
        assert!(m.contains(*r as usize, *c as usize));
    }
    assert!(!m.contains(1, 1));
    assert!(!m.contains(2, 0));
}

#[test]
fn duplicates_collapse_to_single_cell() {
    let m = BinaryCsr::from_pairs(1, 1, &[0, 0, 0], &[0, 0, 0]);
    assert_canonical(&m);
    assert_eq!(m.nnz(), 1);
    assert_eq!(m.row(0), &[0]);
}

#[test]
fn pair_order_does_not_change_the_matrix() {
    let a = BinaryCsr::from_pairs(2, 3, &[0, 0, 1, 0], &[2, 0, 1, 1]);
    let b = BinaryCsr::from_pairs(2, 3, &[1, 0, 0, 0], &[1, 1, 2, 0]);
    assert_eq!(a, b);
}

#[test]
fn empty_matrix_is_valid() {
    let m = BinaryCsr::from_pairs(0, 0, &[], &[]);
    assert_eq!(m.shape(), (0, 0));
    assert_eq!(m.nnz(), 0);
    assert_eq!(m.row_ptr(), &[0]);
}

#[test]
fn rows_without_pairs_are_empty() {
    let m = BinaryCsr::from_pairs(4, 2, &[0, 3], &[1, 0]);
    assert_canonical(&m);
    assert_eq!(m.row(1), &[] as &[u32]);
    assert_eq!(m.row(2), &[] as &[u32]);
}

#[test]
fn col_frequencies_count_cells_after_dedup() {
    let m = BinaryCsr::from_pairs(3, 3, &[0, 0, 1, 2, 2, 2], &[0, 0, 0, 1, 1, 2]);
    assert_eq!(m.col_frequencies(), vec![2, 1, 1]);
}
