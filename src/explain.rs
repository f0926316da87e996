//! Score attribution: decomposes a candidate's log score into ranked
//! per-feature contributions.
//!
//! Each feature contributes the difference between its posterior and prior
//! log-normaliser terms. For a prepared query of size `Q` with feature
//! frequencies `q_j`, the shared shrinkage `ln(a_j+b_j) - ln(a_j+b_j+Q)`
//! combines with either the presence ratio (candidate has the feature) or
//! the absence ratio (candidate lacks it). Under `IncludeAbsent` the terms
//! over all active features sum exactly to the candidate's log score;
//! the default mode drops absence terms for features outside the query
//! aggregate, which are identical for every candidate and explain nothing.

use log::debug;

use crate::query::QueryHandler;

/// Which features an explanation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributionMode {
    /// Features the candidate has, plus absence terms for query features
    /// the candidate lacks. Constant-across-candidates terms are filtered.
    #[default]
    PresentOnly,
    /// Every active feature, so contributions total the full log score.
    IncludeAbsent,
}

/// Ranked per-feature attribution for one (query, candidate) pairing.
///
/// `total_score` is the sum of the terms kept after truncation, not the
/// candidate's full log score; the dominant terms are the point.
#[derive(Debug, Clone, Default)]
pub struct Explanation {
    pub scores: Vec<(String, f64)>,
    pub total_score: f64,
}

impl Explanation {
    /// The empty explanation, returned for unknown candidates.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Attributes `row`'s score under the query prepared in `handler`.
pub(crate) fn explain_candidate(
    handler: &QueryHandler<'_>,
    row: usize,
    max_terms: usize,
    mode: AttributionMode,
) -> Explanation {
    let index = handler.shared_index();
    let matrix = index.matrix();
    let priors = index.priors();
    let q = handler.feature_frequencies();
    let query_size = handler.resolved_rows().len() as u32;

    let mut present = vec![false; matrix.ncols()];
    for &col in matrix.row(row) {
        present[col as usize] = true;
    }

    let mut terms: Vec<(u32, f64)> = Vec::new();
    for j in 0..matrix.ncols() {
        if !priors.is_active(j) {
            continue;
        }
        let contribution = if present[j] {
            priors.presence_ratio(j, q[j]) + priors.shrinkage(j, query_size)
        } else {
            if mode == AttributionMode::PresentOnly && q[j] == 0 {
                continue;
            }
            priors.absence_ratio(j, query_size, q[j]) + priors.shrinkage(j, query_size)
        };
        terms.push((j as u32, contribution));
    }

    // Largest contribution first; equal contributions by ascending column.
    terms.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    terms.truncate(max_terms);

    let total_score: f64 = terms.iter().map(|&(_, c)| c).sum();
    debug!(
        "Explained row {} with {} terms, total {:.6}",
        row,
        terms.len(),
        total_score
    );

    Explanation {
        scores: terms
            .into_iter()
            .map(|(col, c)| (index.feature_label_of(col as usize).to_owned(), c))
            .collect(),
        total_score,
    }
}
