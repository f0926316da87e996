//! Per-query evaluation: weight derivation, fused sparse mat-vec, top-K.
//!
//! A handler is a single-shot, single-threaded object owning its scratch
//! buffers (`q`, `u`, the score heap). The computed index it borrows is
//! immutable and shared, so any number of handlers may run concurrently on
//! separate threads.
//!
//! Scoring turns the Bayesian Sets posterior ratio into an affine function
//! of each binary row. With `Q` resolved query rows and `q_j` the query
//! feature frequency, every active feature gets
//!
//! ```text
//! u_j = [ln(a_j + q_j) - ln a_j] - [ln(b_j + Q - q_j) - ln b_j]
//! ```
//!
//! and the whole query gets one bias
//!
//! ```text
//! bias = sum_j [ln(b_j + Q - q_j) - ln b_j + ln(a_j + b_j) - ln(a_j + b_j + Q)]
//! ```
//!
//! so that `log_score = X . u + bias` in one CSR pass. Candidates never
//! reorder under permutation of the input ids because everything above
//! depends only on the resolved row set.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use log::{debug, info, warn};

use crate::core::ComputedIndex;
use crate::error::{Error, Result};
use crate::explain::{self, Explanation};

/// Rows scored between two cancellation checks.
const CANCEL_BLOCK: usize = 4096;

/// Single-shot query evaluator borrowing a shared [`ComputedIndex`].
///
/// Obtain one per query via [`ComputedIndex::handler`]; the scratch buffers
/// are sized to the index once and reused across [`QueryHandler::prepare`]
/// calls on the same handler.
pub struct QueryHandler<'a> {
    index: &'a ComputedIndex,
    resolved: Vec<usize>,
    q: Vec<u32>,
    u: Vec<f64>,
    bias: f64,
}

impl<'a> QueryHandler<'a> {
    pub(crate) fn new(index: &'a ComputedIndex) -> Self {
        let m = index.num_features();
        Self {
            index,
            resolved: Vec::new(),
            q: vec![0; m],
            u: vec![0.0; m],
            bias: 0.0,
        }
    }

    /// Ranks the whole index against the query and returns the top `top_k`
    /// as `(item_id, log_score)`, best first, equal scores broken towards
    /// the lower row index.
    ///
    /// Unknown ids are dropped; if none resolve, or `top_k` is 0, the
    /// result is empty and no scoring happens.
    pub fn query(&mut self, item_ids: &[u64], top_k: usize) -> Vec<(u64, f64)> {
        // Infallible without a cancellation signal.
        match self.run(item_ids, top_k, None) {
            Ok(ranked) => ranked,
            Err(_) => unreachable!("uncancellable query cannot fail"),
        }
    }

    /// Same as [`QueryHandler::query`] but honouring `cancel` at row-block
    /// boundaries and before the final ordering. Cancellation yields
    /// [`Error::Cancelled`] with no partial results.
    pub fn query_cancellable(
        &mut self,
        item_ids: &[u64],
        top_k: usize,
        cancel: &AtomicBool,
    ) -> Result<Vec<(u64, f64)>> {
        self.run(item_ids, top_k, Some(cancel))
    }

    fn run(
        &mut self,
        item_ids: &[u64],
        top_k: usize,
        cancel: Option<&AtomicBool>,
    ) -> Result<Vec<(u64, f64)>> {
        let query_size = self.prepare(item_ids);
        if query_size == 0 || top_k == 0 {
            return Ok(Vec::new());
        }

        info!(
            "Scoring {} rows against {} query rows, keeping top {}",
            self.index.num_items(),
            query_size,
            top_k
        );
        let ranked = self.top_scores(top_k, cancel)?;
        Ok(ranked
            .into_iter()
            .map(|(row, score)| (self.index.item_id_of(row), score))
            .collect())
    }

    /// Resolves and deduplicates the query ids, accumulates the feature
    /// frequency vector and derives the per-query weights. Returns the
    /// resolved query size `Q`; 0 means nothing to score.
    pub fn prepare(&mut self, item_ids: &[u64]) -> usize {
        self.resolved.clear();
        for &id in item_ids {
            match self.index.row_of(id) {
                Some(row) => {
                    // First occurrence wins; later repeats collapse.
                    if !self.resolved.contains(&row) {
                        self.resolved.push(row);
                    }
                }
                None => warn!("Unknown item id {id} in query, dropping"),
            }
        }

        let query_size = self.resolved.len() as u32;
        if query_size == 0 {
            debug!("No query ids resolved");
            return 0;
        }

        // Query feature frequencies: q_j = number of resolved rows with j.
        self.q.fill(0);
        let matrix = self.index.matrix();
        for &row in &self.resolved {
            for &col in matrix.row(row) {
                self.q[col as usize] += 1;
            }
        }

        self.derive_weights(query_size);
        debug!(
            "Query prepared: Q={}, {} features touched",
            query_size,
            self.q.iter().filter(|&&f| f > 0).count()
        );
        query_size as usize
    }

    fn derive_weights(&mut self, query_size: u32) {
        let priors = self.index.priors();
        self.bias = 0.0;
        for j in 0..self.u.len() {
            if !priors.is_active(j) {
                // Inert column: contributes nothing anywhere.
                self.u[j] = 0.0;
                continue;
            }
            let presence = priors.presence_ratio(j, self.q[j]);
            let absence = priors.absence_ratio(j, query_size, self.q[j]);
            self.u[j] = presence - absence;
            self.bias += absence + priors.shrinkage(j, query_size);
        }
    }

    /// Log score of a single row under the prepared query.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    #[inline]
    pub fn score_row(&self, row: usize) -> f64 {
        let mut score = self.bias;
        for &col in self.index.matrix().row(row) {
            score += self.u[col as usize];
        }
        score
    }

    /// Fused mat-vec and bounded top-K selection.
    fn top_scores(
        &self,
        top_k: usize,
        cancel: Option<&AtomicBool>,
    ) -> Result<Vec<(usize, f64)>> {
        let n = self.index.num_items();
        let mut heap: BinaryHeap<Reverse<Candidate>> =
            BinaryHeap::with_capacity(top_k.min(n) + 1);

        for row in 0..n {
            if row % CANCEL_BLOCK == 0 {
                check_cancel(cancel)?;
            }
            let score = self.score_row(row);
            if !score.is_finite() {
                // Degenerate scores sort below anything finite; keep them out.
                continue;
            }
            let candidate = Candidate { score, row };
            if heap.len() < top_k {
                heap.push(Reverse(candidate));
            } else if let Some(worst) = heap.peek() {
                if candidate > worst.0 {
                    heap.pop();
                    heap.push(Reverse(candidate));
                }
            }
        }

        check_cancel(cancel)?;
        let ranked: Vec<(usize, f64)> = heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(c)| (c.row, c.score))
            .collect();
        debug!("Top-K selection kept {} rows", ranked.len());
        Ok(ranked)
    }

    /// Explains each candidate's score under the query defined by
    /// `item_ids`, reusing this handler's scratch buffers.
    ///
    /// Unknown candidates yield an empty [`Explanation`]; a query that
    /// resolves to nothing yields an empty list.
    pub fn detailed_scores(
        &mut self,
        item_ids: &[u64],
        candidate_ids: &[u64],
        max_terms: usize,
    ) -> Vec<Explanation> {
        if self.prepare(item_ids) == 0 {
            return Vec::new();
        }
        debug!("Explaining {} candidates", candidate_ids.len());
        let mode = self.index.options().attribution_mode;
        candidate_ids
            .iter()
            .map(|&id| match self.index.row_of(id) {
                Some(row) => explain::explain_candidate(self, row, max_terms, mode),
                None => Explanation::empty(),
            })
            .collect()
    }

    /// Resolved query rows, in first-occurrence order.
    #[inline]
    pub fn resolved_rows(&self) -> &[usize] {
        &self.resolved
    }

    /// Query feature frequencies after [`QueryHandler::prepare`].
    #[inline]
    pub(crate) fn feature_frequencies(&self) -> &[u32] {
        &self.q
    }

    #[inline]
    pub(crate) fn shared_index(&self) -> &'a ComputedIndex {
        self.index
    }
}

fn check_cancel(cancel: Option<&AtomicBool>) -> Result<()> {
    if let Some(flag) = cancel {
        if flag.load(AtomicOrdering::Relaxed) {
            info!("Query cancelled before completion");
            return Err(Error::Cancelled);
        }
    }
    Ok(())
}

/// Heap entry ordered so that a greater candidate is a better result:
/// higher score first, then the lower row index on equal scores.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    score: f64,
    row: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Scores are finite by construction, so total_cmp is a plain
        // numeric comparison here.
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.row.cmp(&self.row))
    }
}
