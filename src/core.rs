//! The computed index: sealed CSR matrix, identifier tables and
//! hyperparameters, shared immutably across any number of query handlers.
//!
//! Construction is batch-only. Either load the four raw files from disk or
//! feed pairs straight from memory; both paths end at the same canonical
//! matrix and precomputed priors, so two loads of the same directory are
//! bit-identical. After that the index never changes, which is what makes
//! lock-free concurrent querying safe.

use std::path::Path;

use log::info;
use rand::seq::index::sample;

use crate::error::Result;
use crate::explain::{AttributionMode, Explanation};
use crate::matrix::BinaryCsr;
use crate::priors::{Priors, SMOOTHING_DEFAULT};
use crate::query::QueryHandler;
use crate::storage::RawIndex;
use crate::vocab::{FeatureTable, ItemTable};

/// Default result count when the caller leaves `top_k` unset.
pub const TOP_K_DEFAULT: usize = 10;

/// Load-time configuration, consumed once when the index is computed.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Scales the alpha/beta priors; higher values flatten scores.
    pub smoothing_c: f64,
    /// Result count used when a query omits `top_k`.
    pub top_k_default: usize,
    /// Which features explanations report.
    pub attribution_mode: AttributionMode,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            smoothing_c: SMOOTHING_DEFAULT,
            top_k_default: TOP_K_DEFAULT,
            attribution_mode: AttributionMode::default(),
        }
    }
}

impl IndexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if `c` is not strictly positive.
    pub fn with_smoothing_c(mut self, c: f64) -> Self {
        assert!(c > 0.0, "smoothing constant must be positive");
        self.smoothing_c = c;
        self
    }

    pub fn with_top_k_default(mut self, top_k: usize) -> Self {
        self.top_k_default = top_k;
        self
    }

    pub fn with_attribution_mode(mut self, mode: AttributionMode) -> Self {
        self.attribution_mode = mode;
        self
    }
}

/// A sealed, queryable index.
///
/// Owns the CSR arrays, both identifier tables and the hyperparameter
/// vectors. Everything is read-only after construction; handlers borrow it
/// and keep their own scratch state.
pub struct ComputedIndex {
    items: ItemTable,
    features: FeatureTable,
    matrix: BinaryCsr,
    priors: Priors,
    options: IndexOptions,
}

impl ComputedIndex {
    /// Loads the four raw files under `dir` with default options.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(dir, IndexOptions::default())
    }

    /// Loads the four raw files under `dir`, builds the canonical matrix
    /// and precomputes hyperparameters.
    pub fn load_with(dir: impl AsRef<Path>, options: IndexOptions) -> Result<Self> {
        let raw = RawIndex::read(dir)?;
        Ok(Self::seal(raw.items, raw.features, &raw.xco, &raw.yco, options))
    }

    /// Builds an index directly from in-memory pairs, bypassing disk.
    ///
    /// Ids and labels intern in first-appearance order, exactly as the
    /// writer assigns them, so this agrees with a write-then-load cycle.
    pub fn from_pairs<I>(source: I, options: IndexOptions) -> Self
    where
        I: IntoIterator<Item = (u64, String)>,
    {
        let mut items = ItemTable::new();
        let mut features = FeatureTable::new();
        let mut xco = Vec::new();
        let mut yco = Vec::new();
        for (id, feature) in source {
            let (row, _) = items.intern(id);
            let (col, _) = features.intern(&feature);
            xco.push(row as u32);
            yco.push(col as u32);
        }
        Self::seal(items, features, &xco, &yco, options)
    }

    fn seal(
        items: ItemTable,
        features: FeatureTable,
        xco: &[u32],
        yco: &[u32],
        options: IndexOptions,
    ) -> Self {
        let matrix = BinaryCsr::from_pairs(items.len(), features.len(), xco, yco);
        let priors = Priors::from_matrix(&matrix, options.smoothing_c);
        info!(
            "Computed index sealed: {} items, {} features, {} cells",
            items.len(),
            features.len(),
            matrix.nnz()
        );
        Self { items, features, matrix, priors, options }
    }

    /// Number of items (rows) N.
    #[inline]
    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    /// Number of features (columns) M.
    #[inline]
    pub fn num_features(&self) -> usize {
        self.features.len()
    }

    #[inline]
    pub fn matrix(&self) -> &BinaryCsr {
        &self.matrix
    }

    #[inline]
    pub fn priors(&self) -> &Priors {
        &self.priors
    }

    #[inline]
    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    #[inline]
    pub fn row_of(&self, item_id: u64) -> Option<usize> {
        self.items.row_of(item_id)
    }

    /// # Panics
    ///
    /// Panics if `row >= num_items()`.
    #[inline]
    pub fn item_id_of(&self, row: usize) -> u64 {
        self.items.id_of(row)
    }

    /// # Panics
    ///
    /// Panics if `col >= num_features()`.
    #[inline]
    pub fn feature_label_of(&self, col: usize) -> &str {
        self.features.label_of(col)
    }

    /// A fresh single-shot handler borrowing this index.
    pub fn handler(&self) -> QueryHandler<'_> {
        QueryHandler::new(self)
    }

    /// Ranks the index against the query set and returns the best `top_k`
    /// items with their log scores, best first. `None` falls back to the
    /// configured default count.
    pub fn query(&self, item_ids: &[u64], top_k: Option<usize>) -> Vec<(u64, f64)> {
        let top_k = top_k.unwrap_or(self.options.top_k_default);
        self.handler().query(item_ids, top_k)
    }

    /// Explains each candidate's score under the query defined by
    /// `item_ids`, keeping at most `max_terms` contributions per candidate.
    ///
    /// Unknown candidates yield an empty [`Explanation`]; a query that
    /// resolves to nothing yields an empty list.
    pub fn get_detailed_scores(
        &self,
        item_ids: &[u64],
        candidate_ids: &[u64],
        max_terms: usize,
    ) -> Vec<Explanation> {
        self.handler().detailed_scores(item_ids, candidate_ids, max_terms)
    }

    /// Up to `count` distinct external ids drawn uniformly at random,
    /// handy for smoke-testing a freshly loaded index.
    pub fn sample_item_ids(&self, count: usize) -> Vec<u64> {
        let n = self.items.len();
        let amount = count.min(n);
        if amount == 0 {
            return Vec::new();
        }
        let mut rng = rand::rng();
        sample(&mut rng, n, amount)
            .iter()
            .map(|row| self.items.id_of(row))
            .collect()
    }
}

/// Loads the index under `dir` and queries it in one call.
pub fn search(dir: impl AsRef<Path>, item_ids: &[u64]) -> Result<Vec<(u64, f64)>> {
    let index = ComputedIndex::load(dir)?;
    Ok(index.query(item_ids, None))
}
