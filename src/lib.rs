//! Item-based similarity retrieval with the Bayesian Sets model.
//!
//! A query is a set of item ids exemplifying some latent concept; the
//! engine ranks every indexed item by the log-likelihood ratio that it
//! belongs to the same concept, under a Beta-Bernoulli model over binary
//! features, and can decompose any score into ranked per-feature
//! contributions.
//!
//! The pipeline has three stages:
//!
//! - **Build**: [`storage::IndexWriter`] appends `(item_id, feature)`
//!   presence pairs to four plain-text files; [`storage::Indexer`] drives
//!   any pair iterator through it.
//! - **Seal**: [`ComputedIndex::load`] reads the files back, canonicalises
//!   the pairs into a binary CSR matrix and precomputes the per-feature
//!   hyperparameters. The result is immutable and cheap to share.
//! - **Query**: [`QueryHandler`] owns the per-query scratch state and
//!   evaluates the whole index with one fused sparse mat-vec plus a
//!   bounded top-K selection; [`explain::Explanation`] attributes any
//!   candidate's score back to its features.
//!
//! # Examples
//!
//! ```no_run
//! use bayesets::ComputedIndex;
//!
//! let index = ComputedIndex::load("data/films")?;
//! for (item_id, log_score) in index.query(&[42, 7], Some(5)) {
//!     println!("{item_id}: {log_score:.4}");
//! }
//! # Ok::<(), bayesets::Error>(())
//! ```

pub mod core;
pub mod error;
pub mod explain;
pub mod matrix;
pub mod priors;
pub mod query;
pub mod storage;
pub mod vocab;

pub use crate::core::{search, ComputedIndex, IndexOptions, TOP_K_DEFAULT};
pub use crate::error::{Error, Result};
pub use crate::explain::{AttributionMode, Explanation};
pub use crate::matrix::BinaryCsr;
pub use crate::priors::{Priors, SMOOTHING_DEFAULT};
pub use crate::query::QueryHandler;
pub use crate::storage::{IndexStats, IndexWriter, Indexer, RawIndex};

#[cfg(test)]
mod tests;
