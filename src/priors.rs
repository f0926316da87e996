//! Beta-Bernoulli hyperparameters precomputed per feature column.
//!
//! For column sum `s_j` over N items and smoothing constant `c`:
//!
//! - `alpha_j = c * s_j / N`
//! - `beta_j  = c * (N - s_j) / N`
//!
//! so `alpha_j + beta_j = c` for every feature. The natural logs of alpha,
//! beta and their sum are cached here once, which turns the per-query log
//! score into an affine function of a candidate's binary row and the whole
//! N-scoring pass into one sparse mat-vec plus a bias.
//!
//! Zero columns (`s_j = 0`) are retained but inert: no row contains them,
//! so their weights are pinned to zero and they are skipped in every sum.
//! A full column (`s_j = N`) has `beta_j = 0`; its absence ratio is pinned
//! to zero for the symmetric reason that no row lacks it.

use log::{debug, info};

use crate::matrix::BinaryCsr;

/// Default smoothing constant applied to the empirical feature means.
pub const SMOOTHING_DEFAULT: f64 = 2.0;

/// Precomputed per-feature hyperparameters, all 64-bit floats.
#[derive(Debug, Clone)]
pub struct Priors {
    smoothing_c: f64,
    col_freq: Vec<u32>,
    alpha: Vec<f64>,
    beta: Vec<f64>,
    log_alpha: Vec<f64>,
    log_beta: Vec<f64>,
    log_alpha_plus_beta: Vec<f64>,
}

impl Priors {
    /// Computes hyperparameters from the sealed matrix.
    ///
    /// # Panics
    ///
    /// Panics if `smoothing_c` is not strictly positive.
    pub fn from_matrix(matrix: &BinaryCsr, smoothing_c: f64) -> Self {
        assert!(smoothing_c > 0.0, "smoothing constant must be positive");

        let (n, m) = matrix.shape();
        info!("Computing hyperparameters for {} features over {} items", m, n);
        debug!("Smoothing constant c={}", smoothing_c);

        let col_freq = matrix.col_frequencies();
        let nf = n as f64;

        let mut alpha = Vec::with_capacity(m);
        let mut beta = Vec::with_capacity(m);
        let mut log_alpha = Vec::with_capacity(m);
        let mut log_beta = Vec::with_capacity(m);
        let mut log_alpha_plus_beta = Vec::with_capacity(m);

        let mut inert = 0usize;
        for &s in &col_freq {
            // N = 0 only for the empty index, where every column is inert.
            let (a, b) = if n == 0 {
                (0.0, 0.0)
            } else {
                let sf = f64::from(s);
                (smoothing_c * sf / nf, smoothing_c * (nf - sf) / nf)
            };
            alpha.push(a);
            beta.push(b);
            // Logs of zero parameters are pinned to 0.0 and guarded at every
            // use site; the parameter being zero makes the ratio unreachable.
            log_alpha.push(if a > 0.0 { a.ln() } else { 0.0 });
            log_beta.push(if b > 0.0 { b.ln() } else { 0.0 });
            log_alpha_plus_beta.push(if a + b > 0.0 { (a + b).ln() } else { 0.0 });
            if s == 0 {
                inert += 1;
            }
        }

        if inert > 0 {
            debug!("{} zero columns retained as inert", inert);
        }

        Self { smoothing_c, col_freq, alpha, beta, log_alpha, log_beta, log_alpha_plus_beta }
    }

    #[inline]
    pub fn smoothing_c(&self) -> f64 {
        self.smoothing_c
    }

    /// Number of feature columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.alpha.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.alpha.is_empty()
    }

    /// Document frequency `s_j` of each feature.
    #[inline]
    pub fn col_freq(&self) -> &[u32] {
        &self.col_freq
    }

    /// Whether feature `j` occurs at all; inert columns fail this.
    #[inline]
    pub fn is_active(&self, j: usize) -> bool {
        self.col_freq[j] > 0
    }

    #[inline]
    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    #[inline]
    pub fn beta(&self) -> &[f64] {
        &self.beta
    }

    #[inline]
    pub fn log_alpha(&self) -> &[f64] {
        &self.log_alpha
    }

    #[inline]
    pub fn log_beta(&self) -> &[f64] {
        &self.log_beta
    }

    #[inline]
    pub fn log_alpha_plus_beta(&self) -> &[f64] {
        &self.log_alpha_plus_beta
    }

    /// Ratio `ln(alpha_j + q_j) - ln(alpha_j)`, the presence increment for a
    /// feature seen `q_j` times in the query aggregate.
    ///
    /// Defined as 0 for inert columns, which no query can ever count.
    #[inline]
    pub fn presence_ratio(&self, j: usize, q_j: u32) -> f64 {
        if self.alpha[j] > 0.0 {
            (self.alpha[j] + f64::from(q_j)).ln() - self.log_alpha[j]
        } else {
            0.0
        }
    }

    /// Ratio `ln(beta_j + Q - q_j) - ln(beta_j)`, the absence increment.
    ///
    /// A full column has `beta_j = 0` and necessarily `q_j = Q`, so the
    /// ratio is pinned to 0 rather than evaluating `ln(0) - ln(0)`.
    #[inline]
    pub fn absence_ratio(&self, j: usize, query_size: u32, q_j: u32) -> f64 {
        if self.beta[j] > 0.0 {
            (self.beta[j] + f64::from(query_size - q_j)).ln() - self.log_beta[j]
        } else {
            0.0
        }
    }

    /// Shared shrinkage term `ln(alpha_j + beta_j) - ln(alpha_j + beta_j + Q)`.
    #[inline]
    pub fn shrinkage(&self, j: usize, query_size: u32) -> f64 {
        self.log_alpha_plus_beta[j]
            - (self.alpha[j] + self.beta[j] + f64::from(query_size)).ln()
    }
}
