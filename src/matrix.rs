//! Binary CSR matrix over {0,1} cells.
//!
//! ## Construction overview
//!
//! The raw index records presence pairs as two parallel coordinate streams,
//! duplicates included. Canonicalisation happens here, in place:
//!
//! 1. **Count**: per-row pair counts from the row stream (pre-dedup)
//! 2. **Scatter**: fill `col_idx` with a moving per-row cursor derived from
//!    the prefix sum of the counts
//! 3. **Sort + compact**: sort each row's slice ascending, squeeze out
//!    duplicate columns in place, record the surviving length
//! 4. **Repack**: recompute `row_ptr` as the exact prefix sum of the
//!    compacted lengths and left-shift `col_idx` accordingly
//!
//! Cell values are implicitly 1, so the matrix is just `row_ptr` and
//! `col_idx`. Row sorting runs across rows in parallel; everything else is
//! a linear pass. Total cost is O(nnz log(max row length)).

use log::{debug, info};
use rayon::prelude::*;

/// Read-only sparse binary matrix in compressed sparse row form.
///
/// Invariants, established by [`BinaryCsr::from_pairs`] and never broken
/// afterwards:
///
/// - `row_ptr` is non-decreasing with `row_ptr[0] = 0` and
///   `row_ptr[nrows] = nnz`
/// - within each row, `col_idx` is strictly ascending (no duplicates)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryCsr {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<u32>,
}

impl BinaryCsr {
    /// Builds the canonical matrix from raw presence-pair coordinates.
    ///
    /// `rows[k]` and `cols[k]` form the k-th pair. Duplicate pairs collapse
    /// to a single cell. An empty pair list yields a valid all-zero matrix.
    ///
    /// # Panics
    ///
    /// Panics if the streams differ in length or any coordinate is out of
    /// bounds; the loader validates both before handing coordinates over.
    pub fn from_pairs(nrows: usize, ncols: usize, rows: &[u32], cols: &[u32]) -> Self {
        assert_eq!(rows.len(), cols.len(), "coordinate streams differ in length");
        assert!(
            rows.iter().all(|&r| (r as usize) < nrows),
            "row coordinate out of bounds"
        );
        assert!(
            cols.iter().all(|&c| (c as usize) < ncols),
            "column coordinate out of bounds"
        );

        info!(
            "Building {}x{} binary CSR from {} presence pairs",
            nrows,
            ncols,
            rows.len()
        );

        // Step 1: provisional per-row counts, shifted by one so the same
        // buffer becomes the prefix sum.
        let mut row_ptr = vec![0usize; nrows + 1];
        for &r in rows {
            row_ptr[r as usize + 1] += 1;
        }
        for i in 0..nrows {
            row_ptr[i + 1] += row_ptr[i];
        }

        // Step 2: scatter columns with a moving per-row cursor.
        let mut cursor: Vec<usize> = row_ptr[..nrows].to_vec();
        let mut col_idx = vec![0u32; rows.len()];
        for (&r, &c) in rows.iter().zip(cols.iter()) {
            let slot = cursor[r as usize];
            col_idx[slot] = c;
            cursor[r as usize] = slot + 1;
        }

        // Step 3: per-row sort and in-place dedup, parallel across rows.
        let mut lens = vec![0usize; nrows];
        {
            let mut row_slices: Vec<&mut [u32]> = Vec::with_capacity(nrows);
            let mut rest: &mut [u32] = &mut col_idx;
            for r in 0..nrows {
                let (head, tail) = rest.split_at_mut(row_ptr[r + 1] - row_ptr[r]);
                row_slices.push(head);
                rest = tail;
            }
            row_slices
                .par_iter_mut()
                .zip(lens.par_iter_mut())
                .for_each(|(slice, len)| {
                    slice.sort_unstable();
                    *len = compact_sorted(slice);
                });
        }

        // Step 4: exact prefix sum over compacted lengths, left-shifting the
        // surviving columns as we go (writes never overtake reads).
        let mut write = 0usize;
        let mut packed_ptr = Vec::with_capacity(nrows + 1);
        packed_ptr.push(0);
        for r in 0..nrows {
            let start = row_ptr[r];
            let len = lens[r];
            col_idx.copy_within(start..start + len, write);
            write += len;
            packed_ptr.push(write);
        }
        col_idx.truncate(write);
        col_idx.shrink_to_fit();

        debug!(
            "CSR canonicalised: {} cells survive from {} raw pairs",
            write,
            rows.len()
        );

        Self { nrows, ncols, row_ptr: packed_ptr, col_idx }
    }

    /// Shape (N, M).
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of nonzero cells after dedup.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.row_ptr[self.nrows]
    }

    /// Columns of row `i`, strictly ascending.
    ///
    /// # Panics
    ///
    /// Panics if `i >= nrows`.
    #[inline]
    pub fn row(&self, i: usize) -> &[u32] {
        assert!(i < self.nrows, "row index out of bounds");
        &self.col_idx[self.row_ptr[i]..self.row_ptr[i + 1]]
    }

    /// Whether cell (row, col) is set.
    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.row(row).binary_search(&(col as u32)).is_ok()
    }

    /// The row pointer array, length `nrows + 1`.
    #[inline]
    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    /// The column index array, length `nnz`.
    #[inline]
    pub fn col_idx(&self) -> &[u32] {
        &self.col_idx
    }

    /// Per-column cell counts (document frequency of each feature).
    pub fn col_frequencies(&self) -> Vec<u32> {
        let mut freq = vec![0u32; self.ncols];
        for &c in &self.col_idx {
            freq[c as usize] += 1;
        }
        freq
    }
}

/// Squeezes duplicates out of a sorted slice, returning the surviving length.
fn compact_sorted(slice: &mut [u32]) -> usize {
    if slice.is_empty() {
        return 0;
    }
    let mut w = 1usize;
    for r in 1..slice.len() {
        if slice[r] != slice[w - 1] {
            slice[w] = slice[r];
            w += 1;
        }
    }
    w
}
