//! Identifier tables: external item ids and feature labels mapped onto the
//! dense row and column indices the matrix works with.
//!
//! Both tables are insertion-ordered bijections. A dense index is assigned
//! the first time a key is seen and never reused; the reverse direction is
//! an append-only list, so `ids()[row]` and `labels()[col]` are exactly the
//! line layouts of the `.ids` and `.fts` files.

use std::collections::HashMap;

/// External item id (arbitrary non-negative integer) to dense row index.
#[derive(Debug, Clone, Default)]
pub struct ItemTable {
    map: HashMap<u64, usize>,
    ids: Vec<u64>,
}

impl ItemTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the table from ids in row order, as read from `.ids`.
    ///
    /// Returns the first duplicated id on failure, leaving the table
    /// unusable; a valid index never repeats an external id.
    pub fn from_rows(ids: Vec<u64>) -> std::result::Result<Self, u64> {
        let mut map = HashMap::with_capacity(ids.len());
        for (row, &id) in ids.iter().enumerate() {
            if map.insert(id, row).is_some() {
                return Err(id);
            }
        }
        Ok(Self { map, ids })
    }

    /// Number of distinct items (N).
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the row for `id`, allocating the next dense index if new.
    #[inline]
    pub fn intern(&mut self, id: u64) -> (usize, bool) {
        if let Some(&row) = self.map.get(&id) {
            return (row, false);
        }
        let row = self.ids.len();
        self.map.insert(id, row);
        self.ids.push(id);
        (row, true)
    }

    #[inline]
    pub fn row_of(&self, id: u64) -> Option<usize> {
        self.map.get(&id).copied()
    }

    /// # Panics
    ///
    /// Panics if `row >= len()`.
    #[inline]
    pub fn id_of(&self, row: usize) -> u64 {
        assert!(row < self.ids.len(), "row index out of bounds");
        self.ids[row]
    }

    /// All external ids in row order.
    #[inline]
    pub fn ids(&self) -> &[u64] {
        &self.ids
    }
}

/// Feature label (UTF-8 string) to dense column index.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    map: HashMap<String, usize>,
    labels: Vec<String>,
}

impl FeatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the table from labels in column order, as read from `.fts`.
    pub fn from_cols(labels: Vec<String>) -> Self {
        let mut map = HashMap::with_capacity(labels.len());
        for (col, label) in labels.iter().enumerate() {
            map.entry(label.clone()).or_insert(col);
        }
        Self { map, labels }
    }

    /// Number of distinct features (M).
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the column for `label`, allocating the next dense index if new.
    #[inline]
    pub fn intern(&mut self, label: &str) -> (usize, bool) {
        if let Some(&col) = self.map.get(label) {
            return (col, false);
        }
        let col = self.labels.len();
        self.map.insert(label.to_owned(), col);
        self.labels.push(label.to_owned());
        (col, true)
    }

    #[inline]
    pub fn col_of(&self, label: &str) -> Option<usize> {
        self.map.get(label).copied()
    }

    /// # Panics
    ///
    /// Panics if `col >= len()`.
    #[inline]
    pub fn label_of(&self, col: usize) -> &str {
        assert!(col < self.labels.len(), "column index out of bounds");
        &self.labels[col]
    }

    /// All labels in column order.
    #[inline]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
