#[cfg(test)]
mod test_matrix;
#[cfg(test)]
mod test_priors;

use crate::core::{ComputedIndex, IndexOptions};

/// Four pairs over three items and three features:
/// item 1 has {a, b}, item 2 has {a}, item 3 has {c}.
pub fn tiny_pairs() -> Vec<(u64, String)> {
    [(1, "a"), (1, "b"), (2, "a"), (3, "c")]
        .into_iter()
        .map(|(id, ft)| (id, ft.to_string()))
        .collect()
}

pub fn tiny_index() -> ComputedIndex {
    ComputedIndex::from_pairs(tiny_pairs(), IndexOptions::default())
}

pub fn tiny_index_with(options: IndexOptions) -> ComputedIndex {
    ComputedIndex::from_pairs(tiny_pairs(), options)
}
