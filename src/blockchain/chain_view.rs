// src/blockchain/chain_view.rs
//
// Read-only backward traversal over linked block indexes. Every metric in
// `crate::metrics` walks the chain exclusively through these helpers.

use crate::blockchain::block_index::BlockIndex;
use crate::error::{MetricsError, Result};

/// Lazy walk from a starting node back to genesis via `prev`.
///
/// Each call to [`BlockIndex::ancestors`] starts a fresh cursor; the iterator
/// is finite and yields the starting node first.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    next: Option<&'a BlockIndex>,
}

impl<'a> Ancestors<'a> {
    pub fn new(start: &'a BlockIndex) -> Self {
        Ancestors { next: Some(start) }
    }
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a BlockIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.prev();
        Some(current)
    }
}

/// Most recent node at or before `tip` whose stake flag equals `proof_of_stake`.
///
/// When no node matches, the oldest node reached (genesis) is returned.
pub fn last_block_index(tip: &BlockIndex, proof_of_stake: bool) -> &BlockIndex {
    let mut index = tip;
    while index.is_proof_of_stake != proof_of_stake {
        match index.prev() {
            Some(prev) => index = prev,
            None => break,
        }
    }
    index
}

/// Node at `height` on the chain ending in `tip`, found by walking back
/// `tip.height - height` steps.
pub fn ancestor_at_height(tip: &BlockIndex, height: i64) -> Result<&BlockIndex> {
    if height < 0 || height > i64::from(tip.height) {
        return Err(MetricsError::HeightOutOfRange { height, tip_height: tip.height });
    }
    let steps = (i64::from(tip.height) - height) as usize;
    tip.ancestors()
        .nth(steps)
        .ok_or(MetricsError::HeightOutOfRange { height, tip_height: tip.height })
}
