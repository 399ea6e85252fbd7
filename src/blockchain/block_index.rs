// src/blockchain/block_index.rs

use std::sync::Arc;

use crate::blockchain::block_header::BlockHeaderData;
use crate::blockchain::chain_view::Ancestors;
use crate::util::{bits_to_hex, hash_to_hex};

/// One accepted block on some chain (main or side).
///
/// Nodes are immutable once linked: `prev` is a shared back reference to the
/// preceding node, so many readers can walk the same ancestry concurrently.
/// Heights strictly decrease by one along `prev` down to genesis.
pub struct BlockIndex {
    pub hash: [u8; 32],
    pub height: u32,
    pub header: BlockHeaderData,
    pub is_proof_of_stake: bool,
    // Number of transactions recorded in the block.
    pub tx_volume: u32,
    prev: Option<Arc<BlockIndex>>,
}

impl BlockIndex {
    pub fn genesis(header: BlockHeaderData, is_proof_of_stake: bool, tx_volume: u32) -> Self {
        BlockIndex {
            hash: header.get_hash(),
            height: 0,
            header,
            is_proof_of_stake,
            tx_volume,
            prev: None,
        }
    }

    /// Links a new node on top of `prev`; its height is `prev.height + 1`.
    pub fn extend(prev: &Arc<BlockIndex>, header: BlockHeaderData, is_proof_of_stake: bool, tx_volume: u32) -> Self {
        BlockIndex {
            hash: header.get_hash(),
            height: prev.height + 1,
            header,
            is_proof_of_stake,
            tx_volume,
            prev: Some(Arc::clone(prev)),
        }
    }

    pub fn prev(&self) -> Option<&BlockIndex> {
        self.prev.as_deref()
    }

    pub fn prev_arc(&self) -> Option<&Arc<BlockIndex>> {
        self.prev.as_ref()
    }

    pub fn get_block_time(&self) -> u32 {
        self.header.timestamp
    }

    pub fn bits(&self) -> u32 {
        self.header.bits
    }

    pub fn is_genesis(&self) -> bool {
        self.prev.is_none() && self.height == 0
    }

    pub fn flags(&self) -> &'static str {
        if self.is_proof_of_stake {
            "proof-of-stake"
        } else {
            "proof-of-work"
        }
    }

    /// Backward walk starting at (and including) this node.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors::new(self)
    }
}

// Shows the parent by hash only; deriving would print the whole ancestry.
impl std::fmt::Debug for BlockIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockIndex")
         .field("hash", &hash_to_hex(&self.hash))
         .field("height", &self.height)
         .field("time", &self.header.timestamp)
         .field("bits", &bits_to_hex(self.header.bits))
         .field("flags", &self.flags())
         .field("tx_volume", &self.tx_volume)
         .field("prev", &self.prev.as_ref().map(|p| hash_to_hex(&p.hash)))
         .finish()
    }
}

// Unlink the ancestry iteratively; a long chain would otherwise drop recursively.
impl Drop for BlockIndex {
    fn drop(&mut self) {
        let mut next = self.prev.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut owned) => next = owned.prev.take(),
                Err(_) => break,
            }
        }
    }
}
