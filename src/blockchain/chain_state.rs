use std::collections::HashMap;
use std::sync::Arc;

use crate::blockchain::block_header::BlockHeaderData;
use crate::blockchain::block_index::BlockIndex;
use crate::blockchain::chain_view;
use crate::error::{MetricsError, Result};
use crate::util::{hash_from_hex, hash_to_hex};

/// All known block indexes, including side chains, plus the current best chain.
///
/// `ChainState` does no locking of its own. Callers that share it across
/// threads wrap it (e.g. `Arc<RwLock<ChainState>>`) and hold a read guard for
/// the duration of a metrics query.
pub struct ChainState {
    block_index_map: HashMap<[u8; 32], Arc<BlockIndex>>,
    // Best chain by height; main_chain[h].height == h.
    main_chain: Vec<Arc<BlockIndex>>,
    genesis_hash: Option<[u8; 32]>,
}

impl std::fmt::Debug for ChainState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainState")
         .field("block_index_map_len", &self.block_index_map.len())
         .field("current_tip_height", &self.main_chain.last().map(|t| t.height))
         .field("genesis_hash", &self.genesis_hash.map(|h| hash_to_hex(&h)))
         .finish()
    }
}

impl Default for ChainState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainState {
    pub fn new() -> Self {
        ChainState {
            block_index_map: HashMap::new(),
            main_chain: Vec::new(),
            genesis_hash: None,
        }
    }

    /// Adds a block index if it is not already present and returns it.
    ///
    /// A header with a null previous hash becomes genesis when the chain is
    /// empty. Otherwise the parent must already be known. The new node becomes
    /// the tip when it is higher than the current tip; the first block seen at a
    /// given height wins ties.
    pub fn add_block_index(&mut self, header: BlockHeaderData, is_proof_of_stake: bool, tx_volume: u32) -> Result<Arc<BlockIndex>> {
        let new_hash = header.get_hash();
        if let Some(existing) = self.block_index_map.get(&new_hash) {
            return Ok(Arc::clone(existing));
        }

        let new_index = if header.is_genesis_header() && self.genesis_hash.is_none() {
            let genesis = Arc::new(BlockIndex::genesis(header, is_proof_of_stake, tx_volume));
            self.genesis_hash = Some(genesis.hash);
            log::info!("Genesis block set: hash={}", hash_to_hex(&genesis.hash));
            genesis
        } else {
            let prev = self
                .block_index_map
                .get(&header.prev_block_hash)
                .cloned()
                .ok_or_else(|| MetricsError::UnknownParent(hash_to_hex(&header.prev_block_hash)))?;
            Arc::new(BlockIndex::extend(&prev, header, is_proof_of_stake, tx_volume))
        };

        self.block_index_map.insert(new_hash, Arc::clone(&new_index));
        log::debug!("Added block index: height={}, hash={}", new_index.height, hash_to_hex(&new_hash));

        let tip_height = self.main_chain.last().map(|t| t.height);
        if tip_height.map_or(true, |h| new_index.height > h) {
            self.set_tip(&new_index);
        }
        Ok(new_index)
    }

    // Rewrites main_chain so that it ends at `new_tip`.
    fn set_tip(&mut self, new_tip: &Arc<BlockIndex>) {
        let mut branch = Vec::new();
        let mut cursor = Some(Arc::clone(new_tip));
        while let Some(node) = cursor {
            let on_main = self
                .main_chain
                .get(node.height as usize)
                .map_or(false, |m| m.hash == node.hash);
            if on_main {
                break;
            }
            cursor = node.prev_arc().cloned();
            branch.push(node);
        }

        let branch_point = branch.last().map_or(new_tip.height as usize, |n| n.height as usize);
        if branch_point < self.main_chain.len() {
            log::warn!(
                "Best chain switched branches at height {}: {} block(s) detached",
                branch_point,
                self.main_chain.len() - branch_point
            );
            self.main_chain.truncate(branch_point);
        }
        self.main_chain.extend(branch.into_iter().rev());
        log::info!("New chain tip: height={}, hash={}", new_tip.height, hash_to_hex(&new_tip.hash));
    }

    pub fn get_tip(&self) -> Option<Arc<BlockIndex>> {
        self.main_chain.last().cloned()
    }

    pub fn genesis(&self) -> Option<Arc<BlockIndex>> {
        self.genesis_hash.and_then(|hash| self.get(&hash))
    }

    pub fn get(&self, hash: &[u8; 32]) -> Option<Arc<BlockIndex>> {
        self.block_index_map.get(hash).cloned()
    }

    /// Lookup by display-order hex hash (`getblock`).
    pub fn get_by_hex(&self, hash_hex: &str) -> Result<Arc<BlockIndex>> {
        hash_from_hex(hash_hex)
            .and_then(|hash| self.get(&hash))
            .ok_or_else(|| MetricsError::UnknownBlock(hash_hex.to_string()))
    }

    pub fn len(&self) -> usize {
        self.block_index_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.block_index_map.is_empty()
    }

    /// Height of the best tip (`getblockcount`).
    pub fn best_height(&self) -> Result<u32> {
        self.main_chain.last().map(|t| t.height).ok_or(MetricsError::EmptyChain)
    }

    /// Hash of the best tip (`getbestblockhash`).
    pub fn best_block_hash(&self) -> Result<[u8; 32]> {
        self.main_chain.last().map(|t| t.hash).ok_or(MetricsError::EmptyChain)
    }

    /// Main-chain node at `height`, located by walking back from the tip.
    pub fn block_at_height(&self, height: i64) -> Result<Arc<BlockIndex>> {
        let tip = self.main_chain.last().ok_or(MetricsError::EmptyChain)?;
        let found = chain_view::ancestor_at_height(tip, height)?;
        self.get(&found.hash).ok_or_else(|| MetricsError::UnknownBlock(hash_to_hex(&found.hash)))
    }

    /// Main-chain hash at `height` (`getblockhash`).
    pub fn block_hash_at_height(&self, height: i64) -> Result<[u8; 32]> {
        let tip_height = self.best_height()?;
        if height < 0 || height > i64::from(tip_height) {
            return Err(MetricsError::HeightOutOfRange { height, tip_height });
        }
        Ok(self.main_chain[height as usize].hash)
    }

    pub fn is_in_main_chain(&self, index: &BlockIndex) -> bool {
        self.main_chain
            .get(index.height as usize)
            .map_or(false, |m| m.hash == index.hash)
    }

    /// The following node on the main chain; `None` at the tip and for side-chain nodes.
    pub fn next_on_main_chain(&self, index: &BlockIndex) -> Option<Arc<BlockIndex>> {
        if !self.is_in_main_chain(index) {
            return None;
        }
        self.main_chain.get(index.height as usize + 1).cloned()
    }
}
