pub mod difficulty;
pub mod kernel_rate;
pub mod tx_volume;

use crate::blockchain::chain_state::ChainState;
use crate::chainparams::ChainParams;
use crate::error::{MetricsError, Result};

use self::difficulty::DifficultySummary;
use self::tx_volume::VolumeWindow;

/// Metrics over the best chain of a `ChainState` snapshot, using the fork
/// height and sample size configured in `ChainParams`.
///
/// Borrowing the state for the query's duration is what keeps the chain
/// immutable while it is walked.
#[derive(Debug, Clone, Copy)]
pub struct ChainMetrics<'a> {
    chain: &'a ChainState,
    params: &'a ChainParams,
}

impl<'a> ChainMetrics<'a> {
    pub fn new(chain: &'a ChainState, params: &'a ChainParams) -> Self {
        ChainMetrics { chain, params }
    }

    /// Proof-of-work difficulty at the tip (`getdifficulty` without a block).
    pub fn difficulty(&self) -> f64 {
        let tip = self.chain.get_tip();
        difficulty::decode_difficulty(None, tip.as_deref(), self.params.fork_height)
    }

    pub fn difficulty_summary(&self) -> DifficultySummary {
        let tip = self.chain.get_tip();
        difficulty::difficulty_summary(tip.as_deref(), self.params.fork_height)
    }

    pub fn kernel_rate(&self) -> f64 {
        let tip = self.chain.get_tip();
        kernel_rate::estimate_kernel_rate(tip.as_deref(), self.params.fork_height, self.params.kernel_sample_size)
    }

    /// Windowed transaction volume ending at the tip. Also rejects a tip
    /// timestamped before genesis.
    pub fn windowed_tx_volume(&self, period: i64, window_size: i64, granularity: i64) -> Result<Vec<VolumeWindow>> {
        tx_volume::validate_window_params(period, window_size, granularity)?;
        let tip = self.chain.get_tip();
        if let (Some(tip), Some(genesis)) = (tip.as_deref(), self.chain.genesis()) {
            if tip.get_block_time() < genesis.get_block_time() {
                return Err(MetricsError::InvalidBlockTime {
                    tip_time: tip.get_block_time(),
                    genesis_time: genesis.get_block_time(),
                });
            }
        }
        tx_volume::compute_windowed_volume(tip.as_deref(), period, window_size, granularity)
    }
}
