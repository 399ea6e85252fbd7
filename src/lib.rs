//! Consensus metrics derived from a TWINS-style block index: network
//! difficulty, proof-of-stake kernel rate and windowed transaction volume.
//!
//! All metrics are read-only walks backward from a tip supplied by the caller.

pub mod blockchain;
pub mod chainparams;
pub mod error;
pub mod metrics;
pub mod util;

pub use blockchain::{BlockHeaderData, BlockIndex, ChainState};
pub use chainparams::ChainParams;
pub use error::{MetricsError, Result};
pub use metrics::difficulty::{decode_difficulty, difficulty_from_bits, difficulty_summary, DifficultySummary};
pub use metrics::kernel_rate::estimate_kernel_rate;
pub use metrics::tx_volume::{compute_windowed_volume, VolumeWindow, WindowedTxVolume};
pub use metrics::ChainMetrics;
