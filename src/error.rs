use thiserror::Error;

pub type Result<T> = std::result::Result<T, MetricsError>;

#[derive(Debug, Error)]
pub enum MetricsError {
    /// No tip is available; the chain has not been initialised.
    #[error("No blocks.")]
    EmptyChain,

    /// A caller-supplied parameter is outside its accepted range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The tip carries a timestamp earlier than genesis. Should not happen on a valid chain.
    #[error("Invalid block time: tip time {tip_time} is before genesis time {genesis_time}.")]
    InvalidBlockTime { tip_time: u32, genesis_time: u32 },

    #[error("Block number out of range: {height} (best height {tip_height}).")]
    HeightOutOfRange { height: i64, tip_height: u32 },

    #[error("Block not found: {0}")]
    UnknownBlock(String),

    #[error("Parent block not found: {0}")]
    UnknownParent(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl MetricsError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        MetricsError::InvalidParameter { name, reason: reason.into() }
    }
}
