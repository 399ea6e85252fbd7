pub mod block_header;
pub mod block_index;
pub mod chain_state;
pub mod chain_view;

pub use block_header::BlockHeaderData;
pub use block_index::BlockIndex;
pub use chain_state::ChainState;
