pub mod chunk_buffer;
pub mod codec;
pub mod resource_state;
pub mod transfer_mode;

pub use chunk_buffer::ChunkBuffer;
pub use codec::Codec;
pub use resource_state::ResourceState;
pub use transfer_mode::{TransferMode, TransferRequest};
