pub mod assembler;
pub mod buffer;
pub mod builder;
pub mod header;
pub mod sync;
pub mod tlv;

pub use assembler::{FrameAssembler, FrameFormat, PollOutcome};
pub use buffer::StreamBuffer;
pub use builder::FrameBuilder;
pub use header::{FrameHeader, HeaderLayout};
pub use sync::SyncStatus;
pub use tlv::DecodedPayload;
