//! Event ingestion
//!
//! The live message-queue transport lives outside this crate; sources here
//! deliver already-decoded, normalized pool events to the engine.

pub mod decoder;
pub mod replay;

pub use decoder::decode_message;
pub use replay::ReplaySource;

use crate::error::Result;
use crate::event::PoolEvent;

/// A source of normalized pool events. `Ok(None)` signals end of stream.
pub trait EventSource {
    fn next_batch(
        &mut self,
    ) -> impl std::future::Future<Output = Result<Option<Vec<PoolEvent>>>> + Send;
}
