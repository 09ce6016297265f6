//! Storage and scheduling abstraction trait definitions

mod pacer;
mod record_store;

pub use pacer::{Pacer, TokioPacer};
pub use record_store::{InMemoryRecordStore, RecordStore};
