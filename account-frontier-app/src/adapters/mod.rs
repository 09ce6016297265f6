//! Storage adapters for the web frontend.

mod json_record_store;

pub use json_record_store::JsonFileRecordStore;
