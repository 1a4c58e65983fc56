//! Persistence: durable key-value records surviving across sessions.
//!
//! The only record the core writes today is the last resolved avatar URL,
//! but the store is a general string map so callers can add records without
//! a schema migration.
//!
//! # Invariants
//! - Reads never fail on a missing file; they return no record.
//! - A write that cannot reach disk surfaces an error instead of silently
//!   dropping the record.

pub mod store;

pub use store::{AVATAR_URL_KEY, FileRecordStore, MemoryRecordStore, RecordStore, StoreError};
