//! Shared types for the holoscene session core.
//!
//! # Invariants
//! - Types here carry no behavior tied to any single controller.
//! - Everything is serde-serializable for logs and persistence.

pub mod types;

pub use types::{Pose, SessionId};
