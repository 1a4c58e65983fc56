//! Session orchestration: the strictly ordered bring-up of one interactive
//! session, and the per-frame pump that keeps all state mutations on a
//! single logical turn.
//!
//! # Invariants
//! - Bring-up steps run in order, each gated on the previous one.
//! - A failed step degrades the session (no avatar, no XR) instead of
//!   aborting it; the desktop scene stays usable.
//! - XR events and locomotion updates are sequenced by one `tick`, never
//!   concurrently.

pub mod config;
pub mod orchestrator;

pub use config::{ConfigError, HandshakeSettings, SessionConfig, XrSettings};
pub use orchestrator::{ActiveSession, SessionOrchestrator};
