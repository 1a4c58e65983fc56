//! Immersion: the XR session phase machine and the camera/animation hand-off
//! between the third-person controller and the XR rig.
//!
//! # Invariants
//! - Phase transitions follow one exhaustive table; every other
//!   (phase, event) pair is a logged no-op.
//! - The pre-XR camera pose is captured exactly when Entering begins and
//!   consumed exactly when the session ends, making the hand-off symmetric.
//! - The coordinator never owns rendering; it only issues mode/pause
//!   requests to the locomotion controller and reads/writes rig pose
//!   through the engine contract.

pub mod coordinator;

pub use coordinator::{ImmersionCoordinator, XrPhase};
