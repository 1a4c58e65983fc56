//! Locomotion: the per-frame character controller driving movement, clip
//! selection, and the third-person orbit camera.
//!
//! # Invariants
//! - Exactly one camera owner (orbit follow or XR rig) at any time.
//! - The active clip is a pure function of sampled input, ground contact,
//!   and mode; clip changes cross-fade instead of cutting.
//! - A missing animation clip degrades to Idle; a missing subject mesh is
//!   fatal at construction.

pub mod camera;
pub mod clip;
pub mod controller;
pub mod rig;

pub use camera::OrbitCamera;
pub use clip::{Clip, ClipPlayer};
pub use controller::{CameraOwner, LocomotionConfig, LocomotionController, LocomotionMode};
pub use rig::{AvatarRig, LocomotionError};
