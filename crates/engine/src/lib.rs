//! Engine collaborator contract: the narrow surface the session core consumes
//! from the external rendering/XR engine.
//!
//! # Invariants
//! - The core never reaches past these traits into engine internals.
//! - The engine never mutates core state; data flows out of it only through
//!   returned values and drained events.
//!
//! # Workaround
//! Ships a headless engine implementation (flat or scripted terrain, queued
//! XR events, canned asset bundles) as a workaround for a real renderer
//! backend. The traits are stable; swap in a real engine without changing
//! consumers.

pub mod assets;
pub mod contract;
pub mod headless;

pub use assets::{AnimationClip, AssetImportGateway, AvatarBundle, ImportError, MeshHandle};
pub use contract::{
    AssetImporter, CollisionProbe, FrameClock, SceneError, SceneLifecycle, XrAvailability,
    XrSessionEvent, XrSystem,
};
pub use headless::{HeadlessEngine, STANDARD_RIG_CLIPS};
