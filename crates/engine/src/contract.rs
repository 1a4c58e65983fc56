use crate::assets::{AvatarBundle, ImportError};
use holoscene_common::Pose;

/// Errors from base-scene preparation.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("scene preparation failed: {0}")]
    Prepare(String),
}

/// Base-scene setup: ground, lighting, whatever the engine authors before
/// the avatar arrives. The core only sequences it.
pub trait SceneLifecycle {
    fn prepare_scene(&mut self) -> Result<(), SceneError>;
}

/// Per-frame elapsed time, reported by the engine's render loop.
pub trait FrameClock {
    /// Seconds elapsed since the previous frame.
    fn delta_seconds(&self) -> f32;
}

/// Collision query against the static environment.
///
/// The core only needs ground support: the height of walkable geometry under
/// a horizontal position. Full collision resolution stays inside the engine.
pub trait CollisionProbe {
    /// Height of the walkable surface at (x, z), or `None` over a pit.
    fn ground_height(&self, x: f32, z: f32) -> Option<f32>;
}

/// Whether the host platform can create an immersive session at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrAvailability {
    Supported,
    Unsupported,
}

/// One event from the engine's XR session-state observable.
///
/// The immersion coordinator acts on the four lifecycle edges; the observable
/// is free to emit events outside that set (visibility changes, controller
/// hot-plug) which the coordinator ignores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrSessionEvent {
    EnterRequested,
    SessionActive,
    ExitRequested,
    SessionEnded,
    /// The headset reported a visibility change (blur/focus). Not a
    /// lifecycle edge.
    VisibilityChanged,
    /// An input source was attached or detached mid-session.
    InputSourcesChanged,
}

/// The engine's XR subsystem: availability probe, session-state observable,
/// and the first-person rig's camera pose.
///
/// Events are delivered by draining between frames, never concurrently with
/// the per-frame update.
pub trait XrSystem {
    fn availability(&self) -> XrAvailability;
    /// Take all session events observed since the last drain, in order.
    fn drain_events(&mut self) -> Vec<XrSessionEvent>;
    fn rig_pose(&self) -> Pose;
    fn set_rig_pose(&mut self, pose: Pose);
}

/// Async mesh/animation import from an opaque asset URL.
pub trait AssetImporter {
    fn import_avatar(
        &mut self,
        url: &str,
    ) -> impl Future<Output = Result<AvatarBundle, ImportError>>;
}
