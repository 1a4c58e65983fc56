//! Headless engine double: scripted terrain, XR events, and asset imports.
//!
//! Used by the demo binary and by tests across the workspace. Behaves like a
//! real engine at the contract boundary; renders nothing.

use crate::assets::{AnimationClip, AvatarBundle, ImportError, MeshHandle};
use crate::contract::{
    AssetImporter, CollisionProbe, FrameClock, SceneError, SceneLifecycle, XrAvailability,
    XrSessionEvent, XrSystem,
};
use holoscene_common::Pose;
use std::collections::{BTreeMap, VecDeque};

/// Clip names the standard avatar rig exports.
///
/// Order and spelling follow the creation service's export; the extra
/// `walkBackFast` cycle exists on real rigs even though the controller never
/// requests it.
pub const STANDARD_RIG_CLIPS: [&str; 10] = [
    "fall",
    "idle",
    "idleJump",
    "run",
    "runJump",
    "strafeLeft",
    "strafeRight",
    "walk",
    "walkBack",
    "walkBackFast",
];

type GroundFn = Box<dyn Fn(f32, f32) -> Option<f32>>;

/// Scriptable engine implementation for tests and the CLI demo.
pub struct HeadlessEngine {
    dt: f32,
    ground: GroundFn,
    availability: XrAvailability,
    pending_xr: VecDeque<XrSessionEvent>,
    rig_pose: Pose,
    bundles: BTreeMap<String, AvatarBundle>,
    import_failure: Option<String>,
    scene_prep_failure: Option<String>,
    scene_prepared: bool,
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            ground: Box::new(|_, _| Some(0.0)),
            availability: XrAvailability::Supported,
            pending_xr: VecDeque::new(),
            rig_pose: Pose::default(),
            bundles: BTreeMap::new(),
            import_failure: None,
            scene_prep_failure: None,
            scene_prepared: false,
        }
    }
}

impl HeadlessEngine {
    /// Flat ground at height zero, XR supported, no registered assets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the terrain height function.
    pub fn with_ground(mut self, ground: impl Fn(f32, f32) -> Option<f32> + 'static) -> Self {
        self.ground = Box::new(ground);
        self
    }

    pub fn with_availability(mut self, availability: XrAvailability) -> Self {
        self.availability = availability;
        self
    }

    pub fn set_delta_seconds(&mut self, dt: f32) {
        self.dt = dt;
    }

    /// Queue an XR session event for the next drain.
    pub fn push_xr_event(&mut self, event: XrSessionEvent) {
        self.pending_xr.push_back(event);
    }

    /// Make a bundle importable under the given URL.
    pub fn register_bundle(&mut self, url: &str, bundle: AvatarBundle) {
        self.bundles.insert(url.to_string(), bundle);
    }

    /// All further imports fail with a network error carrying this reason.
    pub fn fail_imports(&mut self, reason: &str) {
        self.import_failure = Some(reason.to_string());
    }

    /// Scene preparation fails with this reason.
    pub fn fail_scene_prep(&mut self, reason: &str) {
        self.scene_prep_failure = Some(reason.to_string());
    }

    pub fn scene_prepared(&self) -> bool {
        self.scene_prepared
    }

    /// A canned bundle with the standard rig's ten clips and one mesh.
    pub fn standard_rig_bundle() -> AvatarBundle {
        AvatarBundle {
            meshes: vec![MeshHandle(1)],
            animations: STANDARD_RIG_CLIPS
                .iter()
                .map(|name| AnimationClip {
                    name: (*name).to_string(),
                    duration_seconds: 1.2,
                    looping: *name != "idleJump" && *name != "runJump",
                })
                .collect(),
        }
    }
}

impl SceneLifecycle for HeadlessEngine {
    fn prepare_scene(&mut self) -> Result<(), SceneError> {
        if let Some(reason) = &self.scene_prep_failure {
            return Err(SceneError::Prepare(reason.clone()));
        }
        self.scene_prepared = true;
        Ok(())
    }
}

impl FrameClock for HeadlessEngine {
    fn delta_seconds(&self) -> f32 {
        self.dt
    }
}

impl CollisionProbe for HeadlessEngine {
    fn ground_height(&self, x: f32, z: f32) -> Option<f32> {
        (self.ground)(x, z)
    }
}

impl XrSystem for HeadlessEngine {
    fn availability(&self) -> XrAvailability {
        self.availability
    }

    fn drain_events(&mut self) -> Vec<XrSessionEvent> {
        self.pending_xr.drain(..).collect()
    }

    fn rig_pose(&self) -> Pose {
        self.rig_pose
    }

    fn set_rig_pose(&mut self, pose: Pose) {
        self.rig_pose = pose;
    }
}

impl AssetImporter for HeadlessEngine {
    async fn import_avatar(&mut self, url: &str) -> Result<AvatarBundle, ImportError> {
        if let Some(reason) = &self.import_failure {
            return Err(ImportError::Network {
                url: url.to_string(),
                reason: reason.clone(),
            });
        }
        self.bundles
            .get(url)
            .cloned()
            .ok_or_else(|| ImportError::Network {
                url: url.to_string(),
                reason: "no bundle registered for url".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_ground_by_default() {
        let engine = HeadlessEngine::new();
        assert_eq!(engine.ground_height(3.0, -7.5), Some(0.0));
    }

    #[test]
    fn scripted_ground_function() {
        let engine = HeadlessEngine::new().with_ground(|x, _| if x > 5.0 { None } else { Some(x) });
        assert_eq!(engine.ground_height(2.0, 0.0), Some(2.0));
        assert_eq!(engine.ground_height(6.0, 0.0), None);
    }

    #[test]
    fn xr_events_drain_in_order() {
        let mut engine = HeadlessEngine::new();
        engine.push_xr_event(XrSessionEvent::EnterRequested);
        engine.push_xr_event(XrSessionEvent::SessionActive);
        let events = engine.drain_events();
        assert_eq!(
            events,
            vec![XrSessionEvent::EnterRequested, XrSessionEvent::SessionActive]
        );
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn standard_rig_has_all_clips() {
        let bundle = HeadlessEngine::standard_rig_bundle();
        for name in STANDARD_RIG_CLIPS {
            assert!(bundle.clip(name).is_some(), "missing clip {name}");
        }
    }

    #[tokio::test]
    async fn import_requires_registration() {
        let mut engine = HeadlessEngine::new();
        assert!(engine.import_avatar("https://models.example/a.glb").await.is_err());
        engine.register_bundle(
            "https://models.example/a.glb",
            HeadlessEngine::standard_rig_bundle(),
        );
        let bundle = engine.import_avatar("https://models.example/a.glb").await.unwrap();
        assert_eq!(bundle.meshes.len(), 1);
    }

    #[tokio::test]
    async fn import_failure_injection() {
        let mut engine = HeadlessEngine::new();
        engine.register_bundle("u", HeadlessEngine::standard_rig_bundle());
        engine.fail_imports("simulated outage");
        assert!(matches!(
            engine.import_avatar("u").await,
            Err(ImportError::Network { .. })
        ));
    }
}
