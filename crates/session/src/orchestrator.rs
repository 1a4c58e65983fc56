use holoscene_avatar::{AvatarHandshake, AvatarResolution, FrameHost, HandshakeError};
use holoscene_common::SessionId;
use holoscene_engine::{
    AssetImportGateway, AssetImporter, CollisionProbe, FrameClock, SceneLifecycle, XrAvailability,
    XrSystem,
};
use holoscene_immersion::ImmersionCoordinator;
use holoscene_input::MoveInput;
use holoscene_locomotion::{AvatarRig, LocomotionController};
use holoscene_persist::RecordStore;

use crate::config::SessionConfig;

/// Builds one interactive session, step by step, each step gated on the
/// previous one's completion.
pub struct SessionOrchestrator {
    id: SessionId,
    config: SessionConfig,
}

/// A running session: everything the host's frame loop needs.
///
/// Degraded forms are normal: `locomotion` is absent when acquisition or
/// import failed, and `xr_enabled` is false on desktop-only hosts. The base
/// scene stays interactive either way.
pub struct ActiveSession {
    pub id: SessionId,
    pub avatar_url: Option<String>,
    pub locomotion: Option<LocomotionController>,
    pub coordinator: ImmersionCoordinator,
    pub xr_enabled: bool,
}

impl SessionOrchestrator {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            id: SessionId::new(),
            config,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Begin avatar acquisition (step 3 of the bring-up).
    ///
    /// The handshake goes back to the caller, which owns message routing;
    /// the pending resolution feeds [`Self::run`].
    pub fn begin_acquisition<S: RecordStore, F: FrameHost>(
        &self,
        store: S,
        host: F,
    ) -> Result<(AvatarHandshake<S, F>, AvatarResolution), HandshakeError> {
        let mut handshake =
            AvatarHandshake::new(store, host, self.config.handshake.subdomain.as_str());
        let resolution = handshake.load()?;
        Ok((handshake, resolution))
    }

    /// Bring the session up: prepare the scene, probe XR, await the avatar,
    /// import it, and wire the controllers.
    ///
    /// Failures degrade instead of aborting. A failed import leaves
    /// `locomotion` empty; unsupported XR leaves the coordinator parked in
    /// its initial phase forever.
    pub async fn run<E>(&self, engine: &mut E, resolution: AvatarResolution) -> ActiveSession
    where
        E: SceneLifecycle + XrSystem + AssetImporter,
    {
        tracing::info!(id = ?self.id, "session bring-up starting");

        // (1) Base scene.
        if let Err(e) = engine.prepare_scene() {
            tracing::error!(error = %e, "scene preparation failed, continuing degraded");
        }

        // (2) XR availability. Non-blocking: an unsupported host just never
        // gets immersive sessions.
        let xr_enabled =
            self.config.xr.enabled && engine.availability() == XrAvailability::Supported;
        if !xr_enabled {
            tracing::info!("xr unavailable or disabled, session stays on desktop");
        }

        // (3) Avatar acquisition.
        let avatar_url = match resolution.resolved().await {
            Ok(url) => {
                tracing::info!(%url, "avatar resolved");
                Some(url)
            }
            Err(e) => {
                tracing::error!(error = %e, "avatar acquisition failed, continuing without avatar");
                None
            }
        };

        // (4) Import and (5) controller construction.
        let mut locomotion = None;
        if let Some(url) = &avatar_url {
            match AssetImportGateway::new().import(engine, url).await {
                Ok(bundle) => match AvatarRig::from_bundle(&bundle) {
                    Ok(rig) => {
                        let mut controller =
                            LocomotionController::new(rig, self.config.locomotion.clone());
                        controller.start();
                        locomotion = Some(controller);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "avatar rig rejected, continuing without avatar");
                    }
                },
                Err(e) => {
                    tracing::error!(error = %e, "avatar import failed, continuing without avatar");
                }
            }
        }

        // (6) Coordinator, bound to the XR probe result.
        tracing::info!(
            id = ?self.id,
            has_avatar = locomotion.is_some(),
            xr_enabled,
            "session bring-up complete"
        );
        ActiveSession {
            id: self.id,
            avatar_url,
            locomotion,
            coordinator: ImmersionCoordinator::new(),
            xr_enabled,
        }
    }
}

impl ActiveSession {
    pub fn has_avatar(&self) -> bool {
        self.locomotion.is_some()
    }

    /// One frame: drain XR session events into the coordinator, then update
    /// locomotion. Sequencing both here keeps every state mutation on a
    /// single logical turn.
    pub fn tick<E>(&mut self, engine: &mut E, input: MoveInput)
    where
        E: XrSystem + CollisionProbe + FrameClock,
    {
        let Some(locomotion) = &mut self.locomotion else {
            return;
        };
        if self.xr_enabled {
            self.coordinator.pump(engine, locomotion);
        }
        let dt = engine.delta_seconds();
        locomotion.update(input, engine, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use holoscene_avatar::NullFrameHost;
    use holoscene_engine::{HeadlessEngine, XrSessionEvent};
    use holoscene_immersion::XrPhase;
    use holoscene_locomotion::{Clip, LocomotionMode};
    use holoscene_persist::{AVATAR_URL_KEY, MemoryRecordStore, RecordStore};

    const FRAME_READY: &str = r#"{"source":"readyplayerme","eventName":"v1.frame.ready","data":{}}"#;

    fn exported(url: &str) -> String {
        format!(
            r#"{{"source":"readyplayerme","eventName":"v1.avatar.exported","data":{{"url":"{url}"}}}}"#
        )
    }

    fn forward() -> MoveInput {
        MoveInput {
            axis: Vec2::new(0.0, 1.0),
            run: false,
            jump: false,
        }
    }

    #[tokio::test]
    async fn end_to_end_scripted_session() {
        let orchestrator = SessionOrchestrator::new(SessionConfig::default());
        let mut store = MemoryRecordStore::new();
        let mut engine = HeadlessEngine::new();
        engine.register_bundle("u1", HeadlessEngine::standard_rig_bundle());

        let (mut handshake, resolution) = orchestrator
            .begin_acquisition(&mut store, NullFrameHost)
            .unwrap();
        handshake.subscribe(FRAME_READY);
        handshake.subscribe(&exported("u1"));
        drop(handshake);

        let session = orchestrator.run(&mut engine, resolution).await;
        assert_eq!(session.avatar_url.as_deref(), Some("u1"));
        assert!(session.has_avatar());
        assert!(session.xr_enabled);
        assert!(engine.scene_prepared());
        assert_eq!(store.get(AVATAR_URL_KEY).unwrap().as_deref(), Some("u1"));

        // A later session restores the persisted record with no frame
        // interaction at all.
        let orchestrator2 = SessionOrchestrator::new(SessionConfig::default());
        let (handshake2, resolution2) = orchestrator2
            .begin_acquisition(&mut store, NullFrameHost)
            .unwrap();
        drop(handshake2);
        let session2 = orchestrator2.run(&mut engine, resolution2).await;
        assert_eq!(session2.avatar_url.as_deref(), Some("u1"));
        assert!(session2.has_avatar());
    }

    #[tokio::test]
    async fn import_failure_degrades_to_desktop_scene() {
        let orchestrator = SessionOrchestrator::new(SessionConfig::default());
        let mut engine = HeadlessEngine::new();
        engine.fail_imports("simulated outage");

        let (mut handshake, resolution) = orchestrator
            .begin_acquisition(MemoryRecordStore::new(), NullFrameHost)
            .unwrap();
        handshake.subscribe(&exported("u1"));

        let mut session = orchestrator.run(&mut engine, resolution).await;
        assert_eq!(session.avatar_url.as_deref(), Some("u1"));
        assert!(!session.has_avatar());
        // The degraded session still ticks without panicking.
        session.tick(&mut engine, forward());
    }

    #[tokio::test]
    async fn invalid_rig_degrades_to_desktop_scene() {
        let orchestrator = SessionOrchestrator::new(SessionConfig::default());
        let mut engine = HeadlessEngine::new();
        let mut bundle = HeadlessEngine::standard_rig_bundle();
        bundle.animations.clear();
        engine.register_bundle("u1", bundle);

        let (mut handshake, resolution) = orchestrator
            .begin_acquisition(MemoryRecordStore::new(), NullFrameHost)
            .unwrap();
        handshake.subscribe(&exported("u1"));

        let session = orchestrator.run(&mut engine, resolution).await;
        assert!(!session.has_avatar());
    }

    #[tokio::test]
    async fn abandoned_acquisition_degrades() {
        let orchestrator = SessionOrchestrator::new(SessionConfig::default());
        let mut engine = HeadlessEngine::new();

        let (handshake, resolution) = orchestrator
            .begin_acquisition(MemoryRecordStore::new(), NullFrameHost)
            .unwrap();
        drop(handshake);

        let session = orchestrator.run(&mut engine, resolution).await;
        assert_eq!(session.avatar_url, None);
        assert!(!session.has_avatar());
    }

    #[tokio::test]
    async fn scene_prep_failure_is_not_fatal() {
        let orchestrator = SessionOrchestrator::new(SessionConfig::default());
        let mut engine = HeadlessEngine::new();
        engine.fail_scene_prep("no canvas");
        engine.register_bundle("u1", HeadlessEngine::standard_rig_bundle());

        let (mut handshake, resolution) = orchestrator
            .begin_acquisition(MemoryRecordStore::new(), NullFrameHost)
            .unwrap();
        handshake.subscribe(&exported("u1"));

        let session = orchestrator.run(&mut engine, resolution).await;
        assert!(session.has_avatar());
    }

    async fn session_with_avatar(engine: &mut HeadlessEngine) -> ActiveSession {
        let orchestrator = SessionOrchestrator::new(SessionConfig::default());
        engine.register_bundle("u1", HeadlessEngine::standard_rig_bundle());
        let (mut handshake, resolution) = orchestrator
            .begin_acquisition(MemoryRecordStore::new(), NullFrameHost)
            .unwrap();
        handshake.subscribe(&exported("u1"));
        orchestrator.run(engine, resolution).await
    }

    #[tokio::test]
    async fn tick_drives_locomotion() {
        let mut engine = HeadlessEngine::new();
        let mut session = session_with_avatar(&mut engine).await;
        for _ in 0..10 {
            session.tick(&mut engine, forward());
        }
        let locomotion = session.locomotion.as_ref().unwrap();
        assert!(locomotion.position().z > 0.0);
        assert_eq!(locomotion.active_clip(), Clip::Walk);
    }

    #[tokio::test]
    async fn tick_round_trips_through_xr() {
        let mut engine = HeadlessEngine::new();
        let mut session = session_with_avatar(&mut engine).await;

        engine.push_xr_event(XrSessionEvent::EnterRequested);
        engine.push_xr_event(XrSessionEvent::SessionActive);
        session.tick(&mut engine, MoveInput::default());
        assert_eq!(session.coordinator.phase(), XrPhase::InXr);
        {
            let locomotion = session.locomotion.as_ref().unwrap();
            assert_eq!(locomotion.mode(), LocomotionMode::FirstPerson);
            assert!(locomotion.is_anim_paused());
            assert!(locomotion.is_in_xr());
        }

        engine.push_xr_event(XrSessionEvent::ExitRequested);
        engine.push_xr_event(XrSessionEvent::SessionEnded);
        session.tick(&mut engine, MoveInput::default());
        assert_eq!(session.coordinator.phase(), XrPhase::NotInXr);
        let locomotion = session.locomotion.as_ref().unwrap();
        assert_eq!(locomotion.mode(), LocomotionMode::ThirdPerson);
        assert!(!locomotion.is_anim_paused());
        assert!(!locomotion.is_in_xr());
    }

    #[tokio::test]
    async fn unsupported_xr_never_leaves_initial_phase() {
        let mut engine = HeadlessEngine::new().with_availability(XrAvailability::Unsupported);
        let mut session = session_with_avatar(&mut engine).await;
        assert!(!session.xr_enabled);

        engine.push_xr_event(XrSessionEvent::EnterRequested);
        engine.push_xr_event(XrSessionEvent::SessionActive);
        for _ in 0..5 {
            session.tick(&mut engine, MoveInput::default());
        }
        assert_eq!(session.coordinator.phase(), XrPhase::NotInXr);
        assert!(!session.locomotion.as_ref().unwrap().is_in_xr());
    }

    #[tokio::test]
    async fn config_can_disable_xr_on_capable_hardware() {
        let mut config = SessionConfig::default();
        config.xr.enabled = false;
        let orchestrator = SessionOrchestrator::new(config);
        let mut engine = HeadlessEngine::new();
        engine.register_bundle("u1", HeadlessEngine::standard_rig_bundle());

        let (mut handshake, resolution) = orchestrator
            .begin_acquisition(MemoryRecordStore::new(), NullFrameHost)
            .unwrap();
        handshake.subscribe(&exported("u1"));
        let session = orchestrator.run(&mut engine, resolution).await;
        assert!(!session.xr_enabled);
    }
}
