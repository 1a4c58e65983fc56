use crate::frame::FrameHost;
use crate::protocol::{self, FrameEvent};
use holoscene_persist::{AVATAR_URL_KEY, RecordStore, StoreError};
use std::time::Duration;
use tokio::sync::oneshot;

/// Where the acquisition currently stands.
///
/// `Exporting` covers the window between receiving an export event and
/// settling the resolution; with a synchronous store it collapses to
/// `Resolved` within the same turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    /// Waiting for the creation frame to boot (or for the user to open it).
    AwaitingFrame,
    /// The frame booted and was subscribed to forward its events.
    FrameReady,
    /// An export event arrived and is being persisted.
    Exporting,
    /// The asset URL is known and immutable for the rest of the session.
    Resolved,
}

/// Errors surfaced by the handshake. Protocol noise is never one of them.
#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("load() may only be called once per handshake")]
    AlreadyLoaded,
    #[error("the creation frame was abandoned before exporting an avatar")]
    Abandoned,
    #[error("avatar resolution timed out")]
    Timeout,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The pending side of a single avatar acquisition.
///
/// Returned by [`AvatarHandshake::load`]; settles exactly once, with the
/// resolved asset URL.
pub struct AvatarResolution {
    rx: oneshot::Receiver<String>,
}

impl AvatarResolution {
    /// Wait for the asset URL. If the handshake is dropped before an export
    /// event arrives (the user abandoned the frame), yields `Abandoned`.
    pub async fn resolved(self) -> Result<String, HandshakeError> {
        self.rx.await.map_err(|_| HandshakeError::Abandoned)
    }

    /// Like [`Self::resolved`], bounded. The protocol itself has no
    /// deadline; this exists for hosts that want one.
    pub async fn resolved_within(self, limit: Duration) -> Result<String, HandshakeError> {
        match tokio::time::timeout(limit, self.rx).await {
            Ok(result) => result.map_err(|_| HandshakeError::Abandoned),
            Err(_) => Err(HandshakeError::Timeout),
        }
    }
}

/// Owns the embedded-frame lifecycle and the message-based negotiation that
/// produces an avatar asset URL exactly once per session.
pub struct AvatarHandshake<S: RecordStore, F: FrameHost> {
    store: S,
    host: F,
    subdomain: String,
    state: AcquisitionState,
    /// Taken on settlement; `None` afterwards guards the single-shot
    /// invariant together with the `Resolved` state check.
    settle: Option<oneshot::Sender<String>>,
    pending: Option<oneshot::Receiver<String>>,
    resolved_url: Option<String>,
}

impl<S: RecordStore, F: FrameHost> AvatarHandshake<S, F> {
    pub fn new(store: S, host: F, subdomain: impl Into<String>) -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            store,
            host,
            subdomain: subdomain.into(),
            state: AcquisitionState::AwaitingFrame,
            settle: Some(tx),
            pending: Some(rx),
            resolved_url: None,
        }
    }

    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    /// The settled URL, once resolution has happened.
    pub fn resolved_url(&self) -> Option<&str> {
        self.resolved_url.as_deref()
    }

    /// Begin acquisition and hand back the pending resolution.
    ///
    /// A previously persisted record resolves immediately (and is
    /// re-persisted, which is idempotent) without the frame ever becoming
    /// visible. Otherwise the call-to-action is shown and the resolution
    /// settles when the frame delivers an export event.
    pub fn load(&mut self) -> Result<AvatarResolution, HandshakeError> {
        let rx = self.pending.take().ok_or(HandshakeError::AlreadyLoaded)?;

        match self.store.get(AVATAR_URL_KEY)? {
            Some(url) => {
                tracing::info!(%url, "restoring persisted avatar, skipping creation frame");
                self.resolve(url);
            }
            None => {
                tracing::info!("no persisted avatar, awaiting creation frame");
                self.host.show_cta();
            }
        }
        Ok(AvatarResolution { rx })
    }

    /// Navigate the embedded frame to the creation service and show it.
    /// Wired to the call-to-action by the host application.
    pub fn open_creator_frame(&mut self) {
        let url = protocol::creator_frame_url(&self.subdomain);
        tracing::debug!(%url, "opening creation frame");
        self.host.show_frame(&url);
    }

    /// Sole entry point for inbound messages from the shared channel.
    ///
    /// Never panics and never rejects the pending resolution: anything that
    /// is not a well-formed frame event is dropped.
    pub fn subscribe(&mut self, raw: &str) {
        let Some(event) = protocol::parse_frame_event(raw) else {
            return;
        };
        match event {
            FrameEvent::FrameReady => {
                tracing::debug!("creation frame ready, subscribing to its events");
                self.host.post_to_frame(&protocol::subscribe_all_message());
                if self.state == AcquisitionState::AwaitingFrame {
                    self.state = AcquisitionState::FrameReady;
                }
            }
            FrameEvent::AvatarExported { url } => {
                if self.state == AcquisitionState::Resolved {
                    tracing::debug!(%url, "duplicate export event after resolution, ignoring");
                    return;
                }
                self.state = AcquisitionState::Exporting;
                self.host.hide_frame();
                self.host.hide_cta();
                self.resolve(url);
            }
            FrameEvent::UserSet { id } => {
                tracing::info!(user_id = %id, "creation frame identified its user");
            }
        }
    }

    /// Persist and settle. The `Option::take` on the sender makes a second
    /// settlement impossible even if state tracking were bypassed.
    fn resolve(&mut self, url: String) {
        if let Err(e) = self.store.set(AVATAR_URL_KEY, &url) {
            // The session can still proceed; only the next session loses the
            // shortcut.
            tracing::warn!(error = %e, "failed to persist avatar record");
        }
        self.state = AcquisitionState::Resolved;
        self.resolved_url = Some(url.clone());
        match self.settle.take() {
            Some(tx) => {
                if tx.send(url).is_err() {
                    tracing::debug!("avatar resolution settled with no awaiting caller");
                }
            }
            None => {
                tracing::debug!("avatar resolution already settled, dropping url");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holoscene_persist::MemoryRecordStore;

    /// Frame host that records every call for assertions.
    #[derive(Debug, Default)]
    struct RecordingHost {
        shown_frame: Vec<String>,
        hid_frame: usize,
        shown_cta: usize,
        hid_cta: usize,
        posted: Vec<String>,
    }

    impl FrameHost for RecordingHost {
        fn show_frame(&mut self, url: &str) {
            self.shown_frame.push(url.to_string());
        }
        fn hide_frame(&mut self) {
            self.hid_frame += 1;
        }
        fn show_cta(&mut self) {
            self.shown_cta += 1;
        }
        fn hide_cta(&mut self) {
            self.hid_cta += 1;
        }
        fn post_to_frame(&mut self, message: &str) {
            self.posted.push(message.to_string());
        }
    }

    fn exported(url: &str) -> String {
        format!(
            r#"{{"source":"readyplayerme","eventName":"v1.avatar.exported","data":{{"url":"{url}"}}}}"#
        )
    }

    const FRAME_READY: &str = r#"{"source":"readyplayerme","eventName":"v1.frame.ready","data":{}}"#;

    #[tokio::test]
    async fn scripted_flow_resolves_and_persists() {
        let mut handshake =
            AvatarHandshake::new(MemoryRecordStore::new(), RecordingHost::default(), "holoim");
        let resolution = handshake.load().unwrap();
        assert_eq!(handshake.state(), AcquisitionState::AwaitingFrame);

        handshake.open_creator_frame();
        handshake.subscribe(FRAME_READY);
        assert_eq!(handshake.state(), AcquisitionState::FrameReady);
        handshake.subscribe(&exported("u1"));

        assert_eq!(resolution.resolved().await.unwrap(), "u1");
        assert_eq!(handshake.state(), AcquisitionState::Resolved);
        assert_eq!(handshake.resolved_url(), Some("u1"));
        assert_eq!(handshake.store.get(AVATAR_URL_KEY).unwrap().as_deref(), Some("u1"));

        let host = &handshake.host;
        assert_eq!(host.shown_frame, vec!["https://holoim.readyplayer.me/avatar?frameApi"]);
        assert_eq!(host.hid_frame, 1);
        assert_eq!(host.hid_cta, 1);
        // Subscribe-all acknowledgement went back to the frame.
        assert_eq!(host.posted.len(), 1);
        assert!(host.posted[0].contains("v1.**"));
    }

    #[tokio::test]
    async fn persisted_record_short_circuits_frame() {
        let store = MemoryRecordStore::with_record(AVATAR_URL_KEY, "https://example/a.glb");
        let mut handshake = AvatarHandshake::new(store, RecordingHost::default(), "holoim");
        let resolution = handshake.load().unwrap();

        assert_eq!(resolution.resolved().await.unwrap(), "https://example/a.glb");
        // No interactive surface was ever shown.
        assert!(handshake.host.shown_frame.is_empty());
        assert_eq!(handshake.host.shown_cta, 0);
        // Re-persist is idempotent.
        assert_eq!(
            handshake.store.get(AVATAR_URL_KEY).unwrap().as_deref(),
            Some("https://example/a.glb")
        );
    }

    #[tokio::test]
    async fn first_export_wins() {
        let mut handshake =
            AvatarHandshake::new(MemoryRecordStore::new(), RecordingHost::default(), "holoim");
        let resolution = handshake.load().unwrap();
        handshake.subscribe(&exported("u1"));
        handshake.subscribe(&exported("u2"));
        handshake.subscribe(&exported("u3"));

        assert_eq!(resolution.resolved().await.unwrap(), "u1");
        assert_eq!(handshake.resolved_url(), Some("u1"));
        assert_eq!(handshake.store.get(AVATAR_URL_KEY).unwrap().as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn noise_never_settles_the_resolution() {
        let mut handshake =
            AvatarHandshake::new(MemoryRecordStore::new(), RecordingHost::default(), "holoim");
        let mut resolution = handshake.load().unwrap();

        // Arbitrary junk plus near-miss envelopes, in bulk.
        for i in 0..200 {
            handshake.subscribe(&format!("junk message {i}"));
            handshake.subscribe(&format!("{{\"source\":\"other\",\"n\":{i}}}"));
            handshake.subscribe("{\"source\":\"readyplayerme\",\"eventName\":\"v1.unknown\"}");
            handshake.subscribe("");
        }
        assert_eq!(handshake.state(), AcquisitionState::AwaitingFrame);
        assert!(resolution.rx.try_recv().is_err());
    }

    #[test]
    fn load_twice_is_an_error() {
        let mut handshake =
            AvatarHandshake::new(MemoryRecordStore::new(), RecordingHost::default(), "holoim");
        let _resolution = handshake.load().unwrap();
        assert!(matches!(handshake.load(), Err(HandshakeError::AlreadyLoaded)));
    }

    #[tokio::test]
    async fn abandoned_frame_reports_abandoned() {
        let mut handshake =
            AvatarHandshake::new(MemoryRecordStore::new(), RecordingHost::default(), "holoim");
        let resolution = handshake.load().unwrap();
        drop(handshake);
        assert!(matches!(
            resolution.resolved().await,
            Err(HandshakeError::Abandoned)
        ));
    }

    #[tokio::test]
    async fn resolution_timeout_fires_when_frame_stalls() {
        let mut handshake =
            AvatarHandshake::new(MemoryRecordStore::new(), RecordingHost::default(), "holoim");
        let resolution = handshake.load().unwrap();
        handshake.subscribe(FRAME_READY);
        let result = resolution.resolved_within(Duration::from_millis(10)).await;
        assert!(matches!(result, Err(HandshakeError::Timeout)));
    }

    #[tokio::test]
    async fn user_set_changes_nothing() {
        let mut handshake =
            AvatarHandshake::new(MemoryRecordStore::new(), RecordingHost::default(), "holoim");
        let mut resolution = handshake.load().unwrap();
        handshake
            .subscribe(r#"{"source":"readyplayerme","eventName":"v1.user.set","data":{"id":"user-1"}}"#);
        assert_eq!(handshake.state(), AcquisitionState::AwaitingFrame);
        assert!(resolution.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn second_session_restores_first_sessions_export() {
        let mut store = MemoryRecordStore::new();
        {
            let mut handshake =
                AvatarHandshake::new(&mut store, RecordingHost::default(), "holoim");
            let resolution = handshake.load().unwrap();
            handshake.subscribe(FRAME_READY);
            handshake.subscribe(&exported("u1"));
            assert_eq!(resolution.resolved().await.unwrap(), "u1");
        }
        // New session, same store: resolves without any frame interaction.
        let mut handshake = AvatarHandshake::new(&mut store, RecordingHost::default(), "holoim");
        let resolution = handshake.load().unwrap();
        assert_eq!(resolution.resolved().await.unwrap(), "u1");
        assert!(handshake.host.shown_frame.is_empty());
    }
}
