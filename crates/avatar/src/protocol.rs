//! Wire format of the creation-frame message channel.
//!
//! Inbound messages arrive as JSON strings on a shared cross-origin channel,
//! so everything here is tolerant: anything that does not parse as a
//! well-formed envelope from the expected source classifies as noise and
//! yields `None`.

use serde::{Deserialize, Serialize};

/// Origin tag the creation frame stamps on every envelope it sends.
pub const FRAME_SOURCE: &str = "readyplayerme";

const EVENT_FRAME_READY: &str = "v1.frame.ready";
const EVENT_AVATAR_EXPORTED: &str = "v1.avatar.exported";
const EVENT_USER_SET: &str = "v1.user.set";

/// Inbound envelope. Fields are optional so near-miss messages (same shape,
/// different producer) deserialize and can be filtered instead of erroring.
#[derive(Debug, Deserialize)]
struct Envelope {
    source: Option<String>,
    #[serde(rename = "eventName")]
    event_name: Option<String>,
    #[serde(default)]
    data: EnvelopeData,
}

#[derive(Debug, Default, Deserialize)]
struct EnvelopeData {
    url: Option<String>,
    id: Option<String>,
}

/// Outbound acknowledgement that subscribes to all frame events.
#[derive(Debug, Serialize)]
struct SubscribeRequest<'a> {
    target: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(rename = "eventName")]
    event_name: &'a str,
}

/// A recognized, well-formed event from the creation frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    /// The frame finished booting and is ready to receive subscriptions.
    FrameReady,
    /// The user exported an avatar; `url` references the downloadable model.
    AvatarExported { url: String },
    /// The frame identified its user. Informational only.
    UserSet { id: String },
}

/// Classify one raw message from the shared channel.
///
/// Returns `None` for anything that is not a recognized frame event:
/// unparseable JSON, envelopes without the expected source tag, unknown
/// event names, and recognized names missing their payload field.
pub fn parse_frame_event(raw: &str) -> Option<FrameEvent> {
    let envelope: Envelope = match serde_json::from_str(raw) {
        Ok(e) => e,
        Err(_) => {
            tracing::trace!("dropping unparseable frame message");
            return None;
        }
    };
    if envelope.source.as_deref() != Some(FRAME_SOURCE) {
        tracing::trace!(source = ?envelope.source, "dropping message from foreign source");
        return None;
    }
    match envelope.event_name.as_deref() {
        Some(EVENT_FRAME_READY) => Some(FrameEvent::FrameReady),
        Some(EVENT_AVATAR_EXPORTED) => {
            let url = envelope.data.url?;
            Some(FrameEvent::AvatarExported { url })
        }
        Some(EVENT_USER_SET) => {
            let id = envelope.data.id?;
            Some(FrameEvent::UserSet { id })
        }
        other => {
            tracing::trace!(event = ?other, "dropping unrecognized frame event");
            None
        }
    }
}

/// The subscribe-all acknowledgement sent back once the frame reports ready.
pub fn subscribe_all_message() -> String {
    // Serialization of a static struct cannot fail.
    serde_json::to_string(&SubscribeRequest {
        target: FRAME_SOURCE,
        kind: "subscribe",
        event_name: "v1.**",
    })
    .expect("static subscribe request serializes")
}

/// URL the embedded creation frame is navigated to.
pub fn creator_frame_url(subdomain: &str) -> String {
    format!("https://{subdomain}.readyplayer.me/avatar?frameApi")
}
