//! Avatar acquisition: the cross-origin handshake with the embedded
//! creation frame, and persistence of the resolved asset URL.
//!
//! # Invariants
//! - The pending resolution settles at most once per session; a resolved
//!   session's URL is immutable.
//! - Malformed or foreign messages on the shared channel are dropped, never
//!   surfaced, and can never reject the pending resolution.
//! - Frame and call-to-action visibility are reached only through the
//!   `FrameHost` collaborator; a host missing its elements no-ops.

pub mod frame;
pub mod handshake;
pub mod protocol;

pub use frame::{FrameHost, NullFrameHost};
pub use handshake::{AcquisitionState, AvatarHandshake, AvatarResolution, HandshakeError};
pub use protocol::{FrameEvent, creator_frame_url, parse_frame_event, subscribe_all_message};
