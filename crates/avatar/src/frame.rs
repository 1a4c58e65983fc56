/// Host-page surface the handshake toggles: the embedded creation frame and
/// the call-to-action control that opens it.
///
/// Both elements are owned by the surrounding application and addressed only
/// through this trait. A host whose page is missing either element must treat
/// the corresponding calls as no-ops, not errors.
pub trait FrameHost {
    /// Navigate the embedded frame to `url` and make it visible.
    fn show_frame(&mut self, url: &str);
    fn hide_frame(&mut self);
    /// Show the control that invites the user to create an avatar.
    fn show_cta(&mut self);
    fn hide_cta(&mut self);
    /// Deliver a JSON message to the frame's window.
    fn post_to_frame(&mut self, message: &str);
}

/// Host with no page at all; every call is a no-op.
///
/// Used by headless sessions where the avatar URL comes from persistence or
/// scripted messages.
#[derive(Debug, Default)]
pub struct NullFrameHost;

impl FrameHost for NullFrameHost {
    fn show_frame(&mut self, _url: &str) {}
    fn hide_frame(&mut self) {}
    fn show_cta(&mut self) {}
    fn hide_cta(&mut self) {}
    fn post_to_frame(&mut self, _message: &str) {}
}
