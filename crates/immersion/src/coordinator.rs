use holoscene_common::Pose;
use holoscene_engine::{XrSessionEvent, XrSystem};
use holoscene_locomotion::{LocomotionController, LocomotionMode};

/// Where the user stands in the immersive-session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XrPhase {
    #[default]
    NotInXr,
    Entering,
    InXr,
    Exiting,
}

/// Observes the XR session lifecycle and arbitrates which of the locomotion
/// controller and the XR rig owns camera and animation authority.
///
/// Transition table (everything else is ignored):
///
/// | From     | Event          | To       |
/// |----------|----------------|----------|
/// | NotInXr  | EnterRequested | Entering |
/// | Entering | SessionActive  | InXr     |
/// | InXr     | ExitRequested  | Exiting  |
/// | Exiting  | SessionEnded   | NotInXr  |
#[derive(Debug, Default)]
pub struct ImmersionCoordinator {
    phase: XrPhase,
    last_non_xr_pose: Option<Pose>,
}

impl ImmersionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> XrPhase {
        self.phase
    }

    /// The camera pose captured at XR entry, until the exit consumes it.
    pub fn last_non_xr_pose(&self) -> Option<Pose> {
        self.last_non_xr_pose
    }

    /// Drain the engine's session observable and apply each event in order.
    /// Called between frame updates, never concurrently with one.
    pub fn pump<X: XrSystem>(&mut self, xr: &mut X, locomotion: &mut LocomotionController) {
        for event in xr.drain_events() {
            self.handle_event(event, xr, locomotion);
        }
    }

    /// Apply one session event against the transition table.
    pub fn handle_event<X: XrSystem>(
        &mut self,
        event: XrSessionEvent,
        xr: &mut X,
        locomotion: &mut LocomotionController,
    ) {
        match (self.phase, event) {
            (XrPhase::NotInXr, XrSessionEvent::EnterRequested) => {
                // Copy the desktop view onto the rig so the transition is
                // visually continuous.
                let pose = locomotion.camera_pose();
                self.last_non_xr_pose = Some(pose);
                xr.set_rig_pose(pose);
                self.set_phase(XrPhase::Entering);
            }
            (XrPhase::Entering, XrSessionEvent::SessionActive) => {
                locomotion.set_in_xr(true);
                locomotion.set_mode(LocomotionMode::FirstPerson);
                locomotion.pause_anim();
                locomotion.force_idle();
                locomotion.reset_rest_pose();
                self.set_phase(XrPhase::InXr);
            }
            (XrPhase::InXr, XrSessionEvent::ExitRequested) => {
                self.set_phase(XrPhase::Exiting);
            }
            (XrPhase::Exiting, XrSessionEvent::SessionEnded) => {
                locomotion.set_in_xr(false);
                locomotion.set_mode(LocomotionMode::ThirdPerson);
                locomotion.resume_anim();
                if let Some(pose) = self.last_non_xr_pose.take() {
                    locomotion.restore_camera_pose(&pose);
                }
                self.set_phase(XrPhase::NotInXr);
            }
            (phase, event) => {
                tracing::trace!(?phase, ?event, "xr event outside transition table, ignoring");
            }
        }
    }

    fn set_phase(&mut self, next: XrPhase) {
        tracing::info!(from = ?self.phase, to = ?next, "xr phase transition");
        self.phase = next;
    }
}
