/// A named animation cycle the controller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clip {
    Idle,
    Walk,
    Run,
    WalkBack,
    StrafeLeft,
    StrafeRight,
    IdleJump,
    RunJump,
    Fall,
}

impl Clip {
    /// The rig-side name of this clip, as exported by the creation service.
    pub fn rig_name(&self) -> &'static str {
        match self {
            Clip::Idle => "idle",
            Clip::Walk => "walk",
            Clip::Run => "run",
            Clip::WalkBack => "walkBack",
            Clip::StrafeLeft => "strafeLeft",
            Clip::StrafeRight => "strafeRight",
            Clip::IdleJump => "idleJump",
            Clip::RunJump => "runJump",
            Clip::Fall => "fall",
        }
    }
}

/// Cross-fading clip playback state.
///
/// Transitions fade the previous clip out and the next one in over a blend
/// window instead of cutting. Pausing freezes the playhead and any blend in
/// progress without losing either.
#[derive(Debug, Clone)]
pub struct ClipPlayer {
    active: Clip,
    fading_out: Option<Clip>,
    blend_seconds: f32,
    blend_elapsed: f32,
    playhead: f32,
    paused: bool,
}

impl ClipPlayer {
    pub fn new(initial: Clip, blend_seconds: f32) -> Self {
        Self {
            active: initial,
            fading_out: None,
            blend_seconds: blend_seconds.max(0.0),
            blend_elapsed: 0.0,
            playhead: 0.0,
            paused: false,
        }
    }

    pub fn active(&self) -> Clip {
        self.active
    }

    /// The clip currently fading out, while a blend is in progress.
    pub fn fading_out(&self) -> Option<Clip> {
        self.fading_out
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Blend weight of the active clip, in [0, 1].
    pub fn active_weight(&self) -> f32 {
        if self.fading_out.is_none() || self.blend_seconds == 0.0 {
            return 1.0;
        }
        (self.blend_elapsed / self.blend_seconds).clamp(0.0, 1.0)
    }

    /// Begin a cross-fade to `next`. Re-requesting the active clip is a
    /// no-op so per-frame selection can call this unconditionally.
    pub fn transition_to(&mut self, next: Clip) {
        if next == self.active {
            return;
        }
        tracing::trace!(from = ?self.active, to = ?next, "clip transition");
        self.fading_out = Some(self.active);
        self.active = next;
        self.blend_elapsed = 0.0;
        self.playhead = 0.0;
    }

    /// Switch to `next` immediately, discarding any blend in progress.
    pub fn force(&mut self, next: Clip) {
        self.active = next;
        self.fading_out = None;
        self.blend_elapsed = 0.0;
        self.playhead = 0.0;
    }

    /// Advance playback. Frozen while paused.
    pub fn advance(&mut self, dt: f32) {
        if self.paused || dt <= 0.0 {
            return;
        }
        self.playhead += dt;
        if self.fading_out.is_some() {
            self.blend_elapsed += dt;
            if self.blend_elapsed >= self.blend_seconds {
                self.fading_out = None;
            }
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_fully_weighted() {
        let player = ClipPlayer::new(Clip::Idle, 0.15);
        assert_eq!(player.active(), Clip::Idle);
        assert_eq!(player.active_weight(), 1.0);
        assert!(player.fading_out().is_none());
    }

    #[test]
    fn transition_blends_over_window() {
        let mut player = ClipPlayer::new(Clip::Idle, 0.2);
        player.transition_to(Clip::Walk);
        assert_eq!(player.active(), Clip::Walk);
        assert_eq!(player.fading_out(), Some(Clip::Idle));
        assert_eq!(player.active_weight(), 0.0);

        player.advance(0.1);
        assert!(player.active_weight() > 0.4 && player.active_weight() < 0.6);

        player.advance(0.1);
        assert_eq!(player.active_weight(), 1.0);
        assert!(player.fading_out().is_none());
    }

    #[test]
    fn retransition_to_active_is_noop() {
        let mut player = ClipPlayer::new(Clip::Walk, 0.2);
        player.advance(0.5);
        player.transition_to(Clip::Walk);
        assert!(player.fading_out().is_none());
        assert_eq!(player.active_weight(), 1.0);
    }

    #[test]
    fn pause_freezes_blend_and_playhead() {
        let mut player = ClipPlayer::new(Clip::Idle, 0.2);
        player.transition_to(Clip::Run);
        player.advance(0.1);
        let mid = player.active_weight();
        player.pause();
        player.advance(1.0);
        assert_eq!(player.active_weight(), mid);
        player.resume();
        player.advance(0.1);
        assert_eq!(player.active_weight(), 1.0);
    }

    #[test]
    fn force_discards_blend() {
        let mut player = ClipPlayer::new(Clip::Run, 0.2);
        player.transition_to(Clip::Walk);
        player.force(Clip::Idle);
        assert_eq!(player.active(), Clip::Idle);
        assert!(player.fading_out().is_none());
        assert_eq!(player.active_weight(), 1.0);
    }

    #[test]
    fn zero_blend_window_cuts() {
        let mut player = ClipPlayer::new(Clip::Idle, 0.0);
        player.transition_to(Clip::Walk);
        assert_eq!(player.active_weight(), 1.0);
    }
}
