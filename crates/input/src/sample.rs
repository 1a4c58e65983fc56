use glam::Vec2;
use std::collections::HashSet;

/// A logical movement key, already mapped from whatever device produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKey {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    Run,
    Jump,
}

/// One frame's worth of movement intent.
///
/// `axis.y` is forward (+1) / back (-1); `axis.x` is strafe right (+1) /
/// left (-1). The vector is not normalized; the consumer clamps speed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveInput {
    pub axis: Vec2,
    pub run: bool,
    pub jump: bool,
}

impl MoveInput {
    /// True when no horizontal movement is requested.
    pub fn is_neutral(&self) -> bool {
        self.axis == Vec2::ZERO && !self.jump
    }
}

/// Anything that can be polled for a movement sample once per frame.
///
/// Desktop key state and XR controller thumbsticks both implement this, so
/// the locomotion controller never knows which embodiment produced a sample.
pub trait MoveSource {
    fn sample(&mut self) -> MoveInput;
}

/// Held-key tracker for the desktop embodiment.
///
/// Jump is latched on press and consumed by the next `sample()`, so a key
/// repeat cannot produce more than one jump per press.
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<MoveKey>,
    jump_latched: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: MoveKey) {
        if key == MoveKey::Jump && !self.held.contains(&MoveKey::Jump) {
            self.jump_latched = true;
        }
        self.held.insert(key);
    }

    pub fn release(&mut self, key: MoveKey) {
        self.held.remove(&key);
    }

    /// Drop all held keys and any pending jump (e.g. on focus loss).
    pub fn clear(&mut self) {
        self.held.clear();
        self.jump_latched = false;
    }

    pub fn is_held(&self, key: MoveKey) -> bool {
        self.held.contains(&key)
    }
}

impl MoveSource for InputState {
    fn sample(&mut self) -> MoveInput {
        let mut axis = Vec2::ZERO;
        if self.held.contains(&MoveKey::Forward) {
            axis.y += 1.0;
        }
        if self.held.contains(&MoveKey::Back) {
            axis.y -= 1.0;
        }
        if self.held.contains(&MoveKey::StrafeRight) {
            axis.x += 1.0;
        }
        if self.held.contains(&MoveKey::StrafeLeft) {
            axis.x -= 1.0;
        }
        let jump = self.jump_latched;
        self.jump_latched = false;
        MoveInput {
            axis,
            run: self.held.contains(&MoveKey::Run),
            jump,
        }
    }
}
