use glam::{EulerRot, Quat, Vec3};
use holoscene_common::Pose;

/// Third-person orbit camera following the character.
///
/// A smoothed root trails a point above the character; the eye orbits that
/// root at a fixed radius under yaw/pitch control. Orbit input is disabled
/// while an XR session owns the view.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Smoothed follow point the eye orbits around.
    root: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub radius: f32,
    /// How far above the character's feet the root sits.
    pub height_offset: f32,
    /// Per-frame smoothing factor for the root's pursuit of the character.
    pub follow_lerp: f32,
    pub sensitivity: f32,
    input_enabled: bool,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            root: Vec3::new(0.0, 2.0, 0.0),
            yaw: std::f32::consts::PI,
            pitch: -0.3,
            radius: 4.0,
            height_offset: 2.0,
            follow_lerp: 0.4,
            sensitivity: 0.003,
            input_enabled: true,
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull the follow root toward the character for this frame.
    pub fn follow(&mut self, character_position: Vec3) {
        let target = character_position + Vec3::Y * self.height_offset;
        self.root = self.root.lerp(target, self.follow_lerp);
    }

    /// Orbit under pointer input. Ignored while input is disabled (XR owns
    /// the view).
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        if !self.input_enabled {
            return;
        }
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-1.5, 1.5);
    }

    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn root(&self) -> Vec3 {
        self.root
    }

    /// World-space eye position on the orbit sphere.
    pub fn eye(&self) -> Vec3 {
        let rotation = Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0);
        self.root + rotation * (Vec3::Z * self.radius)
    }

    /// Re-aim the orbit from a saved pose (the XR hand-off restoring the
    /// desktop view). Inverse of [`Self::pose`]: the eye lands back on the
    /// saved position, looking the saved direction.
    pub fn restore_pose(&mut self, pose: &Pose) {
        let (yaw, pitch, _) = pose.rotation.to_euler(EulerRot::YXZ);
        self.yaw = yaw;
        self.pitch = pitch;
        let rotation = Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0);
        self.root = pose.position - rotation * (Vec3::Z * self.radius);
    }

    /// The camera pose handed to the renderer, and snapshotted at XR entry.
    pub fn pose(&self) -> Pose {
        let eye = self.eye();
        let forward = (self.root - eye).normalize_or_zero();
        let rotation = if forward == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            look_rotation(forward)
        };
        Pose::new(eye, rotation)
    }
}

/// Rotation turning -Z toward `forward` with Y kept up.
fn look_rotation(forward: Vec3) -> Quat {
    let yaw = (-forward.x).atan2(-forward.z);
    let pitch = forward.y.asin();
    Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0)
}
