use crate::camera::OrbitCamera;
use crate::clip::{Clip, ClipPlayer};
use crate::rig::AvatarRig;
use glam::{Quat, Vec3};
use holoscene_common::Pose;
use holoscene_engine::CollisionProbe;
use holoscene_input::MoveInput;

/// Tuning for movement, ground policy, and clip blending.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Horizontal speed for walking, strafing, and backing up (m/s).
    pub walk_speed: f32,
    /// Horizontal speed while the run modifier is held (m/s).
    pub run_speed: f32,
    /// Downward acceleration while airborne (m/s^2, positive magnitude).
    pub gravity: f32,
    /// Initial vertical velocity of a jump (m/s).
    pub jump_speed: f32,
    /// Steepest walkable incline (degrees).
    pub slope_limit_degrees: f32,
    /// Tallest ledge that can be stepped onto without falling (m).
    pub step_offset: f32,
    /// Clip cross-fade window (s).
    pub blend_seconds: f32,
    /// Eye height above the character's feet (m).
    pub head_height: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            walk_speed: 2.0,
            run_speed: 5.0,
            gravity: 9.81,
            jump_speed: 4.5,
            slope_limit_degrees: 45.0,
            step_offset: 0.35,
            blend_seconds: 0.15,
            head_height: 1.7,
        }
    }
}

/// Which embodiment drives the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocomotionMode {
    /// Orbit camera behind a visible character.
    ThirdPerson,
    /// Camera locked to the character's head (immersive sessions).
    FirstPerson,
}

/// Which camera is attached to the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraOwner {
    Orbit,
    XrRig,
}

/// Per-frame character controller.
///
/// Re-entered once per display refresh through [`Self::update`]; everything
/// else (mode switches, pause, XR flag) happens between frames.
pub struct LocomotionController {
    config: LocomotionConfig,
    rig: AvatarRig,
    player: ClipPlayer,
    camera: OrbitCamera,
    mode: LocomotionMode,
    camera_owner: CameraOwner,
    in_xr: bool,
    position: Vec3,
    yaw: f32,
    vertical_velocity: f32,
    grounded: bool,
    /// Airborne because of a jump (selects jump clips) as opposed to
    /// walking off an edge (selects Fall).
    jump_launched: bool,
    launched_moving: bool,
}

impl LocomotionController {
    /// Bind the controller to an imported rig. Rig validation (mesh and
    /// animation set present) already happened in [`AvatarRig::from_bundle`].
    pub fn new(rig: AvatarRig, config: LocomotionConfig) -> Self {
        Self {
            player: ClipPlayer::new(Clip::Idle, config.blend_seconds),
            camera: OrbitCamera::new(),
            config,
            rig,
            mode: LocomotionMode::ThirdPerson,
            camera_owner: CameraOwner::Orbit,
            in_xr: false,
            position: Vec3::ZERO,
            yaw: 0.0,
            vertical_velocity: 0.0,
            grounded: true,
            jump_launched: false,
            launched_moving: false,
        }
    }

    /// Reset to the initial third-person idle state and begin taking frames.
    pub fn start(&mut self) {
        self.mode = LocomotionMode::ThirdPerson;
        self.camera_owner = CameraOwner::Orbit;
        self.player = ClipPlayer::new(Clip::Idle, self.config.blend_seconds);
        tracing::info!(position = ?self.position, "locomotion started");
    }

    pub fn mode(&self) -> LocomotionMode {
        self.mode
    }

    pub fn camera_owner(&self) -> CameraOwner {
        self.camera_owner
    }

    pub fn active_clip(&self) -> Clip {
        self.player.active()
    }

    pub fn is_anim_paused(&self) -> bool {
        self.player.is_paused()
    }

    pub fn is_in_xr(&self) -> bool {
        self.in_xr
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn rig(&self) -> &AvatarRig {
        &self.rig
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    /// Switch embodiment; the camera owner follows the mode.
    pub fn set_mode(&mut self, mode: LocomotionMode) {
        self.mode = mode;
        self.camera_owner = match mode {
            LocomotionMode::ThirdPerson => CameraOwner::Orbit,
            LocomotionMode::FirstPerson => CameraOwner::XrRig,
        };
        tracing::info!(mode = ?mode, owner = ?self.camera_owner, "locomotion mode switched");
    }

    /// Freeze clip playback without detaching per-frame updates.
    pub fn pause_anim(&mut self) {
        self.player.pause();
    }

    pub fn resume_anim(&mut self) {
        self.player.resume();
    }

    /// Suppress third-person-only behaviors while an XR session is active.
    pub fn set_in_xr(&mut self, in_xr: bool) {
        self.in_xr = in_xr;
        self.camera.set_input_enabled(!in_xr);
    }

    /// Snap the active clip to Idle with no blend (XR hand-off).
    pub fn force_idle(&mut self) {
        self.player.force(Clip::Idle);
    }

    /// Return the skeleton to its rest pose (XR hand-off).
    pub fn reset_rest_pose(&mut self) {
        self.rig.reset_to_rest();
    }

    /// Re-aim the orbit camera from a saved pose (desktop view restored
    /// after an immersive session).
    pub fn restore_camera_pose(&mut self, pose: &Pose) {
        self.camera.restore_pose(pose);
    }

    /// The pose of whichever camera currently owns the view.
    pub fn camera_pose(&self) -> Pose {
        match self.camera_owner {
            CameraOwner::Orbit => self.camera.pose(),
            CameraOwner::XrRig => self.head_pose(),
        }
    }

    /// The character's head pose (first-person anchor).
    pub fn head_pose(&self) -> Pose {
        Pose::new(
            self.position + Vec3::Y * self.config.head_height,
            Quat::from_rotation_y(self.yaw),
        )
    }

    /// Advance one frame: sample intent, apply ground policy, integrate
    /// gravity, select and blend the clip, drive the follow camera.
    pub fn update(&mut self, input: MoveInput, probe: &impl CollisionProbe, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        let mut local = Vec3::new(input.axis.x, 0.0, input.axis.y);
        if local.length_squared() > 1.0 {
            local = local.normalize();
        }
        let speed = if input.axis.y > 0.0 && input.run {
            self.config.run_speed
        } else {
            self.config.walk_speed
        };
        let step = Quat::from_rotation_y(self.yaw) * local * speed * dt;

        if self.grounded && input.jump {
            self.vertical_velocity = self.config.jump_speed;
            self.grounded = false;
            self.jump_launched = true;
            self.launched_moving = local.length_squared() > 0.0;
        }

        if self.grounded {
            self.ground_move(step, probe);
        } else {
            self.air_move(step, probe, dt);
        }

        let wanted = self.select_clip(input);
        let clip = if self.rig.has_clip(wanted) {
            wanted
        } else {
            tracing::debug!(clip = ?wanted, "clip missing from rig, degrading to idle");
            Clip::Idle
        };
        self.player.transition_to(clip);
        if !self.player.is_paused() && clip != Clip::Idle {
            self.rig.leave_rest();
        }
        self.player.advance(dt);

        if self.camera_owner == CameraOwner::Orbit {
            self.camera.follow(self.position);
        }
    }

    /// Grounded horizontal movement under the step-offset and slope-limit
    /// policy.
    fn ground_move(&mut self, step: Vec3, probe: &impl CollisionProbe) {
        if step == Vec3::ZERO {
            return;
        }
        let target = self.position + step;
        let Some(ground) = probe.ground_height(target.x, target.z) else {
            // Walked over a pit edge: keep the horizontal motion and fall.
            self.position.x = target.x;
            self.position.z = target.z;
            self.leave_ground();
            return;
        };

        let rise = ground - self.position.y;
        if rise <= 0.0 {
            if -rise <= self.config.step_offset {
                // Downhill within step range: stay glued to the ground.
                self.position = Vec3::new(target.x, ground, target.z);
            } else {
                // Ledge drop: move out over it and fall.
                self.position.x = target.x;
                self.position.z = target.z;
                self.leave_ground();
            }
        } else if rise <= self.config.step_offset {
            // Ledge within step height: climb it without entering Fall.
            self.position = Vec3::new(target.x, ground, target.z);
        } else {
            let run = Vec3::new(step.x, 0.0, step.z).length();
            let slope = rise.atan2(run);
            if slope > self.config.slope_limit_degrees.to_radians() {
                tracing::trace!(
                    slope_degrees = slope.to_degrees(),
                    "movement rejected by slope limit"
                );
            } else {
                self.position = Vec3::new(target.x, ground, target.z);
            }
        }
    }

    fn air_move(&mut self, step: Vec3, probe: &impl CollisionProbe, dt: f32) {
        self.position.x += step.x;
        self.position.z += step.z;
        self.vertical_velocity -= self.config.gravity * dt;
        self.position.y += self.vertical_velocity * dt;

        if self.vertical_velocity <= 0.0
            && let Some(ground) = probe.ground_height(self.position.x, self.position.z)
            && self.position.y <= ground
        {
            self.position.y = ground;
            self.vertical_velocity = 0.0;
            self.grounded = true;
            self.jump_launched = false;
        }
    }

    fn leave_ground(&mut self) {
        self.grounded = false;
        self.vertical_velocity = 0.0;
        self.jump_launched = false;
    }

    /// Clip priority: airborne over moving over idle.
    fn select_clip(&self, input: MoveInput) -> Clip {
        if !self.grounded {
            return if self.jump_launched {
                if self.launched_moving {
                    Clip::RunJump
                } else {
                    Clip::IdleJump
                }
            } else {
                Clip::Fall
            };
        }
        if input.axis == glam::Vec2::ZERO {
            return Clip::Idle;
        }
        if input.axis.y > 0.0 {
            if input.run { Clip::Run } else { Clip::Walk }
        } else if input.axis.y < 0.0 {
            Clip::WalkBack
        } else if input.axis.x > 0.0 {
            Clip::StrafeRight
        } else {
            Clip::StrafeLeft
        }
    }
}
