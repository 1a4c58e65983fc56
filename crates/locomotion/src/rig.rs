use crate::clip::Clip;
use holoscene_engine::{AnimationClip, AvatarBundle, MeshHandle};
use std::collections::HashMap;

/// Errors from binding a controller to an imported avatar.
#[derive(Debug, thiserror::Error)]
pub enum LocomotionError {
    #[error("avatar bundle has no mesh to control")]
    MissingMesh,
    #[error("avatar bundle has no animation set")]
    MissingAnimations,
}

/// An imported avatar bound for locomotion: mesh handles plus the animation
/// set resolved against the controller's clip names.
///
/// Clips the rig does not provide are simply absent; selection degrades to
/// Idle for those. Clips the rig provides beyond the known set (rigs also
/// export a `walkBackFast` cycle) are ignored.
#[derive(Debug, Clone)]
pub struct AvatarRig {
    meshes: Vec<MeshHandle>,
    clips: HashMap<Clip, AnimationClip>,
    at_rest: bool,
}

const ALL_CLIPS: [Clip; 9] = [
    Clip::Idle,
    Clip::Walk,
    Clip::Run,
    Clip::WalkBack,
    Clip::StrafeLeft,
    Clip::StrafeRight,
    Clip::IdleJump,
    Clip::RunJump,
    Clip::Fall,
];

impl AvatarRig {
    /// Bind an imported bundle. A bundle without a mesh or without any
    /// animations cannot be controlled and is rejected here, at
    /// construction, rather than failing every frame.
    pub fn from_bundle(bundle: &AvatarBundle) -> Result<Self, LocomotionError> {
        if bundle.meshes.is_empty() {
            return Err(LocomotionError::MissingMesh);
        }
        if bundle.animations.is_empty() {
            return Err(LocomotionError::MissingAnimations);
        }
        let mut clips = HashMap::new();
        for clip in ALL_CLIPS {
            match bundle.clip(clip.rig_name()) {
                Some(found) => {
                    clips.insert(clip, found.clone());
                }
                None => {
                    tracing::debug!(clip = ?clip, "rig is missing a clip, will degrade to idle");
                }
            }
        }
        Ok(Self {
            meshes: bundle.meshes.clone(),
            clips,
            at_rest: true,
        })
    }

    pub fn meshes(&self) -> &[MeshHandle] {
        &self.meshes
    }

    pub fn has_clip(&self, clip: Clip) -> bool {
        self.clips.contains_key(&clip)
    }

    pub fn clip(&self, clip: Clip) -> Option<&AnimationClip> {
        self.clips.get(&clip)
    }

    /// Snap the skeleton back to its rest pose (used at the XR hand-off so
    /// the first-person body is not frozen mid-stride).
    pub fn reset_to_rest(&mut self) {
        self.at_rest = true;
    }

    /// Mark the skeleton as animated away from rest.
    pub fn leave_rest(&mut self) {
        self.at_rest = false;
    }

    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }
}
