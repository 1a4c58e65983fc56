use crate::contract::AssetImporter;
use serde::{Deserialize, Serialize};

/// A handle referencing a mesh uploaded into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshHandle(pub u64);

/// One named animation cycle imported alongside the avatar mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub duration_seconds: f32,
    pub looping: bool,
}

/// Everything the engine produced from one avatar import: mesh handles plus
/// the animation set, still keyed by the rig's own clip names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarBundle {
    pub meshes: Vec<MeshHandle>,
    pub animations: Vec<AnimationClip>,
}

impl AvatarBundle {
    /// Look up a clip by its rig name.
    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.animations.iter().find(|c| c.name == name)
    }
}

/// Errors from avatar asset import.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("network error fetching {url}: {reason}")]
    Network { url: String, reason: String },
    #[error("malformed asset at {url}: {reason}")]
    Format { url: String, reason: String },
    #[error("imported bundle from {url} contains no meshes")]
    EmptyBundle { url: String },
}

/// Thin gateway in front of the engine's import call.
///
/// Adds the one policy the core cares about: an import that yields no meshes
/// is an error here, not downstream where the controller would fail with a
/// less useful message.
#[derive(Debug, Default)]
pub struct AssetImportGateway;

impl AssetImportGateway {
    pub fn new() -> Self {
        Self
    }

    pub async fn import<E: AssetImporter>(
        &self,
        engine: &mut E,
        url: &str,
    ) -> Result<AvatarBundle, ImportError> {
        tracing::info!(url, "importing avatar bundle");
        let bundle = engine.import_avatar(url).await?;
        if bundle.meshes.is_empty() {
            return Err(ImportError::EmptyBundle { url: url.to_string() });
        }
        tracing::info!(
            meshes = bundle.meshes.len(),
            clips = bundle.animations.len(),
            "avatar bundle imported"
        );
        Ok(bundle)
    }
}
