//! Model manifest gate and model sizing
//!
//! Model files are loaded by the host (browser fetch). The simulation only
//! needs two things from them: whether loading finished, and each model's
//! bounding height so ghosts can be scaled to a consistent world size.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{HEAVY_TARGET_HEIGHT, LIGHT_TARGET_HEIGHT, MIN_MODEL_SCALE};
use crate::sim::npc::NpcKind;

/// Errors raised while reading the model manifest
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("model manifest is malformed: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("model manifest has no entry for {0}")]
    MissingModel(&'static str),
}

/// Measurements of a loaded model, in model units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Height of the model's bounding box
    pub bounding_height: f32,
}

/// One manifest entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub path: String,
    pub bounding_height: f32,
    /// Animation clips shipped with the model
    #[serde(default)]
    pub clips: Vec<ClipEntry>,
}

/// An animation clip and its playback length
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipEntry {
    pub name: String,
    pub duration: f32,
}

/// Manifest describing the ghost models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    pub light: Option<ModelEntry>,
    pub heavy: Option<ModelEntry>,
}

impl ModelManifest {
    pub fn from_json(json: &str) -> Result<Self, AssetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Extract the metrics the simulation needs
    pub fn metrics(&self) -> Result<ModelSet, AssetError> {
        let light = self.light.as_ref().ok_or(AssetError::MissingModel("light"))?;
        let heavy = self.heavy.as_ref().ok_or(AssetError::MissingModel("heavy"))?;
        let mut attack_clips: Vec<f32> = heavy
            .clips
            .iter()
            .filter(|c| c.name.starts_with("attack") && c.duration.is_finite() && c.duration > 0.0)
            .map(|c| c.duration)
            .collect();
        if attack_clips.is_empty() {
            attack_clips = DEFAULT_ATTACK_CLIPS.to_vec();
        }
        Ok(ModelSet {
            light: ModelMetrics {
                bounding_height: light.bounding_height,
            },
            heavy: ModelMetrics {
                bounding_height: heavy.bounding_height,
            },
            attack_clips,
        })
    }
}

/// Attack clip lengths used when the brawler model ships none
pub const DEFAULT_ATTACK_CLIPS: &[f32] = &[1.4, 1.8, 2.2];

/// Metrics for every ghost kind
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSet {
    pub light: ModelMetrics,
    pub heavy: ModelMetrics,
    /// Brawler attack clip durations (seconds)
    pub attack_clips: Vec<f32>,
}

impl Default for ModelSet {
    /// Models authored at their target height (scale 1)
    fn default() -> Self {
        Self {
            light: ModelMetrics {
                bounding_height: LIGHT_TARGET_HEIGHT,
            },
            heavy: ModelMetrics {
                bounding_height: HEAVY_TARGET_HEIGHT,
            },
            attack_clips: DEFAULT_ATTACK_CLIPS.to_vec(),
        }
    }
}

impl ModelSet {
    pub fn for_kind(&self, kind: NpcKind) -> ModelMetrics {
        match kind {
            NpcKind::LightPursuer => self.light,
            NpcKind::HeavyBrawler => self.heavy,
        }
    }
}

/// Loading state of the model manifest
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AssetGate {
    /// Still fetching
    #[default]
    Pending,
    /// All models available
    Ready(ModelSet),
    /// Loading failed; the match can never start
    Failed(String),
}

impl AssetGate {
    pub fn is_ready(&self) -> bool {
        matches!(self, AssetGate::Ready(_))
    }

    /// Resolve the gate from a fetched manifest
    pub fn resolve(&mut self, manifest_json: &str) {
        match ModelManifest::from_json(manifest_json).and_then(|m| m.metrics()) {
            Ok(models) => {
                log::info!("Models ready: {:?}", models);
                *self = AssetGate::Ready(models);
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    /// Mark loading as permanently failed
    pub fn fail(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::error!("Model loading failed: {}", reason);
        *self = AssetGate::Failed(reason);
    }

    pub fn models(&self) -> Option<&ModelSet> {
        match self {
            AssetGate::Ready(models) => Some(models),
            _ => None,
        }
    }
}

/// How a model is fitted into the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelFit {
    /// Uniform scale applied to the mesh
    pub scale: f32,
    /// Resulting height in world units
    pub world_height: f32,
}

/// Scale a model to the target height for its kind.
///
/// Zero or non-finite bounding heights fall back to `MIN_MODEL_SCALE`; the
/// ghost still spawns, just undersized.
pub fn fit_model(kind: NpcKind, metrics: ModelMetrics) -> ModelFit {
    let target = match kind {
        NpcKind::LightPursuer => LIGHT_TARGET_HEIGHT,
        NpcKind::HeavyBrawler => HEAVY_TARGET_HEIGHT,
    };
    let raw = metrics.bounding_height;
    if !raw.is_finite() || raw <= 0.0 {
        log::warn!(
            "{:?} model has degenerate bounding height {}, using minimum scale",
            kind,
            raw
        );
        return ModelFit {
            scale: MIN_MODEL_SCALE,
            world_height: target * MIN_MODEL_SCALE,
        };
    }
    ModelFit {
        scale: target / raw,
        world_height: target,
    }
}
