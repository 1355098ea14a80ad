use headspace_surface::{Falloff, ShadingParams};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown preset `{0}` (expected `subtle` or `dramatic`)")]
    UnknownPreset(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Named falloff tunings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Wide radius, gentle push.
    #[default]
    Subtle,
    /// Tight radius, strong push.
    Dramatic,
}

impl Preset {
    pub fn falloff(self) -> Falloff {
        match self {
            Preset::Subtle => Falloff::SUBTLE,
            Preset::Dramatic => Falloff::DRAMATIC,
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "subtle" => Ok(Preset::Subtle),
            "dramatic" => Ok(Preset::Dramatic),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Subtle => f.write_str("subtle"),
            Preset::Dramatic => f.write_str("dramatic"),
        }
    }
}

/// Everything needed to build the scene. Missing JSON fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// glTF asset holding the `Eyes` and `Head` nodes.
    pub head_path: PathBuf,
    /// glTF asset for the reactive surface.
    pub surface_path: PathBuf,
    pub preset: Preset,
    /// Explicit falloff; overrides `preset` when set.
    pub falloff: Option<Falloff>,
    pub shading: ShadingParams,
    /// Seed for the per-face decoration; random when unset.
    pub seed: Option<u64>,
    /// Delay between assets arriving and the scene being shown.
    pub reveal_delay_ms: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            head_path: PathBuf::from("assets/models/MHead.glb"),
            surface_path: PathBuf::from("assets/models/surface.glb"),
            preset: Preset::default(),
            falloff: None,
            shading: ShadingParams::default(),
            seed: None,
            reveal_delay_ms: 500,
        }
    }
}

impl SceneConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn falloff(&self) -> Falloff {
        self.falloff.unwrap_or_else(|| self.preset.falloff())
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let falloff = self.falloff();
        if falloff.threshold.is_nan() || falloff.threshold <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "falloff threshold must be positive, got {}",
                falloff.threshold
            )));
        }
        if !falloff.push.is_finite() {
            return Err(ConfigError::Invalid("falloff push must be finite".into()));
        }
        for (name, value) in [
            ("metalness", self.shading.metalness),
            ("roughness", self.shading.roughness),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}
