use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{surface::ClipCatalog, Result, SceneError, TransferFunction};

const DEFAULT_CLIP_SECONDS: f32 = 8.0;

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub playlist: PlaylistConfig,
    pub camera: CameraConfig,
    pub environment: EnvironmentConfig,
    /// Clip durations used by the headless playback backend.
    pub clips: ClipCatalog,
}

impl Default for AppConfig {
    fn default() -> Self {
        let playlist = PlaylistConfig::default();
        let clips = ClipCatalog::uniform(playlist.sources.iter().cloned(), DEFAULT_CLIP_SECONDS);
        Self {
            playlist,
            camera: CameraConfig::default(),
            environment: EnvironmentConfig::default(),
            clips,
        }
    }
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing sections fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.playlist.sources.is_empty() {
            return Err(SceneError::configuration(
                "playlist.sources must name at least one clip",
            ));
        }
        if self.camera.damping <= 0.0 || self.camera.damping > 1.0 {
            return Err(SceneError::configuration(format!(
                "camera.damping must be in (0, 1], got {}",
                self.camera.damping
            )));
        }
        if self.environment.fog_near > self.environment.fog_far {
            return Err(SceneError::configuration(
                "environment.fog_near must not exceed fog_far",
            ));
        }
        Ok(())
    }
}

/// Clips shown on the text mesh and how the text is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    pub sources: Vec<String>,
    /// Transfer function the text material expects its colour map in.
    pub encoding: TransferFunction,
    pub text: String,
    pub font: String,
    pub font_size: f32,
    pub letter_spacing: f32,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            sources: (1..=5).map(|n| format!("/{n}.mp4")).collect(),
            encoding: TransferFunction::Srgb,
            text: "Anime".to_string(),
            font: "/Inter-Bold.woff".to_string(),
            font_size: 3.0,
            letter_spacing: -0.06,
        }
    }
}

/// Intro camera placement and pointer-follow behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub start_position: [f32; 3],
    pub fov_degrees: f32,
    /// Position the camera settles at when the pointer is centred.
    pub rest_position: [f32; 3],
    /// World units of offset per unit of pointer movement on x and y.
    pub pointer_gain: [f32; 2],
    /// Fraction of the remaining distance covered each frame.
    pub damping: f32,
    pub look_at: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start_position: [0.0, 3.0, 100.0],
            fov_degrees: 15.0,
            rest_position: [0.0, 3.0, 14.0],
            pointer_gain: [5.0, 2.0],
            damping: 0.05,
            look_at: [0.0, 0.0, 0.0],
        }
    }
}

/// Background, fog and output resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub background: String,
    pub fog_near: f32,
    pub fog_far: f32,
    pub pixel_ratio: [f32; 2],
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            background: "black".to_string(),
            fog_near: 15.0,
            fog_far: 20.0,
            pixel_ratio: [1.0, 1.5],
        }
    }
}
