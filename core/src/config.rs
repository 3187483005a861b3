//! Visualizer configuration.
//!
//! One parameter record drives both the compact and the dense visualizer
//! variants. Defaults reproduce the compact variant.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors raised while building or loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Particle count must be at least 1")]
    EmptyField,
    #[error("Spectrum length must be at least 1")]
    EmptySpectrum,
    #[error("Bass range must be between 1 and the spectrum length ({spectrum_len}), got {bass_range}")]
    InvalidBassRange { bass_range: usize, spectrum_len: usize },
    #[error("Spike modulus must be at least 1")]
    ZeroSpikeModulus,
    #[error("Spike threshold must be in [0, 1], got {0}")]
    InvalidThreshold(f32),
    #[error("Scale smoothing must be in (0, 1], got {0}")]
    InvalidSmoothing(f32),
    #[error("{name} must be finite and non-negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Constants for the idle (no live audio) regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleParams {
    /// Rotation about Y in radians per second.
    pub rotation_rate_y: f32,
    /// Rotation about Z in radians per second.
    pub rotation_rate_z: f32,
    /// Center of the breathing oscillation.
    pub scale_base: f32,
    /// Amplitude of the breathing oscillation.
    pub scale_amplitude: f32,
    /// Angular frequency of the breathing oscillation.
    pub breath_rate: f32,
}

impl Default for IdleParams {
    fn default() -> Self {
        Self {
            rotation_rate_y: 0.05,
            rotation_rate_z: 0.02,
            scale_base: 125.0,
            scale_amplitude: 25.0,
            breath_rate: 0.5,
        }
    }
}

/// Constants for the active (live audio) regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveParams {
    /// Constant Y rotation added every frame.
    pub rotation_base_y: f32,
    /// Extra Y rotation per frame at full bass.
    pub rotation_gain_y: f32,
    pub rotation_base_z: f32,
    pub rotation_gain_z: f32,
    /// Smallest target scale, keeps the field from collapsing to a point.
    pub scale_floor: f32,
    /// Target scale at full bass.
    pub scale_multiplier: f32,
    /// Fraction of the remaining distance to the target covered each frame.
    pub scale_smoothing: f32,
    /// Bass level above which particles spike.
    pub spike_threshold: f32,
    /// Every `spike_modulus`-th particle is a spike.
    pub spike_modulus: u32,
    /// Local scale of a spike particle at full bass.
    pub spike_multiplier: f32,
    /// Local scale of a regular particle at full bass.
    pub body_multiplier: f32,
    /// Flutter is drawn uniformly from `[-flutter_amplitude, flutter_amplitude]`.
    pub flutter_amplitude: f32,
    /// Ripple used below the spike threshold.
    pub ripple_amplitude: f32,
    pub ripple_speed: f32,
    /// Per-index phase step of the ripple.
    pub ripple_phase: f32,
}

impl Default for ActiveParams {
    fn default() -> Self {
        Self {
            rotation_base_y: 0.005,
            rotation_gain_y: 0.05,
            rotation_base_z: 0.002,
            rotation_gain_z: 0.02,
            scale_floor: 5.0,
            scale_multiplier: 500.0,
            scale_smoothing: 0.3,
            spike_threshold: 0.2,
            spike_modulus: 10,
            spike_multiplier: 1.5,
            body_multiplier: 1.05,
            flutter_amplitude: 0.05,
            ripple_amplitude: 0.02,
            ripple_speed: 3.0,
            ripple_phase: 0.2,
        }
    }
}

/// How particle hues are derived.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum HueMode {
    /// Every particle follows one shared hue with a small index offset.
    #[default]
    Shared,
    /// Every particle owns a fixed baseline hue that drifts with time.
    PerParticle {
        /// Hue units per second.
        drift_rate: f32,
    },
}

/// Color parameters shared by both regimes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub mode: HueMode,
    /// Cool baseline hue (cyan/blue).
    pub base_hue: f32,
    /// Hue shift at full bass, toward red/magenta.
    pub hue_span: f32,
    pub saturation: f32,
    pub lightness: f32,
    /// Idle lightness oscillation amplitude.
    pub shimmer: f32,
    /// Extra saturation at full bass.
    pub saturation_gain: f32,
    /// Extra lightness at full bass.
    pub lightness_gain: f32,
    /// Spread of per-particle baseline hues around `base_hue`.
    pub baseline_spread: f32,
    /// Random offset applied to each per-particle baseline hue.
    pub baseline_jitter: f32,
    /// Idle hue drift in hue units per second for the shared hue mode.
    pub shared_drift: f32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            mode: HueMode::Shared,
            base_hue: 0.55,
            hue_span: 0.4,
            saturation: 0.8,
            lightness: 0.4,
            shimmer: 0.1,
            saturation_gain: 0.2,
            lightness_gain: 0.6,
            baseline_spread: 0.2,
            baseline_jitter: 0.03,
            shared_drift: 0.0,
        }
    }
}

/// Complete visualizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    pub particle_count: u32,
    /// Number of spectrum bins sampled per frame.
    pub spectrum_len: usize,
    /// Number of low bins averaged into the bass feature.
    pub bass_range: usize,
    /// Seed for geometry and flutter. `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub idle: IdleParams,
    pub active: ActiveParams,
    pub palette: Palette,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self::compact()
    }
}

impl VisualizerConfig {
    /// The 2000 particle variant with a shared hue.
    pub fn compact() -> Self {
        Self {
            particle_count: 2000,
            spectrum_len: 128,
            bass_range: 20,
            seed: None,
            idle: IdleParams::default(),
            active: ActiveParams::default(),
            palette: Palette::default(),
        }
    }

    /// The large-scale variant: more particles, bigger field, per-particle hues.
    pub fn dense() -> Self {
        Self {
            particle_count: 8000,
            idle: IdleParams {
                scale_base: 200.0,
                scale_amplitude: 50.0,
                ..IdleParams::default()
            },
            active: ActiveParams {
                scale_multiplier: 800.0,
                ..ActiveParams::default()
            },
            palette: Palette {
                mode: HueMode::PerParticle { drift_rate: 0.02 },
                ..Palette::default()
            },
            ..Self::compact()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_particle_count(mut self, count: u32) -> Self {
        self.particle_count = count;
        self
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject configurations that cannot produce a field or a frame.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::EmptyField);
        }
        if self.spectrum_len == 0 {
            return Err(ConfigError::EmptySpectrum);
        }
        if self.bass_range == 0 || self.bass_range > self.spectrum_len {
            return Err(ConfigError::InvalidBassRange {
                bass_range: self.bass_range,
                spectrum_len: self.spectrum_len,
            });
        }

        let active = &self.active;
        if active.spike_modulus == 0 {
            return Err(ConfigError::ZeroSpikeModulus);
        }
        if !(active.scale_smoothing > 0.0 && active.scale_smoothing <= 1.0) {
            return Err(ConfigError::InvalidSmoothing(active.scale_smoothing));
        }
        if !(0.0..=1.0).contains(&active.spike_threshold) {
            return Err(ConfigError::InvalidThreshold(active.spike_threshold));
        }

        let non_negative = [
            ("scale_floor", active.scale_floor),
            ("scale_multiplier", active.scale_multiplier),
            ("spike_multiplier", active.spike_multiplier),
            ("body_multiplier", active.body_multiplier),
            ("flutter_amplitude", active.flutter_amplitude),
            ("ripple_amplitude", active.ripple_amplitude),
            ("idle.scale_base", self.idle.scale_base),
            ("idle.scale_amplitude", self.idle.scale_amplitude),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { name, value });
            }
        }

        Ok(())
    }
}
