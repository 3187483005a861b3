//! Per-frame animation driver.
//!
//! Maps the current regime (idle, or active with a bass level) onto rotation,
//! global scale and per-particle position/color, writing the results into a
//! [`ParticleField`]. Everything except rotation and scale is recomputed from
//! scratch every frame, so a bad frame never leaves residue.

use std::fmt;

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::hsl_to_rgb;
use crate::config::{HueMode, VisualizerConfig};
use crate::field::{DirtyAttributes, ParticleField};

/// Hue offset step per particle in the idle regime.
const IDLE_HUE_STEP: f32 = 0.0002;
/// Hue offset step per particle in the active regime.
const ACTIVE_HUE_STEP: f32 = 0.001;
/// Angular frequency of the idle lightness shimmer.
const SHIMMER_RATE: f32 = 2.0;

/// Operating mode for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "regime", rename_all = "lowercase")]
pub enum Regime {
    /// No live spectrum.
    Idle,
    /// Live spectrum with normalized bass energy in `0.0..=1.0`.
    Active { bass: f32 },
}

impl Regime {
    /// Build a regime from an optional bass reading. Out of range or
    /// non-finite readings are clamped into `0.0..=1.0`.
    pub fn from_bass(bass: Option<f32>) -> Self {
        match bass {
            None => Self::Idle,
            Some(b) if b.is_finite() => Self::Active {
                bass: b.clamp(0.0, 1.0),
            },
            Some(_) => Self::Active { bass: 0.0 },
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    pub fn bass(&self) -> f32 {
        match self {
            Self::Idle => 0.0,
            Self::Active { bass } => *bass,
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Active { bass } => write!(f, "active (bass {:.2})", bass),
        }
    }
}

/// Field rotation in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub y: f32,
    pub z: f32,
}

/// Summary of one driven frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub time: f32,
    pub regime: Regime,
    pub rotation: Rotation,
    pub scale: Vec3,
    /// Particles that took the spike path this frame.
    pub spikes: usize,
}

/// State machine driving a [`ParticleField`] one frame at a time.
///
/// Randomness is limited to the per-particle flutter and comes from the
/// injected generator `R`; rotation and scale trajectories are fully
/// determined by the sequence of `(t, regime)` inputs.
pub struct AnimationDriver<R = SmallRng> {
    config: VisualizerConfig,
    rng: R,
    rotation: Rotation,
    scale: Vec3,
    /// Whether the last frame left positions away from the base geometry.
    deformed: bool,
    last_regime: Option<Regime>,
}

impl<R> fmt::Debug for AnimationDriver<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationDriver")
            .field("rotation", &self.rotation)
            .field("scale", &self.scale)
            .field("deformed", &self.deformed)
            .finish_non_exhaustive()
    }
}

impl<R: Rng> AnimationDriver<R> {
    /// Create a driver. The scale starts at the idle breathing base so the
    /// first idle frame does not pop.
    pub fn new(config: VisualizerConfig, rng: R) -> Self {
        let scale = Vec3::splat(config.idle.scale_base);
        Self {
            config,
            rng,
            rotation: Rotation::default(),
            scale,
            deformed: false,
            last_regime: None,
        }
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    /// Swap the tuning constants without resetting rotation or scale.
    pub fn set_config(&mut self, config: VisualizerConfig) {
        self.config = config;
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Drive one frame at global clock time `t` (seconds).
    pub fn tick(&mut self, t: f32, regime: Regime, field: &mut ParticleField) -> FrameReport {
        let regime = match regime {
            Regime::Idle => Regime::Idle,
            Regime::Active { bass } => Regime::from_bass(Some(bass)),
        };

        if self.last_regime.map(|r| r.is_active()) != Some(regime.is_active()) {
            log::info!("Visualizer entering {} at t={:.2}s", regime, t);
        }
        self.last_regime = Some(regime);

        let spikes = match regime {
            Regime::Idle => {
                self.idle_frame(t, field);
                0
            }
            Regime::Active { bass } => self.active_frame(t, bass, field),
        };

        let report = FrameReport {
            time: t,
            regime,
            rotation: self.rotation,
            scale: self.scale,
            spikes,
        };
        log::trace!("{:?}", report);
        report
    }

    fn idle_frame(&mut self, t: f32, field: &mut ParticleField) {
        let idle = &self.config.idle;
        let palette = &self.config.palette;

        self.rotation = Rotation {
            y: t * idle.rotation_rate_y,
            z: t * idle.rotation_rate_z,
        };
        self.scale = Vec3::splat(idle.scale_base + idle.scale_amplitude * (t * idle.breath_rate).sin());

        let mut dirty = DirtyAttributes::COLORS;
        if self.deformed {
            field.reset_positions();
            self.deformed = false;
            dirty.positions = true;
        }

        for i in 0..field.len() {
            let hue = match (palette.mode, field.initial_hues()) {
                (HueMode::PerParticle { drift_rate }, Some(hues)) => {
                    hues[i] + t * drift_rate + (i % 100) as f32 * IDLE_HUE_STEP
                }
                _ => {
                    palette.base_hue + t * palette.shared_drift + (i % 100) as f32 * IDLE_HUE_STEP
                }
            };
            let lightness =
                palette.lightness + (t * SHIMMER_RATE + i as f32).sin() * palette.shimmer;
            field.set_color(i, hsl_to_rgb(hue, palette.saturation, lightness));
        }

        field.mark_dirty(dirty);
    }

    fn active_frame(&mut self, t: f32, bass: f32, field: &mut ParticleField) -> usize {
        let active = &self.config.active;
        let palette = &self.config.palette;

        self.rotation.y += active.rotation_base_y + bass * active.rotation_gain_y;
        self.rotation.z += active.rotation_base_z + bass * active.rotation_gain_z;

        let target = (bass * active.scale_multiplier).max(active.scale_floor);
        self.scale += (Vec3::splat(target) - self.scale) * active.scale_smoothing;

        let spiking = bass > active.spike_threshold;
        let modulus = active.spike_modulus.max(1) as usize;
        let target_hue = palette.base_hue + bass * palette.hue_span;
        let saturation = palette.saturation + bass * palette.saturation_gain;
        let lightness = palette.lightness + bass * palette.lightness_gain;
        let mut spikes = 0;

        for i in 0..field.len() {
            let local_scale = if spiking {
                let is_spike = i % modulus == 0;
                let multiplier = if is_spike {
                    spikes += 1;
                    active.spike_multiplier
                } else {
                    active.body_multiplier
                };
                let flutter = (self.rng.gen::<f32>() - 0.5) * 2.0 * active.flutter_amplitude;
                1.0 + bass * (multiplier - 1.0) + flutter
            } else {
                1.0 + (t * active.ripple_speed + i as f32 * active.ripple_phase).sin()
                    * active.ripple_amplitude
            };
            field.set_local_scale(i, local_scale);

            let hue_var = (i % 50) as f32 * ACTIVE_HUE_STEP;
            let hue = match (palette.mode, field.initial_hues()) {
                (HueMode::PerParticle { drift_rate }, Some(hues)) => {
                    target_hue + (hues[i] - palette.base_hue) + t * drift_rate + hue_var
                }
                _ => target_hue + hue_var,
            };
            field.set_color(i, hsl_to_rgb(hue, saturation, lightness));
        }

        self.deformed = true;
        field.mark_dirty(DirtyAttributes::ALL);
        spikes
    }
}
