//! Particle field: static sphere geometry plus per-frame render attributes.
//!
//! Particles are indices into parallel arrays. The base geometry is
//! generated once and never mutated; every deformation is written into the
//! separate `positions` array.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::color::hsl_to_rgb;
use crate::config::{ConfigError, HueMode, Palette};

/// Errors raised while building a particle field.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    #[error("A particle field needs at least one particle")]
    Empty,
}

impl From<FieldError> for ConfigError {
    fn from(err: FieldError) -> Self {
        match err {
            FieldError::Empty => ConfigError::EmptyField,
        }
    }
}

/// Which render attributes were rewritten since the renderer last looked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyAttributes {
    pub positions: bool,
    pub colors: bool,
}

impl DirtyAttributes {
    pub const NONE: Self = Self {
        positions: false,
        colors: false,
    };
    pub const ALL: Self = Self {
        positions: true,
        colors: true,
    };
    pub const COLORS: Self = Self {
        positions: false,
        colors: true,
    };

    pub fn any(&self) -> bool {
        self.positions || self.colors
    }

    fn merge(&mut self, other: Self) {
        self.positions |= other.positions;
        self.colors |= other.colors;
    }
}

/// Uniformly distributed point on the unit sphere.
///
/// The polar angle comes from `acos` of a uniform variate in `[-1, 1]`, which
/// gives equal density per unit area.
pub fn sample_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta = rng.gen_range(0.0..TAU);
    let phi = rng.gen_range(-1.0f32..=1.0).acos();

    Vec3::new(
        phi.sin() * theta.cos(),
        phi.sin() * theta.sin(),
        phi.cos(),
    )
}

/// Fixed baseline hue of a particle, derived from where it sits on the sphere.
fn baseline_hue<R: Rng + ?Sized>(position: Vec3, palette: &Palette, rng: &mut R) -> f32 {
    let azimuth = position.y.atan2(position.x).rem_euclid(TAU) / TAU;
    let jitter = if palette.baseline_jitter > 0.0 {
        rng.gen_range(-palette.baseline_jitter..=palette.baseline_jitter)
    } else {
        0.0
    };
    palette.base_hue
        + palette.baseline_spread * azimuth
        + 0.5 * palette.baseline_spread * position.z
        + jitter
}

/// Unit-sphere point cloud with mutable render attributes.
#[derive(Debug, Clone)]
pub struct ParticleField {
    original_positions: Vec<Vec3>,
    positions: Vec<Vec3>,
    colors: Vec<Vec3>,
    initial_hues: Option<Vec<f32>>,
    dirty: DirtyAttributes,
}

impl ParticleField {
    /// Generate `count` particles on the unit sphere.
    ///
    /// Every particle starts undeformed with the palette's idle color. With
    /// a per-particle hue mode each particle also receives its baseline hue.
    pub fn new<R: Rng + ?Sized>(
        count: usize,
        palette: &Palette,
        rng: &mut R,
    ) -> Result<Self, FieldError> {
        if count == 0 {
            return Err(FieldError::Empty);
        }

        let original_positions: Vec<Vec3> = (0..count).map(|_| sample_unit_sphere(rng)).collect();

        let initial_hues = match palette.mode {
            HueMode::Shared => None,
            HueMode::PerParticle { .. } => Some(
                original_positions
                    .iter()
                    .map(|&p| baseline_hue(p, palette, rng))
                    .collect(),
            ),
        };

        let initial_color = hsl_to_rgb(palette.base_hue, palette.saturation, palette.lightness);

        Ok(Self {
            positions: original_positions.clone(),
            colors: vec![initial_color; count],
            original_positions,
            initial_hues,
            dirty: DirtyAttributes::ALL,
        })
    }

    pub fn len(&self) -> usize {
        self.original_positions.len()
    }

    /// Always false once constructed.
    pub fn is_empty(&self) -> bool {
        self.original_positions.is_empty()
    }

    pub fn original_positions(&self) -> &[Vec3] {
        &self.original_positions
    }

    pub fn original_position(&self, index: usize) -> Vec3 {
        self.original_positions[index]
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Baseline hues, present only for the per-particle hue mode.
    pub fn initial_hues(&self) -> Option<&[f32]> {
        self.initial_hues.as_deref()
    }

    #[inline]
    pub fn set_position(&mut self, index: usize, position: Vec3) {
        self.positions[index] = position;
    }

    #[inline]
    pub fn set_color(&mut self, index: usize, color: Vec3) {
        self.colors[index] = color;
    }

    /// Place particle `index` at its base position times `local_scale`.
    #[inline]
    pub fn set_local_scale(&mut self, index: usize, local_scale: f32) {
        self.positions[index] = self.original_positions[index] * local_scale;
    }

    /// Restore every particle to its undeformed position.
    pub fn reset_positions(&mut self) {
        self.positions.copy_from_slice(&self.original_positions);
    }

    /// Flag attributes for re-upload. Flags accumulate until taken.
    pub fn mark_dirty(&mut self, attributes: DirtyAttributes) {
        self.dirty.merge(attributes);
    }

    pub fn dirty(&self) -> DirtyAttributes {
        self.dirty
    }

    /// Read and clear the dirty flags. Called by the renderer after upload.
    pub fn take_dirty(&mut self) -> DirtyAttributes {
        std::mem::take(&mut self.dirty)
    }

    /// Positions as tightly packed `f32` xyz triples.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Colors as tightly packed `f32` rgb triples.
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }
}
