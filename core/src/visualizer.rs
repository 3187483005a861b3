//! Visualizer controller.
//!
//! Owns the particle field, the animation driver and the per-frame spectrum
//! buffer. The render loop host calls [`Visualizer::tick`] once per display
//! frame and then reads [`Visualizer::frame`].

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::audio::SpectrumSource;
use crate::config::{ConfigError, VisualizerConfig};
use crate::driver::{AnimationDriver, FrameReport, Regime, Rotation};
use crate::features::BassExtractor;
use crate::field::{DirtyAttributes, FieldError, ParticleField};

/// Read-only view of the render-facing state after a tick.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub rotation: Rotation,
    pub scale: Vec3,
    pub positions: &'a [Vec3],
    pub colors: &'a [Vec3],
    pub dirty: DirtyAttributes,
}

impl FrameView<'_> {
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.positions)
    }

    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.colors)
    }
}

/// A mounted visualizer instance.
#[derive(Debug)]
pub struct Visualizer {
    config: VisualizerConfig,
    field: ParticleField,
    driver: AnimationDriver<SmallRng>,
    extractor: BassExtractor,
    spectrum: Vec<u8>,
}

fn seeded_rng(seed: Option<u64>, stream: u64) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(stream)),
        None => SmallRng::from_entropy(),
    }
}

impl Visualizer {
    /// Validate `config` and build the field and driver.
    ///
    /// Geometry and flutter draw from separate generators so that the same
    /// seed gives the same sphere regardless of how many frames ran.
    pub fn mount(config: VisualizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let field = Self::build_field(&config)?;
        let driver = AnimationDriver::new(config.clone(), seeded_rng(config.seed, 1));

        log::info!(
            "Mounted visualizer: {} particles, {} spectrum bins, bass range {}",
            config.particle_count,
            config.spectrum_len,
            config.bass_range
        );

        Ok(Self {
            extractor: BassExtractor::new(config.bass_range),
            spectrum: vec![0; config.spectrum_len],
            field,
            driver,
            config,
        })
    }

    fn build_field(config: &VisualizerConfig) -> Result<ParticleField, FieldError> {
        let mut rng = seeded_rng(config.seed, 0);
        ParticleField::new(config.particle_count as usize, &config.palette, &mut rng)
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn particle_count(&self) -> usize {
        self.field.len()
    }

    /// Apply a new configuration.
    ///
    /// The field is regenerated only when the particle count or palette
    /// changed; otherwise geometry, rotation and scale carry over.
    pub fn reconfigure(&mut self, config: VisualizerConfig) -> Result<(), ConfigError> {
        config.validate()?;

        let rebuild = config.particle_count != self.config.particle_count
            || config.palette != self.config.palette
            || config.seed != self.config.seed;
        if rebuild {
            self.field = Self::build_field(&config)?;
            log::info!("Rebuilt particle field with {} particles", self.field.len());
        }

        self.extractor = BassExtractor::new(config.bass_range);
        self.spectrum.resize(config.spectrum_len, 0);
        self.driver.set_config(config.clone());
        self.config = config;
        Ok(())
    }

    /// Drive one frame.
    ///
    /// `source` is `None` whenever no audio is live (nothing loaded, or
    /// paused); that selects the idle regime. A live source is sampled fresh
    /// on every call.
    pub fn tick(&mut self, t: f32, source: Option<&mut dyn SpectrumSource>) -> FrameReport {
        let bass = source.map(|source| {
            if source.bin_count() < self.spectrum.len() {
                log::debug!(
                    "Spectrum source has {} bins, expected {}; missing bins read as zero",
                    source.bin_count(),
                    self.spectrum.len()
                );
            }
            source.sample(&mut self.spectrum);
            self.extractor.extract(&self.spectrum)
        });
        self.tick_with_bass(t, bass)
    }

    /// Drive one frame from an already extracted bass level.
    pub fn tick_with_bass(&mut self, t: f32, bass: Option<f32>) -> FrameReport {
        self.driver.tick(t, Regime::from_bass(bass), &mut self.field)
    }

    /// The most recent spectrum snapshot (all zero before the first live frame).
    pub fn spectrum(&self) -> &[u8] {
        &self.spectrum
    }

    pub fn frame(&self) -> FrameView<'_> {
        FrameView {
            rotation: self.driver.rotation(),
            scale: self.driver.scale(),
            positions: self.field.positions(),
            colors: self.field.colors(),
            dirty: self.field.dirty(),
        }
    }

    /// Hand the dirty flags to the renderer, clearing them.
    pub fn take_dirty(&mut self) -> DirtyAttributes {
        self.field.take_dirty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::StaticSpectrum;

    fn config() -> VisualizerConfig {
        VisualizerConfig::compact()
            .with_particle_count(200)
            .with_seed(42)
    }

    #[test]
    fn test_mount_rejects_empty_field() {
        let result = Visualizer::mount(config().with_particle_count(0));
        assert!(matches!(result, Err(ConfigError::EmptyField)));
    }

    #[test]
    fn test_tick_without_source_is_idle() {
        let mut vis = Visualizer::mount(config()).unwrap();
        let report = vis.tick(1.0, None);
        assert_eq!(report.regime, Regime::Idle);
    }

    #[test]
    fn test_tick_samples_source() {
        let mut vis = Visualizer::mount(config()).unwrap();
        let mut source = StaticSpectrum::new(vec![255; 128]);
        let report = vis.tick(1.0, Some(&mut source));
        assert_eq!(report.regime, Regime::Active { bass: 1.0 });
        assert!(vis.spectrum().iter().all(|&b| b == 255));
    }

    #[test]
    fn test_short_source_reads_as_quieter() {
        let mut vis = Visualizer::mount(config()).unwrap();
        let mut source = StaticSpectrum::new(vec![255; 10]);
        let report = vis.tick(1.0, Some(&mut source));
        assert_eq!(report.regime, Regime::Active { bass: 0.5 });
    }

    #[test]
    fn test_same_seed_same_geometry() {
        let a = Visualizer::mount(config()).unwrap();
        let b = Visualizer::mount(config()).unwrap();
        assert_eq!(a.field().original_positions(), b.field().original_positions());
    }

    #[test]
    fn test_reconfigure_keeps_field_when_count_unchanged() {
        let mut vis = Visualizer::mount(config()).unwrap();
        let before = vis.field().original_positions().to_vec();

        let mut tuned = config();
        tuned.active.spike_threshold = 0.5;
        vis.reconfigure(tuned).unwrap();
        assert_eq!(vis.field().original_positions(), &before[..]);

        vis.reconfigure(config().with_particle_count(300)).unwrap();
        assert_eq!(vis.particle_count(), 300);
    }

    #[test]
    fn test_reconfigure_rejects_invalid() {
        let mut vis = Visualizer::mount(config()).unwrap();
        assert!(vis.reconfigure(config().with_particle_count(0)).is_err());
        assert_eq!(vis.particle_count(), 200);
    }

    #[test]
    fn test_frame_view_bytes() {
        let mut vis = Visualizer::mount(config()).unwrap();
        vis.tick(0.0, None);
        let frame = vis.frame();
        assert_eq!(frame.positions.len(), 200);
        assert_eq!(frame.position_bytes().len(), 200 * 12);
        assert!(frame.dirty.colors);

        assert!(vis.take_dirty().any());
        assert!(!vis.frame().dirty.any());
    }
}
