//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::io::{BufWriter, Write};
use std::path::Path;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use spherebeat::{AnimationDriver, Palette, ParticleField, VisualizerConfig};

pub const SAMPLE_RATE: u32 = 44100;
pub const EPSILON: f32 = 1e-5;

/// Compact config with a fixed seed and the given particle count.
pub fn seeded_config(count: u32) -> VisualizerConfig {
    VisualizerConfig::compact()
        .with_particle_count(count)
        .with_seed(1234)
}

/// Field generated from a fixed seed.
pub fn seeded_field(count: usize, seed: u64) -> ParticleField {
    let mut rng = SmallRng::seed_from_u64(seed);
    ParticleField::new(count, &Palette::default(), &mut rng).expect("non-empty field")
}

/// Field generated with a given palette.
pub fn field_with_palette(count: usize, palette: &Palette, seed: u64) -> ParticleField {
    let mut rng = SmallRng::seed_from_u64(seed);
    ParticleField::new(count, palette, &mut rng).expect("non-empty field")
}

/// Driver with a seeded flutter generator.
pub fn seeded_driver(config: VisualizerConfig, seed: u64) -> AnimationDriver<SmallRng> {
    AnimationDriver::new(config, SmallRng::seed_from_u64(seed))
}

/// Local scale of every particle (|position| on a unit sphere).
pub fn local_scales(field: &ParticleField) -> Vec<f32> {
    field.positions().iter().map(|p| p.length()).collect()
}

/// Byte spectrum with the low `bins` set to `level` and the rest zero.
pub fn bass_spectrum(len: usize, bins: usize, level: u8) -> Vec<u8> {
    (0..len).map(|i| if i < bins { level } else { 0 }).collect()
}

/// Write mono samples as a 16-bit PCM WAV file.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> std::io::Result<()> {
    let mut file = BufWriter::new(std::fs::File::create(path)?);

    let data_size = samples.len() as u32 * 2;

    file.write_all(b"RIFF")?;
    file.write_all(&(36 + data_size).to_le_bytes())?;
    file.write_all(b"WAVE")?;

    file.write_all(b"fmt ")?;
    file.write_all(&16u32.to_le_bytes())?;
    file.write_all(&1u16.to_le_bytes())?; // PCM
    file.write_all(&1u16.to_le_bytes())?; // mono
    file.write_all(&sample_rate.to_le_bytes())?;
    file.write_all(&(sample_rate * 2).to_le_bytes())?;
    file.write_all(&2u16.to_le_bytes())?;
    file.write_all(&16u16.to_le_bytes())?;

    file.write_all(b"data")?;
    file.write_all(&data_size.to_le_bytes())?;
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        file.write_all(&value.to_le_bytes())?;
    }

    file.flush()
}
