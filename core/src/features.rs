//! Perceptual features derived from a byte spectrum snapshot.
//!
//! Only one feature is used by the animation: the normalized average
//! magnitude of the lowest bins ("bass energy").

/// Number of low bins averaged into the bass feature by default.
pub const DEFAULT_BASS_RANGE: usize = 20;

/// Average of the first `bass_range` bins, normalized to `0.0..=1.0`.
///
/// Bins missing from a short spectrum contribute zero; the divisor is always
/// `bass_range` so a truncated snapshot reads as quieter, never louder.
/// Returns 0 for an empty range.
pub fn extract_bass_energy(spectrum: &[u8], bass_range: usize) -> f32 {
    if bass_range == 0 {
        return 0.0;
    }

    let sum: u32 = spectrum
        .iter()
        .take(bass_range)
        .map(|&bin| u32::from(bin))
        .sum();

    let average = sum as f32 / bass_range as f32;
    (average / 255.0).clamp(0.0, 1.0)
}

/// Bass feature extractor bound to a fixed bin window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BassExtractor {
    bass_range: usize,
}

impl Default for BassExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_BASS_RANGE)
    }
}

impl BassExtractor {
    pub fn new(bass_range: usize) -> Self {
        Self { bass_range }
    }

    pub fn bass_range(&self) -> usize {
        self.bass_range
    }

    /// Extract the bass feature from one snapshot.
    pub fn extract(&self, spectrum: &[u8]) -> f32 {
        extract_bass_energy(spectrum, self.bass_range)
    }

    /// Frequency in Hz of the upper edge of the bass window.
    pub fn cutoff_hz(&self, sample_rate: u32, fft_size: usize) -> f32 {
        if fft_size == 0 {
            return 0.0;
        }
        self.bass_range as f32 * sample_rate as f32 / fft_size as f32
    }
}
