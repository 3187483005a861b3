//! Byte-magnitude spectrum analyser using RustFFT.
//!
//! Produces the same kind of snapshot as a browser `AnalyserNode`: a
//! Blackman-windowed FFT over the most recent `fft_size` samples, smoothed
//! across snapshots, converted to decibels and mapped onto `0..=255`.

use std::collections::VecDeque;
use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::source::SpectrumSource;

/// Smallest and largest supported FFT sizes.
pub const MIN_FFT_SIZE: usize = 32;
pub const MAX_FFT_SIZE: usize = 32768;

/// Error type for analyser construction.
#[derive(Debug, thiserror::Error)]
pub enum AnalyserError {
    #[error("FFT size must be a power of 2 between {MIN_FFT_SIZE} and {MAX_FFT_SIZE}, got {0}")]
    InvalidFftSize(usize),
    #[error("Decibel range is empty: min {min} >= max {max}")]
    InvalidDecibelRange { min: f32, max: f32 },
    #[error("Smoothing time constant must be in [0, 1], got {0}")]
    InvalidSmoothing(f32),
}

/// Analyser settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyserConfig {
    pub fft_size: usize,
    /// Weight of the previous snapshot when smoothing magnitudes.
    pub smoothing_time_constant: f32,
    /// Level mapped to byte 0.
    pub min_decibels: f32,
    /// Level mapped to byte 255.
    pub max_decibels: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 512,
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyserConfig {
    pub fn with_fft_size(mut self, fft_size: usize) -> Self {
        self.fft_size = fft_size;
        self
    }

    pub fn validate(&self) -> Result<(), AnalyserError> {
        if !self.fft_size.is_power_of_two()
            || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&self.fft_size)
        {
            return Err(AnalyserError::InvalidFftSize(self.fft_size));
        }
        if !(self.min_decibels < self.max_decibels) {
            return Err(AnalyserError::InvalidDecibelRange {
                min: self.min_decibels,
                max: self.max_decibels,
            });
        }
        if !(0.0..=1.0).contains(&self.smoothing_time_constant) {
            return Err(AnalyserError::InvalidSmoothing(
                self.smoothing_time_constant,
            ));
        }
        Ok(())
    }
}

/// Spectrum analyser over a sliding window of PCM samples.
pub struct AnalyserNode {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    /// Most recent `fft_size` samples, oldest first.
    history: VecDeque<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl std::fmt::Debug for AnalyserNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyserNode")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AnalyserNode {
    /// Create an analyser. The sample window starts silent.
    pub fn new(config: AnalyserConfig) -> Result<Self, AnalyserError> {
        config.validate()?;
        let fft_size = config.fft_size;

        // Blackman window
        let window: Vec<f32> = (0..fft_size)
            .map(|i| {
                let t = i as f32 / fft_size as f32;
                0.42 - 0.5 * (2.0 * PI * t).cos() + 0.08 * (4.0 * PI * t).cos()
            })
            .collect();

        let fft = FftPlanner::new().plan_fft_forward(fft_size);

        Ok(Self {
            fft,
            window,
            history: std::iter::repeat(0.0).take(fft_size).collect(),
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; fft_size / 2],
            config,
        })
    }

    pub fn with_fft_size(fft_size: usize) -> Result<Self, AnalyserError> {
        Self::new(AnalyserConfig::default().with_fft_size(fft_size))
    }

    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    pub fn fft_size(&self) -> usize {
        self.config.fft_size
    }

    /// Number of frequency bins (FFT size / 2).
    pub fn frequency_bin_count(&self) -> usize {
        self.config.fft_size / 2
    }

    /// Get the frequency in Hz for a given bin index.
    pub fn bin_to_freq(&self, bin: usize, sample_rate: u32) -> f32 {
        bin as f32 * sample_rate as f32 / self.config.fft_size as f32
    }

    /// Append PCM samples; only the last `fft_size` are kept.
    pub fn push_samples(&mut self, samples: &[f32]) {
        let fft_size = self.config.fft_size;
        let keep = &samples[samples.len().saturating_sub(fft_size)..];
        let overflow = (self.history.len() + keep.len()).saturating_sub(fft_size);
        self.history.drain(..overflow);
        self.history.extend(keep.iter().copied());
    }

    /// Replace the whole window, zero-padding at the front if `samples` is short.
    pub fn load_window(&mut self, samples: &[f32]) {
        let fft_size = self.config.fft_size;
        let keep = &samples[samples.len().saturating_sub(fft_size)..];
        self.history.clear();
        self.history
            .extend(std::iter::repeat(0.0).take(fft_size - keep.len()));
        self.history.extend(keep.iter().copied());
    }

    /// Forget both the sample window and the smoothing state.
    pub fn reset(&mut self) {
        self.history.iter_mut().for_each(|s| *s = 0.0);
        self.smoothed.iter_mut().for_each(|m| *m = 0.0);
    }

    /// Compute smoothed linear magnitudes for the current window.
    fn update_magnitudes(&mut self) {
        let fft_size = self.config.fft_size;

        for ((slot, &sample), &w) in self.buffer.iter_mut().zip(&self.history).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.buffer);

        let tau = self.config.smoothing_time_constant;
        let scale = 1.0 / fft_size as f32;
        for (smoothed, bin) in self.smoothed.iter_mut().zip(&self.buffer) {
            let magnitude = bin.norm() * scale;
            let next = tau * *smoothed + (1.0 - tau) * magnitude;
            *smoothed = if next.is_finite() { next } else { 0.0 };
        }
    }

    /// Fill `out` with byte magnitudes of the current window.
    ///
    /// Writes `min(out.len(), frequency_bin_count())` bins; any remaining
    /// entries of `out` are zeroed.
    pub fn byte_frequency_data(&mut self, out: &mut [u8]) {
        self.update_magnitudes();

        let min_db = self.config.min_decibels;
        let range = self.config.max_decibels - min_db;
        let bins = out.len().min(self.smoothed.len());

        for (byte, &magnitude) in out[..bins].iter_mut().zip(&self.smoothed) {
            let db = if magnitude > 0.0 {
                20.0 * magnitude.log10()
            } else {
                f32::NEG_INFINITY
            };
            let scaled = 255.0 * (db - min_db) / range;
            *byte = scaled.clamp(0.0, 255.0) as u8;
        }
        out[bins..].fill(0);
    }

    /// Smoothed magnitudes in decibels, without byte quantization.
    pub fn float_frequency_data(&mut self) -> Vec<f32> {
        self.update_magnitudes();
        self.smoothed
            .iter()
            .map(|&m| if m > 0.0 { 20.0 * m.log10() } else { f32::NEG_INFINITY })
            .collect()
    }
}

impl SpectrumSource for AnalyserNode {
    fn bin_count(&self) -> usize {
        self.frequency_bin_count()
    }

    fn sample(&mut self, out: &mut [u8]) {
        self.byte_frequency_data(out);
    }
}
