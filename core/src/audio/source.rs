//! Pull-based spectrum sources.
//!
//! A spectrum source is sampled once per frame and must never block or fail.
//! "No live audio" is not a source state: callers pass `None` instead.

use super::analyser::{AnalyserConfig, AnalyserError, AnalyserNode};
use super::loader::DecodedTrack;

/// Anything that can produce a byte-magnitude spectrum snapshot on demand.
pub trait SpectrumSource {
    /// Number of frequency bins this source produces.
    fn bin_count(&self) -> usize;

    /// Write the most recent snapshot into `out`.
    ///
    /// Writes `min(out.len(), bin_count())` bins and zeroes the rest. When no
    /// audio is flowing the snapshot is all zero. Never panics on a length
    /// mismatch.
    fn sample(&mut self, out: &mut [u8]);
}

impl<S: SpectrumSource + ?Sized> SpectrumSource for &mut S {
    fn bin_count(&self) -> usize {
        (**self).bin_count()
    }

    fn sample(&mut self, out: &mut [u8]) {
        (**self).sample(out)
    }
}

impl<S: SpectrumSource + ?Sized> SpectrumSource for Box<S> {
    fn bin_count(&self) -> usize {
        (**self).bin_count()
    }

    fn sample(&mut self, out: &mut [u8]) {
        (**self).sample(out)
    }
}

/// A fixed snapshot, returned unchanged on every read.
///
/// Useful for driving the visualizer from precomputed data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticSpectrum {
    bins: Vec<u8>,
}

impl StaticSpectrum {
    pub fn new(bins: Vec<u8>) -> Self {
        Self { bins }
    }

    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    pub fn set_bins(&mut self, bins: &[u8]) {
        self.bins.clear();
        self.bins.extend_from_slice(bins);
    }
}

impl SpectrumSource for StaticSpectrum {
    fn bin_count(&self) -> usize {
        self.bins.len()
    }

    fn sample(&mut self, out: &mut [u8]) {
        let n = out.len().min(self.bins.len());
        out[..n].copy_from_slice(&self.bins[..n]);
        out[n..].fill(0);
    }
}

/// Spectrum of a decoded track at a movable playhead.
#[derive(Debug)]
pub struct TrackSource {
    track: DecodedTrack,
    analyser: AnalyserNode,
    position: usize,
}

impl TrackSource {
    pub fn new(track: DecodedTrack, config: AnalyserConfig) -> Result<Self, AnalyserError> {
        Ok(Self {
            analyser: AnalyserNode::new(config)?,
            track,
            position: 0,
        })
    }

    pub fn track(&self) -> &DecodedTrack {
        &self.track
    }

    pub fn analyser(&self) -> &AnalyserNode {
        &self.analyser
    }

    /// Current playhead in seconds.
    pub fn position(&self) -> f64 {
        self.position as f64 / self.track.sample_rate.max(1) as f64
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.track.samples.len()
    }

    /// Move the playhead and load the analysis window that ends there.
    ///
    /// Positions past the end clamp to the end; negative positions clamp to
    /// the start.
    pub fn seek(&mut self, seconds: f64) {
        let target = (seconds.max(0.0) * self.track.sample_rate as f64) as usize;
        self.position = target.min(self.track.samples.len());
        let start = self.position.saturating_sub(self.analyser.fft_size());
        self.analyser
            .load_window(&self.track.samples[start..self.position]);
    }
}

impl SpectrumSource for TrackSource {
    fn bin_count(&self) -> usize {
        self.analyser.frequency_bin_count()
    }

    fn sample(&mut self, out: &mut [u8]) {
        self.analyser.byte_frequency_data(out);
    }
}
