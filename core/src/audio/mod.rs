//! Audio input side of the visualizer.
//!
//! This module provides:
//! - The `SpectrumSource` trait sampled once per frame
//! - A native byte-spectrum analyser via RustFFT
//! - Track decoding via Symphonia (WAV, MP3, FLAC, AAC)
//! - Synthetic test signals

pub mod analyser;
pub mod loader;
pub mod source;
pub mod synth;

pub use analyser::{AnalyserConfig, AnalyserError, AnalyserNode};
pub use loader::{decode_track, DecodedTrack, TrackError};
pub use source::{SpectrumSource, StaticSpectrum, TrackSource};
pub use synth::{generate_kick, generate_kick_pattern, generate_late_bass, generate_sine};
