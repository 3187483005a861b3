//! Spherebeat visualizer core
//!
//! Audio-reactive particle sphere engine. Each display frame the engine reads
//! a byte spectrum, reduces it to a bass level and maps that level onto the
//! rotation, scale, shape and color of a unit-sphere point cloud.
//!
//! # Features
//!
//! - Uniform unit-sphere particle fields with dirty-flagged render buffers
//! - Idle (breathing) and active (bass-driven) animation regimes
//! - Native byte-spectrum analyser via RustFFT
//! - Track decoding (WAV, MP3, FLAC, AAC) via Symphonia
//! - Serializable configuration and playback session state
//! - Headless simulation of a whole track
//!
//! # Example
//!
//! ```
//! use spherebeat::audio::StaticSpectrum;
//! use spherebeat::{Visualizer, VisualizerConfig};
//!
//! let mut visualizer = Visualizer::mount(VisualizerConfig::compact().with_seed(1)).unwrap();
//! let mut spectrum = StaticSpectrum::new(vec![200; 128]);
//!
//! let report = visualizer.tick(0.0, Some(&mut spectrum));
//! assert!(report.regime.is_active());
//!
//! let frame = visualizer.frame();
//! assert_eq!(frame.positions.len(), 2000);
//! ```

pub mod audio;
pub mod color;
pub mod config;
pub mod driver;
pub mod features;
pub mod field;
pub mod pipeline;
pub mod session;
pub mod visualizer;

// Re-export commonly used types
pub use audio::{AnalyserConfig, AnalyserNode, SpectrumSource, TrackSource};
pub use config::{ActiveParams, ConfigError, HueMode, IdleParams, Palette, VisualizerConfig};
pub use driver::{AnimationDriver, FrameReport, Regime, Rotation};
pub use features::{extract_bass_energy, BassExtractor};
pub use field::{DirtyAttributes, FieldError, ParticleField};
pub use pipeline::{simulate_samples, simulate_track, PipelineError, SimulationConfig, SimulationSummary};
pub use session::{SessionEvent, SessionState, TrackEntry};
pub use visualizer::{FrameView, Visualizer};
