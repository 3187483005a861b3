//! Offline pipeline: run the whole engine over a track without a display.
//!
//! Steps a [`TrackSource`] at a fixed frame rate, drives a [`Visualizer`]
//! with it and records one [`FrameReport`] per frame.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audio::{decode_track, AnalyserConfig, AnalyserError, DecodedTrack, TrackError, TrackSource};
use crate::config::{ConfigError, VisualizerConfig};
use crate::driver::FrameReport;
use crate::visualizer::Visualizer;

/// Configuration for an offline run.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub fps: u32,
    pub analyser: AnalyserConfig,
    pub visualizer: VisualizerConfig,
    /// Idle frames rendered after the track ends.
    pub tail_frames: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            analyser: AnalyserConfig::default(),
            visualizer: VisualizerConfig::compact().with_seed(0),
            tail_frames: 0,
        }
    }
}

/// Errors that can occur during an offline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Track error: {0}")]
    Track(#[from] TrackError),
    #[error("Analyser error: {0}")]
    Analyser(#[from] AnalyserError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Frame rate must be at least 1")]
    InvalidFrameRate,
}

/// Result of an offline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub track: String,
    pub duration: f64,
    pub fps: u32,
    pub frames: Vec<FrameReport>,
}

impl SimulationSummary {
    /// Highest bass level seen in any frame.
    pub fn peak_bass(&self) -> f32 {
        self.frames
            .iter()
            .map(|f| f.regime.bass())
            .fold(0.0f32, f32::max)
    }

    /// Fraction of active frames that took the spike path.
    pub fn spike_ratio(&self) -> f32 {
        let active = self.frames.iter().filter(|f| f.regime.is_active()).count();
        if active == 0 {
            return 0.0;
        }
        let spiking = self.frames.iter().filter(|f| f.spikes > 0).count();
        spiking as f32 / active as f32
    }
}

/// Run the engine over already decoded mono samples.
pub fn simulate_samples(
    track: DecodedTrack,
    config: &SimulationConfig,
    progress_callback: Option<&dyn Fn(f32)>,
) -> Result<SimulationSummary, PipelineError> {
    if config.fps == 0 {
        return Err(PipelineError::InvalidFrameRate);
    }

    let mut visualizer = Visualizer::mount(config.visualizer.clone())?;
    let name = track.name.clone();
    let duration = track.duration();
    let mut source = TrackSource::new(track, config.analyser.clone())?;

    let track_frames = (duration * config.fps as f64).ceil() as usize;
    let total_frames = track_frames + config.tail_frames;
    let mut frames = Vec::with_capacity(total_frames);

    log::info!(
        "Simulating '{}': {:.2}s at {} fps ({} frames)",
        name,
        duration,
        config.fps,
        total_frames
    );

    for frame_idx in 0..total_frames {
        let time = frame_idx as f64 / config.fps as f64;
        let report = if frame_idx < track_frames {
            source.seek(time);
            visualizer.tick(time as f32, Some(&mut source))
        } else {
            visualizer.tick(time as f32, None)
        };
        visualizer.take_dirty();
        frames.push(report);

        if let Some(callback) = progress_callback {
            callback((frame_idx + 1) as f32 / total_frames as f32);
        }
    }

    log::info!("Simulation of '{}' finished", name);

    Ok(SimulationSummary {
        track: name,
        duration,
        fps: config.fps,
        frames,
    })
}

/// Decode a track from disk and run the engine over it.
pub fn simulate_track<P: AsRef<Path>>(
    path: P,
    config: &SimulationConfig,
    progress_callback: Option<&dyn Fn(f32)>,
) -> Result<SimulationSummary, PipelineError> {
    let track = decode_track(path.as_ref())?;
    simulate_samples(track, config, progress_callback)
}
