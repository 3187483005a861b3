//! Example: Drive the visualizer headlessly from synthetic audio.
//!
//! Generates a kick pattern, runs the engine over it at 60 fps and prints a
//! per-second summary plus the JSON of the last frame.
//!
//! Run with:
//!     RUST_LOG=info cargo run --example simulate_synthetic

use anyhow::Result;
use spherebeat::audio::synth::generate_kick_pattern;
use spherebeat::audio::DecodedTrack;
use spherebeat::{simulate_samples, SimulationConfig, VisualizerConfig};

fn main() -> Result<()> {
    env_logger::init();

    println!("Spherebeat - Synthetic Audio Example");
    println!("====================================\n");

    let sample_rate: u32 = 44100;
    let duration_secs: f32 = 4.0;
    let bpm: f32 = 120.0;

    println!("Generating synthetic kicks...");
    println!("  Sample rate: {} Hz", sample_rate);
    println!("  Duration: {} seconds", duration_secs);
    println!("  BPM: {}\n", bpm);

    let samples = generate_kick_pattern(bpm, sample_rate, duration_secs);
    let track = DecodedTrack::from_samples("synthetic kicks", samples, sample_rate);

    let config = SimulationConfig {
        visualizer: VisualizerConfig::compact().with_seed(2024),
        tail_frames: 60,
        ..SimulationConfig::default()
    };

    let summary = simulate_samples(track, &config, None)?;

    println!("Frames: {}", summary.frames.len());
    println!("Peak bass: {:.3}", summary.peak_bass());
    println!("Spike ratio: {:.1}%\n", summary.spike_ratio() * 100.0);

    for second in summary.frames.chunks(summary.fps as usize) {
        let peak = second.iter().map(|f| f.regime.bass()).fold(0.0f32, f32::max);
        let spiking = second.iter().filter(|f| f.spikes > 0).count();
        let last = &second[second.len() - 1];
        println!(
            "  t={:>5.2}s  {:<20}  peak bass {:.2}  spiking frames {:>2}  scale {:>6.1}",
            second[0].time,
            last.regime.to_string(),
            peak,
            spiking,
            last.scale.x
        );
    }

    if let Some(last) = summary.frames.last() {
        println!("\nLast frame:\n{}", serde_json::to_string_pretty(last)?);
    }

    Ok(())
}
