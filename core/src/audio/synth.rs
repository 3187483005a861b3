//! Synthetic audio for tests, benches and demos.
//!
//! Bass-heavy signals are what drive the visualizer, so the generators here
//! focus on low-frequency tones and kick drums.

use std::f32::consts::PI;

/// Generate a sine wave.
///
/// # Arguments
/// * `frequency` - Frequency in Hz
/// * `sample_rate` - Sample rate in Hz
/// * `duration` - Duration in seconds
/// * `amplitude` - Amplitude (0.0 to 1.0)
pub fn generate_sine(frequency: f32, sample_rate: u32, duration: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (duration * sample_rate as f32) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * PI * frequency * t).sin()
        })
        .collect()
}

/// Generate a single kick drum hit (pitch drops 150 Hz → 50 Hz over ~150ms).
pub fn generate_kick(sample_rate: u32) -> Vec<f32> {
    let num_samples = (0.15 * sample_rate as f32) as usize;

    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let freq = 50.0 + 100.0 * (-t * 30.0).exp();
            let amp = (-t * 15.0).exp();
            amp * (2.0 * PI * freq * t).sin()
        })
        .collect()
}

/// Kick on every beat, silence in between.
pub fn generate_kick_pattern(bpm: f32, sample_rate: u32, duration: f32) -> Vec<f32> {
    let num_samples = (duration * sample_rate as f32) as usize;
    let samples_per_beat = ((60.0 / bpm * sample_rate as f32) as usize).max(1);
    let kick = generate_kick(sample_rate);

    let mut samples = vec![0.0; num_samples];
    for start in (0..num_samples).step_by(samples_per_beat) {
        for (slot, &k) in samples[start..].iter_mut().zip(&kick) {
            *slot += k * 0.9;
        }
    }
    samples
}

/// Silence followed by a bass tone, useful for idle → active transitions.
pub fn generate_late_bass(
    silence: f32,
    tone: f32,
    frequency: f32,
    sample_rate: u32,
) -> Vec<f32> {
    let mut samples = vec![0.0; (silence * sample_rate as f32) as usize];
    samples.extend(generate_sine(frequency, sample_rate, tone, 0.9));
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sine() {
        let samples = generate_sine(440.0, 44100, 1.0, 0.5);
        assert_eq!(samples.len(), 44100);

        let max = samples.iter().cloned().fold(0.0f32, f32::max);
        assert!((max - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_generate_kick_decays() {
        let kick = generate_kick(44100);
        assert!(!kick.is_empty());

        let peak_max = kick[..kick.len() / 10].iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        let late_max = kick[kick.len() / 2..].iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        assert!(peak_max > late_max, "Kick should decay over time");
    }

    #[test]
    fn test_kick_pattern() {
        let samples = generate_kick_pattern(120.0, 44100, 2.0);
        assert_eq!(samples.len(), 88200);
        assert!(samples.iter().all(|s| s.abs() <= 1.0));

        // Gap between kicks is silent
        let gap = &samples[(0.3 * 44100.0) as usize..(0.45 * 44100.0) as usize];
        assert!(gap.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_late_bass() {
        let samples = generate_late_bass(0.5, 0.5, 60.0, 1000);
        assert_eq!(samples.len(), 1000);
        assert!(samples[..500].iter().all(|&s| s == 0.0));
        assert!(samples[500..].iter().any(|&s| s != 0.0));
    }
}
