//! Track decoding using Symphonia.
//!
//! Decodes WAV, MP3, FLAC and AAC files straight to mono `f32` samples,
//! which is all the spectrum analyser consumes.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use thiserror::Error;

/// Errors that can occur while decoding a track.
#[derive(Error, Debug)]
pub enum TrackError {
    #[error("Failed to open track: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode track: {0}")]
    Decode(#[from] SymphoniaError),

    #[error("No audio stream found in file")]
    NoAudioStream,

    #[error("Unknown sample rate")]
    UnknownSampleRate,
}

/// A fully decoded mono track.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTrack {
    /// Display name, taken from the file stem.
    pub name: String,
    /// Mono samples in `-1.0..=1.0`.
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedTrack {
    pub fn from_samples(name: impl Into<String>, samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            name: name.into(),
            samples,
            sample_rate,
        }
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Average interleaved frames down to one channel.
pub fn downmix(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}

/// Decode a track from a file path.
///
/// ```no_run
/// use spherebeat::audio::decode_track;
/// use std::path::Path;
///
/// let track = decode_track(Path::new("song.mp3")).unwrap();
/// println!("{}: {:.2}s", track.name, track.duration());
/// ```
pub fn decode_track(path: &Path) -> Result<DecodedTrack, TrackError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(TrackError::NoAudioStream)?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(TrackError::UnknownSampleRate)?;

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::debug!("Skipping undecodable packet: {}", msg);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let channels = decoded.spec().channels.count();
        let buf = sample_buf.get_or_insert_with(|| {
            SampleBuffer::new(decoded.capacity() as u64, *decoded.spec())
        });
        buf.copy_interleaved_ref(decoded);
        downmix(buf.samples(), channels, &mut samples);
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string();

    log::info!(
        "Decoded '{}': {} samples at {} Hz",
        name,
        samples.len(),
        sample_rate
    );

    Ok(DecodedTrack {
        name,
        samples,
        sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_duration() {
        let track = DecodedTrack::from_samples("t", vec![0.0; 22050], 44100);
        assert!((track.duration() - 0.5).abs() < 1e-9);

        let broken = DecodedTrack::from_samples("t", vec![0.0; 10], 0);
        assert_eq!(broken.duration(), 0.0);
    }

    #[test]
    fn test_downmix_stereo() {
        let mut mono = Vec::new();
        downmix(&[0.5, -0.5, 1.0, 0.0], 2, &mut mono);
        assert_eq!(mono, vec![0.0, 0.5]);
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        let mut mono = vec![0.25];
        downmix(&[0.1, 0.2], 1, &mut mono);
        assert_eq!(mono, vec![0.25, 0.1, 0.2]);
    }

    #[test]
    fn test_missing_file() {
        let result = decode_track(Path::new("/definitely/not/here.wav"));
        assert!(matches!(result, Err(TrackError::Io(_))));
    }
}
