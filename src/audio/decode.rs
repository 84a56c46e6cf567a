// Decode module - encoded audio to mono f32 samples
//
// RIFF/WAVE input goes through hound. Anything else (and WAV layouts hound
// rejects) is probed by symphonia. Multichannel audio is averaged to mono
// and the native sample rate is kept.

use std::io::Cursor;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::analysis::Signal;
use crate::error::{AnalysisError, DecodeError};

/// Mono PCM decoded from a file or upload
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Channel count of the source before downmixing
    pub source_channels: u16,
}

impl DecodedAudio {
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Convert into an analysis signal.
    pub fn to_signal(&self) -> Result<Signal, AnalysisError> {
        Signal::from_f32(&self.samples, self.sample_rate)
    }
}

/// Decode a file from disk, using its extension as a format hint.
pub fn decode_file(path: &Path) -> Result<DecodedAudio, DecodeError> {
    let bytes = std::fs::read(path)?;
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    log::debug!("[Decode] {} ({} bytes)", path.display(), bytes.len());
    decode_bytes(&bytes, name)
}

/// Decode an in-memory upload.
///
/// `name_hint` is the original file name; only its extension is used.
pub fn decode_bytes(bytes: &[u8], name_hint: &str) -> Result<DecodedAudio, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let decoded = if is_riff_wave(bytes) {
        match decode_wav(bytes) {
            Err(DecodeError::Unsupported { reason }) => {
                log::debug!("[Decode] hound rejected WAV ({}), probing with symphonia", reason);
                decode_with_symphonia(bytes.to_vec(), name_hint)?
            }
            other => other?,
        }
    } else {
        decode_with_symphonia(bytes.to_vec(), name_hint)?
    };

    if decoded.samples.is_empty() {
        return Err(DecodeError::Empty);
    }
    if decoded.sample_rate == 0 {
        return Err(DecodeError::Malformed {
            reason: "sample rate is zero".to_string(),
        });
    }

    log::info!(
        "[Decode] {}: {} samples @ {} Hz ({} ch -> mono)",
        name_hint,
        decoded.samples.len(),
        decoded.sample_rate,
        decoded.source_channels
    );
    Ok(decoded)
}

fn is_riff_wave(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio, DecodeError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    let interleaved = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()?,
        hound::SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(DecodeError::Unsupported {
                    reason: format!("{} bits per sample", spec.bits_per_sample),
                });
            }
            let scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 / scale))
                .collect::<Result<Vec<f32>, _>>()?
        }
    };

    Ok(DecodedAudio {
        samples: downmix(&interleaved, usize::from(spec.channels)),
        sample_rate: spec.sample_rate,
        source_channels: spec.channels,
    })
}

fn decode_with_symphonia(bytes: Vec<u8>, name_hint: &str) -> Result<DecodedAudio, DecodeError> {
    let mut hint = Hint::new();
    if let Some(ext) = Path::new(name_hint).extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let stream = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());
    let probed = symphonia::default::get_probe().format(
        &hint,
        stream,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| DecodeError::Unsupported {
            reason: "no decodable audio track".to_string(),
        })?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut source_channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(0);
    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(err.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(buffer) => {
                let spec = *buffer.spec();
                let channels = spec.channels.count();
                sample_rate = spec.rate;
                source_channels = channels as u16;

                let mut interleaved = SampleBuffer::<f32>::new(buffer.capacity() as u64, spec);
                interleaved.copy_interleaved_ref(buffer);
                samples.extend(downmix(interleaved.samples(), channels));
            }
            // Corrupt frames are skipped, matching common player behavior
            Err(SymphoniaError::DecodeError(msg)) => {
                log::warn!("[Decode] skipping corrupt packet: {}", msg);
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
        source_channels,
    })
}

/// Average interleaved frames down to one channel.
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
