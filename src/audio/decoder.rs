use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::audio::resample;
use crate::pronunciation::PronunciationError;
use crate::types::{AudioData, TARGET_SAMPLE_RATE};

/// Decode a WAV byte buffer into mono samples at the analysis rate.
///
/// Accepts 8/16/24/32-bit integer PCM and 32-bit float. Channels are averaged
/// down to mono and the result is linearly resampled to 16 kHz. Buffers that
/// do not start with the `RIFF`/`WAVE` magic are rejected with a format error.
pub fn decode_wav(bytes: &[u8]) -> crate::pronunciation::Result<AudioData> {
    if !has_wav_magic(bytes) {
        return Err(PronunciationError::format(
            "missing RIFF/WAVE header in audio buffer",
        ));
    }
    let mut reader = WavReader::new(Cursor::new(bytes))
        .map_err(|err| PronunciationError::format(format!("unreadable WAV header: {err}")))?;
    let spec = reader.spec();
    if spec.channels == 0 || spec.sample_rate == 0 {
        return Err(PronunciationError::format(
            "WAV header declares zero channels or sample rate",
        ));
    }

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|err| PronunciationError::format(format!("corrupt WAV data: {err}")))?,
        (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
            let scale = 1.0 / (1_i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|s| s as f32 * scale))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|err| PronunciationError::format(format!("corrupt WAV data: {err}")))?
        }
        (format, bits) => {
            return Err(PronunciationError::format(format!(
                "unsupported WAV sample format {format:?} at {bits} bits"
            )))
        }
    };

    let mono = mix_to_mono(&interleaved, spec.channels as usize);
    debug!(
        channels = spec.channels,
        bits = spec.bits_per_sample,
        sample_rate = spec.sample_rate,
        frames = mono.len(),
        "decoded WAV buffer"
    );
    to_target_rate(mono, spec.sample_rate)
        .map_err(|err| PronunciationError::format(err.to_string()))
}

/// Decode an audio file from disk.
///
/// WAV files go through [`decode_wav`]; anything else is probed with
/// symphonia (MP3, OGG, FLAC, ...).
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<AudioData> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
    if has_wav_magic(&bytes) {
        return decode_wav(&bytes)
            .with_context(|| format!("Failed to decode WAV file: {}", path.display()));
    }
    decode_container(bytes, path.extension().and_then(|e| e.to_str()))
}

pub fn has_wav_magic(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

fn decode_container(bytes: Vec<u8>, extension: Option<&str>) -> Result<AudioData> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = extension {
        hint.with_extension(extension);
    }

    let probe_result = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Failed to probe audio format")?;
    let mut format = probe_result.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio tracks found in file")?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Sample rate not specified in audio file")?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder")?;

    let mut mono = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => return Err(err).context("Failed to read packet"),
        };
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = decoder
            .decode(&packet)
            .context("Failed to decode audio packet")?;
        let channels = decoded.spec().channels.count();
        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        buffer.copy_interleaved_ref(decoded);
        mono.extend(mix_to_mono(buffer.samples(), channels));
    }

    to_target_rate(mono, sample_rate)
}

fn mix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn to_target_rate(samples: Vec<f32>, sample_rate: u32) -> Result<AudioData> {
    let resampled = resample::linear_resample(&samples, sample_rate, TARGET_SAMPLE_RATE)
        .with_context(|| {
            format!(
                "failed to resample audio from {} Hz to {} Hz",
                sample_rate, TARGET_SAMPLE_RATE
            )
        })?;
    Ok(AudioData::from_samples(resampled, TARGET_SAMPLE_RATE))
}
