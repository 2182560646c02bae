use std::io::{Cursor, Seek, Write};
use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};

use crate::types::AudioData;

/// Encode AudioData as a 16-bit mono WAV byte buffer.
pub fn encode_wav(audio: &AudioData) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_samples(audio, &mut cursor)?;
    Ok(cursor.into_inner())
}

/// Encode AudioData to WAV format and write it to `path`.
pub fn write_wav<P: AsRef<Path>>(audio: &AudioData, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;
    write_samples(audio, std::io::BufWriter::new(file))
        .with_context(|| format!("Failed to write WAV file: {}", path.display()))
}

fn write_samples<W: Write + Seek>(audio: &AudioData, sink: W) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::new(sink, spec).context("Failed to start WAV stream")?;
    for &sample in audio.samples.iter() {
        let scaled = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        writer
            .write_sample(scaled)
            .context("Failed to write audio sample")?;
    }
    writer.finalize().context("Failed to finalize WAV stream")
}
