use serde::Serialize;

use crate::types::AudioData;

/// An interior silent run, in seconds from the start of the clip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pause {
    pub start: f32,
    pub end: f32,
}

impl Pause {
    pub fn duration(&self) -> f32 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PauseReport {
    pub pauses: Vec<Pause>,
}

impl PauseReport {
    pub fn count(&self) -> usize {
        self.pauses.len()
    }

    pub fn longest(&self) -> Option<f32> {
        self.pauses.iter().map(Pause::duration).reduce(f32::max)
    }
}

/// Detect unnatural pauses inside an utterance.
///
/// # Parameters
/// * `audio` - mono PCM data
/// * `window_ms` - RMS envelope window in milliseconds (e.g. 10.0)
/// * `relative_threshold` - fraction of the peak window RMS below which a window is silent
/// * `min_pause_ms` - silent runs must be strictly longer than this to count
///
/// Silence before the first and after the last loud window is leading or
/// trailing silence, not a pause, and is ignored.
pub fn detect_micro_pauses(
    audio: &AudioData,
    window_ms: f32,
    relative_threshold: f32,
    min_pause_ms: f32,
) -> PauseReport {
    if audio.is_empty() || audio.sample_rate == 0 {
        return PauseReport::default();
    }
    let sample_rate = audio.sample_rate as f32;
    let window_size = ((window_ms / 1000.0) * sample_rate).max(1.0) as usize;
    let envelope: Vec<f32> = audio.samples.chunks(window_size).map(window_rms).collect();

    let peak = envelope.iter().copied().fold(0.0_f32, f32::max);
    if peak <= 0.0 {
        return PauseReport::default();
    }
    let threshold = peak * relative_threshold;
    let loud: Vec<bool> = envelope.iter().map(|&rms| rms >= threshold).collect();
    let (first, last) = match (
        loud.iter().position(|&l| l),
        loud.iter().rposition(|&l| l),
    ) {
        (Some(first), Some(last)) => (first, last),
        _ => return PauseReport::default(),
    };

    let window_secs = window_size as f32 / sample_rate;
    let min_pause_secs = min_pause_ms / 1000.0;
    let mut pauses = Vec::new();
    let mut silence_start: Option<usize> = None;
    for (idx, &is_loud) in loud.iter().enumerate().take(last + 1).skip(first) {
        if !is_loud {
            silence_start.get_or_insert(idx);
        } else if let Some(start) = silence_start.take() {
            let length = (idx - start) as f32 * window_secs;
            if length > min_pause_secs {
                pauses.push(Pause {
                    start: start as f32 * window_secs,
                    end: idx as f32 * window_secs,
                });
            }
        }
    }

    PauseReport { pauses }
}

fn window_rms(window: &[f32]) -> f32 {
    if window.is_empty() {
        return 0.0;
    }
    let sum: f32 = window.iter().map(|sample| sample * sample).sum();
    (sum / window.len() as f32).sqrt()
}
