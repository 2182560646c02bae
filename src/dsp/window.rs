use std::f32::consts::PI;

/// Periodic Hann window; overlapping copies at 50% hop sum to one.
pub fn hann(len: usize) -> Vec<f32> {
    (0..len)
        .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f32 / len.max(1) as f32).cos())
        .collect()
}

/// Symmetric Hamming window.
pub fn hamming(len: usize) -> Vec<f32> {
    if len == 1 {
        return vec![1.0];
    }
    let denom = len.saturating_sub(1).max(1) as f32;
    (0..len)
        .map(|n| 0.54 - 0.46 * (2.0 * PI * n as f32 / denom).cos())
        .collect()
}

/// Multiplies `frame` by `window` sample-wise, truncating to the shorter one.
pub fn apply(frame: &[f32], window: &[f32]) -> Vec<f32> {
    frame.iter().zip(window).map(|(s, w)| s * w).collect()
}
