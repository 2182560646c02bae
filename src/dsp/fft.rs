//! Iterative radix-2 Cooley-Tukey transform.
//!
//! Operates on a whole buffer at a time: the input is zero-padded to the next
//! power of two, bit-reverse permuted, then combined with butterfly stages of
//! size 2, 4, 8, ... up to the padded length.

use std::f32::consts::PI;

use num_complex::Complex32;

/// Smallest power of two that is `>= len` (1 for an empty input).
pub fn padded_len(len: usize) -> usize {
    len.max(1).next_power_of_two()
}

/// Forward transform of a real signal.
///
/// The returned spectrum has `padded_len(signal.len())` bins. An empty signal
/// produces an empty spectrum.
pub fn fft(signal: &[f32]) -> Vec<Complex32> {
    if signal.is_empty() {
        return Vec::new();
    }
    let size = padded_len(signal.len());
    let mut buffer: Vec<Complex32> = signal.iter().map(|&s| Complex32::new(s, 0.0)).collect();
    buffer.resize(size, Complex32::new(0.0, 0.0));
    transform(&mut buffer, false);
    buffer
}

/// Inverse transform, scaled by `1/M`, keeping only the real part.
pub fn ifft(spectrum: &[Complex32]) -> Vec<f32> {
    if spectrum.is_empty() {
        return Vec::new();
    }
    let size = padded_len(spectrum.len());
    let mut buffer = spectrum.to_vec();
    buffer.resize(size, Complex32::new(0.0, 0.0));
    transform(&mut buffer, true);
    let scale = 1.0 / size as f32;
    buffer.iter().map(|value| value.re * scale).collect()
}

/// Power spectrum `|X[k]|^2` for the non-negative frequency bins `0..=M/2`.
pub fn power_spectrum(signal: &[f32]) -> Vec<f32> {
    let spectrum = fft(signal);
    let bins = spectrum.len() / 2 + 1;
    spectrum.iter().take(bins).map(|bin| bin.norm_sqr()).collect()
}

/// In-place transform of a buffer whose length is a power of two.
fn transform(buffer: &mut [Complex32], inverse: bool) {
    let n = buffer.len();
    if n <= 1 {
        return;
    }
    bit_reverse(buffer);

    let sign = if inverse { 1.0 } else { -1.0 };
    let mut size = 2;
    while size <= n {
        let half = size / 2;
        let step = Complex32::from_polar(1.0, sign * 2.0 * PI / size as f32);
        for start in (0..n).step_by(size) {
            let mut twiddle = Complex32::new(1.0, 0.0);
            for offset in 0..half {
                let even = buffer[start + offset];
                let odd = buffer[start + offset + half] * twiddle;
                buffer[start + offset] = even + odd;
                buffer[start + offset + half] = even - odd;
                twiddle *= step;
            }
        }
        size *= 2;
    }
}

fn bit_reverse(buffer: &mut [Complex32]) {
    let n = buffer.len();
    let mut j = 0;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
        if i < j {
            buffer.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_has_flat_spectrum() {
        let spectrum = fft(&[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(spectrum.len(), 4);
        for bin in spectrum {
            assert!((bin.re - 1.0).abs() < 1e-6);
            assert!(bin.im.abs() < 1e-6);
        }
    }

    #[test]
    fn pads_to_next_power_of_two() {
        assert_eq!(fft(&[0.5; 5]).len(), 8);
        assert_eq!(padded_len(0), 1);
        assert_eq!(padded_len(512), 512);
        assert!(fft(&[]).is_empty());
    }

    #[test]
    fn sine_peaks_in_expected_bin() {
        let n = 64;
        let signal: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * 4.0 * i as f32 / n as f32).sin())
            .collect();
        let power = power_spectrum(&signal);
        let peak = power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| idx);
        assert_eq!(peak, Some(4));
    }
}
