use std::f32::consts::PI;

use ndarray::Array2;

pub(crate) fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

pub(crate) fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filterbank of shape `(filters, fft_size / 2 + 1)`.
///
/// Filter centres are evenly spaced on the mel scale between 0 Hz and
/// Nyquist. Weights are evaluated at each bin's exact frequency so narrow
/// low-frequency filters never collapse onto a single bin edge.
pub(crate) fn mel_filterbank(filters: usize, fft_size: usize, sample_rate: u32) -> Array2<f32> {
    let bins = fft_size / 2 + 1;
    let mut bank = Array2::zeros((filters, bins));
    if filters == 0 || fft_size == 0 {
        return bank;
    }
    let nyquist = sample_rate as f32 / 2.0;
    let max_mel = hz_to_mel(nyquist);
    let edges: Vec<f32> = (0..filters + 2)
        .map(|idx| mel_to_hz(max_mel * idx as f32 / (filters + 1) as f32))
        .collect();
    let bin_hz = sample_rate as f32 / fft_size as f32;

    for (filter, mut row) in bank.outer_iter_mut().enumerate() {
        let (lower, centre, upper) = (edges[filter], edges[filter + 1], edges[filter + 2]);
        for (bin, weight) in row.iter_mut().enumerate() {
            let freq = bin as f32 * bin_hz;
            *weight = if freq > lower && freq <= centre {
                (freq - lower) / (centre - lower)
            } else if freq > centre && freq < upper {
                (upper - freq) / (upper - centre)
            } else {
                0.0
            };
        }
    }
    bank
}

/// Orthonormal DCT-II basis of shape `(coefficients, filters)`.
pub(crate) fn dct_matrix(coefficients: usize, filters: usize) -> Array2<f32> {
    let mut basis = Array2::zeros((coefficients, filters));
    if filters == 0 {
        return basis;
    }
    let n = filters as f32;
    for ((k, idx), value) in basis.indexed_iter_mut() {
        let scale = if k == 0 {
            (1.0 / n).sqrt()
        } else {
            (2.0 / n).sqrt()
        };
        *value = scale * (PI * k as f32 * (idx as f32 + 0.5) / n).cos();
    }
    basis
}
