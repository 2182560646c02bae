use ndarray::{Array1, Array2, Axis};

const EPSILON: f32 = 1e-12;

/// Regression deltas over `±window` frames, clamping indices at the edges.
pub(crate) fn compute_delta_matrix(input: &Array2<f32>, window: usize) -> Array2<f32> {
    let frames = input.len_of(Axis(0));
    let coeffs = input.len_of(Axis(1));
    let mut output = Array2::zeros((frames, coeffs));
    if frames == 0 || window == 0 {
        return output;
    }
    let denominator = 2.0_f32
        * (1..=window)
            .map(|n| (n * n) as f32)
            .sum::<f32>()
            .max(EPSILON);

    for t in 0..frames {
        let mut numerator = Array1::<f32>::zeros(coeffs);
        for n in 1..=window {
            let prev = input.row(t.saturating_sub(n));
            let next = input.row((t + n).min(frames - 1));
            numerator.scaled_add(n as f32, &(&next - &prev));
        }
        output.row_mut(t).assign(&(numerator / denominator));
    }

    output
}

/// Mean and population standard deviation; `(0, 0)` when empty.
pub(crate) fn mean_and_std(values: &[f32]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let count = values.len() as f32;
    let mean = values.iter().sum::<f32>() / count;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / count;
    (mean, variance.sqrt())
}
