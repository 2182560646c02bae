use std::ops::Range;

use serde::Serialize;
use tracing::trace;

use crate::pronunciation::features::MfccFeatures;

/// Extra cost for an insertion or deletion step.
pub const WARP_PENALTY: f32 = 2.0;
/// Sakoe-Chiba band width as a fraction of the longer sequence.
pub const BAND_FRACTION: f32 = 0.15;
/// Normalized distance units per similarity point.
pub const DISTANCE_SCALE: f32 = 4.0;

/// Alignment of a reference sequence (`i`) against a query sequence (`j`).
#[derive(Debug, Clone, Serialize)]
pub struct DtwResult {
    pub distance: f32,
    pub normalized_distance: f32,
    /// 0-100
    pub similarity: f32,
    /// Monotonic `(reference, query)` pairs from `(0, 0)` to `(n - 1, m - 1)`.
    pub path: Vec<(usize, usize)>,
}

impl DtwResult {
    fn unmatched() -> Self {
        Self {
            distance: f32::INFINITY,
            normalized_distance: f32::INFINITY,
            similarity: 0.0,
            path: Vec::new(),
        }
    }

    /// Query frames the path maps onto reference frames `reference`.
    pub fn query_range(&self, reference: &Range<usize>) -> Range<usize> {
        let mut matched = self
            .path
            .iter()
            .filter(|(i, _)| reference.contains(i))
            .map(|&(_, j)| j);
        match matched.next() {
            Some(first) => {
                let (lo, hi) = matched.fold((first, first), |(lo, hi), j| (lo.min(j), hi.max(j)));
                lo..hi + 1
            }
            None => 0..0,
        }
    }
}

/// Banded dynamic time warping over MFCC frame vectors.
#[derive(Debug, Clone)]
pub struct DtwComparator {
    warp_penalty: f32,
    band_fraction: f32,
}

impl Default for DtwComparator {
    fn default() -> Self {
        Self {
            warp_penalty: WARP_PENALTY,
            band_fraction: BAND_FRACTION,
        }
    }
}

impl DtwComparator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compare(&self, reference: &MfccFeatures, query: &MfccFeatures) -> DtwResult {
        self.compare_frames(&reference.frame_vectors(), &query.frame_vectors())
    }

    /// Compare sub-ranges of two feature sets. Path indices are relative to
    /// the start of each range.
    pub fn compare_region(
        &self,
        reference: &MfccFeatures,
        reference_range: Range<usize>,
        query: &MfccFeatures,
        query_range: Range<usize>,
    ) -> DtwResult {
        self.compare(
            &reference.slice(reference_range.start, reference_range.end),
            &query.slice(query_range.start, query_range.end),
        )
    }

    pub fn compare_frames(&self, reference: &[Vec<f32>], query: &[Vec<f32>]) -> DtwResult {
        let (n, m) = (reference.len(), query.len());
        if n == 0 || m == 0 {
            return DtwResult::unmatched();
        }

        let band = n
            .abs_diff(m)
            .max((self.band_fraction * n.max(m) as f32).floor() as usize);
        let cols = m + 1;
        let mut cost = vec![f32::INFINITY; (n + 1) * cols];
        cost[0] = 0.0;

        for i in 1..=n {
            let lo = i.saturating_sub(band).max(1);
            let hi = (i + band).min(m);
            for j in lo..=hi {
                let local = euclidean(&reference[i - 1], &query[j - 1]);
                let diagonal = cost[(i - 1) * cols + j - 1] + local;
                let up = cost[(i - 1) * cols + j] + local + self.warp_penalty;
                let left = cost[i * cols + j - 1] + local + self.warp_penalty;
                cost[i * cols + j] = diagonal.min(up).min(left);
            }
        }

        let distance = cost[n * cols + m];
        if !distance.is_finite() {
            return DtwResult::unmatched();
        }
        let path = backtrack(&cost, cols, n, m);
        let normalized_distance = distance / n.max(m) as f32;
        let similarity = (100.0 - normalized_distance / DISTANCE_SCALE).clamp(0.0, 100.0);
        trace!(n, m, band, distance, similarity, "dtw alignment");

        DtwResult {
            distance,
            normalized_distance,
            similarity,
            path,
        }
    }
}

fn backtrack(cost: &[f32], cols: usize, n: usize, m: usize) -> Vec<(usize, usize)> {
    let (mut i, mut j) = (n, m);
    let mut path = Vec::with_capacity(n + m);
    path.push((i - 1, j - 1));
    while i > 1 || j > 1 {
        if i == 1 {
            j -= 1;
        } else if j == 1 {
            i -= 1;
        } else {
            let diagonal = cost[(i - 1) * cols + j - 1];
            let up = cost[(i - 1) * cols + j];
            let left = cost[i * cols + j - 1];
            if diagonal <= up && diagonal <= left {
                i -= 1;
                j -= 1;
            } else if up <= left {
                i -= 1;
            } else {
                j -= 1;
            }
        }
        path.push((i - 1, j - 1));
    }
    path.reverse();
    path
}

fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn frames(values: &[f32]) -> Vec<Vec<f32>> {
        values.iter().map(|&v| vec![v, v * 0.5]).collect()
    }

    #[test]
    fn identical_sequences_follow_diagonal() {
        let seq = frames(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let result = DtwComparator::new().compare_frames(&seq, &seq);
        assert_abs_diff_eq!(result.distance, 0.0);
        assert_abs_diff_eq!(result.similarity, 100.0);
        assert_eq!(result.path, (0..5).map(|i| (i, i)).collect::<Vec<_>>());
    }

    #[test]
    fn empty_input_is_unmatched() {
        let seq = frames(&[1.0, 2.0]);
        let result = DtwComparator::new().compare_frames(&seq, &[]);
        assert!(result.distance.is_infinite());
        assert_eq!(result.similarity, 0.0);
        assert!(result.path.is_empty());
    }

    #[test]
    fn stretched_query_pays_warp_penalty() {
        let reference = frames(&[0.0, 5.0, 10.0]);
        let query = frames(&[0.0, 5.0, 5.0, 10.0]);
        let result = DtwComparator::new().compare_frames(&reference, &query);
        assert_abs_diff_eq!(result.distance, WARP_PENALTY);
        assert_eq!(result.path.first(), Some(&(0, 0)));
        assert_eq!(result.path.last(), Some(&(2, 3)));
    }

    #[test]
    fn query_range_spans_matched_frames() {
        let reference = frames(&[0.0, 5.0, 10.0]);
        let query = frames(&[0.0, 5.0, 5.0, 10.0]);
        let result = DtwComparator::new().compare_frames(&reference, &query);
        assert_eq!(result.query_range(&(1..2)), 1..3);
        assert_eq!(result.query_range(&(5..6)), 0..0);
    }
}
