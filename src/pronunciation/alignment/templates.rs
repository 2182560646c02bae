use std::ops::Range;

use super::dtw::DtwResult;

/// Frames attributed to one phoneme on both sides of an alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct PhonemeRegion {
    pub phoneme: String,
    pub reference: Range<usize>,
    pub learner: Range<usize>,
}

impl PhonemeRegion {
    pub fn is_empty(&self) -> bool {
        self.reference.is_empty() || self.learner.is_empty()
    }
}

/// Evenly partition `frame_count` frames into `phoneme_count` contiguous
/// ranges. Earlier ranges absorb the remainder; when there are fewer frames
/// than phonemes the trailing ranges are empty.
pub fn partition_frames(frame_count: usize, phoneme_count: usize) -> Vec<Range<usize>> {
    if phoneme_count == 0 {
        return Vec::new();
    }
    let base = frame_count / phoneme_count;
    let remainder = frame_count % phoneme_count;
    let mut segments = Vec::with_capacity(phoneme_count);
    let mut start = 0;
    for index in 0..phoneme_count {
        let end = start + base + usize::from(index < remainder);
        segments.push(start..end);
        start = end;
    }
    segments
}

/// Split the reference evenly by phoneme and carry each slice through the
/// warping path onto the learner's frames.
pub fn project_regions<S: AsRef<str>>(
    phonemes: &[S],
    reference_frames: usize,
    alignment: &DtwResult,
) -> Vec<PhonemeRegion> {
    partition_frames(reference_frames, phonemes.len())
        .into_iter()
        .zip(phonemes.iter())
        .map(|(reference, phoneme)| PhonemeRegion {
            phoneme: phoneme.as_ref().to_string(),
            learner: alignment.query_range(&reference),
            reference,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_spreads_remainder_first() {
        assert_eq!(partition_frames(10, 3), vec![0..4, 4..7, 7..10]);
    }

    #[test]
    fn partition_with_too_few_frames_leaves_empty_tail() {
        let ranges = partition_frames(2, 3);
        assert_eq!(ranges, vec![0..1, 1..2, 2..2]);
        assert!(ranges[2].is_empty());
        assert!(partition_frames(5, 0).is_empty());
    }

    #[test]
    fn regions_follow_the_path() {
        let alignment = DtwResult {
            distance: 0.0,
            normalized_distance: 0.0,
            similarity: 100.0,
            path: vec![(0, 0), (1, 1), (1, 2), (2, 3), (3, 4), (3, 5)],
        };
        let regions = project_regions(&["K", "AE", "T"], 4, &alignment);
        assert_eq!(regions[0].reference, 0..2);
        assert_eq!(regions[0].learner, 0..3);
        assert_eq!(regions[1].reference, 2..3);
        assert_eq!(regions[1].learner, 3..4);
        assert_eq!(regions[2].learner, 4..6);
        assert!(!regions[2].is_empty());
    }
}
