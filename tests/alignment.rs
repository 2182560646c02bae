use approx::assert_abs_diff_eq;
use phonic_check::pronunciation::alignment::{
    partition_frames, project_regions, DtwComparator, PronunciationDictionary,
};
use phonic_check::pronunciation::ErrorKind;

fn ramp(len: usize, offset: f32) -> Vec<Vec<f32>> {
    (0..len).map(|i| vec![i as f32 + offset, 1.0]).collect()
}

#[test]
fn identical_sequences_follow_the_diagonal() {
    let frames = ramp(20, 0.0);
    let result = DtwComparator::new().compare_frames(&frames, &frames);

    assert_abs_diff_eq!(result.distance, 0.0);
    assert_abs_diff_eq!(result.similarity, 100.0);
    assert_eq!(result.path.len(), 20);
    assert!(result.path.iter().all(|&(i, j)| i == j));
}

#[test]
fn every_step_is_a_single_move() {
    let reference = ramp(12, 0.0);
    let query: Vec<Vec<f32>> = (0..17).map(|i| vec![(i as f32) * 0.7, 1.0]).collect();
    for (a, b) in [(&reference, &query), (&query, &reference)] {
        let path = DtwComparator::new().compare_frames(a, b).path;
        assert_eq!(path.first(), Some(&(0, 0)));
        assert_eq!(path.last(), Some(&(a.len() - 1, b.len() - 1)));
        for step in path.windows(2) {
            let (di, dj) = (step[1].0 - step[0].0, step[1].1 - step[0].1);
            assert!(
                matches!((di, dj), (1, 0) | (0, 1) | (1, 1)),
                "bad step {:?} -> {:?}",
                step[0],
                step[1]
            );
        }
    }
}

#[test]
fn stretched_query_warps_monotonically() {
    let reference = ramp(10, 0.0);
    let query: Vec<Vec<f32>> = reference.iter().flat_map(|f| [f.clone(), f.clone()]).collect();
    let result = DtwComparator::new().compare_frames(&reference, &query);

    assert_eq!(result.path.first(), Some(&(0, 0)));
    assert_eq!(result.path.last(), Some(&(9, 19)));
    assert!(result
        .path
        .windows(2)
        .all(|w| w[1] != w[0]
            && w[1].0 >= w[0].0
            && w[1].1 >= w[0].1
            && w[1].0 - w[0].0 <= 1
            && w[1].1 - w[0].1 <= 1));
    assert!(result.similarity > 90.0);
    let stretched = result.query_range(&(3..5));
    assert!(!stretched.is_empty());
    assert!(stretched.start >= 4 && stretched.end <= 12, "{stretched:?}");
}

#[test]
fn distant_sequences_score_lower() {
    let reference = ramp(15, 0.0);
    let near = ramp(15, 1.0);
    let far = ramp(15, 200.0);
    let dtw = DtwComparator::new();
    let near_score = dtw.compare_frames(&reference, &near).similarity;
    let far_score = dtw.compare_frames(&reference, &far).similarity;
    assert!(near_score > far_score);
    assert_abs_diff_eq!(far_score, 50.0, epsilon = 1.0);
}

#[test]
fn empty_side_is_unmatched() {
    let result = DtwComparator::new().compare_frames(&ramp(5, 0.0), &[]);
    assert!(result.distance.is_infinite());
    assert_abs_diff_eq!(result.similarity, 0.0);
    assert!(result.path.is_empty());
}

#[test]
fn regions_cover_reference_in_order() {
    let frames = ramp(12, 0.0);
    let alignment = DtwComparator::new().compare_frames(&frames, &frames);
    let regions = project_regions(&["K", "AE", "T"], 12, &alignment);

    assert_eq!(partition_frames(12, 3), vec![0..4, 4..8, 8..12]);
    assert_eq!(regions.len(), 3);
    assert_eq!(regions[1].phoneme, "AE");
    assert_eq!(regions[1].learner, 4..8);
    assert!(regions.iter().all(|r| !r.is_empty()));
}

#[test]
fn lexicon_round_trips_between_words_and_phonemes() {
    let dict = PronunciationDictionary::shared().expect("bundled lexicon parses");
    assert!(!dict.is_empty());
    assert_eq!(dict.primary("Lamp").unwrap(), ["L", "AE1", "M", "P"]);
    assert_eq!(dict.reverse_lookup(&["D", "AO0", "G"]), Some("dog"));
    assert_eq!(dict.reverse_lookup(&["Z", "Z", "Z"]), None);

    let err = dict.primary("xylophonic").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}
