use crate::audio::pause_detector::PauseReport;
use crate::config::ScoringConfig;
use crate::pronunciation::environment::EnvironmentReport;
use crate::pronunciation::features::{Formants, PitchReport};
use crate::pronunciation::PhonemeScore;

const GOOD_PHONEME: f32 = 80.0;
const FAIR_PHONEME: f32 = 50.0;

/// Turns alignment and prosody measurements into 0-100 scores and
/// child-facing feedback.
#[derive(Debug, Clone, Default)]
pub struct MetricCalculator {
    config: ScoringConfig,
}

impl MetricCalculator {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// 100 minus penalties for flat pitch and for interior pauses.
    pub fn expression_score(&self, pitch: &PitchReport, pauses: &PauseReport) -> f32 {
        let monotone = if pitch.monotone {
            self.config.monotone_penalty
        } else {
            0.0
        };
        let pausing = (pauses.count() as f32 * self.config.pause_penalty)
            .min(self.config.max_pause_penalty);
        (100.0 - monotone - pausing).clamp(0.0, 100.0)
    }

    /// How close measured vowel formants sit to the (adult-normalized) target.
    ///
    /// Errors inside the tolerance cost nothing. A frame with no usable F1
    /// resonance is a "mushy" vowel and takes a flat penalty instead.
    pub fn formant_score(&self, target: [f32; 3], measured: &Formants) -> f32 {
        let cfg = &self.config;
        let f1_penalty = match measured.f1_hz() {
            Some(f1) => excess(f1, target[0], cfg.f1_tolerance_hz) * cfg.f1_penalty_per_hz,
            None => cfg.mushy_vowel_penalty,
        };
        let f2_penalty = measured
            .f2_hz()
            .map(|f2| excess(f2, target[1], cfg.f2_tolerance_hz) * cfg.f2_penalty_per_hz)
            .unwrap_or(0.0);
        (100.0 - f1_penalty - f2_penalty).clamp(0.0, 100.0)
    }

    /// Blend of local spectral similarity and, for vowels, the formant score.
    pub fn phoneme_score(&self, local_similarity: f32, formant_score: Option<f32>) -> f32 {
        let score = match formant_score {
            Some(formant) => {
                self.config.local_similarity_weight * local_similarity
                    + self.config.formant_weight * formant
            }
            None => local_similarity,
        };
        score.clamp(0.0, 100.0)
    }

    pub fn articulation_score(&self, phonemes: &[PhonemeScore]) -> f32 {
        if phonemes.is_empty() {
            return 0.0;
        }
        phonemes.iter().map(|p| p.score).sum::<f32>() / phonemes.len() as f32
    }

    pub fn overall_score(&self, rhythm: f32, articulation: f32, expression: f32) -> f32 {
        let cfg = &self.config;
        (cfg.rhythm_weight * rhythm
            + cfg.articulation_weight * articulation
            + cfg.expression_weight * expression)
            .round()
            .clamp(0.0, 100.0)
    }

    /// One message, picked by priority: environment, praise, pitch, pauses,
    /// then the weakest sound.
    pub fn feedback(
        &self,
        overall: f32,
        environment: &EnvironmentReport,
        pitch: &PitchReport,
        pauses: &PauseReport,
        phonemes: &[PhonemeScore],
    ) -> String {
        if environment.is_noisy() {
            return environment.message.clone();
        }
        if overall >= self.config.excellent_threshold {
            return "Excellent! That sounded great.".to_string();
        }
        if pitch.monotone {
            return "Try saying it with more expression, like you're telling a story.".to_string();
        }
        if pauses.count() >= self.config.excessive_pauses {
            return "Try saying the whole word smoothly without stopping.".to_string();
        }
        match phonemes.iter().min_by(|a, b| a.score.total_cmp(&b.score)) {
            Some(weakest) => format!(
                "Good try! Let's practice the \"{}\" sound.",
                weakest.phoneme.to_ascii_lowercase()
            ),
            None => "Good try! Let's say it again.".to_string(),
        }
    }
}

/// Short note attached to each phoneme score.
pub fn phoneme_feedback(score: f32) -> &'static str {
    if score >= GOOD_PHONEME {
        "clear"
    } else if score >= FAIR_PHONEME {
        "close"
    } else if score > 0.0 {
        "needs practice"
    } else {
        "not heard"
    }
}

fn excess(measured: f32, target: f32, tolerance: f32) -> f32 {
    ((measured - target).abs() - tolerance).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::pause_detector::Pause;
    use crate::pronunciation::environment::EnvironmentCondition;
    use crate::pronunciation::features::formant::Formant;
    use approx::assert_abs_diff_eq;

    fn calculator() -> MetricCalculator {
        MetricCalculator::new(ScoringConfig::default())
    }

    fn pauses(count: usize) -> PauseReport {
        PauseReport {
            pauses: (0..count)
                .map(|i| Pause {
                    start: i as f32,
                    end: i as f32 + 0.2,
                })
                .collect(),
        }
    }

    fn formant(frequency: f32) -> Option<Formant> {
        Some(Formant {
            frequency,
            bandwidth: 100.0,
        })
    }

    #[test]
    fn expression_penalties_stack_and_cap() {
        let calc = calculator();
        let flat = PitchReport {
            monotone: true,
            ..PitchReport::default()
        };
        assert_abs_diff_eq!(
            calc.expression_score(&PitchReport::default(), &pauses(0)),
            100.0
        );
        assert_abs_diff_eq!(calc.expression_score(&flat, &pauses(1)), 70.0);
        assert_abs_diff_eq!(calc.expression_score(&flat, &pauses(5)), 50.0);
    }

    #[test]
    fn formant_errors_inside_tolerance_are_free() {
        let measured = Formants {
            f1: formant(760.0),
            f2: formant(1500.0),
            f3: None,
        };
        assert_abs_diff_eq!(calculator().formant_score([660.0, 1720.0, 2410.0], &measured), 100.0);
    }

    #[test]
    fn formant_errors_beyond_tolerance_cost_points() {
        let measured = Formants {
            f1: formant(910.0),
            f2: formant(2070.0),
            f3: None,
        };
        // F1 off by 250 (100 over), F2 off by 350 (100 over)
        assert_abs_diff_eq!(
            calculator().formant_score([660.0, 1720.0, 2410.0], &measured),
            100.0 - 20.0 - 10.0
        );
    }

    #[test]
    fn missing_f1_is_mushy() {
        assert_abs_diff_eq!(
            calculator().formant_score([660.0, 1720.0, 2410.0], &Formants::default()),
            80.0
        );
    }

    #[test]
    fn overall_uses_weights_and_rounds() {
        assert_abs_diff_eq!(calculator().overall_score(100.0, 80.0, 80.0), 90.0);
        assert_abs_diff_eq!(calculator().overall_score(71.0, 50.3, 100.0), 71.0);
    }

    #[test]
    fn vowel_blend_weights_local_and_formant() {
        assert_abs_diff_eq!(calculator().phoneme_score(100.0, Some(50.0)), 80.0);
        assert_abs_diff_eq!(calculator().phoneme_score(70.0, None), 70.0);
    }

    #[test]
    fn feedback_priority_order() {
        let calc = calculator();
        let quiet = EnvironmentReport::default();
        let noisy = EnvironmentReport {
            condition: EnvironmentCondition::TooNoisy,
            message: "noisy".into(),
            ..EnvironmentReport::default()
        };
        let flat = PitchReport {
            monotone: true,
            ..PitchReport::default()
        };
        let steady = PitchReport::default();
        let phonemes = vec![
            PhonemeScore {
                phoneme: "K".into(),
                score: 90.0,
                ..PhonemeScore::default()
            },
            PhonemeScore {
                phoneme: "AE".into(),
                score: 30.0,
                ..PhonemeScore::default()
            },
        ];

        assert_eq!(calc.feedback(95.0, &noisy, &flat, &pauses(3), &phonemes), "noisy");
        assert!(calc
            .feedback(95.0, &quiet, &flat, &pauses(3), &phonemes)
            .starts_with("Excellent"));
        assert!(calc
            .feedback(60.0, &quiet, &flat, &pauses(3), &phonemes)
            .contains("expression"));
        assert!(calc
            .feedback(60.0, &quiet, &steady, &pauses(2), &phonemes)
            .contains("without stopping"));
        assert!(calc
            .feedback(60.0, &quiet, &steady, &pauses(1), &phonemes)
            .contains("\"ae\""));
    }

    #[test]
    fn phoneme_notes_by_band() {
        assert_eq!(phoneme_feedback(95.0), "clear");
        assert_eq!(phoneme_feedback(60.0), "close");
        assert_eq!(phoneme_feedback(10.0), "needs practice");
        assert_eq!(phoneme_feedback(0.0), "not heard");
    }
}
