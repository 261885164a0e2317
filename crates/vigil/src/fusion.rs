//! Risk fusion: weighted composite of the pointer and cadence scores.

use vigil_common::constants::fusion::{CADENCE_WEIGHT_PCT, POINTER_WEIGHT_PCT};
use vigil_common::{RiskAssessment, RiskClass, Score};

use crate::config::FusionConfig;

/// Composite with the default 25% / 75% weights
pub fn composite(pointer: Score, cadence: Score) -> Score {
    weighted(pointer, cadence, POINTER_WEIGHT_PCT, CADENCE_WEIGHT_PCT)
}

fn weighted(pointer: Score, cadence: Score, pointer_pct: f64, cadence_pct: f64) -> Score {
    Score::new(pointer.value() * (pointer_pct / 100.0) + cadence.value() * (cadence_pct / 100.0))
}

/// Recomputes the composite synchronously whenever an input score changes
#[derive(Debug)]
pub struct RiskFusion {
    settings: FusionConfig,
    last: Option<RiskAssessment>,
}

impl RiskFusion {
    pub fn new(settings: FusionConfig) -> Self {
        Self {
            settings,
            last: None,
        }
    }

    pub fn recompute(&mut self, pointer: Score, cadence: Score) -> RiskAssessment {
        let composite = weighted(
            pointer,
            cadence,
            self.settings.pointer_weight_pct,
            self.settings.cadence_weight_pct,
        );
        let class = RiskClass::classify_with(composite, self.settings.bot_like_threshold);
        let assessment = RiskAssessment::new(pointer, cadence, composite, class);

        tracing::info!(
            pointer = %pointer,
            cadence = %cadence,
            composite = %composite,
            "Risk Level: {}",
            class
        );

        self.last = Some(assessment.clone());
        assessment
    }

    /// Latest composite, or zero before any signal arrived
    pub fn composite(&self) -> Score {
        self.last.as_ref().map(|a| a.composite).unwrap_or(Score::ZERO)
    }

    pub fn last(&self) -> Option<&RiskAssessment> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_boundary_is_human_like() {
        let score = composite(Score::new(40.0), Score::new(20.0));
        assert_eq!(score.value(), 25.0);
        assert_eq!(RiskClass::classify(score), RiskClass::HumanLike);
    }

    #[test]
    fn test_composite_above_boundary_is_bot_like() {
        let score = composite(Score::new(40.0), Score::new(21.0));
        assert_eq!(score.value(), 25.75);
        assert_eq!(RiskClass::classify(score), RiskClass::BotLike);
    }

    #[test]
    fn test_composite_extremes() {
        assert_eq!(composite(Score::ZERO, Score::ZERO), Score::ZERO);
        assert_eq!(composite(Score::MAX, Score::MAX), Score::MAX);
        assert_eq!(composite(Score::MAX, Score::ZERO).value(), 25.0);
    }

    #[test]
    fn test_recompute_tracks_last() {
        let mut fusion = RiskFusion::new(FusionConfig::default());
        assert_eq!(fusion.composite(), Score::ZERO);
        assert!(fusion.last().is_none());

        let assessment = fusion.recompute(Score::new(80.0), Score::new(60.0));
        assert_eq!(assessment.composite.value(), 65.0);
        assert!(assessment.class.is_bot_like());
        assert_eq!(fusion.composite().value(), 65.0);
    }

    #[test]
    fn test_custom_weights() {
        let mut fusion = RiskFusion::new(FusionConfig {
            pointer_weight_pct: 50.0,
            cadence_weight_pct: 50.0,
            bot_like_threshold: 40.0,
        });
        let assessment = fusion.recompute(Score::new(30.0), Score::new(50.0));
        assert_eq!(assessment.composite.value(), 40.0);
        assert_eq!(assessment.class, RiskClass::HumanLike);
    }
}
