use crate::models::{ScoringConstants, TriageAnswers, TriageCriteria, TriageDimension};
use crate::core::filters::tag_matches;

/// Calculate the base triage score (0-100) for a pathology's criteria
///
/// Scoring formula:
/// score = (
///     33 if temporal evolution matches +
///     33 if pain type matches +
///     34 if pain location matches
/// )
///
/// Returns the score together with the matched dimensions, in evaluation order.
pub fn calculate_base_score(
    criteria: &TriageCriteria,
    answers: &TriageAnswers,
    constants: &ScoringConstants,
) -> (u32, Vec<TriageDimension>) {
    let mut score = 0;
    let mut matched = Vec::with_capacity(TriageDimension::ALL.len());

    for dimension in TriageDimension::ALL {
        if tag_matches(criteria.tags(dimension), answers.get(dimension)) {
            score += constants.points(dimension);
            matched.push(dimension);
        }
    }

    (score, matched)
}

/// Apply the modifier and the population prior to a base score
///
/// Returns the rounded score; callers drop anything that is not positive.
#[inline]
pub fn apply_weighting(base_score: u32, modifier: f64, triage_weight: f64) -> f64 {
    (base_score as f64 * modifier * (triage_weight / 100.0)).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shoulder_criteria() -> TriageCriteria {
        TriageCriteria {
            temporal_evolution: vec!["brutale".to_string()],
            pain_type: vec!["mecanique".to_string(), "neurologique".to_string()],
            pain_location: vec!["epaule".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_full_match_scores_100() {
        let answers = TriageAnswers::new("brutale", "mecanique", "epaule");
        let (score, matched) = calculate_base_score(&shoulder_criteria(), &answers, &ScoringConstants::default());

        assert_eq!(score, 100);
        assert_eq!(
            matched,
            vec![
                TriageDimension::TemporalEvolution,
                TriageDimension::PainType,
                TriageDimension::PainLocation,
            ]
        );
    }

    #[test]
    fn test_partial_match_uses_dimension_points() {
        let answers = TriageAnswers::new("progressive", "neurologique", "epaule");
        let (score, matched) = calculate_base_score(&shoulder_criteria(), &answers, &ScoringConstants::default());

        assert_eq!(score, 67);
        assert_eq!(matched, vec![TriageDimension::PainType, TriageDimension::PainLocation]);
    }

    #[test]
    fn test_missing_answers_never_match() {
        let (score, matched) =
            calculate_base_score(&shoulder_criteria(), &TriageAnswers::default(), &ScoringConstants::default());

        assert_eq!(score, 0);
        assert!(matched.is_empty());
    }

    #[test]
    fn test_weighting() {
        assert_eq!(apply_weighting(100, 1.0, 100.0), 100.0);
        assert_eq!(apply_weighting(100, 0.15, 100.0), 15.0);
        assert_eq!(apply_weighting(66, 1.2, 50.0), 40.0);
        assert_eq!(apply_weighting(33, 0.0105, 100.0), 0.0);
    }
}
