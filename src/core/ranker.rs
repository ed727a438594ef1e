use serde::{Deserialize, Serialize};
use crate::models::{
    BadgeInfo, ModifierBreakdown, Pathology, PatientProfile, ScoredMatch, ScoringConstants, TriageAnswers,
};
use crate::core::{
    badge::classify_badge,
    modifier::modifier_breakdown,
    scoring::{apply_weighting, calculate_base_score},
};

/// Why candidates were left out of a ranking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTally {
    pub no_criteria: usize,
    pub no_dimension_matched: usize,
    pub excluded: usize,
    /// Modifier reduced to zero without an exclusion rule firing
    pub zero_modifier: usize,
    pub zero_score: usize,
}

impl DropTally {
    pub fn total(&self) -> usize {
        self.no_criteria + self.no_dimension_matched + self.excluded + self.zero_modifier + self.zero_score
    }
}

/// Result of the ranking process
#[derive(Debug)]
pub struct RankResult {
    pub matches: Vec<ScoredMatch>,
    pub total_candidates: usize,
    pub dropped: DropTally,
}

/// Triage orchestrator - scores every candidate pathology and ranks the survivors
///
/// # Pipeline Stages
/// 1. Drop pathologies without triage criteria
/// 2. Base score from the triage answers
/// 3. Inclusion/exclusion modifier
/// 4. Population weighting, rounding and ranking
#[derive(Debug, Clone)]
pub struct TriageRanker {
    constants: ScoringConstants,
}

impl TriageRanker {
    pub fn new(constants: ScoringConstants) -> Self {
        Self { constants }
    }

    pub fn with_default_constants() -> Self {
        Self {
            constants: ScoringConstants::default(),
        }
    }

    pub fn constants(&self) -> &ScoringConstants {
        &self.constants
    }

    pub fn compute_modifier(
        &self,
        pathology: &Pathology,
        answers: &TriageAnswers,
        patient: &PatientProfile,
    ) -> f64 {
        self.modifier_breakdown(pathology, answers, patient).modifier
    }

    pub fn modifier_breakdown(
        &self,
        pathology: &Pathology,
        answers: &TriageAnswers,
        patient: &PatientProfile,
    ) -> ModifierBreakdown {
        modifier_breakdown(pathology, answers, patient, &self.constants)
    }

    pub fn classify_badge(
        &self,
        pathology: &Pathology,
        patient: &PatientProfile,
        modifier: f64,
    ) -> Option<BadgeInfo> {
        classify_badge(pathology, patient, modifier)
    }

    /// Score and rank every pathology, returning only the surviving matches
    pub fn filter_and_rank(
        &self,
        pathologies: &[Pathology],
        answers: &TriageAnswers,
        patient: &PatientProfile,
    ) -> Vec<ScoredMatch> {
        self.rank(pathologies, answers, patient, None).matches
    }

    /// Rank candidate pathologies for a patient
    ///
    /// # Arguments
    /// * `pathologies` - Candidate pathologies, in catalogue order
    /// * `answers` - The patient's triage answers
    /// * `patient` - The patient's demographics
    /// * `limit` - Maximum number of matches to return, if any
    ///
    /// # Returns
    /// RankResult with matches sorted by descending score. Equal scores keep
    /// catalogue order.
    pub fn rank(
        &self,
        pathologies: &[Pathology],
        answers: &TriageAnswers,
        patient: &PatientProfile,
        limit: Option<usize>,
    ) -> RankResult {
        let mut dropped = DropTally::default();

        let mut matches: Vec<ScoredMatch> = pathologies
            .iter()
            .filter_map(|pathology| {
                // Stage 1: must carry triage criteria
                let criteria = match &pathology.triage_criteria {
                    Some(criteria) => criteria,
                    None => {
                        dropped.no_criteria += 1;
                        return None;
                    }
                };

                // Stage 2: base score
                let (base_score, matched_criteria) = calculate_base_score(criteria, answers, &self.constants);
                if matched_criteria.is_empty() {
                    dropped.no_dimension_matched += 1;
                    return None;
                }

                // Stage 3: inclusion/exclusion modifier
                let breakdown = self.modifier_breakdown(pathology, answers, patient);
                if breakdown.is_excluded() {
                    dropped.excluded += 1;
                    return None;
                }
                let modifier = breakdown.modifier;
                if modifier <= 0.0 {
                    dropped.zero_modifier += 1;
                    return None;
                }

                // Stage 4: weighting
                let score = apply_weighting(base_score, modifier, criteria.triage_weight);
                if !score.is_finite() || score <= 0.0 {
                    dropped.zero_score += 1;
                    return None;
                }

                tracing::trace!(
                    "Pathology {} scored {} (base {}, modifier {:.4}, weight {})",
                    pathology.id,
                    score,
                    base_score,
                    modifier,
                    criteria.triage_weight
                );

                // Tests and clusters are lifted to the match so they appear once
                let mut pathology = pathology.clone();
                let tests = pathology.tests.take().unwrap_or_default();
                let clusters = pathology.clusters.take().unwrap_or_default();

                Some(ScoredMatch {
                    pathology,
                    match_score: score as u32,
                    matched_criteria,
                    inclusion_modifier: modifier,
                    tests,
                    clusters,
                })
            })
            .collect();

        // Stable sort keeps catalogue order among equal scores
        matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));

        if let Some(limit) = limit {
            matches.truncate(limit);
        }

        tracing::debug!(
            "Ranked {} of {} pathologies ({} dropped)",
            matches.len(),
            pathologies.len(),
            dropped.total()
        );

        RankResult {
            matches,
            total_candidates: pathologies.len(),
            dropped,
        }
    }
}

impl Default for TriageRanker {
    fn default() -> Self {
        Self::with_default_constants()
    }
}

/// Filter and rank pathologies with the default constants
pub fn filter_and_rank_pathologies(
    pathologies: &[Pathology],
    answers: &TriageAnswers,
    patient: &PatientProfile,
) -> Vec<ScoredMatch> {
    TriageRanker::with_default_constants().filter_and_rank(pathologies, answers, patient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdditionalCriteria, ExclusionCriteria, Requirement, TriageCriteria};

    fn candidate(id: &str, pain_type: &str, pain_location: &str, weight: f64) -> Pathology {
        Pathology {
            id: id.to_string(),
            name: format!("Pathology {}", id),
            description: None,
            region: None,
            triage_criteria: Some(TriageCriteria {
                temporal_evolution: vec!["brutale".to_string()],
                pain_type: vec![pain_type.to_string()],
                pain_location: vec![pain_location.to_string()],
                triage_weight: weight,
                additional_criteria: None,
            }),
            tests: None,
            clusters: None,
        }
    }

    fn answers() -> TriageAnswers {
        TriageAnswers::new("brutale", "mecanique", "epaule")
    }

    #[test]
    fn test_rank_basic() {
        let ranker = TriageRanker::with_default_constants();
        let candidates = vec![
            candidate("1", "mecanique", "epaule", 100.0),     // 100
            candidate("2", "inflammatoire", "genou", 100.0),  // 33
            candidate("3", "mecanique", "genou", 50.0),       // 33
        ];

        let result = ranker.rank(&candidates, &answers(), &PatientProfile::default(), None);

        let scores: Vec<_> = result.matches.iter().map(|m| (m.pathology.id.as_str(), m.match_score)).collect();
        assert_eq!(scores, vec![("1", 100), ("2", 33), ("3", 33)]);
        assert_eq!(result.total_candidates, 3);
        assert_eq!(result.dropped.total(), 0);
    }

    #[test]
    fn test_drop_reasons() {
        let ranker = TriageRanker::with_default_constants();

        let mut no_criteria = candidate("a", "mecanique", "epaule", 100.0);
        no_criteria.triage_criteria = None;

        let mut unmatched = candidate("b", "inflammatoire", "genou", 100.0);
        if let Some(criteria) = unmatched.triage_criteria.as_mut() {
            criteria.temporal_evolution = vec!["progressive".to_string()];
        }

        let mut excluded = candidate("c", "mecanique", "epaule", 100.0);
        if let Some(criteria) = excluded.triage_criteria.as_mut() {
            criteria.additional_criteria = Some(AdditionalCriteria {
                exclusion: Some(ExclusionCriteria {
                    pain_location: vec!["epaule".to_string()],
                    ..Default::default()
                }),
                ..Default::default()
            });
        }

        let zero_weight = candidate("d", "mecanique", "epaule", 0.0);

        let result = ranker.rank(
            &[no_criteria, unmatched, excluded, zero_weight],
            &answers(),
            &PatientProfile::default(),
            None,
        );

        assert!(result.matches.is_empty());
        assert_eq!(
            result.dropped,
            DropTally {
                no_criteria: 1,
                no_dimension_matched: 1,
                excluded: 1,
                zero_modifier: 0,
                zero_score: 1,
            }
        );
    }

    #[test]
    fn test_zero_requirement_penalty_is_not_an_exclusion() {
        let ranker = TriageRanker::with_default_constants();
        let mut pathology = candidate("a", "mecanique", "epaule", 100.0);
        if let Some(criteria) = pathology.triage_criteria.as_mut() {
            criteria.additional_criteria = Some(AdditionalCriteria {
                requires_one_of: Some(vec![Requirement {
                    pain_type: Some("inflammatoire".to_string()),
                    ..Default::default()
                }]),
                penalty_if_missing: Some(0.0),
                ..Default::default()
            });
        }

        let result = ranker.rank(&[pathology], &answers(), &PatientProfile::default(), None);

        assert!(result.matches.is_empty());
        assert_eq!(result.dropped.excluded, 0);
        assert_eq!(result.dropped.zero_modifier, 1);
    }

    #[test]
    fn test_ties_keep_catalogue_order() {
        let candidates = vec![
            candidate("first", "mecanique", "genou", 100.0),
            candidate("second", "mecanique", "genou", 100.0),
            candidate("third", "mecanique", "genou", 100.0),
        ];

        let matches = filter_and_rank_pathologies(&candidates, &answers(), &PatientProfile::default());

        let ids: Vec<_> = matches.iter().map(|m| m.pathology.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_respects_limit() {
        let ranker = TriageRanker::default();
        let candidates: Vec<Pathology> = (0..20)
            .map(|i| candidate(&i.to_string(), "mecanique", "epaule", 10.0 + i as f64))
            .collect();

        let result = ranker.rank(&candidates, &answers(), &PatientProfile::default(), Some(5));

        assert_eq!(result.matches.len(), 5);
        assert_eq!(result.matches[0].pathology.id, "19");
        assert_eq!(result.total_candidates, 20);
    }

    #[test]
    fn test_pass_through_tests_and_clusters() {
        let mut pathology = candidate("1", "mecanique", "epaule", 100.0);
        pathology.tests = Some(vec![serde_json::json!({"id": "jobe", "name": "Test de Jobe"})]);

        let matches = filter_and_rank_pathologies(&[pathology], &answers(), &PatientProfile::default());

        assert_eq!(matches[0].tests.len(), 1);
        assert!(matches[0].clusters.is_empty());
        assert!(matches[0].pathology.tests.is_none());

        let json = serde_json::to_value(&matches[0]).unwrap();
        assert!(json["pathology"].get("tests").is_none());
        assert_eq!(json["tests"][0]["id"], "jobe");
    }
}
