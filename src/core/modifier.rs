use crate::core::filters::{check_inclusion, excluded_dimension, satisfies_any_requirement};
use crate::models::{
    AdditionalCriteria, InclusionCriteria, ModifierBreakdown, ModifierRule, ModifierStep, Pathology,
    PatientProfile, ScoringConstants, TriageAnswers,
};

/// Compute the inclusion/exclusion modifier with the default constants
///
/// Returns `0.0` when the pathology is excluded, `1.0` when no additional
/// criteria are configured, and otherwise a value no greater than `1.5`.
pub fn compute_inclusion_exclusion_modifier(
    pathology: &Pathology,
    answers: &TriageAnswers,
    patient: &PatientProfile,
) -> f64 {
    modifier_breakdown(pathology, answers, patient, &ScoringConstants::default()).modifier
}

/// Compute the modifier and record every rule that fired
///
/// The stages run in a fixed order and each multiplies the running value:
/// 1. exclusion veto (returns `0` immediately)
/// 2. per-dimension inclusion penalties and the sex preference bonus
/// 3. inclusion ratio penalty
/// 4. `requires_one_of` penalty
/// 5. ceiling
///
/// Reordering the stages changes results.
pub fn modifier_breakdown(
    pathology: &Pathology,
    answers: &TriageAnswers,
    patient: &PatientProfile,
    constants: &ScoringConstants,
) -> ModifierBreakdown {
    let criteria = match pathology.additional_criteria() {
        Some(criteria) => criteria,
        None => return ModifierBreakdown::neutral(),
    };

    if let Some(exclusion) = &criteria.exclusion {
        if let Some(dimension) = excluded_dimension(exclusion, answers) {
            let answer = answers.get(dimension).unwrap_or_default();
            tracing::debug!(
                "Pathology {} excluded: {} = {}",
                pathology.id,
                dimension,
                answer
            );
            return ModifierBreakdown::excluded(format!("{} '{}' is an exclusion criterion", dimension, answer));
        }
    }

    let mut breakdown = ModifierBreakdown::neutral();

    if let Some(inclusion) = &criteria.inclusion {
        apply_inclusion(&mut breakdown, inclusion, criteria, patient, constants);
    }

    apply_requirements(&mut breakdown, criteria, answers, patient, constants);

    if breakdown.modifier > constants.max_modifier {
        let factor = constants.max_modifier / breakdown.modifier;
        breakdown.steps.push(ModifierStep {
            rule: ModifierRule::Ceiling,
            factor,
            note: format!("capped at {}", constants.max_modifier),
        });
        breakdown.modifier = constants.max_modifier;
    }

    tracing::debug!(
        "Pathology {} modifier {:.4} after {} step(s)",
        pathology.id,
        breakdown.modifier,
        breakdown.steps.len()
    );

    breakdown
}

fn apply_inclusion(
    breakdown: &mut ModifierBreakdown,
    inclusion: &InclusionCriteria,
    criteria: &AdditionalCriteria,
    patient: &PatientProfile,
    constants: &ScoringConstants,
) {
    let mut total = 0u32;
    let mut matches = 0u32;

    match check_inclusion(&inclusion.age, patient.age) {
        Some(true) => {
            total += 1;
            matches += 1;
        }
        Some(false) => {
            total += 1;
            breakdown.apply(
                ModifierRule::AgeMismatch,
                constants.age_mismatch_penalty,
                format!("age {} outside expected range", describe(patient.age)),
            );
        }
        None => {}
    }

    match check_inclusion(&inclusion.sex, patient.sex) {
        Some(true) => {
            total += 1;
            matches += 1;
            if let (Some(sex), Some(preferred)) = (patient.sex, criteria.sex_preference) {
                if sex == preferred {
                    breakdown.apply(
                        ModifierRule::SexPreferenceBonus,
                        constants.sex_preference_bonus,
                        format!("sex {} is the preferred presentation", sex),
                    );
                }
            }
        }
        Some(false) => {
            total += 1;
            breakdown.apply(
                ModifierRule::SexMismatch,
                constants.sex_mismatch_penalty,
                format!("sex {} not typical", describe(patient.sex)),
            );
        }
        None => {}
    }

    match check_inclusion(&inclusion.lifestyle, patient.lifestyle) {
        Some(true) => {
            total += 1;
            matches += 1;
        }
        Some(false) => {
            total += 1;
            breakdown.apply(
                ModifierRule::LifestyleMismatch,
                constants.lifestyle_mismatch_penalty,
                format!("lifestyle {} not typical", describe(patient.lifestyle)),
            );
        }
        None => {}
    }

    if total == 0 {
        return;
    }

    let ratio = matches as f64 / total as f64;
    if ratio < constants.low_inclusion_ratio {
        breakdown.apply(
            ModifierRule::LowInclusionRatio,
            constants.low_inclusion_penalty,
            format!("{}/{} inclusion criteria met", matches, total),
        );
    } else if ratio < 1.0 {
        breakdown.apply(
            ModifierRule::PartialInclusionRatio,
            constants.partial_inclusion_penalty,
            format!("{}/{} inclusion criteria met", matches, total),
        );
    }
}

fn apply_requirements(
    breakdown: &mut ModifierBreakdown,
    criteria: &AdditionalCriteria,
    answers: &TriageAnswers,
    patient: &PatientProfile,
    constants: &ScoringConstants,
) {
    let alternatives = match criteria.requires_one_of.as_deref() {
        Some(alternatives) if !alternatives.is_empty() => alternatives,
        _ => return,
    };

    if satisfies_any_requirement(alternatives, answers, patient) {
        return;
    }

    // A negative factor would flip the sign of the modifier
    let penalty = criteria
        .penalty_if_missing
        .unwrap_or(constants.missing_requirement_penalty)
        .max(0.0);
    breakdown.apply(
        ModifierRule::MissingRequirement,
        penalty,
        format!("none of {} required presentation(s) met", alternatives.len()),
    );
}

fn describe<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "unknown".to_string(), |value| value.to_string())
}
