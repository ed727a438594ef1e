use crate::models::{
    ExclusionCriteria, PatientProfile, ProfileValue, Requirement, TriageAnswers, TriageDimension,
};

/// Check whether a triage answer is one of the tags; an unanswered question never matches
#[inline]
pub fn tag_matches(tags: &[String], answer: Option<&str>) -> bool {
    match answer {
        Some(answer) => tags.iter().any(|tag| tag == answer),
        None => false,
    }
}

/// Check a patient attribute against an inclusion list
///
/// Returns `None` when the list is empty (dimension not configured).
/// An unset or unrecognised patient value counts as a mismatch.
#[inline]
pub fn check_inclusion<T: ProfileValue>(allowed: &[T], value: Option<T>) -> Option<bool> {
    if allowed.is_empty() {
        return None;
    }
    Some(value.map_or(false, |value| allowed.iter().any(|entry| entry.matches(&value))))
}

#[inline]
fn profile_matches<T: ProfileValue>(expected: T, actual: Option<T>) -> bool {
    actual.map_or(false, |actual| expected.matches(&actual))
}

/// Find the first triage dimension whose answer is on the exclusion list
#[inline]
pub fn excluded_dimension(
    exclusion: &ExclusionCriteria,
    answers: &TriageAnswers,
) -> Option<TriageDimension> {
    TriageDimension::ALL
        .into_iter()
        .find(|dimension| tag_matches(exclusion.tags(*dimension), answers.get(*dimension)))
}

/// Check if every key of a requirement matches the patient's answers or profile
pub fn requirement_satisfied(
    requirement: &Requirement,
    answers: &TriageAnswers,
    patient: &PatientProfile,
) -> bool {
    if !requirement.unrecognised.is_empty() {
        return false;
    }

    let checks = [
        requirement.age.map(|age| profile_matches(age, patient.age)),
        requirement.sex.map(|sex| profile_matches(sex, patient.sex)),
        requirement.lifestyle.map(|lifestyle| profile_matches(lifestyle, patient.lifestyle)),
        requirement
            .temporal_evolution
            .as_deref()
            .map(|tag| answers.temporal_evolution.as_deref() == Some(tag)),
        requirement
            .pain_type
            .as_deref()
            .map(|tag| answers.pain_type.as_deref() == Some(tag)),
        requirement
            .pain_location
            .as_deref()
            .map(|tag| answers.pain_location.as_deref() == Some(tag)),
    ];

    checks.into_iter().flatten().all(|matched| matched)
}

/// Check if at least one alternative requirement holds
#[inline]
pub fn satisfies_any_requirement(
    alternatives: &[Requirement],
    answers: &TriageAnswers,
    patient: &PatientProfile,
) -> bool {
    alternatives
        .iter()
        .any(|requirement| requirement_satisfied(requirement, answers, patient))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgeBucket, Sex};

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_tag_matches() {
        let location = tags(&["epaule", "coude"]);

        assert!(tag_matches(&location, Some("coude")));
        assert!(!tag_matches(&location, Some("genou")));
        assert!(!tag_matches(&location, None));
        assert!(!tag_matches(&[], Some("epaule")));
    }

    #[test]
    fn test_check_inclusion() {
        let ages = [AgeBucket::From18To30, AgeBucket::From30To50];

        assert_eq!(check_inclusion(&ages, Some(AgeBucket::From30To50)), Some(true));
        assert_eq!(check_inclusion(&ages, Some(AgeBucket::Over65)), Some(false));
        assert_eq!(check_inclusion(&ages, None), Some(false));
        assert_eq!(check_inclusion::<AgeBucket>(&[], Some(AgeBucket::Over65)), None);
    }

    #[test]
    fn test_unknown_values_never_match() {
        let sexes = [Sex::Femme, Sex::Unknown];

        assert_eq!(check_inclusion(&sexes, Some(Sex::Unknown)), Some(false));
        assert_eq!(check_inclusion(&sexes, Some(Sex::Femme)), Some(true));
        assert_eq!(check_inclusion(&[Sex::Unknown], Some(Sex::Homme)), Some(false));

        let requirement = Requirement {
            age: Some(AgeBucket::Unknown),
            ..Default::default()
        };
        let patient = PatientProfile {
            age: Some(AgeBucket::Unknown),
            ..Default::default()
        };
        assert!(!requirement_satisfied(&requirement, &TriageAnswers::default(), &patient));
    }

    #[test]
    fn test_excluded_dimension() {
        let exclusion = ExclusionCriteria {
            pain_type: tags(&["inflammatoire"]),
            pain_location: tags(&["lombaire"]),
            ..Default::default()
        };

        let answers = TriageAnswers::new("progressive", "inflammatoire", "lombaire");
        assert_eq!(excluded_dimension(&exclusion, &answers), Some(TriageDimension::PainType));

        let answers = TriageAnswers::new("progressive", "mecanique", "cervicale");
        assert_eq!(excluded_dimension(&exclusion, &answers), None);
    }

    #[test]
    fn test_requirement_satisfied() {
        let patient = PatientProfile {
            age: Some(AgeBucket::Over65),
            sex: Some(Sex::Femme),
            lifestyle: None,
        };
        let answers = TriageAnswers::new("progressive", "mecanique", "genou");

        let requirement = Requirement {
            age: Some(AgeBucket::Over65),
            pain_location: Some("genou".to_string()),
            ..Default::default()
        };
        assert!(requirement_satisfied(&requirement, &answers, &patient));

        let requirement = Requirement {
            age: Some(AgeBucket::Over65),
            sex: Some(Sex::Homme),
            ..Default::default()
        };
        assert!(!requirement_satisfied(&requirement, &answers, &patient));
    }

    #[test]
    fn test_unset_fields_fail_requirement() {
        let requirement = Requirement {
            lifestyle: Some(crate::models::Lifestyle::Athlete),
            ..Default::default()
        };

        assert!(!requirement_satisfied(
            &requirement,
            &TriageAnswers::default(),
            &PatientProfile::default()
        ));
    }

    #[test]
    fn test_unrecognised_key_never_satisfied() {
        let mut requirement = Requirement::default();
        requirement
            .unrecognised
            .insert("bmi".to_string(), serde_json::json!("30+"));

        assert!(!requirement_satisfied(
            &requirement,
            &TriageAnswers::default(),
            &PatientProfile::default()
        ));
    }

    #[test]
    fn test_any_requirement() {
        let patient = PatientProfile {
            age: Some(AgeBucket::From30To50),
            ..Default::default()
        };
        let answers = TriageAnswers::default();
        let alternatives = vec![
            Requirement {
                age: Some(AgeBucket::Over65),
                ..Default::default()
            },
            Requirement {
                age: Some(AgeBucket::From30To50),
                ..Default::default()
            },
        ];

        assert!(satisfies_any_requirement(&alternatives, &answers, &patient));
        assert!(!satisfies_any_requirement(&alternatives[..1], &answers, &patient));
        assert!(!satisfies_any_requirement(&[], &answers, &patient));
    }
}
