use crate::models::{BadgeInfo, BadgeKind, Pathology, PatientProfile, ProfileValue};

/// Classify a scored pathology for display
///
/// Priority: excluded > bonus > penalty > none. Pathologies without
/// additional criteria never get a badge.
pub fn classify_badge(
    pathology: &Pathology,
    patient: &PatientProfile,
    modifier: f64,
) -> Option<BadgeInfo> {
    let criteria = pathology.additional_criteria()?;

    if modifier == 0.0 {
        return Some(BadgeKind::Excluded.into());
    }

    let preferred = matches!(
        (patient.sex, criteria.sex_preference),
        (Some(sex), Some(preferred)) if sex.matches(&preferred)
    );
    if preferred && modifier > 1.0 {
        return Some(BadgeKind::Bonus.into());
    }

    if modifier < 1.0 {
        return Some(BadgeKind::Penalty.into());
    }

    None
}
