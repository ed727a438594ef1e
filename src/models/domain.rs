use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Deserialize an optional tag, treating blank strings as unset
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Deserialize a profile value; unrecognised strings become `Unknown`
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = Infallible>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Ok(value),
        Err(never) => match never {},
    }
}

/// Patient attribute compared against inclusion lists and requirements
///
/// `Unknown` stands for any value outside the intake form vocabulary. It is
/// kept so a configured rule still counts, but it never matches anything,
/// including another `Unknown`.
pub trait ProfileValue: Copy + PartialEq {
    fn is_known(&self) -> bool;

    /// Equality restricted to recognised values
    fn matches(&self, other: &Self) -> bool {
        self.is_known() && self == other
    }
}

/// Patient age bucket as collected by the intake form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AgeBucket {
    #[serde(rename = "0-18")]
    UpTo18,
    #[serde(rename = "18-30")]
    From18To30,
    #[serde(rename = "30-50")]
    From30To50,
    #[serde(rename = "50-65")]
    From50To65,
    #[serde(rename = "65+")]
    Over65,
    #[serde(rename = "unknown")]
    Unknown,
}

impl AgeBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBucket::UpTo18 => "0-18",
            AgeBucket::From18To30 => "18-30",
            AgeBucket::From30To50 => "30-50",
            AgeBucket::From50To65 => "50-65",
            AgeBucket::Over65 => "65+",
            AgeBucket::Unknown => "unknown",
        }
    }
}

impl ProfileValue for AgeBucket {
    fn is_known(&self) -> bool {
        *self != AgeBucket::Unknown
    }
}

impl FromStr for AgeBucket {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "0-18" => AgeBucket::UpTo18,
            "18-30" => AgeBucket::From18To30,
            "30-50" => AgeBucket::From30To50,
            "50-65" => AgeBucket::From50To65,
            "65+" => AgeBucket::Over65,
            _ => AgeBucket::Unknown,
        })
    }
}

impl<'de> Deserialize<'de> for AgeBucket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient(deserializer)
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Homme,
    Femme,
    Unknown,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Homme => "homme",
            Sex::Femme => "femme",
            Sex::Unknown => "unknown",
        }
    }
}

impl ProfileValue for Sex {
    fn is_known(&self) -> bool {
        *self != Sex::Unknown
    }
}

impl FromStr for Sex {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "homme" => Sex::Homme,
            "femme" => Sex::Femme,
            _ => Sex::Unknown,
        })
    }
}

impl<'de> Deserialize<'de> for Sex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient(deserializer)
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifestyle {
    Sedentaire,
    Actif,
    Athlete,
    Unknown,
}

impl Lifestyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifestyle::Sedentaire => "sedentaire",
            Lifestyle::Actif => "actif",
            Lifestyle::Athlete => "athlete",
            Lifestyle::Unknown => "unknown",
        }
    }
}

impl ProfileValue for Lifestyle {
    fn is_known(&self) -> bool {
        *self != Lifestyle::Unknown
    }
}

impl FromStr for Lifestyle {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "sedentaire" => Lifestyle::Sedentaire,
            "actif" => Lifestyle::Actif,
            "athlete" => Lifestyle::Athlete,
            _ => Lifestyle::Unknown,
        })
    }
}

impl<'de> Deserialize<'de> for Lifestyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient(deserializer)
    }
}

impl fmt::Display for Lifestyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Patient demographics supplied with each scoring call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub age: Option<AgeBucket>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sex: Option<Sex>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub lifestyle: Option<Lifestyle>,
}

/// The three triage questions used for first-pass matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageDimension {
    TemporalEvolution,
    PainType,
    PainLocation,
}

impl TriageDimension {
    /// Evaluation order for base scoring and exclusion checks
    pub const ALL: [TriageDimension; 3] = [
        TriageDimension::TemporalEvolution,
        TriageDimension::PainType,
        TriageDimension::PainLocation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TriageDimension::TemporalEvolution => "temporal_evolution",
            TriageDimension::PainType => "pain_type",
            TriageDimension::PainLocation => "pain_location",
        }
    }
}

impl fmt::Display for TriageDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Patient answers to the triage questions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriageAnswers {
    #[serde(
        rename = "temporalEvolution",
        alias = "temporal_evolution",
        default,
        deserialize_with = "empty_as_none"
    )]
    pub temporal_evolution: Option<String>,
    #[serde(
        rename = "painType",
        alias = "pain_type",
        default,
        deserialize_with = "empty_as_none"
    )]
    pub pain_type: Option<String>,
    #[serde(
        rename = "painLocation",
        alias = "pain_location",
        default,
        deserialize_with = "empty_as_none"
    )]
    pub pain_location: Option<String>,
}

impl TriageAnswers {
    pub fn new(temporal_evolution: &str, pain_type: &str, pain_location: &str) -> Self {
        Self {
            temporal_evolution: Some(temporal_evolution.to_string()),
            pain_type: Some(pain_type.to_string()),
            pain_location: Some(pain_location.to_string()),
        }
    }

    pub fn get(&self, dimension: TriageDimension) -> Option<&str> {
        match dimension {
            TriageDimension::TemporalEvolution => self.temporal_evolution.as_deref(),
            TriageDimension::PainType => self.pain_type.as_deref(),
            TriageDimension::PainLocation => self.pain_location.as_deref(),
        }
    }
}

/// Pathology record from the catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pathology {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub triage_criteria: Option<TriageCriteria>,
    /// Clinical tests linked upstream; passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clusters: Option<Vec<Value>>,
}

impl Pathology {
    /// Additional criteria, if configured and not empty
    pub fn additional_criteria(&self) -> Option<&AdditionalCriteria> {
        self.triage_criteria
            .as_ref()
            .and_then(|criteria| criteria.additional_criteria.as_ref())
            .filter(|criteria| !criteria.is_empty())
    }
}

fn default_triage_weight() -> f64 { 100.0 }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageCriteria {
    #[serde(default)]
    pub temporal_evolution: Vec<String>,
    #[serde(default)]
    pub pain_type: Vec<String>,
    #[serde(default)]
    pub pain_location: Vec<String>,
    /// Population prior on a 0-100 scale
    #[serde(default = "default_triage_weight")]
    pub triage_weight: f64,
    #[serde(default)]
    pub additional_criteria: Option<AdditionalCriteria>,
}

impl TriageCriteria {
    pub fn tags(&self, dimension: TriageDimension) -> &[String] {
        match dimension {
            TriageDimension::TemporalEvolution => &self.temporal_evolution,
            TriageDimension::PainType => &self.pain_type,
            TriageDimension::PainLocation => &self.pain_location,
        }
    }
}

impl Default for TriageCriteria {
    fn default() -> Self {
        Self {
            temporal_evolution: Vec::new(),
            pain_type: Vec::new(),
            pain_location: Vec::new(),
            triage_weight: default_triage_weight(),
            additional_criteria: None,
        }
    }
}

/// Inclusion/exclusion rules refining the base triage match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalCriteria {
    #[serde(default)]
    pub exclusion: Option<ExclusionCriteria>,
    #[serde(default)]
    pub inclusion: Option<InclusionCriteria>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sex_preference: Option<Sex>,
    #[serde(default)]
    pub requires_one_of: Option<Vec<Requirement>>,
    #[serde(default)]
    pub penalty_if_missing: Option<f64>,
}

impl AdditionalCriteria {
    /// True when no rule would fire for any patient
    pub fn is_empty(&self) -> bool {
        self.exclusion.as_ref().map_or(true, ExclusionCriteria::is_empty)
            && self.inclusion.as_ref().map_or(true, InclusionCriteria::is_empty)
            && self.sex_preference.is_none()
            && self.requires_one_of.as_ref().map_or(true, Vec::is_empty)
    }
}

/// Triage answers that disqualify a pathology outright
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExclusionCriteria {
    #[serde(default)]
    pub temporal_evolution: Vec<String>,
    #[serde(default)]
    pub pain_type: Vec<String>,
    #[serde(default)]
    pub pain_location: Vec<String>,
}

impl ExclusionCriteria {
    pub fn tags(&self, dimension: TriageDimension) -> &[String] {
        match dimension {
            TriageDimension::TemporalEvolution => &self.temporal_evolution,
            TriageDimension::PainType => &self.pain_type,
            TriageDimension::PainLocation => &self.pain_location,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.temporal_evolution.is_empty() && self.pain_type.is_empty() && self.pain_location.is_empty()
    }
}

/// Patient attributes a pathology is statistically associated with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InclusionCriteria {
    #[serde(default)]
    pub age: Vec<AgeBucket>,
    #[serde(default)]
    pub sex: Vec<Sex>,
    #[serde(default)]
    pub lifestyle: Vec<Lifestyle>,
}

impl InclusionCriteria {
    pub fn is_empty(&self) -> bool {
        self.age.is_empty() && self.sex.is_empty() && self.lifestyle.is_empty()
    }
}

/// One alternative of a `requires_one_of` rule
///
/// Every field that is set must equal the patient's value. Keys outside the
/// known fields are kept in `unrecognised` and can never be satisfied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<AgeBucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifestyle: Option<Lifestyle>,
    #[serde(default, alias = "temporalEvolution", skip_serializing_if = "Option::is_none")]
    pub temporal_evolution: Option<String>,
    #[serde(default, alias = "painType", skip_serializing_if = "Option::is_none")]
    pub pain_type: Option<String>,
    #[serde(default, alias = "painLocation", skip_serializing_if = "Option::is_none")]
    pub pain_location: Option<String>,
    #[serde(flatten)]
    pub unrecognised: BTreeMap<String, Value>,
}

/// Scored pathology match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub pathology: Pathology,
    #[serde(rename = "matchScore")]
    pub match_score: u32,
    #[serde(rename = "matchedCriteria")]
    pub matched_criteria: Vec<TriageDimension>,
    #[serde(rename = "inclusionModifier")]
    pub inclusion_modifier: f64,
    pub tests: Vec<Value>,
    pub clusters: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeKind {
    Excluded,
    Bonus,
    Penalty,
}

impl BadgeKind {
    pub fn label(&self) -> &'static str {
        match self {
            BadgeKind::Excluded => "Exclu",
            BadgeKind::Bonus => "Profil favorable",
            BadgeKind::Penalty => "Profil atypique",
        }
    }
}

/// Presentation badge for a scored pathology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeInfo {
    pub kind: BadgeKind,
    pub label: String,
}

impl From<BadgeKind> for BadgeInfo {
    fn from(kind: BadgeKind) -> Self {
        Self {
            kind,
            label: kind.label().to_string(),
        }
    }
}

/// Rule that adjusted the inclusion modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierRule {
    Exclusion,
    AgeMismatch,
    SexMismatch,
    LifestyleMismatch,
    SexPreferenceBonus,
    LowInclusionRatio,
    PartialInclusionRatio,
    MissingRequirement,
    Ceiling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierStep {
    pub rule: ModifierRule,
    pub factor: f64,
    pub note: String,
}

/// Modifier value together with the rules that produced it, in firing order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierBreakdown {
    pub modifier: f64,
    pub steps: Vec<ModifierStep>,
}

impl ModifierBreakdown {
    pub fn neutral() -> Self {
        Self {
            modifier: 1.0,
            steps: Vec::new(),
        }
    }

    pub fn excluded(note: String) -> Self {
        Self {
            modifier: 0.0,
            steps: vec![ModifierStep {
                rule: ModifierRule::Exclusion,
                factor: 0.0,
                note,
            }],
        }
    }

    /// True only when an exclusion rule vetoed the pathology
    pub fn is_excluded(&self) -> bool {
        self.steps.first().map(|step| step.rule) == Some(ModifierRule::Exclusion)
    }

    /// Multiply the running modifier and record the step
    pub fn apply(&mut self, rule: ModifierRule, factor: f64, note: String) {
        self.modifier *= factor;
        self.steps.push(ModifierStep { rule, factor, note });
    }
}

/// Tunable scoring constants
///
/// The defaults are empirically tuned values; change them only with
/// clinical input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConstants {
    pub temporal_evolution_points: u32,
    pub pain_type_points: u32,
    pub pain_location_points: u32,
    pub age_mismatch_penalty: f64,
    pub sex_mismatch_penalty: f64,
    pub lifestyle_mismatch_penalty: f64,
    pub sex_preference_bonus: f64,
    pub low_inclusion_ratio: f64,
    pub low_inclusion_penalty: f64,
    pub partial_inclusion_penalty: f64,
    pub missing_requirement_penalty: f64,
    pub max_modifier: f64,
}

impl ScoringConstants {
    pub fn points(&self, dimension: TriageDimension) -> u32 {
        match dimension {
            TriageDimension::TemporalEvolution => self.temporal_evolution_points,
            TriageDimension::PainType => self.pain_type_points,
            TriageDimension::PainLocation => self.pain_location_points,
        }
    }
}

impl Default for ScoringConstants {
    fn default() -> Self {
        Self {
            temporal_evolution_points: 33,
            pain_type_points: 33,
            pain_location_points: 34,
            age_mismatch_penalty: 0.5,
            sex_mismatch_penalty: 0.5,
            lifestyle_mismatch_penalty: 0.7,
            sex_preference_bonus: 1.2,
            low_inclusion_ratio: 0.5,
            low_inclusion_penalty: 0.3,
            partial_inclusion_penalty: 0.7,
            missing_requirement_penalty: 0.1,
            max_modifier: 1.5,
        }
    }
}
