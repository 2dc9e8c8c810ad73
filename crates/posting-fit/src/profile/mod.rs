//! Candidate hiring preferences, loaded once per run and shared read-only by every scorer.

mod validation;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::matching::KeywordError;
use crate::scoring::GradeThresholds;

/// Immutable candidate configuration. Construct through [`CandidateProfile::from_json_str`],
/// [`CandidateProfile::from_reader`] or [`CandidateProfile::from_path`] so it is always validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CandidateProfile {
    /// Seniority keywords the candidate is aiming for, most preferred first.
    pub target_seniority: Vec<String>,
    pub domain_keywords: Vec<String>,
    /// Extra technical vocabulary counted by the technical sub-score.
    #[serde(default)]
    pub technical_keywords: Vec<String>,
    #[serde(default)]
    pub role_types: BTreeMap<String, RoleTypeGroup>,
    #[serde(default)]
    pub location_preferences: LocationPreferences,
    #[serde(default)]
    pub hard_filter_keywords: HardFilterKeywords,
    #[serde(default)]
    pub context_filters: ContextFilterSettings,
    #[serde(default)]
    pub filtering: FilteringSettings,
    #[serde(default)]
    pub grading: GradeThresholds,
}

impl CandidateProfile {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ProfileError> {
        let profile: CandidateProfile = serde_json::from_reader(reader)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ProfileError> {
        let profile: CandidateProfile = serde_json::from_str(raw)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        validation::validate(self)
    }

    /// All vocabulary the technical sub-score counts: domain keywords first, then extras.
    pub fn technical_vocabulary(&self) -> impl Iterator<Item = &str> {
        self.domain_keywords
            .iter()
            .chain(self.technical_keywords.iter())
            .map(String::as_str)
    }

    pub fn allows_senior_coordinator(&self) -> bool {
        self.hard_filter_keywords
            .allow_senior_coordinator
            .unwrap_or(self.filtering.aggression != AggressionLevel::Aggressive)
    }
}

/// A named group of role keywords worth `points` when any keyword appears in the title.
/// Negative points mark role shapes the candidate wants to steer away from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleTypeGroup {
    pub keywords: Vec<String>,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocationPreferences {
    pub remote_keywords: Vec<String>,
    pub hybrid_keywords: Vec<String>,
    pub preferred_cities: Vec<String>,
    pub preferred_regions: Vec<String>,
}

impl Default for LocationPreferences {
    fn default() -> Self {
        Self {
            remote_keywords: strings(&["remote", "work from home", "wfh", "distributed", "anywhere"]),
            hybrid_keywords: strings(&["hybrid"]),
            preferred_cities: Vec::new(),
            preferred_regions: Vec::new(),
        }
    }
}

/// Block lists and exceptions consumed by the hard filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HardFilterKeywords {
    /// HR and people-operations roles.
    pub role_blocks: Vec<String>,
    pub role_exceptions: Vec<String>,
    /// Department names; the marketing filter uses the entries mentioning "marketing".
    pub department_blocks: Vec<String>,
    pub sales_marketing_blocks: Vec<String>,
    pub sales_blocks: Vec<String>,
    /// Director-and-above cues that let a sales leadership role through.
    pub sales_exceptions: Vec<String>,
    /// `None` follows the aggression level; aggressive filtering drops the exception.
    pub allow_senior_coordinator: Option<bool>,
}

impl Default for HardFilterKeywords {
    fn default() -> Self {
        Self {
            role_blocks: strings(&[
                "hr",
                "human resources",
                "people operations",
                "people ops",
                "people partner",
                "head of people",
                "vp of people",
                "vp people",
                "vp, people",
                "director of people",
                "people and culture",
                "people & culture",
                "talent acquisition",
                "recruiter",
                "recruiting",
            ]),
            role_exceptions: strings(&["chief people officer"]),
            department_blocks: strings(&[
                "marketing manager",
                "marketing director",
                "director of marketing",
                "head of marketing",
                "vp of marketing",
                "vp marketing",
                "product marketing",
                "brand marketing",
                "digital marketing",
                "growth marketing",
                "content marketing",
                "marketing communications",
            ]),
            sales_marketing_blocks: strings(&[
                "sales and marketing",
                "sales & marketing",
                "marketing and sales",
                "sales/marketing",
            ]),
            sales_blocks: strings(&[
                "sales",
                "account executive",
                "account manager",
                "business development representative",
                "sdr",
                "bdr",
            ]),
            sales_exceptions: strings(&[
                "director",
                "head of",
                "vp",
                "vice president",
                "svp",
                "evp",
                "chief",
            ]),
            allow_senior_coordinator: None,
        }
    }
}

/// Post-scoring veto settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContextFilterSettings {
    /// Keywords that rescue an "associate" title from the associate hard filter.
    pub associate_exceptions: Vec<String>,
    pub software_engineering_exceptions: Vec<String>,
    pub contract_keywords: Vec<String>,
    /// Seniority sub-score a contract role must reach to be kept (25 is director level).
    pub contract_min_seniority_score: i32,
}

impl Default for ContextFilterSettings {
    fn default() -> Self {
        Self {
            associate_exceptions: strings(&["director", "vp", "principal", "chief"]),
            software_engineering_exceptions: strings(&["hardware", "product"]),
            contract_keywords: strings(&["contract", "contractor", "temporary", "temp", "interim"]),
            contract_min_seniority_score: 25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggressionLevel {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl AggressionLevel {
    /// Classification confidence needed before the software-company penalty is applied.
    pub fn software_penalty_min_confidence(self) -> f64 {
        match self {
            AggressionLevel::Conservative => 0.7,
            AggressionLevel::Moderate => 0.5,
            AggressionLevel::Aggressive => 0.3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AggressionLevel::Conservative => "conservative",
            AggressionLevel::Moderate => "moderate",
            AggressionLevel::Aggressive => "aggressive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilteringSettings {
    pub aggression: AggressionLevel,
    pub hardware_company_boost: i32,
    pub software_company_penalty: i32,
}

impl Default for FilteringSettings {
    fn default() -> Self {
        Self {
            aggression: AggressionLevel::Moderate,
            hardware_company_boost: 10,
            software_company_penalty: -20,
        }
    }
}

/// Profile loading and validation failures. Each variant names the offending field.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("could not read profile {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("profile is not valid JSON for the expected schema: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("profile field `{field}` is required and must not be empty")]
    Missing { field: String },
    #[error("profile field `{field}` is {value}, expected a value in [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("grade thresholds must not increase from A to D (found {found})")]
    NonMonotonicGrades { found: String },
    #[error(transparent)]
    Keyword(#[from] KeywordError),
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
