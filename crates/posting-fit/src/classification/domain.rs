use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// What a company builds, as far as the signals can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyType {
    Hardware,
    Software,
    Both,
    Unknown,
}

impl CompanyType {
    pub const fn label(self) -> &'static str {
        match self {
            CompanyType::Hardware => "hardware",
            CompanyType::Software => "software",
            CompanyType::Both => "both",
            CompanyType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CompanyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a classification came from the signals or from an operator override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationSource {
    Auto,
    Manual,
}

/// Independent evidence sources, ordered from heaviest to lightest weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    CuratedList,
    NameKeywords,
    DomainKeywords,
    JobContent,
}

impl SignalKind {
    pub const ALL: [SignalKind; 4] = [
        SignalKind::CuratedList,
        SignalKind::NameKeywords,
        SignalKind::DomainKeywords,
        SignalKind::JobContent,
    ];

    pub const fn weight(self) -> f64 {
        match self {
            SignalKind::CuratedList => 0.4,
            SignalKind::NameKeywords => 0.3,
            SignalKind::DomainKeywords => 0.2,
            SignalKind::JobContent => 0.1,
        }
    }
}

/// One signal's vote and its strength in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    #[serde(rename = "type")]
    pub company_type: CompanyType,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<String>,
}

impl SignalResult {
    pub fn unknown() -> Self {
        Self {
            company_type: CompanyType::Unknown,
            score: 0.0,
            evidence: Vec::new(),
        }
    }

    pub fn new(company_type: CompanyType, score: f64, evidence: Vec<String>) -> Self {
        Self {
            company_type,
            score: score.clamp(0.0, 1.0),
            evidence,
        }
    }
}

/// Raised when a classification would carry a confidence outside [0, 1].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("classification confidence must be within [0.0, 1.0], got {0}")]
pub struct InvalidConfidence(pub f64);

/// Final classification for a company together with the audit trail that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyClassification {
    #[serde(rename = "type")]
    pub company_type: CompanyType,
    #[serde(deserialize_with = "deserialize_confidence")]
    confidence: f64,
    #[serde(default)]
    pub signals: BTreeMap<SignalKind, SignalResult>,
    pub source: ClassificationSource,
}

impl CompanyClassification {
    pub fn new(
        company_type: CompanyType,
        confidence: f64,
        signals: BTreeMap<SignalKind, SignalResult>,
        source: ClassificationSource,
    ) -> Result<Self, InvalidConfidence> {
        Ok(Self {
            company_type,
            confidence: checked_confidence(confidence)?,
            signals,
            source,
        })
    }

    /// Operator override; fully trusted.
    pub fn manual(company_type: CompanyType) -> Self {
        Self {
            company_type,
            confidence: 1.0,
            signals: BTreeMap::new(),
            source: ClassificationSource::Manual,
        }
    }

    pub fn unknown() -> Self {
        Self {
            company_type: CompanyType::Unknown,
            confidence: 0.0,
            signals: BTreeMap::new(),
            source: ClassificationSource::Auto,
        }
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn is_manual(&self) -> bool {
        self.source == ClassificationSource::Manual
    }
}

fn checked_confidence(value: f64) -> Result<f64, InvalidConfidence> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(InvalidConfidence(value))
    }
}

fn deserialize_confidence<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    checked_confidence(raw).map_err(serde::de::Error::custom)
}

/// Everything the classifier may look at for one company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationInput {
    pub company: String,
    #[serde(default)]
    pub domain_keywords: Vec<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
}

impl ClassificationInput {
    pub fn for_company(company: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            ..Self::default()
        }
    }
}

/// Store key for a company: lowercase with collapsed whitespace.
pub fn company_key(company: &str) -> String {
    company
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
