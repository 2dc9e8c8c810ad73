use serde::{Deserialize, Serialize};

use crate::matching::{KeywordError, KeywordSet};

use super::domain::{company_key, CompanyType};

pub const TABLES_VERSION: &str = "2024.1";

/// Indicator vocabularies and curated company lists, as loaded from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierTablesConfig {
    pub version: String,
    pub hardware_indicators: Vec<String>,
    pub software_indicators: Vec<String>,
    pub hardware_companies: Vec<String>,
    pub software_companies: Vec<String>,
    pub both_companies: Vec<String>,
}

impl Default for ClassifierTablesConfig {
    fn default() -> Self {
        Self {
            version: TABLES_VERSION.to_string(),
            hardware_indicators: strings(&[
                "hardware",
                "robotics",
                "robot",
                "automation",
                "semiconductor*",
                "electronics",
                "devices",
                "instruments",
                "manufacturing",
                "embedded",
                "firmware",
                "fpga",
                "asic",
                "mechanical",
                "aerospace",
                "motors",
                "sensors",
                "lidar",
                "drones",
                "medical devices",
                "battery",
                "batteries",
            ]),
            software_indicators: strings(&[
                "software",
                "saas",
                "cloud",
                "apps",
                "app",
                "platform",
                "analytics",
                "data",
                "ai",
                "machine learning",
                "web",
                "mobile",
                "fintech",
                "cybersecurity",
                "devops",
                "backend",
                "frontend",
                "full stack",
            ]),
            hardware_companies: strings(&[
                "boston dynamics",
                "irobot",
                "tesla",
                "nvidia",
                "intel",
                "amd",
                "qualcomm",
                "analog devices",
                "texas instruments",
                "rockwell automation",
                "teradyne",
                "garmin",
                "anduril",
                "skydio",
                "formlabs",
                "markforged",
                "zebra technologies",
            ]),
            software_companies: strings(&[
                "salesforce",
                "atlassian",
                "shopify",
                "stripe",
                "datadog",
                "snowflake",
                "hubspot",
                "dropbox",
                "twilio",
                "asana",
                "workday",
                "servicenow",
            ]),
            both_companies: strings(&[
                "apple",
                "google",
                "microsoft",
                "amazon",
                "meta",
                "samsung",
                "sony",
                "siemens",
            ]),
        }
    }
}

struct CuratedList {
    company_type: CompanyType,
    exact: Vec<String>,
    partial: KeywordSet,
}

/// Compiled, read-only form of [`ClassifierTablesConfig`] shared by every classification.
pub struct ClassifierTables {
    version: String,
    hardware: KeywordSet,
    software: KeywordSet,
    curated: Vec<CuratedList>,
}

/// Where a curated-list hit came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CuratedMatch {
    Exact { company_type: CompanyType, entry: String },
    Partial { company_type: CompanyType, entry: String },
}

impl ClassifierTables {
    pub fn standard() -> Result<Self, KeywordError> {
        Self::compile(&ClassifierTablesConfig::default())
    }

    pub fn compile(config: &ClassifierTablesConfig) -> Result<Self, KeywordError> {
        let curated = [
            (CompanyType::Both, &config.both_companies),
            (CompanyType::Hardware, &config.hardware_companies),
            (CompanyType::Software, &config.software_companies),
        ]
        .into_iter()
        .map(|(company_type, entries)| {
            Ok(CuratedList {
                company_type,
                exact: entries.iter().map(|entry| company_key(entry)).collect(),
                partial: KeywordSet::new(entries)?,
            })
        })
        .collect::<Result<Vec<_>, KeywordError>>()?;

        Ok(Self {
            version: config.version.clone(),
            hardware: KeywordSet::new(&config.hardware_indicators)?,
            software: KeywordSet::new(&config.software_indicators)?,
            curated,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn hardware_indicators(&self) -> &KeywordSet {
        &self.hardware
    }

    pub fn software_indicators(&self) -> &KeywordSet {
        &self.software
    }

    /// Exact membership in any list beats a partial hit; lists are checked both, hardware,
    /// software.
    pub fn curated_match(&self, company: &str) -> Option<CuratedMatch> {
        let key = company_key(company);
        if key.is_empty() {
            return None;
        }

        let exact = self.curated.iter().find_map(|list| {
            list.exact
                .iter()
                .find(|entry| **entry == key)
                .map(|entry| CuratedMatch::Exact {
                    company_type: list.company_type,
                    entry: entry.clone(),
                })
        });

        exact.or_else(|| {
            self.curated.iter().find_map(|list| {
                list.partial
                    .matched(&key)
                    .first()
                    .map(|entry| CuratedMatch::Partial {
                        company_type: list.company_type,
                        entry: entry.to_string(),
                    })
            })
        })
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
