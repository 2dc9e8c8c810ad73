use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of veto tags consumed by audit logs and digest filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterReason {
    #[serde(rename = "hard_filter_junior")]
    Junior,
    #[serde(rename = "hard_filter_intern")]
    Intern,
    #[serde(rename = "hard_filter_coordinator")]
    Coordinator,
    #[serde(rename = "hard_filter_associate_low_seniority")]
    AssociateLowSeniority,
    #[serde(rename = "hard_filter_hr_role")]
    HrRole,
    #[serde(rename = "hard_filter_finance")]
    Finance,
    #[serde(rename = "hard_filter_legal")]
    Legal,
    #[serde(rename = "hard_filter_marketing")]
    Marketing,
    #[serde(rename = "hard_filter_sales_marketing")]
    SalesMarketing,
    #[serde(rename = "hard_filter_sales")]
    Sales,
    #[serde(rename = "hard_filter_administrative")]
    Administrative,
    #[serde(rename = "hard_filter_retail")]
    Retail,
    #[serde(rename = "context_filter_software_engineering")]
    SoftwareEngineering,
    #[serde(rename = "context_filter_contract_low_seniority")]
    ContractLowSeniority,
}

impl FilterReason {
    pub const fn tag(self) -> &'static str {
        match self {
            FilterReason::Junior => "hard_filter_junior",
            FilterReason::Intern => "hard_filter_intern",
            FilterReason::Coordinator => "hard_filter_coordinator",
            FilterReason::AssociateLowSeniority => "hard_filter_associate_low_seniority",
            FilterReason::HrRole => "hard_filter_hr_role",
            FilterReason::Finance => "hard_filter_finance",
            FilterReason::Legal => "hard_filter_legal",
            FilterReason::Marketing => "hard_filter_marketing",
            FilterReason::SalesMarketing => "hard_filter_sales_marketing",
            FilterReason::Sales => "hard_filter_sales",
            FilterReason::Administrative => "hard_filter_administrative",
            FilterReason::Retail => "hard_filter_retail",
            FilterReason::SoftwareEngineering => "context_filter_software_engineering",
            FilterReason::ContractLowSeniority => "context_filter_contract_low_seniority",
        }
    }

    pub const fn is_hard(self) -> bool {
        !matches!(
            self,
            FilterReason::SoftwareEngineering | FilterReason::ContractLowSeniority
        )
    }

    pub fn summary(self) -> String {
        match self {
            FilterReason::Junior => "blocked as a junior role".to_string(),
            FilterReason::Intern => "blocked as an internship".to_string(),
            FilterReason::Coordinator => "blocked as a coordinator role".to_string(),
            FilterReason::AssociateLowSeniority => {
                "blocked as an associate role without senior cues".to_string()
            }
            FilterReason::HrRole => "blocked as an HR or people-operations role".to_string(),
            FilterReason::Finance => "blocked as a finance role".to_string(),
            FilterReason::Legal => "blocked as a legal role".to_string(),
            FilterReason::Marketing => "blocked as a marketing role".to_string(),
            FilterReason::SalesMarketing => "blocked as a sales and marketing role".to_string(),
            FilterReason::Sales => "blocked as a sales role below director".to_string(),
            FilterReason::Administrative => "blocked as an administrative role".to_string(),
            FilterReason::Retail => "blocked as a retail role".to_string(),
            FilterReason::SoftwareEngineering => {
                "vetoed as pure software engineering leadership".to_string()
            }
            FilterReason::ContractLowSeniority => {
                "vetoed as a contract role below the seniority floor".to_string()
            }
        }
    }
}

impl fmt::Display for FilterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Outcome of one filter stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDecision {
    pub passed: bool,
    pub reason: Option<FilterReason>,
}

impl FilterDecision {
    pub const fn pass() -> Self {
        Self {
            passed: true,
            reason: None,
        }
    }

    pub const fn block(reason: FilterReason) -> Self {
        Self {
            passed: false,
            reason: Some(reason),
        }
    }
}
