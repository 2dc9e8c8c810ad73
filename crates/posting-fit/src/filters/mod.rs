//! Two-stage veto pipeline around scoring.
//!
//! Hard filters run on the title alone before any scoring and stop at the first match.
//! Context filters run afterwards and may use the computed breakdown.

mod reason;


use tracing::debug;

use crate::matching::KeywordSet;
use crate::profile::{CandidateProfile, ProfileError};
use crate::scoring::ScoreBreakdown;

pub use reason::{FilterDecision, FilterReason};

const JUNIOR: &[&str] = &["junior", "jr", "entry level", "entry-level", "new grad"];
const INTERN: &[&str] = &["intern", "internship", "co-op"];
const COORDINATOR: &[&str] = &["coordinator"];
const SENIOR_COORDINATOR: &[&str] = &["senior coordinator"];
const ASSOCIATE: &[&str] = &["associate"];
const FINANCE: &[&str] = &[
    "financ*",
    "accounting",
    "accountant",
    "controller",
    "treasurer",
    "cfo",
];
const LEGAL: &[&str] = &["legal", "counsel", "compliance", "paralegal", "attorney"];
const ADMINISTRATIVE: &[&str] = &[
    "administrative",
    "executive assistant",
    "office manager",
    "receptionist",
    "secretary",
    "clerk",
];
const MARKETING: &[&str] = &["marketing", "cmo"];
/// Lets combined sales/marketing titles fall through to their own rule.
const MARKETING_EXCEPTIONS: &[&str] = &["sales"];
const RETAIL: &[&str] = &["retail", "store manager", "cashier", "merchandiser"];

/// One hard filter: blocks when any keyword matches and no exception does.
struct HardRule {
    reason: FilterReason,
    blocks: KeywordSet,
    exceptions: KeywordSet,
}

impl HardRule {
    fn new(
        reason: FilterReason,
        blocks: KeywordSet,
        exceptions: KeywordSet,
    ) -> Self {
        Self {
            reason,
            blocks,
            exceptions,
        }
    }

    fn vetoes(&self, title: &str) -> bool {
        self.blocks.matches(title) && !self.exceptions.matches(title)
    }
}

pub struct FilterPipeline {
    hard_rules: Vec<HardRule>,
    software: KeywordSet,
    engineering: KeywordSet,
    software_exceptions: KeywordSet,
    contract: KeywordSet,
    contract_min_seniority: i32,
}

impl FilterPipeline {
    pub fn new(profile: &CandidateProfile) -> Result<Self, ProfileError> {
        let hard = &profile.hard_filter_keywords;
        let context = &profile.context_filters;

        let senior_coordinator = if profile.allows_senior_coordinator() {
            KeywordSet::new(SENIOR_COORDINATOR)?
        } else {
            KeywordSet::default()
        };
        let department_blocks = KeywordSet::new(&hard.department_blocks)?;
        let marketing = KeywordSet::new(
            department_blocks
                .subset_containing("marketing")
                .keywords()
                .chain(MARKETING.iter().copied()),
        )?;
        let marketing_exceptions = KeywordSet::new(
            MARKETING_EXCEPTIONS
                .iter()
                .copied()
                .chain(hard.sales_marketing_blocks.iter().map(String::as_str)),
        )?;

        // Evaluation order is part of the contract: the first matching rule names the veto.
        let hard_rules = vec![
            HardRule::new(FilterReason::Junior, KeywordSet::new(JUNIOR)?, KeywordSet::default()),
            HardRule::new(FilterReason::Intern, KeywordSet::new(INTERN)?, KeywordSet::default()),
            HardRule::new(
                FilterReason::Coordinator,
                KeywordSet::new(COORDINATOR)?,
                senior_coordinator,
            ),
            HardRule::new(
                FilterReason::AssociateLowSeniority,
                KeywordSet::new(ASSOCIATE)?,
                KeywordSet::new(&context.associate_exceptions)?,
            ),
            HardRule::new(
                FilterReason::HrRole,
                KeywordSet::new(&hard.role_blocks)?,
                KeywordSet::new(&hard.role_exceptions)?,
            ),
            HardRule::new(FilterReason::Finance, KeywordSet::new(FINANCE)?, KeywordSet::default()),
            HardRule::new(FilterReason::Legal, KeywordSet::new(LEGAL)?, KeywordSet::default()),
            HardRule::new(
                FilterReason::Marketing,
                marketing,
                marketing_exceptions,
            ),
            HardRule::new(
                FilterReason::SalesMarketing,
                KeywordSet::new(&hard.sales_marketing_blocks)?,
                KeywordSet::default(),
            ),
            HardRule::new(
                FilterReason::Sales,
                KeywordSet::new(&hard.sales_blocks)?,
                KeywordSet::new(&hard.sales_exceptions)?,
            ),
            HardRule::new(
                FilterReason::Administrative,
                KeywordSet::new(ADMINISTRATIVE)?,
                KeywordSet::default(),
            ),
            HardRule::new(FilterReason::Retail, KeywordSet::new(RETAIL)?, KeywordSet::default()),
        ];

        Ok(Self {
            hard_rules,
            software: KeywordSet::new(["software"])?,
            engineering: KeywordSet::new(["engineering"])?,
            software_exceptions: KeywordSet::new(&context.software_engineering_exceptions)?,
            contract: KeywordSet::new(&context.contract_keywords)?,
            contract_min_seniority: context.contract_min_seniority_score,
        })
    }

    /// Pre-scoring vetoes, checked in fixed order; the first match wins.
    pub fn apply_hard_filters(&self, title: &str) -> FilterDecision {
        match self.hard_rules.iter().find(|rule| rule.vetoes(title)) {
            Some(rule) => {
                debug!(title, reason = %rule.reason, "hard filter veto");
                FilterDecision::block(rule.reason)
            }
            None => FilterDecision::pass(),
        }
    }

    /// Post-scoring vetoes that depend on the computed breakdown.
    pub fn apply_context_filters(&self, title: &str, breakdown: &ScoreBreakdown) -> FilterDecision {
        let reason = if self.software.matches(title)
            && self.engineering.matches(title)
            && !self.software_exceptions.matches(title)
        {
            Some(FilterReason::SoftwareEngineering)
        } else if self.contract.matches(title) && breakdown.seniority < self.contract_min_seniority
        {
            Some(FilterReason::ContractLowSeniority)
        } else {
            None
        };

        match reason {
            Some(reason) => {
                debug!(title, reason = %reason, seniority = breakdown.seniority, "context filter veto");
                FilterDecision::block(reason)
            }
            None => FilterDecision::pass(),
        }
    }
}
