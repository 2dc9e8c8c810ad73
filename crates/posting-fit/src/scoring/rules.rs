use std::collections::BTreeSet;
use std::sync::Arc;

use crate::matching::KeywordSet;
use crate::profile::{CandidateProfile, ProfileError};

use super::breakdown::SubScoreBounds;
use super::hierarchy::SeniorityHierarchy;
use super::role_type::{KeywordRoleTypeScorer, RoleTypeScorer};

const ABSOLUTE_TIERS: [(i32, &[&str]); 4] = [
    (
        30,
        &[
            "vp", "vice president", "svp", "evp", "chief", "cto", "ceo", "coo", "cfo", "cpo",
            "c-level", "head of",
        ],
    ),
    (25, &["director", "executive"]),
    (15, &["senior manager", "principal", "staff", "senior"]),
    (10, &["manager", "lead"]),
];

const GENERIC_DOMAIN: [&str; 2] = ["engineering", "product"];

/// Computes the five profile-driven sub-scores. Every method is pure, so one scorer can be
/// shared across worker threads.
pub struct FitScorer {
    hierarchy: Arc<SeniorityHierarchy>,
    target_levels: BTreeSet<u8>,
    absolute_tiers: Vec<(i32, KeywordSet)>,
    domain: KeywordSet,
    generic_domain: KeywordSet,
    technical: KeywordSet,
    remote: KeywordSet,
    hybrid: KeywordSet,
    cities: KeywordSet,
    regions: KeywordSet,
    role_type: Box<dyn RoleTypeScorer>,
}

impl FitScorer {
    pub fn new(
        profile: &CandidateProfile,
        hierarchy: Arc<SeniorityHierarchy>,
    ) -> Result<Self, ProfileError> {
        let target_levels = hierarchy.detect_target_levels(&profile.target_seniority);
        let absolute_tiers = ABSOLUTE_TIERS
            .iter()
            .map(|(points, keywords)| Ok((*points, KeywordSet::new(keywords.iter().copied())?)))
            .collect::<Result<Vec<_>, ProfileError>>()?;
        let location = &profile.location_preferences;

        Ok(Self {
            target_levels,
            absolute_tiers,
            domain: KeywordSet::new(&profile.domain_keywords)?,
            generic_domain: KeywordSet::new(GENERIC_DOMAIN)?,
            technical: KeywordSet::new(profile.technical_vocabulary())?,
            remote: KeywordSet::new(&location.remote_keywords)?,
            hybrid: KeywordSet::new(&location.hybrid_keywords)?,
            cities: KeywordSet::new(&location.preferred_cities)?,
            regions: KeywordSet::new(&location.preferred_regions)?,
            role_type: Box::new(KeywordRoleTypeScorer::from_profile(profile)?),
            hierarchy,
        })
    }

    /// Swap the role-type archetype while keeping the rest of the profile wiring.
    pub fn with_role_type_scorer(mut self, scorer: Box<dyn RoleTypeScorer>) -> Self {
        self.role_type = scorer;
        self
    }

    pub fn hierarchy(&self) -> &SeniorityHierarchy {
        &self.hierarchy
    }

    pub fn target_levels(&self) -> &BTreeSet<u8> {
        &self.target_levels
    }

    pub fn score_seniority(&self, title: &str) -> i32 {
        if self.target_levels.is_empty() {
            return self.absolute_seniority(title);
        }

        let Some(level) = self.hierarchy.detect_level(title) else {
            return 0;
        };

        if self.target_levels.contains(&level) {
            return 30;
        }

        let distance = self
            .target_levels
            .iter()
            .map(|target| level.abs_diff(*target))
            .min()
            .unwrap_or(u8::MAX);

        match distance {
            0 => 30,
            1 => 25,
            2 => 15,
            3 => 10,
            _ => 5,
        }
    }

    fn absolute_seniority(&self, title: &str) -> i32 {
        self.absolute_tiers
            .iter()
            .find(|(_, keywords)| keywords.matches(title))
            .map(|(points, _)| *points)
            .unwrap_or(0)
    }

    pub fn score_domain(&self, title: &str, company: &str) -> i32 {
        let text = combined(title, company);
        let score = match self.domain.count(&text) {
            n if n >= 3 => 25,
            2 => 20,
            1 => 15,
            _ if self.generic_domain.matches(&text) => 10,
            _ => 5,
        };
        SubScoreBounds::DOMAIN.clamp(score)
    }

    pub fn score_location(&self, location: Option<&str>) -> i32 {
        let location = match location.map(str::trim) {
            Some(value) if !value.is_empty() => value,
            _ => return 0,
        };

        let in_city = self.cities.matches(location);
        let in_region = self.regions.matches(location);

        if self.remote.matches(location) {
            15
        } else if self.hybrid.matches(location) && (in_city || in_region) {
            15
        } else if in_city {
            12
        } else if in_region {
            8
        } else {
            0
        }
    }

    pub fn score_technical(&self, title: &str, company: &str) -> i32 {
        let matches = self.technical.count(&combined(title, company)) as i32;
        SubScoreBounds::TECHNICAL.clamp(matches * 2)
    }

    pub fn score_role_type(&self, title: &str) -> i32 {
        if title.trim().is_empty() {
            return 0;
        }
        SubScoreBounds::ROLE_TYPE.clamp(self.role_type.score(title))
    }

    /// Profile domain keywords present in the posting, fed to the company classifier.
    pub fn matched_domain_keywords(&self, title: &str, company: &str) -> Vec<String> {
        self.domain
            .matched(&combined(title, company))
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

fn combined(title: &str, company: &str) -> String {
    format!("{title} {company}")
}
