use std::collections::BTreeSet;

use crate::matching::{KeywordError, KeywordSet};

/// Bumped whenever a keyword moves between levels so stored scores can be traced back.
pub const HIERARCHY_VERSION: &str = "2024.1";

pub const MAX_LEVEL: u8 = 8;

const LEVELS: [&[&str]; 9] = [
    &[
        "intern",
        "internship",
        "junior",
        "jr",
        "entry level",
        "entry-level",
        "apprentice",
        "trainee",
    ],
    &["associate", "coordinator", "specialist", "analyst"],
    &["senior", "sr"],
    &["staff", "lead"],
    &["principal", "senior staff"],
    &["manager", "senior manager"],
    &["director", "senior director", "head of"],
    &["vp", "vice president", "svp", "evp"],
    &["chief", "cto", "ceo", "coo", "cfo", "cpo", "c-level"],
];

/// Read-only keyword table ranking title seniority from 0 (intern) to 8 (C-level).
#[derive(Debug, Clone)]
pub struct SeniorityHierarchy {
    levels: Vec<KeywordSet>,
}

impl SeniorityHierarchy {
    pub fn standard() -> Result<Self, KeywordError> {
        let levels = LEVELS
            .iter()
            .map(|keywords| KeywordSet::new(keywords.iter().copied()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { levels })
    }

    pub fn version(&self) -> &'static str {
        HIERARCHY_VERSION
    }

    pub fn keywords_at(&self, level: u8) -> Vec<&str> {
        self.levels
            .get(level as usize)
            .map(|set| set.keywords().collect())
            .unwrap_or_default()
    }

    /// Highest level whose keywords appear in `title`; `None` for titles with no seniority cue.
    pub fn detect_level(&self, title: &str) -> Option<u8> {
        if title.trim().is_empty() {
            return None;
        }

        self.levels
            .iter()
            .enumerate()
            .rev()
            .find(|(_, keywords)| keywords.matches(title))
            .map(|(level, _)| level as u8)
    }

    /// Maps profile keywords onto levels through the same lookup titles use.
    pub fn detect_target_levels<I, S>(&self, keywords: I) -> BTreeSet<u8>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keywords
            .into_iter()
            .filter_map(|keyword| self.detect_level(keyword.as_ref()))
            .collect()
    }
}
