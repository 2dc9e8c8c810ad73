use crate::matching::KeywordSet;
use crate::profile::{CandidateProfile, ProfileError};

use super::breakdown::SubScoreBounds;

/// Role-shape scoring differs per candidate archetype, so the scorer holds it behind a trait.
pub trait RoleTypeScorer: Send + Sync {
    /// Points for the role shape in `title`, within [-20, 20].
    fn score(&self, title: &str) -> i32;
}

struct RoleGroup {
    name: String,
    points: i32,
    keywords: KeywordSet,
}

/// Default archetype: the profile's named keyword groups. The best rewarding group and the
/// harshest penalizing group that match are added together.
pub struct KeywordRoleTypeScorer {
    groups: Vec<RoleGroup>,
}

impl KeywordRoleTypeScorer {
    pub fn from_profile(profile: &CandidateProfile) -> Result<Self, ProfileError> {
        let groups = profile
            .role_types
            .iter()
            .map(|(name, group)| {
                Ok(RoleGroup {
                    name: name.clone(),
                    points: group.points,
                    keywords: KeywordSet::new(&group.keywords)?,
                })
            })
            .collect::<Result<Vec<_>, ProfileError>>()?;

        Ok(Self { groups })
    }

    /// Names of the groups matching `title`, for audit output.
    pub fn matched_groups(&self, title: &str) -> Vec<&str> {
        self.groups
            .iter()
            .filter(|group| group.keywords.matches(title))
            .map(|group| group.name.as_str())
            .collect()
    }
}

impl RoleTypeScorer for KeywordRoleTypeScorer {
    fn score(&self, title: &str) -> i32 {
        let mut reward = 0;
        let mut penalty = 0;

        for group in self.groups.iter().filter(|group| group.keywords.matches(title)) {
            if group.points >= 0 {
                reward = reward.max(group.points);
            } else {
                penalty = penalty.min(group.points);
            }
        }

        SubScoreBounds::ROLE_TYPE.clamp(reward + penalty)
    }
}
