//! Fit sub-scores, the seniority hierarchy they lean on, and grading.

mod breakdown;
mod grade;
mod hierarchy;
mod role_type;
mod rules;


pub use breakdown::{ScoreBreakdown, SubScoreBounds};
pub use grade::{calculate_grade, Grade, GradeThresholds};
pub use hierarchy::{SeniorityHierarchy, HIERARCHY_VERSION, MAX_LEVEL};
pub use role_type::{KeywordRoleTypeScorer, RoleTypeScorer};
pub use rules::FitScorer;
