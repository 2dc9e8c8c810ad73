use super::{CandidateProfile, ProfileError};

const ADJUSTMENT_BOUND: i64 = 50;
const ROLE_POINTS_BOUND: i64 = 20;
const SENIORITY_MAX: i64 = 30;

pub(super) fn validate(profile: &CandidateProfile) -> Result<(), ProfileError> {
    require_keywords("target_seniority", &profile.target_seniority)?;
    require_keywords("domain_keywords", &profile.domain_keywords)?;

    for (name, group) in &profile.role_types {
        require_keywords(&format!("role_types.{name}.keywords"), &group.keywords)?;
        within(
            &format!("role_types.{name}.points"),
            group.points as i64,
            -ROLE_POINTS_BOUND,
            ROLE_POINTS_BOUND,
        )?;
    }

    within(
        "filtering.hardware_company_boost",
        profile.filtering.hardware_company_boost as i64,
        -ADJUSTMENT_BOUND,
        ADJUSTMENT_BOUND,
    )?;
    within(
        "filtering.software_company_penalty",
        profile.filtering.software_company_penalty as i64,
        -ADJUSTMENT_BOUND,
        ADJUSTMENT_BOUND,
    )?;
    within(
        "context_filters.contract_min_seniority_score",
        profile.context_filters.contract_min_seniority_score as i64,
        0,
        SENIORITY_MAX,
    )?;

    let grades = &profile.grading;
    if !(grades.a >= grades.b && grades.b >= grades.c && grades.c >= grades.d) {
        return Err(ProfileError::NonMonotonicGrades {
            found: format!("A={} B={} C={} D={}", grades.a, grades.b, grades.c, grades.d),
        });
    }

    Ok(())
}

fn require_keywords(field: &str, values: &[String]) -> Result<(), ProfileError> {
    if values.is_empty() || values.iter().all(|value| value.trim().is_empty()) {
        return Err(ProfileError::Missing {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn within(field: &str, value: i64, min: i64, max: i64) -> Result<(), ProfileError> {
    if value < min || value > max {
        return Err(ProfileError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(())
}
