use serde::{Deserialize, Serialize};

/// Inclusive bounds of one sub-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubScoreBounds {
    pub min: i32,
    pub max: i32,
}

impl SubScoreBounds {
    pub const SENIORITY: Self = Self { min: 0, max: 30 };
    pub const DOMAIN: Self = Self { min: 5, max: 25 };
    pub const ROLE_TYPE: Self = Self { min: -20, max: 20 };
    pub const LOCATION: Self = Self { min: 0, max: 15 };
    pub const TECHNICAL: Self = Self { min: 0, max: 10 };
    pub const COMPANY_CLASSIFICATION: Self = Self { min: -50, max: 50 };

    pub fn contains(self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn clamp(self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }
}

/// Per-category contributions to a posting's fit score. The total is always their sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub seniority: i32,
    pub domain: i32,
    pub role_type: i32,
    pub location: i32,
    pub technical: i32,
    pub company_classification: i32,
}

impl ScoreBreakdown {
    pub fn entries(&self) -> [(&'static str, i32); 6] {
        [
            ("seniority", self.seniority),
            ("domain", self.domain),
            ("role_type", self.role_type),
            ("location", self.location),
            ("technical", self.technical),
            ("company_classification", self.company_classification),
        ]
    }

    pub fn total(&self) -> i32 {
        self.entries().iter().map(|(_, value)| value).sum()
    }

    /// Categories whose value falls outside the documented range.
    pub fn out_of_bounds(&self) -> Vec<&'static str> {
        let bounds = [
            SubScoreBounds::SENIORITY,
            SubScoreBounds::DOMAIN,
            SubScoreBounds::ROLE_TYPE,
            SubScoreBounds::LOCATION,
            SubScoreBounds::TECHNICAL,
            SubScoreBounds::COMPANY_CLASSIFICATION,
        ];

        self.entries()
            .iter()
            .zip(bounds)
            .filter(|((_, value), bound)| !bound.contains(*value))
            .map(|((name, _), _)| *name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_sum_of_entries() {
        let breakdown = ScoreBreakdown {
            seniority: 30,
            domain: 20,
            role_type: -5,
            location: 15,
            technical: 6,
            company_classification: 10,
        };
        assert_eq!(breakdown.total(), 76);
        assert!(breakdown.out_of_bounds().is_empty());
    }

    #[test]
    fn flags_out_of_range_categories() {
        let breakdown = ScoreBreakdown {
            seniority: 31,
            domain: 0,
            ..ScoreBreakdown::default()
        };
        assert_eq!(breakdown.out_of_bounds(), vec!["seniority", "domain"]);
    }
}
