use std::fmt;

use serde::{Deserialize, Serialize};

/// Letter grade derived from the total fit score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub const fn label(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    const fn rank(self) -> u8 {
        match self {
            Grade::A => 4,
            Grade::B => 3,
            Grade::C => 2,
            Grade::D => 1,
            Grade::F => 0,
        }
    }

    /// True when this grade is `minimum` or better.
    pub fn meets(self, minimum: Grade) -> bool {
        self.rank() >= minimum.rank()
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lower bounds for each passing letter over the nominal 0–115 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GradeThresholds {
    pub a: i32,
    pub b: i32,
    pub c: i32,
    pub d: i32,
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            a: 98,
            b: 80,
            c: 63,
            d: 46,
        }
    }
}

pub fn calculate_grade(total_score: i32, thresholds: &GradeThresholds) -> Grade {
    if total_score >= thresholds.a {
        Grade::A
    } else if total_score >= thresholds.b {
        Grade::B
    } else if total_score >= thresholds.c {
        Grade::C
    } else if total_score >= thresholds.d {
        Grade::D
    } else {
        Grade::F
    }
}
