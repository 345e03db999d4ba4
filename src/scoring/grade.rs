use serde::Serialize;
use std::fmt;

/// Letter grade assigned to a 0–10 score, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    D,
    #[serde(rename = "D-")]
    DMinus,
    F,
}

impl Grade {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::CMinus => "C-",
            Grade::DPlus => "D+",
            Grade::D => "D",
            Grade::DMinus => "D-",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Converts a 0–10 score into a letter grade.
///
/// The thresholds are 10/13 apart, rounded to two decimals:
///
/// | Score   | Grade |
/// |---------|-------|
/// | >= 9.23 | A+    |
/// | >= 8.46 | A     |
/// | >= 7.69 | A-    |
/// | >= 6.92 | B+    |
/// | >= 6.15 | B     |
/// | >= 5.38 | B-    |
/// | >= 4.61 | C+    |
/// | >= 3.85 | C     |
/// | >= 3.08 | C-    |
/// | >= 2.31 | D+    |
/// | >= 1.54 | D     |
/// | >= 0.77 | D-    |
/// | else    | F     |
///
/// NaN fails every comparison and grades `F`.
pub fn convert_to_grade(score: f64) -> Grade {
    match score {
        s if s >= 9.23 => Grade::APlus,
        s if s >= 8.46 => Grade::A,
        s if s >= 7.69 => Grade::AMinus,
        s if s >= 6.92 => Grade::BPlus,
        s if s >= 6.15 => Grade::B,
        s if s >= 5.38 => Grade::BMinus,
        s if s >= 4.61 => Grade::CPlus,
        s if s >= 3.85 => Grade::C,
        s if s >= 3.08 => Grade::CMinus,
        s if s >= 2.31 => Grade::DPlus,
        s if s >= 1.54 => Grade::D,
        s if s >= 0.77 => Grade::DMinus,
        _ => Grade::F,
    }
}
