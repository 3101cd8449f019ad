use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

/// Maximum marks for a single mid-term exam
pub const MID_MAX: f64 = 30.0;
/// Maximum marks for the external (end-semester) exam
pub const EXTERNAL_MAX: f64 = 70.0;
/// Internal + external
pub const TOTAL_MAX: f64 = MID_MAX + EXTERNAL_MAX;

/// Rounds to two decimal places, the precision every derived mark is stored at
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Letter grades on the ten point scale
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, AsRefStr,
)]
pub enum LetterGrade {
    #[strum(serialize = "O")]
    #[serde(rename = "O")]
    Outstanding,
    #[strum(serialize = "A+")]
    #[serde(rename = "A+")]
    Excellent,
    #[strum(serialize = "A")]
    #[serde(rename = "A")]
    VeryGood,
    #[strum(serialize = "B+")]
    #[serde(rename = "B+")]
    Good,
    #[strum(serialize = "B")]
    #[serde(rename = "B")]
    AboveAverage,
    #[strum(serialize = "C")]
    #[serde(rename = "C")]
    Average,
    #[strum(serialize = "F")]
    #[serde(rename = "F")]
    Fail,
}

impl LetterGrade {
    /// Cutoffs in descending order; the first one a percentage reaches wins
    const CUTOFFS: [(f64, LetterGrade); 6] = [
        (90.0, Self::Outstanding),
        (80.0, Self::Excellent),
        (70.0, Self::VeryGood),
        (60.0, Self::Good),
        (50.0, Self::AboveAverage),
        (40.0, Self::Average),
    ];

    pub fn from_percentage(percentage: f64) -> Self {
        Self::CUTOFFS
            .iter()
            .find(|(cutoff, _)| percentage >= *cutoff)
            .map(|(_, grade)| *grade)
            .unwrap_or(Self::Fail)
    }

    pub fn points(self) -> f64 {
        match self {
            Self::Outstanding => 10.0,
            Self::Excellent => 9.0,
            Self::VeryGood => 8.0,
            Self::Good => 7.0,
            Self::AboveAverage => 6.0,
            Self::Average => 5.0,
            Self::Fail => 0.0,
        }
    }

    pub fn is_pass(self) -> bool {
        self != Self::Fail
    }

    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    pub fn all() -> Vec<LetterGrade> {
        LetterGrade::iter().collect()
    }
}

impl Display for LetterGrade {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Why a mark sheet was rejected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MarkError {
    Negative(&'static str),
    OverLimit { field: &'static str, max: f64 },
    NotFinite(&'static str),
}

impl Display for MarkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Negative(field) => write!(f, "{field} cannot be negative"),
            Self::OverLimit { field, max } => write!(f, "{field} cannot exceed {max}"),
            Self::NotFinite(field) => write!(f, "{field} must be a number"),
        }
    }
}

impl std::error::Error for MarkError {}

/// Raw exam marks for one student in one subject
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkSheet {
    pub mid1: Option<f64>,
    pub mid2: Option<f64>,
    pub external: Option<f64>,
}

/// Marks derived from a [`MarkSheet`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub internal: f64,
    pub total: f64,
    pub percentage: f64,
    pub grade: LetterGrade,
    pub grade_points: f64,
}

impl MarkSheet {
    pub fn new(mid1: Option<f64>, mid2: Option<f64>, external: Option<f64>) -> Self {
        Self {
            mid1,
            mid2,
            external,
        }
    }

    pub fn validate(&self) -> Result<(), MarkError> {
        let fields = [
            ("mid1", self.mid1, MID_MAX),
            ("mid2", self.mid2, MID_MAX),
            ("external", self.external, EXTERNAL_MAX),
        ];

        for (field, value, max) in fields {
            let Some(value) = value else { continue };
            if !value.is_finite() {
                return Err(MarkError::NotFinite(field));
            }
            if value < 0.0 {
                return Err(MarkError::Negative(field));
            }
            if value > max {
                return Err(MarkError::OverLimit { field, max });
            }
        }

        Ok(())
    }

    /// Internal marks are the mean of whichever mid exams have been written
    pub fn internal(&self) -> f64 {
        let mids: Vec<f64> = [self.mid1, self.mid2].into_iter().flatten().collect();
        if mids.is_empty() {
            return 0.0;
        }
        round2(mids.iter().sum::<f64>() / mids.len() as f64)
    }

    pub fn evaluate(&self) -> Evaluation {
        let internal = self.internal();
        let total = round2(internal + self.external.unwrap_or(0.0));
        let percentage = round2(total / TOTAL_MAX * 100.0);
        let grade = LetterGrade::from_percentage(percentage);

        Evaluation {
            internal,
            total,
            percentage,
            grade,
            grade_points: grade.points(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case(100.0, LetterGrade::Outstanding)]
    #[case(90.0, LetterGrade::Outstanding)]
    #[case(89.99, LetterGrade::Excellent)]
    #[case(80.0, LetterGrade::Excellent)]
    #[case(70.0, LetterGrade::VeryGood)]
    #[case(65.5, LetterGrade::Good)]
    #[case(50.0, LetterGrade::AboveAverage)]
    #[case(40.0, LetterGrade::Average)]
    #[case(39.99, LetterGrade::Fail)]
    #[case(0.0, LetterGrade::Fail)]
    fn test_grade_cutoffs(#[case] percentage: f64, #[case] expected: LetterGrade) {
        assert_eq!(LetterGrade::from_percentage(percentage), expected);
    }

    #[test]
    fn test_grade_strings() {
        assert_eq!(LetterGrade::Excellent.to_string(), "A+");
        assert_eq!(LetterGrade::from_str("B+").unwrap(), LetterGrade::Good);
        assert_eq!(
            serde_json::to_string(&LetterGrade::Outstanding).unwrap(),
            "\"O\""
        );
        assert_eq!(LetterGrade::all().len(), 7);
    }

    #[test]
    fn test_evaluate_full_sheet() {
        let sheet = MarkSheet::new(Some(25.0), Some(28.0), Some(60.0));
        let eval = sheet.evaluate();

        assert_eq!(eval.internal, 26.5);
        assert_eq!(eval.total, 86.5);
        assert_eq!(eval.percentage, 86.5);
        assert_eq!(eval.grade, LetterGrade::Excellent);
        assert_eq!(eval.grade_points, 9.0);
    }

    #[test]
    fn test_evaluate_single_mid() {
        let sheet = MarkSheet::new(Some(20.0), None, None);
        let eval = sheet.evaluate();

        assert_eq!(eval.internal, 20.0);
        assert_eq!(eval.total, 20.0);
        assert_eq!(eval.grade, LetterGrade::Fail);
        assert!(!eval.grade.is_pass());
    }

    #[test]
    fn test_evaluate_empty_sheet() {
        let eval = MarkSheet::default().evaluate();
        assert_eq!(eval.internal, 0.0);
        assert_eq!(eval.total, 0.0);
        assert_eq!(eval.grade_points, 0.0);
    }

    #[test]
    fn test_validate_limits() {
        assert!(MarkSheet::new(Some(30.0), Some(0.0), Some(70.0)).validate().is_ok());
        assert_eq!(
            MarkSheet::new(Some(31.0), None, None).validate(),
            Err(MarkError::OverLimit {
                field: "mid1",
                max: MID_MAX
            })
        );
        assert_eq!(
            MarkSheet::new(None, None, Some(-1.0)).validate(),
            Err(MarkError::Negative("external"))
        );
        assert_eq!(
            MarkSheet::new(None, Some(f64::NAN), None).validate(),
            Err(MarkError::NotFinite("mid2"))
        );
    }
}
