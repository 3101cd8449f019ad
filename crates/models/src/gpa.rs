use crate::grading::round2;
use serde::{Deserialize, Serialize};

/// Credits and grade points earned in a single subject
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreditPoints {
    pub credits: u32,
    pub grade_points: f64,
}

impl CreditPoints {
    pub fn new(credits: u32, grade_points: f64) -> Self {
        Self {
            credits,
            grade_points,
        }
    }
}

/// Aggregated outcome of one semester
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SemesterResult {
    pub semester: u32,
    pub sgpa: f64,
    pub total_credits: u32,
    pub is_completed: bool,
}

impl SemesterResult {
    pub fn from_subjects(semester: u32, subjects: &[CreditPoints], is_completed: bool) -> Self {
        Self {
            semester,
            sgpa: sgpa(subjects),
            total_credits: subjects.iter().map(|s| s.credits).sum(),
            is_completed,
        }
    }
}

/// Credit weighted mean of grade points
pub fn sgpa(subjects: &[CreditPoints]) -> f64 {
    let total_credits: u32 = subjects.iter().map(|s| s.credits).sum();
    if total_credits == 0 {
        return 0.0;
    }

    let weighted: f64 = subjects
        .iter()
        .map(|s| f64::from(s.credits) * s.grade_points)
        .sum();

    round2(weighted / f64::from(total_credits))
}

/// Plain mean of SGPA over completed semesters
///
/// Incomplete semesters are ignored; `None` until at least one semester is complete.
pub fn cgpa(semesters: &[SemesterResult]) -> Option<f64> {
    let completed: Vec<f64> = semesters
        .iter()
        .filter(|s| s.is_completed)
        .map(|s| s.sgpa)
        .collect();

    if completed.is_empty() {
        return None;
    }

    Some(round2(completed.iter().sum::<f64>() / completed.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sgpa_weighted() {
        let subjects = [
            CreditPoints::new(4, 10.0),
            CreditPoints::new(3, 8.0),
            CreditPoints::new(2, 6.0),
        ];
        // (40 + 24 + 12) / 9
        assert_eq!(sgpa(&subjects), 8.44);
    }

    #[test]
    fn test_sgpa_no_credits() {
        assert_eq!(sgpa(&[]), 0.0);
        assert_eq!(sgpa(&[CreditPoints::new(0, 9.0)]), 0.0);
    }

    #[test]
    fn test_semester_result_totals() {
        let result = SemesterResult::from_subjects(
            2,
            &[CreditPoints::new(4, 9.0), CreditPoints::new(2, 0.0)],
            true,
        );
        assert_eq!(result.total_credits, 6);
        assert_eq!(result.sgpa, 6.0);
    }

    #[test]
    fn test_cgpa_ignores_incomplete() {
        let semesters = [
            SemesterResult {
                semester: 1,
                sgpa: 8.0,
                total_credits: 20,
                is_completed: true,
            },
            SemesterResult {
                semester: 2,
                sgpa: 9.0,
                total_credits: 22,
                is_completed: true,
            },
            SemesterResult {
                semester: 3,
                sgpa: 2.0,
                total_credits: 4,
                is_completed: false,
            },
        ];
        assert_eq!(cgpa(&semesters), Some(8.5));
    }

    #[test]
    fn test_cgpa_none_without_completed() {
        let semesters = [SemesterResult {
            semester: 1,
            sgpa: 7.0,
            total_credits: 10,
            is_completed: false,
        }];
        assert_eq!(cgpa(&semesters), None);
        assert_eq!(cgpa(&[]), None);
    }
}
