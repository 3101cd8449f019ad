use crate::grading::round2;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, AsRefStr,
)]
#[cfg_attr(feature = "database", derive(sea_orm::DeriveActiveEnum))]
#[cfg_attr(feature = "database", sea_orm(rs_type = "String", db_type = "Text"))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    #[cfg_attr(feature = "database", sea_orm(string_value = "present"))]
    Present,
    #[cfg_attr(feature = "database", sea_orm(string_value = "absent"))]
    Absent,
}

impl AttendanceStatus {
    pub fn is_present(self) -> bool {
        self == Self::Present
    }
}

/// Attended versus held periods
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub total: u32,
    pub present: u32,
    pub absent: u32,
    pub percentage: f64,
}

impl AttendanceSummary {
    pub fn from_counts(total: u32, present: u32) -> Self {
        let present = present.min(total);
        let percentage = if total == 0 {
            0.0
        } else {
            round2(f64::from(present) / f64::from(total) * 100.0)
        };

        Self {
            total,
            present,
            absent: total - present,
            percentage,
        }
    }

    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = AttendanceStatus>,
    {
        let (total, present) = statuses.into_iter().fold((0, 0), |(total, present), s| {
            (total + 1, present + u32::from(s.is_present()))
        });
        Self::from_counts(total, present)
    }

    /// Adds another summary's counts, recomputing the percentage
    pub fn merge(self, other: Self) -> Self {
        Self::from_counts(self.total + other.total, self.present + other.present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_from_counts() {
        let summary = AttendanceSummary::from_counts(3, 2);
        assert_eq!(summary.absent, 1);
        assert_eq!(summary.percentage, 66.67);
    }

    #[test]
    fn test_summary_empty() {
        let summary = AttendanceSummary::from_counts(0, 0);
        assert_eq!(summary.percentage, 0.0);
        assert_eq!(summary, AttendanceSummary::default());
    }

    #[test]
    fn test_summary_from_statuses_and_merge() {
        use AttendanceStatus::*;
        let a = AttendanceSummary::from_statuses([Present, Absent, Present, Present]);
        assert_eq!(a.present, 3);
        assert_eq!(a.percentage, 75.0);

        let merged = a.merge(AttendanceSummary::from_statuses([Absent]));
        assert_eq!(merged.total, 5);
        assert_eq!(merged.percentage, 60.0);
    }
}
