use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// Lifecycle of a complaint ticket
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[cfg_attr(feature = "database", derive(sea_orm::DeriveActiveEnum))]
#[cfg_attr(feature = "database", sea_orm(rs_type = "String", db_type = "Text"))]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ComplaintStatus {
    #[default]
    #[cfg_attr(feature = "database", sea_orm(string_value = "pending"))]
    Pending,
    #[cfg_attr(feature = "database", sea_orm(string_value = "inProgress"))]
    InProgress,
    #[cfg_attr(feature = "database", sea_orm(string_value = "resolved"))]
    Resolved,
    #[cfg_attr(feature = "database", sea_orm(string_value = "rejected"))]
    Rejected,
}

impl ComplaintStatus {
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }

    /// Closed tickets may only be reopened to pending
    pub fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (a, b) if a == b => false,
            (Self::Pending, _) => true,
            (Self::InProgress, _) => true,
            (Self::Resolved | Self::Rejected, Self::Pending) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ComplaintStatus::Pending, ComplaintStatus::InProgress, true)]
    #[case(ComplaintStatus::Pending, ComplaintStatus::Rejected, true)]
    #[case(ComplaintStatus::InProgress, ComplaintStatus::Resolved, true)]
    #[case(ComplaintStatus::InProgress, ComplaintStatus::Pending, true)]
    #[case(ComplaintStatus::Resolved, ComplaintStatus::Pending, true)]
    #[case(ComplaintStatus::Resolved, ComplaintStatus::InProgress, false)]
    #[case(ComplaintStatus::Rejected, ComplaintStatus::Resolved, false)]
    #[case(ComplaintStatus::Pending, ComplaintStatus::Pending, false)]
    fn test_transitions(
        #[case] from: ComplaintStatus,
        #[case] to: ComplaintStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&ComplaintStatus::InProgress).unwrap(),
            "\"inProgress\""
        );
        assert!(ComplaintStatus::Rejected.is_closed());
    }
}
