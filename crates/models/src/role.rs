use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

/// The role a user holds within the campus
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, AsRefStr,
)]
#[cfg_attr(feature = "database", derive(sea_orm::DeriveActiveEnum))]
#[cfg_attr(feature = "database", sea_orm(rs_type = "String", db_type = "Text"))]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Role {
    /// Top-level administrator, owns every department
    #[cfg_attr(feature = "database", sea_orm(string_value = "admin"))]
    Admin,
    /// Administrator scoped to a single department
    #[cfg_attr(feature = "database", sea_orm(string_value = "departmentAdmin"))]
    DepartmentAdmin,
    #[cfg_attr(feature = "database", sea_orm(string_value = "faculty"))]
    Faculty,
    #[cfg_attr(feature = "database", sea_orm(string_value = "student"))]
    Student,
}

impl Role {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    pub fn all() -> Vec<Role> {
        Role::iter().collect()
    }

    /// Whether a user with this role may create or edit users holding `other`
    pub fn can_manage(self, other: Role) -> bool {
        match self {
            Self::Admin => true,
            Self::DepartmentAdmin => matches!(other, Self::Faculty | Self::Student),
            Self::Faculty | Self::Student => false,
        }
    }

    /// Admins of either level
    pub fn is_manager(self) -> bool {
        matches!(self, Self::Admin | Self::DepartmentAdmin)
    }

    /// Roles that must be bound to a department
    pub fn requires_department(self) -> bool {
        !matches!(self, Self::Admin)
    }
}

/// Soft account state, inactive users cannot sign in
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
pub enum UserStatus {
    #[default]
    #[cfg_attr(feature = "database", sea_orm(string_value = "active"))]
    Active,
    #[cfg_attr(feature = "database", sea_orm(string_value = "inactive"))]
    Inactive,
}

impl UserStatus {
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_round_trip() {
        for role in Role::all() {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
        assert_eq!(Role::DepartmentAdmin.as_str(), "departmentAdmin");
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&Role::DepartmentAdmin).unwrap();
        assert_eq!(json, "\"departmentAdmin\"");

        let role: Role = serde_json::from_str("\"faculty\"").unwrap();
        assert_eq!(role, Role::Faculty);
    }

    #[test]
    fn test_can_manage() {
        assert!(Role::Admin.can_manage(Role::DepartmentAdmin));
        assert!(Role::DepartmentAdmin.can_manage(Role::Student));
        assert!(!Role::DepartmentAdmin.can_manage(Role::DepartmentAdmin));
        assert!(!Role::DepartmentAdmin.can_manage(Role::Admin));
        assert!(!Role::Faculty.can_manage(Role::Student));
    }

    #[test]
    fn test_status_default_is_active() {
        assert!(UserStatus::default().is_active());
        assert!(!UserStatus::Inactive.is_active());
    }
}
