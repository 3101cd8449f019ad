//! Role and department checks shared by the route handlers

use crate::error::{ApiError, ApiResult};
use database::entities::users;
use models::role::Role;
use uuid::Uuid;

pub fn require_role(user: &users::Model, roles: &[Role]) -> ApiResult<()> {
    if roles.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "Role {} is not allowed to perform this action",
            user.role.as_str()
        )))
    }
}

pub fn require_manager(user: &users::Model) -> ApiResult<()> {
    require_role(user, &[Role::Admin, Role::DepartmentAdmin])
}

/// Admins reach every department, everyone else only their own
pub fn require_department_access(user: &users::Model, department_id: Uuid) -> ApiResult<()> {
    if user.role == Role::Admin || user.department_id == Some(department_id) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Access limited to your own department"))
    }
}

/// A manager of the target's department, or the target themselves
pub fn require_self_or_manager(user: &users::Model, target: &users::Model) -> ApiResult<()> {
    if user.id == target.id {
        return Ok(());
    }
    require_can_manage(user, target.role, target.department_id)
}

/// Whether `user` may create or modify accounts with the given role and department
pub fn require_can_manage(
    user: &users::Model,
    role: Role,
    department_id: Option<Uuid>,
) -> ApiResult<()> {
    if !user.role.can_manage(role) {
        return Err(ApiError::forbidden(format!(
            "Not allowed to manage {} accounts",
            role.as_str()
        )));
    }
    if user.role == Role::DepartmentAdmin && department_id != user.department_id {
        return Err(ApiError::forbidden("Access limited to your own department"));
    }
    Ok(())
}

/// The department a non-admin is confined to, `None` for admins
pub fn department_scope(user: &users::Model) -> Option<Uuid> {
    match user.role {
        Role::Admin => None,
        _ => user.department_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use models::role::UserStatus;
    use rstest::rstest;

    fn user(role: Role, department_id: Option<Uuid>) -> users::Model {
        let now = Utc::now().naive_utc();
        users::Model {
            id: Uuid::new_v4(),
            name: "Test".into(),
            email: "test@campus.test".into(),
            password_hash: String::new(),
            role,
            department_id,
            class_id: None,
            semester: None,
            roll_number: None,
            phone: None,
            status: UserStatus::Active,
            is_class_teacher: false,
            cgpa: None,
            reset_token: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[case(Role::Admin, true)]
    #[case(Role::DepartmentAdmin, true)]
    #[case(Role::Faculty, false)]
    #[case(Role::Student, false)]
    fn test_require_manager(#[case] role: Role, #[case] allowed: bool) {
        assert_eq!(require_manager(&user(role, None)).is_ok(), allowed);
    }

    #[test]
    fn test_department_access() {
        let dept = Uuid::new_v4();
        assert!(require_department_access(&user(Role::Admin, None), dept).is_ok());
        assert!(require_department_access(&user(Role::Faculty, Some(dept)), dept).is_ok());
        assert!(require_department_access(&user(Role::Student, Some(Uuid::new_v4())), dept).is_err());
    }

    #[test]
    fn test_department_admin_manages_own_department_only() {
        let dept = Uuid::new_v4();
        let admin = user(Role::DepartmentAdmin, Some(dept));

        assert!(require_can_manage(&admin, Role::Student, Some(dept)).is_ok());
        assert!(require_can_manage(&admin, Role::Faculty, Some(Uuid::new_v4())).is_err());
        assert!(require_can_manage(&admin, Role::DepartmentAdmin, Some(dept)).is_err());
    }

    #[test]
    fn test_self_or_manager() {
        let dept = Uuid::new_v4();
        let student = user(Role::Student, Some(dept));
        let classmate = user(Role::Student, Some(dept));

        assert!(require_self_or_manager(&student, &student).is_ok());
        assert!(require_self_or_manager(&classmate, &student).is_err());
        assert!(require_self_or_manager(&user(Role::Admin, None), &student).is_ok());
    }
}
