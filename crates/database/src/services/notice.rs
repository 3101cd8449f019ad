use crate::{
    entities::{
        attachment::{Attachment, Attachments, RoleList},
        classes, departments, notices, users,
    },
    error::{ServiceError, ServiceResult},
    services::{non_empty, now},
};
use chrono::NaiveDateTime;
use log::info;
use models::{
    priority::Priority,
    role::{Role, UserStatus},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

pub const DEFAULT_CATEGORY: &str = "general";

#[derive(Debug, Clone)]
pub struct NewNotice {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub priority: Priority,
    pub target_roles: Vec<Role>,
    pub department_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub attachments: Vec<Attachment>,
    pub expires_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default)]
pub struct NoticeChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub target_roles: Option<Vec<Role>>,
    pub expires_at: Option<NaiveDateTime>,
    pub is_active: Option<bool>,
}

/// Whether `viewer` is in the audience of a live notice
pub fn is_visible(notice: &notices::Model, viewer: &users::Model, at: NaiveDateTime) -> bool {
    if !notice.is_active || notice.expires_at.is_some_and(|e| e <= at) {
        return false;
    }
    if viewer.role == Role::Admin || notice.author_id == viewer.id {
        return true;
    }
    if notice.department_id.is_some() && notice.department_id != viewer.department_id {
        return false;
    }
    if viewer.role == Role::Student && notice.class_id.is_some() && notice.class_id != viewer.class_id
    {
        return false;
    }
    notice.target_roles.admits(viewer.role)
}

pub struct NoticeService;

impl NoticeService {
    pub async fn create(
        db: &DatabaseConnection,
        new: NewNotice,
        author_id: Uuid,
    ) -> ServiceResult<notices::Model> {
        let title = new.title.trim().to_string();
        let content = new.content.trim().to_string();
        if title.is_empty() || content.is_empty() {
            return Err(ServiceError::validation("Title and content are required"));
        }

        let mut department_id = new.department_id;
        if let Some(class_id) = new.class_id {
            let class = classes::Entity::find_by_id(class_id)
                .one(db)
                .await?
                .ok_or(ServiceError::NotFound("Class"))?;
            if department_id.is_some_and(|d| d != class.department_id) {
                return Err(ServiceError::validation(
                    "Class belongs to another department",
                ));
            }
            department_id = Some(class.department_id);
        } else if let Some(id) = department_id {
            departments::Entity::find_by_id(id)
                .one(db)
                .await?
                .ok_or(ServiceError::NotFound("Department"))?;
        }

        let mut target_roles = new.target_roles;
        target_roles.sort_by_key(|r| r.as_str().to_string());
        target_roles.dedup();

        let timestamp = now();
        let notice = notices::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            content: Set(content),
            category: Set(non_empty(new.category).unwrap_or_else(|| DEFAULT_CATEGORY.into())),
            priority: Set(new.priority),
            target_roles: Set(RoleList(target_roles)),
            department_id: Set(department_id),
            class_id: Set(new.class_id),
            attachments: Set(Attachments(new.attachments)),
            author_id: Set(author_id),
            is_active: Set(true),
            expires_at: Set(new.expires_at),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(db)
        .await?;

        info!("Published notice {} by {author_id}", notice.id);
        Ok(notice)
    }

    pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> ServiceResult<notices::Model> {
        notices::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Notice"))
    }

    /// Live notices addressed to the viewer, newest first
    pub async fn visible_to<C: ConnectionTrait>(
        db: &C,
        viewer: &users::Model,
    ) -> ServiceResult<Vec<notices::Model>> {
        let at = now();
        let mut query = notices::Entity::find()
            .filter(notices::Column::IsActive.eq(true))
            .filter(
                Condition::any()
                    .add(notices::Column::ExpiresAt.is_null())
                    .add(notices::Column::ExpiresAt.gt(at)),
            );

        if viewer.role != Role::Admin {
            let mut scope = Condition::any().add(notices::Column::DepartmentId.is_null());
            if let Some(department_id) = viewer.department_id {
                scope = scope.add(notices::Column::DepartmentId.eq(department_id));
            }
            query = query.filter(
                Condition::any()
                    .add(scope)
                    .add(notices::Column::AuthorId.eq(viewer.id)),
            );
        }

        Ok(query
            .order_by_desc(notices::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .filter(|n| is_visible(n, viewer, at))
            .collect())
    }

    /// Active users in the audience of a notice, for real-time delivery
    pub async fn audience<C: ConnectionTrait>(
        db: &C,
        notice: &notices::Model,
    ) -> ServiceResult<Vec<Uuid>> {
        let mut condition = Condition::all().add(users::Column::Status.eq(UserStatus::Active));
        if let Some(department_id) = notice.department_id {
            condition = condition.add(
                Condition::any()
                    .add(users::Column::DepartmentId.eq(department_id))
                    .add(users::Column::Role.eq(Role::Admin)),
            );
        }

        let at = now();
        Ok(users::Entity::find()
            .filter(condition)
            .all(db)
            .await?
            .into_iter()
            .filter(|u| is_visible(notice, u, at))
            .map(|u| u.id)
            .collect())
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        changes: NoticeChanges,
    ) -> ServiceResult<notices::Model> {
        let notice = Self::get(db, id).await?;
        let mut active: notices::ActiveModel = notice.into();

        if let Some(title) = non_empty(changes.title) {
            active.title = Set(title);
        }
        if let Some(content) = non_empty(changes.content) {
            active.content = Set(content);
        }
        if let Some(category) = non_empty(changes.category) {
            active.category = Set(category);
        }
        if let Some(priority) = changes.priority {
            active.priority = Set(priority);
        }
        if let Some(roles) = changes.target_roles {
            active.target_roles = Set(RoleList(roles));
        }
        if let Some(expires_at) = changes.expires_at {
            active.expires_at = Set(Some(expires_at));
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(now());

        let notice = active.update(db).await?;
        info!("Updated notice {}", notice.id);
        Ok(notice)
    }

    /// Deletes the notice and hands back its row so attachments can be cleaned up
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> ServiceResult<notices::Model> {
        let notice = Self::get(db, id).await?;
        notices::Entity::delete_by_id(id).exec(db).await?;

        info!("Deleted notice {id}");
        Ok(notice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(role: Role, department_id: Option<Uuid>, class_id: Option<Uuid>) -> users::Model {
        let at = now();
        users::Model {
            id: Uuid::new_v4(),
            name: "Viewer".into(),
            email: "viewer@campus.test".into(),
            password_hash: String::new(),
            role,
            department_id,
            class_id,
            semester: None,
            roll_number: None,
            phone: None,
            status: UserStatus::Active,
            is_class_teacher: false,
            cgpa: None,
            reset_token: None,
            reset_token_expires_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn notice(department_id: Option<Uuid>, class_id: Option<Uuid>, roles: Vec<Role>) -> notices::Model {
        let at = now();
        notices::Model {
            id: Uuid::new_v4(),
            title: "Exam schedule".into(),
            content: "Mid exams start Monday".into(),
            category: DEFAULT_CATEGORY.into(),
            priority: Priority::High,
            target_roles: RoleList(roles),
            department_id,
            class_id,
            attachments: Attachments::default(),
            author_id: Uuid::new_v4(),
            is_active: true,
            expires_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_campus_wide_notice_reaches_everyone() {
        let n = notice(None, None, vec![]);
        let at = now();
        for role in Role::all() {
            assert!(is_visible(&n, &user(role, Some(Uuid::new_v4()), None), at));
        }
    }

    #[test]
    fn test_department_scope() {
        let dept = Uuid::new_v4();
        let n = notice(Some(dept), None, vec![]);
        let at = now();

        assert!(is_visible(&n, &user(Role::Faculty, Some(dept), None), at));
        assert!(!is_visible(&n, &user(Role::Faculty, Some(Uuid::new_v4()), None), at));
        assert!(is_visible(&n, &user(Role::Admin, None, None), at));
    }

    #[test]
    fn test_class_scope_only_limits_students() {
        let dept = Uuid::new_v4();
        let class = Uuid::new_v4();
        let n = notice(Some(dept), Some(class), vec![]);
        let at = now();

        assert!(is_visible(&n, &user(Role::Student, Some(dept), Some(class)), at));
        assert!(!is_visible(&n, &user(Role::Student, Some(dept), Some(Uuid::new_v4())), at));
        assert!(is_visible(&n, &user(Role::Faculty, Some(dept), None), at));
    }

    #[test]
    fn test_target_roles() {
        let n = notice(None, None, vec![Role::Faculty]);
        let at = now();

        assert!(is_visible(&n, &user(Role::Faculty, None, None), at));
        assert!(!is_visible(&n, &user(Role::Student, None, None), at));
    }

    #[test]
    fn test_expired_and_inactive_are_hidden() {
        let viewer = user(Role::Student, None, None);
        let at = now();

        let mut expired = notice(None, None, vec![]);
        expired.expires_at = Some(at - Duration::hours(1));
        assert!(!is_visible(&expired, &viewer, at));

        let mut inactive = notice(None, None, vec![]);
        inactive.is_active = false;
        assert!(!is_visible(&inactive, &viewer, at));
    }
}
