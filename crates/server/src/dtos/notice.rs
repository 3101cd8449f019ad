use super::{AttachmentResponse, attachments};
use chrono::NaiveDateTime;
use database::{entities::notices, services::notice::NoticeChanges};
use models::{priority::Priority, role::Role};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoticeResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: String,
    #[schema(value_type = String, example = "high")]
    pub priority: Priority,
    /// Empty means every role
    #[schema(value_type = Vec<String>)]
    pub target_roles: Vec<Role>,
    pub department_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub attachments: Vec<AttachmentResponse>,
    pub author_id: Uuid,
    pub is_active: bool,
    pub expires_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<notices::Model> for NoticeResponse {
    fn from(n: notices::Model) -> Self {
        Self {
            id: n.id,
            title: n.title,
            content: n.content,
            category: n.category,
            priority: n.priority,
            target_roles: n.target_roles.0,
            department_id: n.department_id,
            class_id: n.class_id,
            attachments: attachments(n.attachments),
            author_id: n.author_id,
            is_active: n.is_active,
            expires_at: n.expires_at,
            created_at: n.created_at,
            updated_at: n.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoticeRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    #[schema(value_type = Option<String>)]
    pub priority: Option<Priority>,
    #[schema(value_type = Option<Vec<String>>)]
    pub target_roles: Option<Vec<Role>>,
    pub expires_at: Option<NaiveDateTime>,
    pub is_active: Option<bool>,
}

impl From<UpdateNoticeRequest> for NoticeChanges {
    fn from(r: UpdateNoticeRequest) -> Self {
        Self {
            title: r.title,
            content: r.content,
            category: r.category,
            priority: r.priority,
            target_roles: r.target_roles,
            expires_at: r.expires_at,
            is_active: r.is_active,
        }
    }
}
