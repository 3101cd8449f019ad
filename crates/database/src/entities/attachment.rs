use models::role::Role;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// A file stored under the upload directory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    /// Public path, e.g. `/uploads/notices/<uuid>-syllabus.pdf`
    pub url: String,
    pub size: u64,
    pub content_type: Option<String>,
}

/// Attachments stored as a JSON column
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Attachments(pub Vec<Attachment>);

/// Audience roles stored as a JSON column, empty means everyone
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct RoleList(pub Vec<Role>);

impl RoleList {
    pub fn admits(&self, role: Role) -> bool {
        self.0.is_empty() || self.0.contains(&role)
    }
}
