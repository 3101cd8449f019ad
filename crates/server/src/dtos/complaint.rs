use super::{AttachmentResponse, attachments};
use chrono::NaiveDateTime;
use database::{
    entities::{complaint_history, complaints},
    services::complaint::{ComplaintDetail, StatusChange},
};
use models::{complaint::ComplaintStatus, priority::Priority};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    #[schema(value_type = String)]
    pub priority: Priority,
    #[schema(value_type = String, example = "inProgress")]
    pub status: ComplaintStatus,
    pub raised_by: Uuid,
    pub department_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub resolution: Option<String>,
    pub attachments: Vec<AttachmentResponse>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<complaints::Model> for ComplaintResponse {
    fn from(c: complaints::Model) -> Self {
        Self {
            id: c.id,
            title: c.title,
            description: c.description,
            category: c.category,
            priority: c.priority,
            status: c.status,
            raised_by: c.raised_by,
            department_id: c.department_id,
            assigned_to: c.assigned_to,
            resolution: c.resolution,
            attachments: attachments(c.attachments),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryResponse {
    #[schema(value_type = String)]
    pub status: ComplaintStatus,
    pub comment: Option<String>,
    pub changed_by: Uuid,
    pub changed_at: NaiveDateTime,
}

impl From<complaint_history::Model> for HistoryEntryResponse {
    fn from(h: complaint_history::Model) -> Self {
        Self {
            status: h.status,
            comment: h.comment,
            changed_by: h.changed_by,
            changed_at: h.changed_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComplaintDetailResponse {
    pub complaint: ComplaintResponse,
    pub history: Vec<HistoryEntryResponse>,
}

impl From<ComplaintDetail> for ComplaintDetailResponse {
    fn from(d: ComplaintDetail) -> Self {
        Self {
            complaint: d.complaint.into(),
            history: d.history.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ComplaintQueryParams {
    #[param(value_type = Option<String>)]
    pub status: Option<ComplaintStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateComplaintStatusRequest {
    #[schema(value_type = String, example = "resolved")]
    pub status: ComplaintStatus,
    pub comment: Option<String>,
    pub resolution: Option<String>,
}

impl From<UpdateComplaintStatusRequest> for StatusChange {
    fn from(r: UpdateComplaintStatusRequest) -> Self {
        Self {
            status: r.status,
            comment: r.comment,
            resolution: r.resolution,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignComplaintRequest {
    pub assignee_id: Uuid,
}
