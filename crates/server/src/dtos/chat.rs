use super::user::UserSummary;
use chrono::NaiveDateTime;
use database::{
    entities::chat_messages,
    services::chat::{ChatDetail, ChatSummary},
};
use models::chat::ChatType;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectChatRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupChatRequest {
    pub name: String,
    pub participant_ids: Vec<Uuid>,
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct MessageQueryParams {
    /// Only messages older than this timestamp
    pub before: Option<NaiveDateTime>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MuteRequest {
    pub muted: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BlockRequest {
    pub blocked: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantsRequest {
    pub user_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResponse {
    pub user: UserSummary,
    pub is_admin: bool,
    pub is_muted: bool,
    pub has_blocked: bool,
    pub last_read_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub id: Uuid,
    #[schema(value_type = String, example = "direct")]
    pub chat_type: ChatType,
    pub name: Option<String>,
    pub department_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub last_message_at: Option<NaiveDateTime>,
    pub participants: Vec<ParticipantResponse>,
}

impl From<ChatDetail> for ChatResponse {
    fn from(d: ChatDetail) -> Self {
        let participants = d
            .participants
            .into_iter()
            .map(|p| ParticipantResponse {
                is_admin: p.membership.is_admin,
                is_muted: p.membership.is_muted,
                has_blocked: p.membership.has_blocked,
                last_read_at: p.membership.last_read_at,
                user: p.user.into(),
            })
            .collect();

        Self {
            id: d.chat.id,
            chat_type: d.chat.chat_type,
            name: d.chat.name,
            department_id: d.chat.department_id,
            created_by: d.chat.created_by,
            last_message_at: d.chat.last_message_at,
            participants,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub is_deleted: bool,
    pub created_at: NaiveDateTime,
}

impl From<chat_messages::Model> for ChatMessageResponse {
    fn from(m: chat_messages::Model) -> Self {
        Self {
            id: m.id,
            chat_id: m.chat_id,
            sender_id: m.sender_id,
            content: m.content,
            is_deleted: m.is_deleted,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummaryResponse {
    pub chat: ChatResponse,
    pub last_message: Option<ChatMessageResponse>,
    pub unread: u64,
}

impl From<ChatSummary> for ChatSummaryResponse {
    fn from(s: ChatSummary) -> Self {
        Self {
            chat: s.detail.into(),
            last_message: s.last_message.map(Into::into),
            unread: s.unread,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceiptResponse {
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub last_read_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSettingsResponse {
    pub chat_id: Uuid,
    pub is_muted: bool,
    pub has_blocked: bool,
}
