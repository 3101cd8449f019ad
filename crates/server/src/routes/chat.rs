use crate::{
    auth::{AuthUser, policy::require_role},
    dtos::{
        MessageResponse,
        chat::{
            BlockRequest, ChatMessageResponse, ChatResponse, ChatSummaryResponse,
            DirectChatRequest, GroupChatRequest, MessageQueryParams, MuteRequest,
            ParticipantSettingsResponse, ParticipantsRequest, ReadReceiptResponse,
            SendMessageRequest,
        },
    },
    error::{ApiError, ApiResult},
    realtime::events,
    state::SharedState,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use database::{entities::chat_participants, services::chat::ChatService};
use models::role::Role;
use serde_json::json;
use uuid::Uuid;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_chats))
        .route("/direct", post(direct_chat))
        .route("/group", post(group_chat))
        .route("/{id}", get(get_chat))
        .route("/{id}/messages", get(list_messages).post(send_message))
        .route("/{id}/messages/{message_id}", delete(delete_message))
        .route("/{id}/read", post(mark_read))
        .route("/{id}/mute", post(set_muted))
        .route("/{id}/block", post(set_blocked))
        .route("/{id}/participants", post(add_participants))
        .route("/{id}/participants/{user_id}", delete(remove_participant))
}

fn settings(membership: chat_participants::Model) -> ParticipantSettingsResponse {
    ParticipantSettingsResponse {
        chat_id: membership.chat_id,
        is_muted: membership.is_muted,
        has_blocked: membership.has_blocked,
    }
}

/// Opens the direct chat with another user, creating it on first contact
#[utoipa::path(
    post,
    path = "/api/chat/direct",
    request_body = DirectChatRequest,
    responses(
        (status = 200, description = "Direct chat", body = ChatResponse),
        (status = 400, description = "Cannot chat with yourself"),
        (status = 404, description = "User not found")
    ),
    security(("jwt" = [])),
    tag = "Chat"
)]
pub async fn direct_chat(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Json(body): Json<DirectChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let chat = ChatService::direct(&state.db, actor.id, body.user_id).await?;
    Ok(Json(chat.into()))
}

#[utoipa::path(
    post,
    path = "/api/chat/group",
    request_body = GroupChatRequest,
    responses(
        (status = 201, description = "Group created", body = ChatResponse),
        (status = 400, description = "Missing name or unknown participants"),
        (status = 403, description = "Students cannot create groups")
    ),
    security(("jwt" = [])),
    tag = "Chat"
)]
pub async fn group_chat(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Json(body): Json<GroupChatRequest>,
) -> ApiResult<(StatusCode, Json<ChatResponse>)> {
    require_role(&actor, &[Role::Admin, Role::DepartmentAdmin, Role::Faculty])?;
    let department_id = match actor.role {
        Role::Admin => body.department_id,
        _ => body.department_id.or(actor.department_id),
    };
    if actor.role != Role::Admin && department_id != actor.department_id {
        return Err(ApiError::forbidden(
            "Groups can only belong to your own department",
        ));
    }

    let chat = ChatService::group(
        &state.db,
        actor.id,
        body.name,
        body.participant_ids,
        department_id,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(chat.into())))
}

/// The caller's chats, most recently active first
#[utoipa::path(
    get,
    path = "/api/chat",
    responses(
        (status = 200, description = "Chats with last message and unread count", body = Vec<ChatSummaryResponse>)
    ),
    security(("jwt" = [])),
    tag = "Chat"
)]
pub async fn list_chats(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
) -> ApiResult<Json<Vec<ChatSummaryResponse>>> {
    let chats = ChatService::for_user(&state.db, actor.id).await?;
    Ok(Json(chats.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/chat/{id}",
    params(("id" = Uuid, Path, description = "Chat ID")),
    responses(
        (status = 200, description = "Chat with participants", body = ChatResponse),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Chat not found")
    ),
    security(("jwt" = [])),
    tag = "Chat"
)]
pub async fn get_chat(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ChatResponse>> {
    ChatService::membership(&state.db, id, actor.id).await?;
    let chat = ChatService::detail(&state.db, id).await?;
    Ok(Json(chat.into()))
}

/// Messages newest first, paged backwards with `before`
#[utoipa::path(
    get,
    path = "/api/chat/{id}/messages",
    params(
        ("id" = Uuid, Path, description = "Chat ID"),
        MessageQueryParams
    ),
    responses(
        (status = 200, description = "Messages", body = Vec<ChatMessageResponse>),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Chat not found")
    ),
    security(("jwt" = [])),
    tag = "Chat"
)]
pub async fn list_messages(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<MessageQueryParams>,
) -> ApiResult<Json<Vec<ChatMessageResponse>>> {
    let messages =
        ChatService::messages(&state.db, id, actor.id, params.before, params.limit).await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/chat/{id}/messages",
    params(("id" = Uuid, Path, description = "Chat ID")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = ChatMessageResponse),
        (status = 400, description = "Empty or oversized message"),
        (status = 403, description = "Not a participant, or the chat is blocked"),
        (status = 404, description = "Chat not found")
    ),
    security(("jwt" = [])),
    tag = "Chat"
)]
pub async fn send_message(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<SendMessageRequest>,
) -> ApiResult<(StatusCode, Json<ChatMessageResponse>)> {
    let sent = ChatService::send(&state.db, id, actor.id, body.content).await?;
    let message = ChatMessageResponse::from(sent.message);

    let listeners = sent
        .recipients
        .iter()
        .filter(|r| !r.is_muted)
        .map(|r| r.user_id)
        .chain(std::iter::once(actor.id));
    state
        .hub
        .emit_to_users(listeners, events::MESSAGE_NEW, &message);

    Ok((StatusCode::CREATED, Json(message)))
}

/// Soft deletes one of the caller's own messages
#[utoipa::path(
    delete,
    path = "/api/chat/{id}/messages/{message_id}",
    params(
        ("id" = Uuid, Path, description = "Chat ID"),
        ("message_id" = Uuid, Path, description = "Message ID")
    ),
    responses(
        (status = 200, description = "Message deleted", body = MessageResponse),
        (status = 403, description = "Only the sender can delete"),
        (status = 404, description = "Message not found")
    ),
    security(("jwt" = [])),
    tag = "Chat"
)]
pub async fn delete_message(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path((id, message_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    ChatService::delete_message(&state.db, id, message_id, actor.id).await?;

    let participants = ChatService::participant_ids(&state.db, id).await?;
    state.hub.emit_to_users(
        participants,
        events::MESSAGE_DELETED,
        &json!({ "chatId": id, "messageId": message_id }),
    );

    Ok(Json(MessageResponse::new("Message deleted")))
}

#[utoipa::path(
    post,
    path = "/api/chat/{id}/read",
    params(("id" = Uuid, Path, description = "Chat ID")),
    responses(
        (status = 200, description = "Chat marked as read", body = ReadReceiptResponse),
        (status = 403, description = "Not a participant")
    ),
    security(("jwt" = [])),
    tag = "Chat"
)]
pub async fn mark_read(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ReadReceiptResponse>> {
    let membership = ChatService::mark_read(&state.db, id, actor.id).await?;
    let receipt = ReadReceiptResponse {
        chat_id: id,
        user_id: actor.id,
        last_read_at: membership.last_read_at,
    };

    let others = ChatService::participant_ids(&state.db, id)
        .await?
        .into_iter()
        .filter(|user_id| *user_id != actor.id);
    state.hub.emit_to_users(others, events::CHAT_READ, &receipt);

    Ok(Json(receipt))
}

/// Muted chats stop pushing new messages to the caller
#[utoipa::path(
    post,
    path = "/api/chat/{id}/mute",
    params(("id" = Uuid, Path, description = "Chat ID")),
    request_body = MuteRequest,
    responses(
        (status = 200, description = "Mute updated", body = ParticipantSettingsResponse),
        (status = 403, description = "Not a participant")
    ),
    security(("jwt" = [])),
    tag = "Chat"
)]
pub async fn set_muted(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<MuteRequest>,
) -> ApiResult<Json<ParticipantSettingsResponse>> {
    let membership = ChatService::set_muted(&state.db, id, actor.id, body.muted).await?;
    Ok(Json(settings(membership)))
}

#[utoipa::path(
    post,
    path = "/api/chat/{id}/block",
    params(("id" = Uuid, Path, description = "Chat ID")),
    request_body = BlockRequest,
    responses(
        (status = 200, description = "Block updated", body = ParticipantSettingsResponse),
        (status = 400, description = "Group chats cannot be blocked"),
        (status = 403, description = "Not a participant")
    ),
    security(("jwt" = [])),
    tag = "Chat"
)]
pub async fn set_blocked(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<BlockRequest>,
) -> ApiResult<Json<ParticipantSettingsResponse>> {
    let membership = ChatService::set_blocked(&state.db, id, actor.id, body.blocked).await?;
    Ok(Json(settings(membership)))
}

#[utoipa::path(
    post,
    path = "/api/chat/{id}/participants",
    params(("id" = Uuid, Path, description = "Chat ID")),
    request_body = ParticipantsRequest,
    responses(
        (status = 200, description = "Participants added", body = ChatResponse),
        (status = 403, description = "Chat admins only"),
        (status = 404, description = "Chat or user not found")
    ),
    security(("jwt" = [])),
    tag = "Chat"
)]
pub async fn add_participants(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ParticipantsRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let chat = ChatService::add_participants(&state.db, id, actor.id, body.user_ids).await?;
    Ok(Json(chat.into()))
}

/// Chat admins remove anyone, members may leave
#[utoipa::path(
    delete,
    path = "/api/chat/{id}/participants/{user_id}",
    params(
        ("id" = Uuid, Path, description = "Chat ID"),
        ("user_id" = Uuid, Path, description = "Participant user ID")
    ),
    responses(
        (status = 200, description = "Participant removed", body = ChatResponse),
        (status = 403, description = "Chat admins only"),
        (status = 404, description = "Participant not found")
    ),
    security(("jwt" = [])),
    tag = "Chat"
)]
pub async fn remove_participant(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ChatResponse>> {
    let chat = ChatService::remove_participant(&state.db, id, actor.id, user_id).await?;
    Ok(Json(chat.into()))
}
