use crate::{
    entities::{chat_messages, chat_participants, chats, users},
    error::{ServiceError, ServiceResult},
    services::{non_empty, now},
};
use chrono::NaiveDateTime;
use log::info;
use models::chat::{ChatType, MAX_MESSAGE_LEN};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use std::collections::BTreeSet;
use uuid::Uuid;

/// A chat with every participant and their user row
#[derive(Debug, Clone)]
pub struct ChatDetail {
    pub chat: chats::Model,
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub membership: chat_participants::Model,
    pub user: users::Model,
}

/// One entry of a user's chat list
#[derive(Debug, Clone)]
pub struct ChatSummary {
    pub detail: ChatDetail,
    pub last_message: Option<chat_messages::Model>,
    pub unread: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recipient {
    pub user_id: Uuid,
    pub is_muted: bool,
}

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub message: chat_messages::Model,
    /// Everyone in the chat except the sender
    pub recipients: Vec<Recipient>,
}

pub const DEFAULT_PAGE: u64 = 50;

pub struct ChatService;

impl ChatService {
    /// Returns the direct chat between two users, creating it on first contact
    pub async fn direct(
        db: &DatabaseConnection,
        user_id: Uuid,
        other_id: Uuid,
    ) -> ServiceResult<ChatDetail> {
        if user_id == other_id {
            return Err(ServiceError::validation("Cannot start a chat with yourself"));
        }
        users::Entity::find_by_id(other_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        if let Some(chat_id) = Self::find_direct(db, user_id, other_id).await? {
            return Self::detail(db, chat_id).await;
        }

        let txn = db.begin().await?;
        let chat = Self::insert_chat(&txn, ChatType::Direct, None, None, user_id).await?;
        for member in [user_id, other_id] {
            Self::insert_participant(&txn, chat.id, member, false).await?;
        }
        txn.commit().await?;

        info!("Opened direct chat {} between {user_id} and {other_id}", chat.id);
        Self::detail(db, chat.id).await
    }

    pub async fn group(
        db: &DatabaseConnection,
        creator_id: Uuid,
        name: String,
        participant_ids: Vec<Uuid>,
        department_id: Option<Uuid>,
    ) -> ServiceResult<ChatDetail> {
        let name = non_empty(Some(name))
            .ok_or_else(|| ServiceError::validation("Group name is required"))?;
        let members: BTreeSet<Uuid> = participant_ids
            .into_iter()
            .filter(|id| *id != creator_id)
            .collect();
        if members.is_empty() {
            return Err(ServiceError::validation("A group needs at least one other member"));
        }

        let txn = db.begin().await?;
        Self::ensure_users_exist(&txn, &members).await?;

        let chat =
            Self::insert_chat(&txn, ChatType::Group, Some(name), department_id, creator_id).await?;
        Self::insert_participant(&txn, chat.id, creator_id, true).await?;
        for member in &members {
            Self::insert_participant(&txn, chat.id, *member, false).await?;
        }
        txn.commit().await?;

        info!(
            "Created group chat {} with {} members",
            chat.id,
            members.len() + 1
        );
        Self::detail(db, chat.id).await
    }

    pub async fn detail<C: ConnectionTrait>(db: &C, chat_id: Uuid) -> ServiceResult<ChatDetail> {
        let chat = chats::Entity::find_by_id(chat_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Chat"))?;
        let participants = chat_participants::Entity::find()
            .filter(chat_participants::Column::ChatId.eq(chat_id))
            .order_by_asc(chat_participants::Column::JoinedAt)
            .find_also_related(users::Entity)
            .all(db)
            .await?
            .into_iter()
            .filter_map(|(membership, user)| Some(Participant {
                user: user?,
                membership,
            }))
            .collect();

        Ok(ChatDetail { chat, participants })
    }

    /// The user's chats, most recently active first
    pub async fn for_user<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> ServiceResult<Vec<ChatSummary>> {
        let memberships = chat_participants::Entity::find()
            .filter(chat_participants::Column::UserId.eq(user_id))
            .all(db)
            .await?;

        let mut summaries = Vec::with_capacity(memberships.len());
        for membership in memberships {
            let detail = Self::detail(db, membership.chat_id).await?;
            let last_message = chat_messages::Entity::find()
                .filter(chat_messages::Column::ChatId.eq(membership.chat_id))
                .filter(chat_messages::Column::IsDeleted.eq(false))
                .order_by_desc(chat_messages::Column::CreatedAt)
                .one(db)
                .await?;
            let unread = Self::unread(db, &membership).await?;

            summaries.push(ChatSummary {
                detail,
                last_message,
                unread,
            });
        }

        summaries.sort_by(|a, b| {
            let key = |s: &ChatSummary| s.detail.chat.last_message_at.unwrap_or(s.detail.chat.created_at);
            key(b).cmp(&key(a))
        });
        Ok(summaries)
    }

    /// The caller's membership, or `Forbidden` for outsiders
    pub async fn membership<C: ConnectionTrait>(
        db: &C,
        chat_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<chat_participants::Model> {
        chats::Entity::find_by_id(chat_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Chat"))?;

        chat_participants::Entity::find()
            .filter(chat_participants::Column::ChatId.eq(chat_id))
            .filter(chat_participants::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::forbidden("You are not a participant of this chat"))
    }

    /// A page of messages older than `before`, returned oldest first
    pub async fn messages<C: ConnectionTrait>(
        db: &C,
        chat_id: Uuid,
        user_id: Uuid,
        before: Option<NaiveDateTime>,
        limit: Option<u64>,
    ) -> ServiceResult<Vec<chat_messages::Model>> {
        Self::membership(db, chat_id, user_id).await?;

        let mut query =
            chat_messages::Entity::find().filter(chat_messages::Column::ChatId.eq(chat_id));
        if let Some(before) = before {
            query = query.filter(chat_messages::Column::CreatedAt.lt(before));
        }

        let mut messages = query
            .order_by_desc(chat_messages::Column::CreatedAt)
            .limit(limit.unwrap_or(DEFAULT_PAGE).clamp(1, 200))
            .all(db)
            .await?;
        messages.reverse();

        for message in messages.iter_mut().filter(|m| m.is_deleted) {
            message.content.clear();
        }
        Ok(messages)
    }

    pub async fn send(
        db: &DatabaseConnection,
        chat_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> ServiceResult<SentMessage> {
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(ServiceError::validation("Message cannot be empty"));
        }
        if content.chars().count() > MAX_MESSAGE_LEN {
            return Err(ServiceError::validation(format!(
                "Message cannot exceed {MAX_MESSAGE_LEN} characters"
            )));
        }

        let txn = db.begin().await?;
        let membership = Self::membership(&txn, chat_id, sender_id).await?;
        let detail = Self::detail(&txn, chat_id).await?;
        if detail.chat.chat_type == ChatType::Direct
            && detail.participants.iter().any(|p| p.membership.has_blocked)
        {
            return Err(ServiceError::forbidden("This conversation is blocked"));
        }

        let timestamp = now();
        let message = chat_messages::ActiveModel {
            id: Set(Uuid::new_v4()),
            chat_id: Set(chat_id),
            sender_id: Set(sender_id),
            content: Set(content),
            is_deleted: Set(false),
            created_at: Set(timestamp),
        }
        .insert(&txn)
        .await?;

        let mut chat: chats::ActiveModel = detail.chat.into();
        chat.last_message_at = Set(Some(timestamp));
        chat.updated_at = Set(timestamp);
        chat.update(&txn).await?;

        let mut own: chat_participants::ActiveModel = membership.into();
        own.last_read_at = Set(Some(timestamp));
        own.update(&txn).await?;
        txn.commit().await?;

        let recipients = detail
            .participants
            .iter()
            .filter(|p| p.membership.user_id != sender_id)
            .map(|p| Recipient {
                user_id: p.membership.user_id,
                is_muted: p.membership.is_muted,
            })
            .collect();

        info!("Message {} sent to chat {chat_id}", message.id);
        Ok(SentMessage {
            message,
            recipients,
        })
    }

    /// Soft deletes a message; only its sender may do so
    pub async fn delete_message(
        db: &DatabaseConnection,
        chat_id: Uuid,
        message_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<chat_messages::Model> {
        let message = chat_messages::Entity::find_by_id(message_id)
            .filter(chat_messages::Column::ChatId.eq(chat_id))
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Message"))?;
        if message.sender_id != user_id {
            return Err(ServiceError::forbidden(
                "Only the sender can delete a message",
            ));
        }

        let mut active: chat_messages::ActiveModel = message.into();
        active.is_deleted = Set(true);
        let mut message = active.update(db).await?;
        message.content.clear();

        info!("Deleted message {message_id} in chat {chat_id}");
        Ok(message)
    }

    pub async fn mark_read(
        db: &DatabaseConnection,
        chat_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<chat_participants::Model> {
        let membership = Self::membership(db, chat_id, user_id).await?;
        let mut active: chat_participants::ActiveModel = membership.into();
        active.last_read_at = Set(Some(now()));
        Ok(active.update(db).await?)
    }

    pub async fn set_muted(
        db: &DatabaseConnection,
        chat_id: Uuid,
        user_id: Uuid,
        muted: bool,
    ) -> ServiceResult<chat_participants::Model> {
        let membership = Self::membership(db, chat_id, user_id).await?;
        let mut active: chat_participants::ActiveModel = membership.into();
        active.is_muted = Set(muted);

        let membership = active.update(db).await?;
        info!("User {user_id} muted={muted} chat {chat_id}");
        Ok(membership)
    }

    /// Blocking only applies to direct chats
    pub async fn set_blocked(
        db: &DatabaseConnection,
        chat_id: Uuid,
        user_id: Uuid,
        blocked: bool,
    ) -> ServiceResult<chat_participants::Model> {
        let membership = Self::membership(db, chat_id, user_id).await?;
        let chat = Self::detail(db, chat_id).await?.chat;
        if chat.chat_type != ChatType::Direct {
            return Err(ServiceError::validation("Only direct chats can be blocked"));
        }

        let mut active: chat_participants::ActiveModel = membership.into();
        active.has_blocked = Set(blocked);

        let membership = active.update(db).await?;
        info!("User {user_id} blocked={blocked} chat {chat_id}");
        Ok(membership)
    }

    pub async fn add_participants(
        db: &DatabaseConnection,
        chat_id: Uuid,
        actor_id: Uuid,
        user_ids: Vec<Uuid>,
    ) -> ServiceResult<ChatDetail> {
        let txn = db.begin().await?;
        Self::require_group_admin(&txn, chat_id, actor_id).await?;

        let requested: BTreeSet<Uuid> = user_ids.into_iter().collect();
        Self::ensure_users_exist(&txn, &requested).await?;
        let present: BTreeSet<Uuid> = Self::participant_ids(&txn, chat_id)
            .await?
            .into_iter()
            .collect();

        let added: Vec<Uuid> = requested.difference(&present).copied().collect();
        for user_id in &added {
            Self::insert_participant(&txn, chat_id, *user_id, false).await?;
        }
        txn.commit().await?;

        info!("Added {} participants to chat {chat_id}", added.len());
        Self::detail(db, chat_id).await
    }

    /// Chat admins may remove anyone; members may remove themselves
    pub async fn remove_participant(
        db: &DatabaseConnection,
        chat_id: Uuid,
        actor_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<ChatDetail> {
        if actor_id != user_id {
            Self::require_group_admin(db, chat_id, actor_id).await?;
        } else if Self::detail(db, chat_id).await?.chat.chat_type != ChatType::Group {
            return Err(ServiceError::validation("Only group chats can be left"));
        }

        let result = chat_participants::Entity::delete_many()
            .filter(chat_participants::Column::ChatId.eq(chat_id))
            .filter(chat_participants::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Participant"));
        }

        info!("Removed {user_id} from chat {chat_id}");
        Self::detail(db, chat_id).await
    }

    pub async fn participant_ids<C: ConnectionTrait>(
        db: &C,
        chat_id: Uuid,
    ) -> ServiceResult<Vec<Uuid>> {
        Ok(chat_participants::Entity::find()
            .select_only()
            .column(chat_participants::Column::UserId)
            .filter(chat_participants::Column::ChatId.eq(chat_id))
            .into_tuple::<Uuid>()
            .all(db)
            .await?)
    }

    /// Unread messages across every chat of the user
    pub async fn total_unread<C: ConnectionTrait>(db: &C, user_id: Uuid) -> ServiceResult<u64> {
        let memberships = chat_participants::Entity::find()
            .filter(chat_participants::Column::UserId.eq(user_id))
            .all(db)
            .await?;

        let mut total = 0;
        for membership in &memberships {
            total += Self::unread(db, membership).await?;
        }
        Ok(total)
    }

    async fn unread<C: ConnectionTrait>(
        db: &C,
        membership: &chat_participants::Model,
    ) -> ServiceResult<u64> {
        let mut query = chat_messages::Entity::find()
            .filter(chat_messages::Column::ChatId.eq(membership.chat_id))
            .filter(chat_messages::Column::SenderId.ne(membership.user_id))
            .filter(chat_messages::Column::IsDeleted.eq(false));
        if let Some(last_read) = membership.last_read_at {
            query = query.filter(chat_messages::Column::CreatedAt.gt(last_read));
        }
        Ok(query.count(db).await?)
    }

    async fn find_direct<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        other_id: Uuid,
    ) -> ServiceResult<Option<Uuid>> {
        let mine: Vec<Uuid> = chat_participants::Entity::find()
            .select_only()
            .column(chat_participants::Column::ChatId)
            .filter(chat_participants::Column::UserId.eq(user_id))
            .into_tuple::<Uuid>()
            .all(db)
            .await?;
        if mine.is_empty() {
            return Ok(None);
        }

        let shared = chat_participants::Entity::find()
            .filter(chat_participants::Column::UserId.eq(other_id))
            .filter(chat_participants::Column::ChatId.is_in(mine))
            .find_also_related(chats::Entity)
            .filter(Condition::all().add(chats::Column::ChatType.eq(ChatType::Direct)))
            .one(db)
            .await?;

        Ok(shared.map(|(membership, _)| membership.chat_id))
    }

    async fn require_group_admin<C: ConnectionTrait>(
        db: &C,
        chat_id: Uuid,
        actor_id: Uuid,
    ) -> ServiceResult<()> {
        let membership = Self::membership(db, chat_id, actor_id).await?;
        let chat = Self::detail(db, chat_id).await?.chat;
        if chat.chat_type != ChatType::Group {
            return Err(ServiceError::validation(
                "Participants can only be managed in group chats",
            ));
        }
        if !membership.is_admin {
            return Err(ServiceError::forbidden(
                "Only chat admins can manage participants",
            ));
        }
        Ok(())
    }

    async fn ensure_users_exist<C: ConnectionTrait>(
        db: &C,
        ids: &BTreeSet<Uuid>,
    ) -> ServiceResult<()> {
        let found = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .count(db)
            .await?;
        if found != ids.len() as u64 {
            return Err(ServiceError::NotFound("User"));
        }
        Ok(())
    }

    async fn insert_chat<C: ConnectionTrait>(
        db: &C,
        chat_type: ChatType,
        name: Option<String>,
        department_id: Option<Uuid>,
        created_by: Uuid,
    ) -> ServiceResult<chats::Model> {
        let timestamp = now();
        Ok(chats::ActiveModel {
            id: Set(Uuid::new_v4()),
            chat_type: Set(chat_type),
            name: Set(name),
            department_id: Set(department_id),
            created_by: Set(Some(created_by)),
            last_message_at: Set(None),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(db)
        .await?)
    }

    async fn insert_participant<C: ConnectionTrait>(
        db: &C,
        chat_id: Uuid,
        user_id: Uuid,
        is_admin: bool,
    ) -> ServiceResult<()> {
        chat_participants::ActiveModel {
            id: Set(Uuid::new_v4()),
            chat_id: Set(chat_id),
            user_id: Set(user_id),
            is_admin: Set(is_admin),
            is_muted: Set(false),
            has_blocked: Set(false),
            last_read_at: Set(None),
            joined_at: Set(now()),
        }
        .insert(db)
        .await?;
        Ok(())
    }
}
