use log::debug;
use models::role::Role;
use serde::Serialize;
use serde_json::json;
use std::{collections::HashMap, fmt, sync::Arc};
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 1024;

pub mod events {
    pub const MESSAGE_NEW: &str = "message:new";
    pub const MESSAGE_DELETED: &str = "message:deleted";
    pub const CHAT_READ: &str = "chat:read";
    pub const NOTICE_NEW: &str = "notice:new";
    pub const PRESENCE: &str = "presence";
    pub const TYPING: &str = "typing";
    pub const PONG: &str = "pong";
}

/// An addressable group of connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    User(Uuid),
    Department(Uuid),
    Role(Role),
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Department(id) => write!(f, "department:{id}"),
            Self::Role(role) => write!(f, "role:{}", role.as_str()),
        }
    }
}

/// The rooms a user's connection joins
pub fn rooms_for(user_id: Uuid, role: Role, department_id: Option<Uuid>) -> Vec<Room> {
    let mut rooms = vec![Room::User(user_id), Room::Role(role)];
    rooms.extend(department_id.map(Room::Department));
    rooms
}

/// A serialised `{event, data}` frame addressed to one room
#[derive(Debug, Clone)]
pub struct Delivery {
    pub room: Room,
    pub payload: Arc<str>,
}

/// Fan-out of server events to WebSocket connections
pub struct Hub {
    tx: broadcast::Sender<Delivery>,
    online: RwLock<HashMap<Uuid, usize>>,
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl Hub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            online: RwLock::new(HashMap::new()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Delivery> {
        self.tx.subscribe()
    }

    /// Fire-and-forget; events are dropped when nobody listens
    pub fn emit<T: Serialize>(&self, room: Room, event: &str, data: &T) {
        let payload = frame(event, data);
        if self.tx.send(Delivery { room, payload }).is_err() {
            debug!("No listeners for {event} in {room}");
        }
    }

    pub fn emit_to_users<T: Serialize>(
        &self,
        users: impl IntoIterator<Item = Uuid>,
        event: &str,
        data: &T,
    ) {
        for user_id in users {
            self.emit(Room::User(user_id), event, data);
        }
    }

    /// Registers a connection, true when it is the user's first
    pub async fn connect(&self, user_id: Uuid) -> bool {
        let mut online = self.online.write().await;
        let count = online.entry(user_id).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Drops a connection, true when it was the user's last
    pub async fn disconnect(&self, user_id: Uuid) -> bool {
        let mut online = self.online.write().await;
        match online.get_mut(&user_id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                online.remove(&user_id);
                true
            }
            None => false,
        }
    }

    pub async fn is_online(&self, user_id: Uuid) -> bool {
        self.online.read().await.contains_key(&user_id)
    }
}

pub fn frame<T: Serialize>(event: &str, data: &T) -> Arc<str> {
    json!({ "event": event, "data": data }).to_string().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_names() {
        let id = Uuid::nil();
        assert_eq!(
            Room::User(id).to_string(),
            "user:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(Room::Role(Role::DepartmentAdmin).to_string(), "role:departmentAdmin");
    }

    #[test]
    fn test_rooms_for_user_without_department() {
        let rooms = rooms_for(Uuid::nil(), Role::Admin, None);
        assert_eq!(rooms, vec![Room::User(Uuid::nil()), Room::Role(Role::Admin)]);
    }

    #[tokio::test]
    async fn test_emit_reaches_subscribers() {
        let hub = Hub::new();
        let mut rx = hub.subscribe();
        let user = Uuid::new_v4();

        hub.emit(Room::User(user), events::NOTICE_NEW, &json!({ "title": "Holiday" }));

        let delivery = rx.recv().await.unwrap();
        assert_eq!(delivery.room, Room::User(user));
        let value: serde_json::Value = serde_json::from_str(&delivery.payload).unwrap();
        assert_eq!(value["event"], "notice:new");
        assert_eq!(value["data"]["title"], "Holiday");
    }

    #[tokio::test]
    async fn test_presence_counts_connections() {
        let hub = Hub::new();
        let user = Uuid::new_v4();

        assert!(hub.connect(user).await);
        assert!(!hub.connect(user).await);
        assert!(!hub.disconnect(user).await);
        assert!(hub.is_online(user).await);
        assert!(hub.disconnect(user).await);
        assert!(!hub.is_online(user).await);
    }
}
