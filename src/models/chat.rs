//! Modelos de Chat y Message
//!
//! Un chat es una conversación entre exactamente dos usuarios distintos.
//! El par no tiene orden: chat(A, B) y chat(B, A) son el mismo chat.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::user::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: Uuid,
    pub participant1_id: Uuid,
    pub participant2_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.participant1_id == user_id || self.participant2_id == user_id
    }

    /// El otro participante visto desde `user_id`
    pub fn other_participant(&self, user_id: Uuid) -> Uuid {
        if self.participant1_id == user_id {
            self.participant2_id
        } else {
            self.participant1_id
        }
    }

    pub fn pair_key(&self) -> (Uuid, Uuid) {
        canonical_pair(self.participant1_id, self.participant2_id)
    }
}

/// Clave canónica del par: el id menor primero.
///
/// Es la misma clave que respalda el índice único `chats_participant_pair_key`.
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Remitente resumido que acompaña a cada mensaje
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageSender {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageWithSender {
    #[serde(flatten)]
    pub message: Message,
    pub sender: MessageSender,
}

/// Chat abierto: participantes y mensajes en orden cronológico
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDetail {
    #[serde(flatten)]
    pub chat: Chat,
    pub participant1: UserSummary,
    pub participant2: UserSummary,
    pub messages: Vec<MessageWithSender>,
}

/// Entrada del listado de chats de un usuario
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatOverview {
    #[serde(flatten)]
    pub chat: Chat,
    pub participant1: UserSummary,
    pub participant2: UserSummary,
    pub last_message: Option<Message>,
    pub unread_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_pair_ignores_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(canonical_pair(a, b), canonical_pair(b, a));
    }

    #[test]
    fn test_other_participant() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let chat = Chat {
            id: Uuid::new_v4(),
            participant1_id: a,
            participant2_id: b,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(chat.other_participant(a), b);
        assert_eq!(chat.other_participant(b), a);
        assert!(!chat.has_participant(Uuid::new_v4()));
    }
}
