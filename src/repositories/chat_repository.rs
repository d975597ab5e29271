use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::chat::{canonical_pair, Chat, ChatOverview, Message, MessageSender, MessageWithSender};
use crate::models::user::{UserRole, UserSummary};
use crate::utils::errors::{map_unique_violation, AppResult};

#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Chat entre dos usuarios, sin importar el orden
    async fn find_between(&self, a: Uuid, b: Uuid) -> AppResult<Option<Chat>>;
    /// Crea el chat; si el par ya existe devuelve `AppError::Conflict`
    async fn create(&self, participant1_id: Uuid, participant2_id: Uuid) -> AppResult<Chat>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Chat>>;
    /// Chats del usuario, actividad más reciente primero
    async fn list_overviews(&self, user_id: Uuid) -> AppResult<Vec<ChatOverview>>;
    /// Guarda el mensaje (no leído) y actualiza la actividad del chat
    async fn add_message(&self, chat_id: Uuid, sender_id: Uuid, content: String) -> AppResult<Message>;
    /// Mensajes en orden cronológico ascendente
    async fn list_messages(&self, chat_id: Uuid) -> AppResult<Vec<MessageWithSender>>;
    /// Marca como leídos los mensajes que `reader_id` recibió en el chat
    async fn mark_read(&self, chat_id: Uuid, reader_id: Uuid) -> AppResult<u64>;
}

pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ChatOverviewRow {
    #[sqlx(flatten)]
    chat: Chat,
    p1_name: String,
    p1_role: UserRole,
    p1_company_name: Option<String>,
    p2_name: String,
    p2_role: UserRole,
    p2_company_name: Option<String>,
    last_id: Option<Uuid>,
    last_sender_id: Option<Uuid>,
    last_content: Option<String>,
    last_read: Option<bool>,
    last_created_at: Option<DateTime<Utc>>,
    unread_count: i64,
}

impl From<ChatOverviewRow> for ChatOverview {
    fn from(row: ChatOverviewRow) -> Self {
        let last_message = match (row.last_id, row.last_sender_id, row.last_content, row.last_created_at) {
            (Some(id), Some(sender_id), Some(content), Some(created_at)) => Some(Message {
                id,
                chat_id: row.chat.id,
                sender_id,
                content,
                read: row.last_read.unwrap_or(false),
                created_at,
            }),
            _ => None,
        };

        ChatOverview {
            participant1: UserSummary {
                id: row.chat.participant1_id,
                name: row.p1_name,
                role: row.p1_role,
                company_name: row.p1_company_name,
            },
            participant2: UserSummary {
                id: row.chat.participant2_id,
                name: row.p2_name,
                role: row.p2_role,
                company_name: row.p2_company_name,
            },
            chat: row.chat,
            last_message,
            unread_count: row.unread_count,
        }
    }
}

#[derive(FromRow)]
struct MessageRow {
    #[sqlx(flatten)]
    message: Message,
    sender_name: String,
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    async fn find_between(&self, a: Uuid, b: Uuid) -> AppResult<Option<Chat>> {
        let (low, high) = canonical_pair(a, b);

        let chat = sqlx::query_as::<_, Chat>(
            r#"
            SELECT * FROM chats
            WHERE LEAST(participant1_id, participant2_id) = $1
              AND GREATEST(participant1_id, participant2_id) = $2
            "#,
        )
        .bind(low)
        .bind(high)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chat)
    }

    async fn create(&self, participant1_id: Uuid, participant2_id: Uuid) -> AppResult<Chat> {
        sqlx::query_as::<_, Chat>(
            r#"
            INSERT INTO chats (id, participant1_id, participant2_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(participant1_id)
        .bind(participant2_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Chat já existe"))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Chat>> {
        let chat = sqlx::query_as::<_, Chat>("SELECT * FROM chats WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(chat)
    }

    async fn list_overviews(&self, user_id: Uuid) -> AppResult<Vec<ChatOverview>> {
        let rows = sqlx::query_as::<_, ChatOverviewRow>(
            r#"
            SELECT c.*,
                   u1.name AS p1_name, u1.role AS p1_role, u1.company_name AS p1_company_name,
                   u2.name AS p2_name, u2.role AS p2_role, u2.company_name AS p2_company_name,
                   lm.id AS last_id,
                   lm.sender_id AS last_sender_id,
                   lm.content AS last_content,
                   lm.read AS last_read,
                   lm.created_at AS last_created_at,
                   (SELECT COUNT(*) FROM messages m
                     WHERE m.chat_id = c.id AND m.sender_id <> $1 AND NOT m.read) AS unread_count
            FROM chats c
            JOIN users u1 ON u1.id = c.participant1_id
            JOIN users u2 ON u2.id = c.participant2_id
            LEFT JOIN LATERAL (
                SELECT * FROM messages m
                WHERE m.chat_id = c.id
                ORDER BY m.created_at DESC
                LIMIT 1
            ) lm ON TRUE
            WHERE c.participant1_id = $1 OR c.participant2_id = $1
            ORDER BY c.updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ChatOverview::from).collect())
    }

    async fn add_message(&self, chat_id: Uuid, sender_id: Uuid, content: String) -> AppResult<Message> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (id, chat_id, sender_id, content, read, created_at)
            VALUES ($1, $2, $3, $4, FALSE, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(chat_id)
        .bind(sender_id)
        .bind(&content)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE chats SET updated_at = $2 WHERE id = $1")
            .bind(chat_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(message)
    }

    async fn list_messages(&self, chat_id: Uuid) -> AppResult<Vec<MessageWithSender>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT m.*, u.name AS sender_name
            FROM messages m
            JOIN users u ON u.id = m.sender_id
            WHERE m.chat_id = $1
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| MessageWithSender {
                sender: MessageSender {
                    id: row.message.sender_id,
                    name: row.sender_name,
                },
                message: row.message,
            })
            .collect())
    }

    async fn mark_read(&self, chat_id: Uuid, reader_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE messages SET read = TRUE WHERE chat_id = $1 AND sender_id <> $2 AND NOT read",
        )
        .bind(chat_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
