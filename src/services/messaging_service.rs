//! Mensajería entre clientes y motoristas
//!
//! Un chat por par de usuarios. Quien no participa de un chat recibe
//! `NotFound`, igual que si el chat no existiera.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::middleware::auth::AuthenticatedUser;
use crate::models::chat::{Chat, ChatDetail, ChatOverview, MessageSender, MessageWithSender};
use crate::models::user::UserSummary;
use crate::repositories::{ChatRepository, UserRepository};
use crate::utils::errors::{bad_request_error, not_found_error, validation_error, AppError, AppResult};
use crate::utils::sanitize::sanitize_input;

pub struct MessagingService {
    chats: Arc<dyn ChatRepository>,
    users: Arc<dyn UserRepository>,
}

/// Resultado de abrir un chat nuevo o recuperar el existente
#[derive(Debug)]
pub struct ChatOpening {
    pub chat: ChatDetail,
    pub created: bool,
}

impl MessagingService {
    pub fn new(chats: Arc<dyn ChatRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { chats, users }
    }

    /// Devuelve el chat del par o lo crea con `caller` como participante 1
    pub async fn create_or_get_chat(
        &self,
        caller: &AuthenticatedUser,
        participant_id: Uuid,
    ) -> AppResult<ChatOpening> {
        if participant_id == caller.id {
            return Err(bad_request_error("Não é possível iniciar um chat consigo mesmo"));
        }

        if self.users.find_by_id(participant_id).await?.is_none() {
            return Err(not_found_error("Usuário não encontrado"));
        }

        if let Some(chat) = self.chats.find_between(caller.id, participant_id).await? {
            return Ok(ChatOpening {
                chat: self.detail(chat).await?,
                created: false,
            });
        }

        match self.chats.create(caller.id, participant_id).await {
            Ok(chat) => {
                info!("💬 Chat {} creado entre {} y {}", chat.id, caller.id, participant_id);
                Ok(ChatOpening {
                    chat: self.detail(chat).await?,
                    created: true,
                })
            }
            // Otro request creó el mismo par entre la búsqueda y el insert
            Err(AppError::Conflict(_)) => {
                debug!("💬 Chat concurrente detectado, recuperando el existente");
                let chat = self
                    .chats
                    .find_between(caller.id, participant_id)
                    .await?
                    .ok_or_else(|| AppError::Internal("Chat desaparecido tras conflicto".to_string()))?;
                Ok(ChatOpening {
                    chat: self.detail(chat).await?,
                    created: false,
                })
            }
            Err(e) => Err(e),
        }
    }

    pub async fn send_message(
        &self,
        caller: &AuthenticatedUser,
        chat_id: Uuid,
        content: &str,
    ) -> AppResult<MessageWithSender> {
        let chat = self.participant_chat(caller, chat_id).await?;

        let content = sanitize_input(content);
        if content.is_empty() {
            return Err(validation_error("content", "Mensagem não pode ser vazia"));
        }

        let message = self.chats.add_message(chat.id, caller.id, content).await?;
        debug!("💬 Mensaje {} enviado en chat {}", message.id, chat.id);

        Ok(MessageWithSender {
            message,
            sender: MessageSender {
                id: caller.id,
                name: caller.name.clone(),
            },
        })
    }

    /// Abre el chat y marca como leídos los mensajes del otro participante
    pub async fn open_chat(&self, caller: &AuthenticatedUser, chat_id: Uuid) -> AppResult<ChatDetail> {
        let chat = self.participant_chat(caller, chat_id).await?;

        let marked = self.chats.mark_read(chat.id, caller.id).await?;
        if marked > 0 {
            debug!("📬 {} mensajes marcados como leídos en chat {}", marked, chat.id);
        }

        self.detail(chat).await
    }

    /// Chats del usuario por última actividad
    pub async fn list_chats(&self, caller: &AuthenticatedUser) -> AppResult<Vec<ChatOverview>> {
        self.chats.list_overviews(caller.id).await
    }

    async fn participant_chat(&self, caller: &AuthenticatedUser, chat_id: Uuid) -> AppResult<Chat> {
        match self.chats.find_by_id(chat_id).await? {
            Some(chat) if chat.has_participant(caller.id) => Ok(chat),
            _ => Err(not_found_error("Chat não encontrado")),
        }
    }

    async fn detail(&self, chat: Chat) -> AppResult<ChatDetail> {
        let participant1 = self.summary(chat.participant1_id).await?;
        let participant2 = self.summary(chat.participant2_id).await?;
        let messages = self.chats.list_messages(chat.id).await?;

        Ok(ChatDetail {
            chat,
            participant1,
            participant2,
            messages,
        })
    }

    async fn summary(&self, user_id: Uuid) -> AppResult<UserSummary> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|user| UserSummary::from(&user))
            .ok_or_else(|| not_found_error("Usuário não encontrado"))
    }
}
