use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::BusinessRules;

// Request para abrir (o recuperar) un chat con otro usuario
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    pub participant_id: Uuid,
}

impl BusinessRules for CreateChatRequest {}

// Request para enviar un mensaje
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub chat_id: Uuid,
    #[validate(length(min = 1, max = 2000, message = "Mensagem deve ter entre 1 e 2000 caracteres"))]
    pub content: String,
}

impl BusinessRules for SendMessageRequest {}
