use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::MessageEntity;
use crate::database::repositories::{MessageRepository, NewMessage, SessionRepository};
use crate::error::AppError;
use crate::models::page::{PageRequest, PageResponse};

/// 消息发送方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageSender {
    User,
    Assistant,
    System,
}

impl MessageSender {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageSender::User => "USER",
            MessageSender::Assistant => "ASSISTANT",
            MessageSender::System => "SYSTEM",
        }
    }
}

impl fmt::Display for MessageSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageSender {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(MessageSender::User),
            "ASSISTANT" => Ok(MessageSender::Assistant),
            "SYSTEM" => Ok(MessageSender::System),
            other => Err(AppError::Internal(format!("unknown message sender {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub sender: MessageSender,
    pub content: String,
    pub context: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MessageEntity> for MessageResponse {
    type Error = AppError;

    fn try_from(message: MessageEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: message.id,
            sender: message.sender.parse()?,
            content: message.content,
            context: message.context,
            created_at: message.created_at,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AddMessageRequest {
    pub sender: Option<MessageSender>,
    pub content: Option<String>,
    pub context: Option<serde_json::Value>,
}

impl AddMessageRequest {
    fn validate(self) -> Result<(MessageSender, String, Option<serde_json::Value>), AppError> {
        let content = self
            .content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        let mut problems = Vec::new();
        if self.sender.is_none() {
            problems.push("Sender is required");
        }
        if content.is_none() {
            problems.push("Content is required");
        }

        match (self.sender, content) {
            (Some(sender), Some(content)) => Ok((sender, content, self.context)),
            _ => Err(AppError::BadRequest(problems.join("; "))),
        }
    }
}

/// Messages are only reachable through a session owned by the caller.
#[derive(Clone)]
pub struct MessageService {
    messages: Arc<dyn MessageRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl MessageService {
    pub fn new(messages: Arc<dyn MessageRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { messages, sessions }
    }

    pub async fn add(
        &self,
        user_id: &str,
        session_id: Uuid,
        req: AddMessageRequest,
    ) -> Result<MessageResponse, AppError> {
        let (sender, content, context) = req.validate()?;
        self.ensure_owned(user_id, session_id).await?;

        let message = self
            .messages
            .create(NewMessage {
                session_id,
                sender: sender.as_str().to_string(),
                content,
                context,
            })
            .await?;
        MessageResponse::try_from(message)
    }

    pub async fn list(
        &self,
        user_id: &str,
        session_id: Uuid,
        page: PageRequest,
    ) -> Result<PageResponse<MessageResponse>, AppError> {
        self.ensure_owned(user_id, session_id).await?;

        let found = self.messages.find_by_session(session_id, user_id, page).await?;
        let content = found
            .content
            .into_iter()
            .map(MessageResponse::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageResponse::new(content, page, found.total_elements))
    }

    async fn ensure_owned(&self, user_id: &str, session_id: Uuid) -> Result<(), AppError> {
        match self.sessions.find_by_id_and_user(session_id, user_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound {
                resource: "Session",
                id: session_id,
            }),
        }
    }
}
