//! Conversation turn records

use super::Model;
use crate::error::{ChatError, ChatResult};
use crate::tokens::TokenCounter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,
    /// System prompt
    System,
    /// Assistant response
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::System => "system",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "system" => Ok(Role::System),
            "assistant" => Ok(Role::Assistant),
            other => Err(ChatError::validation_field(
                format!("invalid role: {}", other),
                "role",
            )),
        }
    }
}

/// An immutable conversation turn
///
/// The token count is computed once, at construction, against the model the
/// message is destined for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: String,
    role: Role,
    content: String,
    token_count: usize,
    created_at: DateTime<Utc>,
}

impl Message {
    /// Build and validate a new message
    pub fn new(
        role: Role,
        content: impl Into<String>,
        model: &Model,
        counter: &dyn TokenCounter,
    ) -> ChatResult<Self> {
        let content = content.into();
        let token_count = counter.count(model.name(), &content);

        let message = Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            token_count,
            created_at: Utc::now(),
        };
        message.validate()?;
        Ok(message)
    }

    /// Check the message invariants
    pub fn validate(&self) -> ChatResult<()> {
        if self.content.is_empty() {
            return Err(ChatError::validation_field("content is empty", "content"));
        }
        if self.created_at == DateTime::<Utc>::UNIX_EPOCH {
            return Err(ChatError::validation_field(
                "invalid created at",
                "created_at",
            ));
        }
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
