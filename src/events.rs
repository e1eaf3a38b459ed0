use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::auth::AuthResponse;
use crate::conversation::{LoadedHistory, TurnReply};

/// Results delivered from background tasks back to the UI loop
#[derive(Debug)]
pub enum AppEvent {
    /// Stored history finished loading, stamped with the account it belongs to
    HistoryLoaded(LoadedHistory),

    /// A reply (or failure) for the turn in flight
    Reply(TurnReply),

    /// An identity-provider call issued by the auth modal finished
    Auth(AuthResponse),

    /// Scheduled close of the auth modal after a successful step
    CloseAuthModal,

    /// Sign-out finished
    SignedOut,
}

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Which reply strategy answers the user
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ModelChoice {
    /// Canned keyword responder, no network
    Local,
    /// Remote DeepSeek chat completion
    #[default]
    DeepSeek,
}

impl ModelChoice {
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelChoice::Local => "本地模型",
            ModelChoice::DeepSeek => "DeepSeek",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ModelChoice::Local => "免费，回复较机械",
            ModelChoice::DeepSeek => "智能，需 API Key",
        }
    }

    /// Cycle to the other model, used by `/model` without an argument
    pub fn toggled(&self) -> ModelChoice {
        match self {
            ModelChoice::Local => ModelChoice::DeepSeek,
            ModelChoice::DeepSeek => ModelChoice::Local,
        }
    }
}
