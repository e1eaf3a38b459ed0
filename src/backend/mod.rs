//! Identity and message-storage collaborators
//!
//! The controllers only see these traits; [`SupabaseClient`] is the hosted
//! implementation and tests substitute in-memory mocks.

pub mod supabase;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::events::{ChatMessage, Role};

pub use supabase::SupabaseClient;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Identity operations consumed by the auth modal and CLI
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Email a one-time code, creating the account if needed
    async fn send_otp(&self, email: &str) -> ProviderResult<()>;

    /// Exchange an emailed code for a session
    async fn verify_otp(&self, email: &str, token: &str) -> ProviderResult<()>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> ProviderResult<()>;

    async fn sign_up(&self, email: &str, password: &str) -> ProviderResult<()>;

    /// Email a password-recovery link
    async fn request_password_reset(&self, email: &str) -> ProviderResult<()>;

    /// Set the password of the signed-in user
    async fn update_password(&self, password: &str) -> ProviderResult<()>;

    async fn sign_out(&self) -> ProviderResult<()>;
}

/// Persisted message row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRow {
    pub user_id: String,
    pub role: Role,
    pub content: String,
}

impl MessageRow {
    pub fn new(user_id: &str, message: &ChatMessage) -> Self {
        Self {
            user_id: user_id.to_string(),
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Conversation history storage
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// All messages visible to the session, oldest first
    async fn load_messages(&self) -> ProviderResult<Vec<ChatMessage>>;

    /// Insert rows as one batch
    async fn insert_messages(&self, rows: &[MessageRow]) -> ProviderResult<()>;
}
