use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;

use super::{IdentityProvider, MessageRow, MessageStore, ProviderResult};
use crate::config::SupabaseConfig;
use crate::error::ProviderError;
use crate::events::ChatMessage;
use crate::session::{Session, SessionState};

/// Supabase REST client (GoTrue for auth, PostgREST for messages)
#[derive(Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    messages_table: String,
    redirect_to: Option<String>,
    sessions: SessionState,
}

/// Session-bearing body returned by `/verify`, `/token` and `/signup`
#[derive(Debug, Deserialize)]
struct AuthBody {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<UserBody>,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig, sessions: SessionState) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            messages_table: config.messages_table.clone(),
            redirect_to: config.redirect_to.clone(),
            sessions,
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn rest_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.messages_table)
    }

    /// Attach the project key and the caller's bearer token. Falls back to
    /// the anon key when signed out.
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .sessions
            .handle()
            .current()
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.anon_key.clone());

        builder
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    async fn send(&self, builder: RequestBuilder) -> ProviderResult<Response> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(ProviderError::transport)?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
        tracing::debug!(%status, %message, "supabase request rejected");
        Err(ProviderError::new(message))
    }

    /// Install the session carried by an auth response, if any
    async fn adopt_session(&self, response: Response, fallback_email: &str) -> ProviderResult<()> {
        let body: AuthBody = response.json().await.map_err(ProviderError::transport)?;

        let (Some(access_token), Some(user)) = (body.access_token, body.user) else {
            // Sign-up awaiting email confirmation returns no session
            tracing::info!("auth call succeeded without a session");
            return Ok(());
        };

        self.sessions.set(Session {
            access_token,
            refresh_token: body.refresh_token,
            user_id: user.id,
            email: user.email.unwrap_or_else(|| fallback_email.to_string()),
        });
        Ok(())
    }

    /// Resolve the user behind a bare access token (recovery links carry
    /// only tokens) and install it as the current session.
    pub async fn restore_from_tokens(
        &self,
        access_token: &str,
        refresh_token: Option<String>,
    ) -> ProviderResult<()> {
        let response = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(ProviderError::transport)?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::new(
                error_message(&body).unwrap_or_else(|| "Invalid recovery link".to_string()),
            ));
        }

        let user: UserBody = response.json().await.map_err(ProviderError::transport)?;
        self.sessions.set(Session {
            access_token: access_token.to_string(),
            refresh_token,
            user_id: user.id,
            email: user.email.unwrap_or_default(),
        });
        Ok(())
    }
}

/// Pull the human-readable message out of a GoTrue/PostgREST error body
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn send_otp(&self, email: &str) -> ProviderResult<()> {
        tracing::info!(email, "sending one-time code");
        self.send(
            self.client
                .post(self.auth_url("otp"))
                .json(&json!({ "email": email, "create_user": true })),
        )
        .await?;
        Ok(())
    }

    async fn verify_otp(&self, email: &str, token: &str) -> ProviderResult<()> {
        let response = self
            .send(self.client.post(self.auth_url("verify")).json(&json!({
                "type": "email",
                "email": email,
                "token": token,
            })))
            .await?;
        self.adopt_session(response, email).await
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> ProviderResult<()> {
        let response = self
            .send(
                self.client
                    .post(self.auth_url("token"))
                    .query(&[("grant_type", "password")])
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;
        self.adopt_session(response, email).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> ProviderResult<()> {
        let response = self
            .send(
                self.client
                    .post(self.auth_url("signup"))
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;
        self.adopt_session(response, email).await
    }

    async fn request_password_reset(&self, email: &str) -> ProviderResult<()> {
        let mut request = self.client.post(self.auth_url("recover"));
        if let Some(redirect) = &self.redirect_to {
            request = request.query(&[("redirect_to", redirect.as_str())]);
        }
        self.send(request.json(&json!({ "email": email }))).await?;
        Ok(())
    }

    async fn update_password(&self, password: &str) -> ProviderResult<()> {
        if !self.sessions.handle().is_signed_in() {
            return Err(ProviderError::new("Auth session missing!"));
        }
        self.send(
            self.client
                .put(self.auth_url("user"))
                .json(&json!({ "password": password })),
        )
        .await?;
        Ok(())
    }

    async fn sign_out(&self) -> ProviderResult<()> {
        let result = if self.sessions.handle().is_signed_in() {
            self.send(self.client.post(self.auth_url("logout"))).await.map(|_| ())
        } else {
            Ok(())
        };
        // The local session goes away even if the server call failed
        self.sessions.clear();
        result
    }
}

#[async_trait]
impl MessageStore for SupabaseClient {
    async fn load_messages(&self) -> ProviderResult<Vec<ChatMessage>> {
        let response = self
            .send(self.client.get(self.rest_url()).query(&[
                ("select", "role,content,created_at"),
                ("order", "created_at.asc"),
            ]))
            .await?;
        response.json().await.map_err(ProviderError::transport)
    }

    async fn insert_messages(&self, rows: &[MessageRow]) -> ProviderResult<()> {
        self.send(
            self.client
                .post(self.rest_url())
                .header("Prefer", "return=minimal")
                .json(rows),
        )
        .await?;
        Ok(())
    }
}
