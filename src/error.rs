//! Error types at the collaborator seams

use thiserror::Error;

/// Error returned by the identity/storage backend.
///
/// The message is shown to the user exactly as the provider wrote it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Wrap a transport failure that never reached the provider.
    pub fn transport(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Errors from the remote chat-completion API
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("No DeepSeek API key configured")]
    MissingApiKey,

    #[error("Completion request failed with status {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Completion response had no choices")]
    EmptyResponse,
}

/// Locally detected form errors; these never reach a provider.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("请输入完整的6位验证码")]
    IncompleteCode,

    #[error("两次输入的密码不一致")]
    PasswordMismatch,

    #[error("密码至少需要6个字符")]
    PasswordTooShort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_is_verbatim() {
        let error = ProviderError::new("Invalid login credentials");
        assert_eq!(error.to_string(), "Invalid login credentials");
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::IncompleteCode.to_string(), "请输入完整的6位验证码");
        assert_eq!(ValidationError::PasswordMismatch.to_string(), "两次输入的密码不一致");
        assert_eq!(ValidationError::PasswordTooShort.to_string(), "密码至少需要6个字符");
    }

    #[test]
    fn test_completion_status_display() {
        assert_eq!(
            CompletionError::Status(401).to_string(),
            "Completion request failed with status 401"
        );
    }
}
