//! Password-recovery redirect links
//!
//! Recovery emails redirect back with the session in the URL fragment, e.g.
//! `https://app.example/#access_token=...&refresh_token=...&type=recovery`.

use anyhow::{Context, Result};
use reqwest::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryLink {
    /// The address with its fragment removed, safe to log
    pub address: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_recovery: bool,
}

impl RecoveryLink {
    /// `Ok(None)` when the link carries no recovery signal
    pub fn parse(link: &str) -> Result<Option<Self>> {
        let mut url = Url::parse(link).context("Invalid recovery link")?;
        let Some(fragment) = url.fragment().map(str::to_string) else {
            return Ok(None);
        };

        let mut access_token = None;
        let mut refresh_token = None;
        let mut is_recovery = false;
        // Hash routers put a path before the parameters: `#/reset?type=...`
        for pair in fragment.split(['?', '&']) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "access_token" if !value.is_empty() => access_token = Some(value.to_string()),
                "refresh_token" if !value.is_empty() => refresh_token = Some(value.to_string()),
                "type" => is_recovery |= value == "recovery",
                _ => {}
            }
        }

        if !is_recovery && access_token.is_none() {
            return Ok(None);
        }

        url.set_fragment(None);
        Ok(Some(Self {
            address: url.to_string(),
            access_token,
            refresh_token,
            is_recovery,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_fragment_is_parsed_and_stripped() {
        let link = RecoveryLink::parse(
            "https://tutor.example/app#access_token=abc.def&expires_in=3600&refresh_token=r1&type=recovery",
        )
        .unwrap()
        .unwrap();

        assert_eq!(link.address, "https://tutor.example/app");
        assert_eq!(link.access_token.as_deref(), Some("abc.def"));
        assert_eq!(link.refresh_token.as_deref(), Some("r1"));
        assert!(link.is_recovery);
    }

    #[test]
    fn test_access_token_alone_counts() {
        let link = RecoveryLink::parse("https://tutor.example/#access_token=tok")
            .unwrap()
            .unwrap();
        assert!(!link.is_recovery);
        assert_eq!(link.access_token.as_deref(), Some("tok"));
        assert_eq!(link.refresh_token, None);
    }

    #[test]
    fn test_type_recovery_without_token() {
        let link = RecoveryLink::parse("https://tutor.example/#type=recovery")
            .unwrap()
            .unwrap();
        assert!(link.is_recovery);
        assert_eq!(link.access_token, None);
    }

    #[test]
    fn test_hash_router_fragment() {
        let link = RecoveryLink::parse(
            "https://tutor.example/#/reset?type=recovery&access_token=tok&refresh_token=r2",
        )
        .unwrap()
        .unwrap();

        assert!(link.is_recovery);
        assert_eq!(link.address, "https://tutor.example/");
        assert_eq!(link.access_token.as_deref(), Some("tok"));
        assert_eq!(link.refresh_token.as_deref(), Some("r2"));
    }

    #[test]
    fn test_plain_links_are_not_recovery() {
        assert_eq!(RecoveryLink::parse("https://tutor.example/").unwrap(), None);
        assert_eq!(RecoveryLink::parse("https://tutor.example/#section-2").unwrap(), None);
        assert_eq!(RecoveryLink::parse("https://tutor.example/#/lessons?page=2").unwrap(), None);
        assert_eq!(
            RecoveryLink::parse("https://tutor.example/#type=signup").unwrap(),
            None
        );
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(RecoveryLink::parse("not a url").is_err());
    }
}
