use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::events::ModelChoice;

pub const DEEPSEEK_API_KEY_ENV: &str = "DEEPSEEK_API_KEY";
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bearer credential for the DeepSeek completion API
    pub deepseek_api_key: Option<String>,

    /// DeepSeek endpoint and model
    pub deepseek: DeepSeekConfig,

    /// Hosted backend for auth and message history
    pub supabase: SupabaseConfig,

    /// Reply strategy selected at startup
    pub default_model: ModelChoice,

    /// Application home directory
    #[serde(skip)]
    pub home: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepSeekConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    /// Table holding `{ user_id, role, content, created_at }` rows
    pub messages_table: String,
    /// Where password-recovery emails should send the user back to
    pub redirect_to: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));

        Config {
            deepseek_api_key: None,
            deepseek: DeepSeekConfig::default(),
            supabase: SupabaseConfig {
                messages_table: "messages".to_string(),
                ..SupabaseConfig::default()
            },
            default_model: ModelChoice::default(),
            home: home.join(".htmltutor"),
        }
    }
}

impl Config {
    /// Load configuration from `~/.htmltutor/config.toml`, then apply
    /// environment overrides. Read once at startup.
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir()
            .context("Could not find home directory")?
            .join(".htmltutor");
        Self::load_from(&home)
    }

    pub fn load_from(home: &Path) -> Result<Self> {
        fs::create_dir_all(home).context("Failed to create .htmltutor directory")?;

        let config_path = home.join("config.toml");
        let mut config = if config_path.exists() {
            let content =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            Config::default()
        };

        config.home = home.to_path_buf();
        if config.supabase.messages_table.is_empty() {
            config.supabase.messages_table = "messages".to_string();
        }
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Environment wins over the file for credentials and endpoints
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(DEEPSEEK_API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.deepseek_api_key = Some(key);
        }
        if let Some(url) = lookup(SUPABASE_URL_ENV).filter(|u| !u.is_empty()) {
            self.supabase.url = url;
        }
        if let Some(key) = lookup(SUPABASE_ANON_KEY_ENV).filter(|k| !k.is_empty()) {
            self.supabase.anon_key = key;
        }
    }

    /// Write a config file holding only the defaults. Values taken from the
    /// environment stay out of it.
    pub fn write_default(&self) -> Result<()> {
        let defaults = Config {
            home: self.home.clone(),
            ..Config::default()
        };
        let content = toml::to_string_pretty(&defaults).context("Failed to serialize config")?;
        fs::write(self.config_path(), content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    pub fn session_path(&self) -> PathBuf {
        self.home.join("session.json")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.home.join("logs")
    }

    /// Check if the completion API key is configured
    pub fn has_api_key(&self) -> bool {
        self.deepseek_api_key.is_some()
    }

    pub fn has_backend(&self) -> bool {
        !self.supabase.url.is_empty() && !self.supabase.anon_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path()).unwrap();

        assert_eq!(config.deepseek.model, "deepseek-chat");
        assert_eq!(config.deepseek.max_tokens, 2000);
        assert_eq!(config.supabase.messages_table, "messages");
        assert_eq!(config.home, dir.path());
    }

    #[test]
    fn test_load_reads_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            r#"
default_model = "local"

[supabase]
url = "https://project.supabase.co"
anon_key = "anon"
"#,
        )
        .unwrap();

        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.default_model, ModelChoice::Local);
        assert_eq!(config.supabase.url, "https://project.supabase.co");
        assert_eq!(config.supabase.messages_table, "messages");
        assert_eq!(config.deepseek.base_url, "https://api.deepseek.com");
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::default();
        config.supabase.url = "https://file.example".to_string();

        let env: HashMap<&str, &str> = HashMap::from([
            (DEEPSEEK_API_KEY_ENV, "sk-test"),
            (SUPABASE_URL_ENV, "https://env.example"),
            (SUPABASE_ANON_KEY_ENV, ""),
        ]);
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.deepseek_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.supabase.url, "https://env.example");
        assert!(config.supabase.anon_key.is_empty());
        assert!(!config.has_backend());
    }

    #[test]
    fn test_default_file_keeps_env_secrets_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load_from(dir.path()).unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            (DEEPSEEK_API_KEY_ENV, "sk-from-env-secret"),
            (SUPABASE_ANON_KEY_ENV, "anon-from-env"),
        ]);
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        config.write_default().unwrap();

        let written = std::fs::read_to_string(config.config_path()).unwrap();
        assert!(!written.contains("sk-from-env-secret"));
        assert!(!written.contains("anon-from-env"));

        let reloaded: Config = toml::from_str(&written).unwrap();
        assert_eq!(reloaded.deepseek.model, "deepseek-chat");
        assert!(reloaded.deepseek_api_key.is_none());
    }
}
