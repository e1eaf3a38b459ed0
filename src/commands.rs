use anyhow::{Context, Result};

use crate::auth::flow::validate_new_password;
use crate::backend::{IdentityProvider, MessageStore, SupabaseClient};
use crate::config::Config;
use crate::events::Role;
use crate::session::SessionState;
use crate::storage::SessionStore;

/// Backend client wired to the session saved on disk
fn connect(config: &Config) -> Result<(SupabaseClient, SessionState, SessionStore)> {
    if !config.has_backend() {
        anyhow::bail!(
            "Supabase is not configured. Set SUPABASE_URL and SUPABASE_ANON_KEY or edit {}",
            config.config_path().display()
        );
    }

    let store = SessionStore::new(config.session_path());
    let sessions = SessionState::new(store.load()?);
    let client = SupabaseClient::new(&config.supabase, sessions.clone())?;
    Ok((client, sessions, store))
}

pub async fn show_history(config: &Config) -> Result<()> {
    let (client, sessions, _) = connect(config)?;

    let Some(session) = sessions.handle().current() else {
        println!("🔒 还没有登录。运行 'htmltutor' 并输入 /login 登录后再查看历史。");
        return Ok(());
    };

    let messages = client
        .load_messages()
        .await
        .context("Failed to load history")?;

    if messages.is_empty() {
        println!("📭 {} 还没有任何对话记录。", session.email);
        return Ok(());
    }

    println!("📚 {} 的学习记录：", session.email);
    println!("{}", "=".repeat(50));
    for message in messages {
        let who = match message.role {
            Role::User => "👤 你",
            Role::Assistant => "🤖 小码老师",
        };
        println!("{}", who);
        for line in message.content.lines() {
            println!("   {}", line);
        }
        println!();
    }

    Ok(())
}

pub async fn logout(config: &Config) -> Result<()> {
    let (client, sessions, store) = connect(config)?;

    if !sessions.handle().is_signed_in() {
        println!("👋 当前没有登录的账号。");
        return Ok(());
    }

    if let Err(e) = client.sign_out().await {
        tracing::warn!(error = %e, "server-side sign-out failed");
    }
    store.clear()?;
    println!("✅ 已退出登录。");
    Ok(())
}

pub async fn signup(config: &Config, email: &str, password: &str) -> Result<()> {
    validate_new_password(password, password)?;
    let (client, sessions, store) = connect(config)?;

    client
        .sign_up(email, password)
        .await
        .context("Sign-up failed")?;

    match sessions.handle().current() {
        Some(session) => {
            store.save(&session)?;
            println!("🎉 注册成功！已登录为 {}", session.email);
        }
        None => {
            println!("📧 注册成功！请查收 {} 的确认邮件后再登录。", email);
        }
    }
    Ok(())
}

fn redact(secret: Option<&str>) -> String {
    match secret {
        Some(s) if s.chars().count() > 8 => {
            let head: String = s.chars().take(4).collect();
            format!("{}…", head)
        }
        Some(_) => "(set)".to_string(),
        None => "(not set)".to_string(),
    }
}

pub fn show_config(config: &Config, init: bool) -> Result<()> {
    if init {
        if config.config_path().exists() {
            println!("⚠️  {} already exists, leaving it alone.", config.config_path().display());
        } else {
            config.write_default()?;
            println!("📝 Wrote {}", config.config_path().display());
        }
    }

    let anon_key = Some(config.supabase.anon_key.as_str()).filter(|k| !k.is_empty());

    println!("⚙️  htmltutor configuration");
    println!("{}", "=".repeat(50));
    println!("   📍 Config file:   {}", config.config_path().display());
    println!("   🔑 Session file:  {}", config.session_path().display());
    println!("   📜 Logs:          {}", config.log_dir().display());
    println!("   🤖 Default model: {}", config.default_model.display_name());
    println!("   🌐 DeepSeek:      {} ({})", config.deepseek.base_url, config.deepseek.model);
    println!("   🗝️  API key:       {}", redact(config.deepseek_api_key.as_deref()));
    println!(
        "   🗄️  Supabase:      {}",
        if config.supabase.url.is_empty() {
            "(not set)"
        } else {
            config.supabase.url.as_str()
        }
    );
    println!("   🗝️  Anon key:      {}", redact(anon_key));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_keeps_only_a_prefix() {
        assert_eq!(redact(Some("sk-1234567890abcdef")), "sk-1…");
        assert_eq!(redact(Some("short")), "(set)");
        assert_eq!(redact(None), "(not set)");
    }

    #[tokio::test]
    async fn test_commands_need_a_backend() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load_from(dir.path()).unwrap();
        config.supabase.url.clear();
        config.supabase.anon_key.clear();

        let err = show_history(&config).await.unwrap_err();
        assert!(err.to_string().contains("SUPABASE_URL"));
    }

    #[tokio::test]
    async fn test_signup_rejects_short_password_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path()).unwrap();

        let err = signup(&config, "a@b.c", "123").await.unwrap_err();
        assert_eq!(err.to_string(), "密码至少需要6个字符");
    }

    #[test]
    fn test_config_init_does_not_write_resolved_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load_from(dir.path()).unwrap();
        config.deepseek_api_key = Some("sk-resolved-secret".to_string());

        show_config(&config, true).unwrap();

        let written = std::fs::read_to_string(config.config_path()).unwrap();
        assert!(!written.contains("sk-resolved-secret"));
    }

    #[test]
    fn test_config_init_writes_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path()).unwrap();

        show_config(&config, true).unwrap();
        assert!(config.config_path().exists());
        show_config(&config, true).unwrap();
    }
}
