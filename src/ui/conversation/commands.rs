use std::str::FromStr;

use crate::events::ModelChoice;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Switch between the local tutor and DeepSeek
    Model,
    /// Open the login / registration dialog
    Login,
    /// Sign out and forget the conversation
    Logout,
    /// Show help
    Help,
    /// Exit the application
    Quit,
}

pub fn command_entries() -> Vec<CommandEntry> {
    SlashCommand::iter()
        .map(|command| CommandEntry {
            command,
            keyword: command.command(),
            description: command.description(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: SlashCommand,
    pub argument: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEntry {
    pub command: SlashCommand,
    pub keyword: &'static str,
    pub description: &'static str,
}

impl ParsedCommand {
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// Explicit target of `/model <name>`
    pub fn model_target(&self) -> Option<ModelChoice> {
        if self.command != SlashCommand::Model {
            return None;
        }

        let arg = self.argument()?.trim().to_lowercase();
        match arg.as_str() {
            "l" | "本地" => Some(ModelChoice::Local),
            "d" | "ds" => Some(ModelChoice::DeepSeek),
            other => ModelChoice::from_str(other).ok(),
        }
    }
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Model => "切换模型（local / deepseek）",
            SlashCommand::Login => "登录或注册",
            SlashCommand::Logout => "退出登录",
            SlashCommand::Help => "显示可用命令",
            SlashCommand::Quit => "退出程序",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }

    /// Whether this command can be run while a reply is being generated.
    pub fn available_while_busy(self) -> bool {
        match self {
            SlashCommand::Help | SlashCommand::Quit | SlashCommand::Model => true,
            SlashCommand::Login | SlashCommand::Logout => false,
        }
    }
}

/// Parse a slash command from user input
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.split_whitespace();
    let head = parts.next()?;
    let tail: Vec<&str> = parts.collect();

    let command = SlashCommand::from_str(head).ok().or_else(|| match head.to_lowercase().as_str() {
        "q" | "exit" | "bye" => Some(SlashCommand::Quit),
        "m" | "models" => Some(SlashCommand::Model),
        "signin" | "register" => Some(SlashCommand::Login),
        "signout" => Some(SlashCommand::Logout),
        "h" | "?" => Some(SlashCommand::Help),
        _ => None,
    })?;

    let argument = if tail.is_empty() {
        None
    } else {
        Some(tail.join(" "))
    };

    Some(ParsedCommand { command, argument })
}

/// Get help text for all available commands
pub fn get_help_text() -> String {
    let mut help = String::from("可用命令：\n\n");
    for command in SlashCommand::iter() {
        help.push_str(&format!("/{} - {}\n", command.command(), command.description()));
    }

    help.push_str("\n别名：/q 退出，/m 切换模型，/model local 或 /model deepseek 直接指定");
    help.push_str("\n输入\"帮助\"可以看看小码老师能教你什么。");

    help
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands_and_aliases() {
        assert_eq!(parse_slash_command("/quit").unwrap().command, SlashCommand::Quit);
        assert_eq!(parse_slash_command("/q").unwrap().command, SlashCommand::Quit);
        assert_eq!(parse_slash_command("/login").unwrap().command, SlashCommand::Login);
        assert_eq!(parse_slash_command("/signout").unwrap().command, SlashCommand::Logout);
        assert!(parse_slash_command("/nope").is_none());
        assert!(parse_slash_command("div").is_none());
        assert!(parse_slash_command("/").is_none());
    }

    #[test]
    fn test_model_target() {
        let parsed = parse_slash_command("/model local").unwrap();
        assert_eq!(parsed.model_target(), Some(ModelChoice::Local));

        let parsed = parse_slash_command("/m DeepSeek").unwrap();
        assert_eq!(parsed.model_target(), Some(ModelChoice::DeepSeek));

        let parsed = parse_slash_command("/model").unwrap();
        assert_eq!(parsed.model_target(), None);

        let parsed = parse_slash_command("/help local").unwrap();
        assert_eq!(parsed.model_target(), None);
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = get_help_text();
        for entry in command_entries() {
            assert!(help.contains(&format!("/{}", entry.keyword)));
        }
    }
}
