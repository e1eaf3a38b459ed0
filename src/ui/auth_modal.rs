//! Login / registration dialog drawn over the conversation

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::auth::{AuthFlow, AuthStep, CODE_LENGTH};

/// Input fields the dialog can focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Email,
    Password,
    Confirmation,
    Code,
}

fn fields_for(step: AuthStep) -> &'static [AuthField] {
    match step {
        AuthStep::EnterEmail | AuthStep::ForgotPassword => &[AuthField::Email],
        AuthStep::VerifyCode => &[AuthField::Code],
        AuthStep::SetPassword | AuthStep::ResetPassword => {
            &[AuthField::Password, AuthField::Confirmation]
        }
        AuthStep::PasswordLogin => &[AuthField::Email, AuthField::Password],
    }
}

/// What the host loop should do after a key reached the dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    None,
    Submit,
    Resend,
    Close,
}

/// Field focus, reset whenever the flow changes step
#[derive(Debug, Clone, Copy)]
pub struct AuthModalState {
    step: AuthStep,
    focus: usize,
}

impl Default for AuthModalState {
    fn default() -> Self {
        Self {
            step: AuthStep::EnterEmail,
            focus: 0,
        }
    }
}

impl AuthModalState {
    pub fn focused(&self, flow: &AuthFlow) -> AuthField {
        let fields = fields_for(flow.step());
        if self.step != flow.step() {
            return fields[0];
        }
        fields[self.focus.min(fields.len() - 1)]
    }

    fn sync(&mut self, flow: &AuthFlow) {
        if self.step != flow.step() {
            self.step = flow.step();
            self.focus = 0;
        }
    }

    fn cycle(&mut self, flow: &AuthFlow, forward: bool) {
        let len = fields_for(flow.step()).len();
        self.focus = if forward {
            (self.focus + 1) % len
        } else {
            (self.focus + len - 1) % len
        };
    }

    pub fn handle_key(&mut self, flow: &mut AuthFlow, key: KeyEvent) -> ModalAction {
        if key.kind != KeyEventKind::Press {
            return ModalAction::None;
        }
        self.sync(flow);

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char(c) = key.code {
                return self.shortcut(flow, c);
            }
        }

        let field = self.focused(flow);
        match key.code {
            KeyCode::Esc => return ModalAction::Close,
            KeyCode::Enter => {
                if flow.step() == AuthStep::VerifyCode && !flow.code().is_complete() {
                    return ModalAction::None;
                }
                return ModalAction::Submit;
            }
            KeyCode::Tab | KeyCode::Down => self.cycle(flow, true),
            KeyCode::BackTab | KeyCode::Up => self.cycle(flow, false),
            KeyCode::Left if field == AuthField::Code => flow.code_mut().move_left(),
            KeyCode::Right if field == AuthField::Code => flow.code_mut().move_right(),
            KeyCode::Backspace => match field {
                AuthField::Code => flow.code_mut().backspace(),
                other => {
                    text_field(flow, other).pop();
                }
            },
            KeyCode::Char(c) => match field {
                AuthField::Code => flow.code_mut().input(c),
                other => text_field(flow, other).push(c),
            },
            _ => {}
        }
        ModalAction::None
    }

    /// Bracketed paste into the focused field
    pub fn paste(&mut self, flow: &mut AuthFlow, text: &str) {
        self.sync(flow);
        match self.focused(flow) {
            AuthField::Code => flow.code_mut().paste(text),
            other => text_field(flow, other).push_str(text.trim()),
        }
    }

    fn shortcut(&mut self, flow: &mut AuthFlow, c: char) -> ModalAction {
        match (flow.step(), c) {
            (AuthStep::EnterEmail, 't') => flow.toggle_register(),
            (AuthStep::EnterEmail, 'p') if !flow.is_register() => {
                flow.switch_step(AuthStep::PasswordLogin)
            }
            (AuthStep::VerifyCode, 'r') => return ModalAction::Resend,
            (AuthStep::VerifyCode, 'b') => flow.switch_step(AuthStep::EnterEmail),
            (AuthStep::PasswordLogin, 'e') => flow.switch_step(AuthStep::EnterEmail),
            (AuthStep::PasswordLogin, 'r') => flow.register_anew(),
            (AuthStep::PasswordLogin, 'f') => flow.switch_step(AuthStep::ForgotPassword),
            (AuthStep::ForgotPassword, 'b') => flow.switch_step(AuthStep::PasswordLogin),
            _ => {}
        }
        self.sync(flow);
        ModalAction::None
    }
}

fn text_field(flow: &mut AuthFlow, field: AuthField) -> &mut String {
    match field {
        AuthField::Password => flow.password_mut(),
        AuthField::Confirmation => flow.confirmation_mut(),
        AuthField::Email | AuthField::Code => flow.email_mut(),
    }
}

/// Renders [`AuthFlow`] as a centered dialog
pub struct AuthModal<'a> {
    flow: &'a AuthFlow,
    focus: AuthField,
}

impl<'a> AuthModal<'a> {
    pub fn new(flow: &'a AuthFlow, state: &AuthModalState) -> Self {
        Self {
            flow,
            focus: state.focused(flow),
        }
    }

    fn input_line(&self, field: AuthField, label: &'a str, value: &str, masked: bool) -> Line<'a> {
        let focused = self.focus == field;
        let mut shown = if masked {
            "•".repeat(value.chars().count())
        } else {
            value.to_string()
        };
        if focused {
            shown.push('▌');
        }
        let style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };
        Line::from(vec![
            Span::styled(format!("{:<6}", label), Style::default().fg(Color::DarkGray)),
            Span::styled(format!("[ {} ]", shown), style),
        ])
    }

    fn code_line(&self) -> Line<'a> {
        let code = self.flow.code();
        let mut spans = Vec::with_capacity(CODE_LENGTH * 2);
        for index in 0..CODE_LENGTH {
            let digit = code.slot(index).unwrap_or('_');
            let style = if index == code.focus() {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            spans.push(Span::styled(format!(" {} ", digit), style));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }

    fn body(&self) -> Vec<Line<'a>> {
        let flow = self.flow;
        let mut lines = Vec::new();

        match flow.step() {
            AuthStep::EnterEmail => {
                let intro = if flow.is_register() {
                    "输入邮箱，我们会发送6位验证码帮你注册"
                } else {
                    "输入邮箱，用验证码直接登录"
                };
                lines.push(Line::from(intro));
                lines.push(Line::from(""));
                lines.push(self.input_line(AuthField::Email, "邮箱", flow.email(), false));
            }
            AuthStep::VerifyCode => {
                lines.push(Line::from(format!("验证码已发送到 {}", flow.email())));
                lines.push(Line::from(""));
                lines.push(self.code_line());
                lines.push(Line::from(""));
                let resend = if flow.countdown() > 0 {
                    format!("{}秒后可重新发送", flow.countdown())
                } else {
                    "可以重新发送验证码了 (Ctrl+R)".to_string()
                };
                lines.push(Line::from(Span::styled(
                    resend,
                    Style::default().fg(Color::DarkGray),
                )));
            }
            AuthStep::SetPassword | AuthStep::ResetPassword => {
                lines.push(Line::from("密码至少6个字符"));
                lines.push(Line::from(""));
                lines.push(self.input_line(AuthField::Password, "密码", flow.password(), true));
                lines.push(self.input_line(
                    AuthField::Confirmation,
                    "确认",
                    flow.confirmation(),
                    true,
                ));
            }
            AuthStep::PasswordLogin => {
                lines.push(self.input_line(AuthField::Email, "邮箱", flow.email(), false));
                lines.push(self.input_line(AuthField::Password, "密码", flow.password(), true));
            }
            AuthStep::ForgotPassword => {
                lines.push(Line::from("输入注册邮箱，我们会发送重置密码的链接"));
                lines.push(Line::from(""));
                lines.push(self.input_line(AuthField::Email, "邮箱", flow.email(), false));
            }
        }

        lines.push(Line::from(""));
        if let Some(error) = flow.error() {
            lines.push(Line::from(Span::styled(
                format!("❌ {}", error),
                Style::default().fg(Color::Red),
            )));
        }
        if let Some(success) = flow.success() {
            lines.push(Line::from(Span::styled(
                format!("✅ {}", success),
                Style::default().fg(Color::Green),
            )));
        }
        if flow.is_busy() {
            lines.push(Line::from(Span::styled(
                "处理中...",
                Style::default().fg(Color::Yellow),
            )));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            self.hints(),
            Style::default().fg(Color::DarkGray),
        )));
        lines
    }

    fn hints(&self) -> &'static str {
        match self.flow.step() {
            AuthStep::EnterEmail if self.flow.is_register() => {
                "Enter 发送验证码 · Ctrl+T 已有账号？登录 · Esc 关闭"
            }
            AuthStep::EnterEmail => {
                "Enter 发送验证码 · Ctrl+P 密码登录 · Ctrl+T 去注册 · Esc 关闭"
            }
            AuthStep::VerifyCode => "Enter 验证 · Ctrl+R 重新发送 · Ctrl+B 修改邮箱 · Esc 关闭",
            AuthStep::SetPassword => "Enter 完成注册 · Tab 切换输入框 · Esc 关闭",
            AuthStep::ResetPassword => "Enter 重置密码 · Tab 切换输入框 · Esc 关闭",
            AuthStep::PasswordLogin => {
                "Enter 登录 · Ctrl+E 验证码登录 · Ctrl+F 忘记密码 · Ctrl+R 注册新账号"
            }
            AuthStep::ForgotPassword => "Enter 发送重置邮件 · Ctrl+B 返回密码登录 · Esc 关闭",
        }
    }
}

impl Widget for AuthModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.flow.title()))
            .style(Style::default().fg(Color::Cyan));

        Paragraph::new(self.body())
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{IdentityProvider, ProviderResult};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NoopIdentity;

    #[async_trait]
    impl IdentityProvider for NoopIdentity {
        async fn send_otp(&self, _email: &str) -> ProviderResult<()> {
            Ok(())
        }
        async fn verify_otp(&self, _email: &str, _token: &str) -> ProviderResult<()> {
            Ok(())
        }
        async fn sign_in_with_password(&self, _email: &str, _password: &str) -> ProviderResult<()> {
            Ok(())
        }
        async fn sign_up(&self, _email: &str, _password: &str) -> ProviderResult<()> {
            Ok(())
        }
        async fn request_password_reset(&self, _email: &str) -> ProviderResult<()> {
            Ok(())
        }
        async fn update_password(&self, _password: &str) -> ProviderResult<()> {
            Ok(())
        }
        async fn sign_out(&self) -> ProviderResult<()> {
            Ok(())
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn flow() -> AuthFlow {
        let mut flow = AuthFlow::new(Arc::new(NoopIdentity));
        flow.open(false);
        flow
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut flow = flow();
        let mut state = AuthModalState::default();
        for c in "a@b.c".chars() {
            state.handle_key(&mut flow, key(KeyCode::Char(c)));
        }
        assert_eq!(flow.email(), "a@b.c");
        assert_eq!(state.handle_key(&mut flow, key(KeyCode::Enter)), ModalAction::Submit);
    }

    #[test]
    fn test_tab_moves_between_password_fields() {
        let mut flow = flow();
        let mut state = AuthModalState::default();
        flow.switch_step(AuthStep::SetPassword);

        state.handle_key(&mut flow, key(KeyCode::Char('x')));
        state.handle_key(&mut flow, key(KeyCode::Tab));
        state.handle_key(&mut flow, key(KeyCode::Char('y')));

        assert_eq!(flow.password(), "x");
        assert_eq!(flow.confirmation(), "y");
    }

    #[test]
    fn test_enter_waits_for_full_code() {
        let mut flow = flow();
        let mut state = AuthModalState::default();
        flow.switch_step(AuthStep::VerifyCode);

        state.paste(&mut flow, "123");
        assert_eq!(state.handle_key(&mut flow, key(KeyCode::Enter)), ModalAction::None);
        state.paste(&mut flow, "456");
        assert_eq!(state.handle_key(&mut flow, key(KeyCode::Enter)), ModalAction::Submit);
    }

    #[test]
    fn test_shortcuts_follow_step() {
        let mut flow = flow();
        let mut state = AuthModalState::default();

        // password login is only offered in login mode
        state.handle_key(&mut flow, ctrl('p'));
        assert_eq!(flow.step(), AuthStep::EnterEmail);

        state.handle_key(&mut flow, ctrl('t'));
        state.handle_key(&mut flow, ctrl('p'));
        assert_eq!(flow.step(), AuthStep::PasswordLogin);

        state.handle_key(&mut flow, ctrl('f'));
        assert_eq!(flow.step(), AuthStep::ForgotPassword);
        state.handle_key(&mut flow, ctrl('b'));
        assert_eq!(flow.step(), AuthStep::PasswordLogin);

        state.handle_key(&mut flow, ctrl('r'));
        assert_eq!(flow.step(), AuthStep::EnterEmail);
        assert!(flow.is_register());
    }

    #[test]
    fn test_escape_closes() {
        let mut flow = flow();
        let mut state = AuthModalState::default();
        assert_eq!(state.handle_key(&mut flow, key(KeyCode::Esc)), ModalAction::Close);
    }
}
