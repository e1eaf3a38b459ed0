//! TUI application: one `select!` loop over terminal input, background
//! results and session changes.
//!
//! ```text
//! App (select! loop)                 spawned tasks
//!   ├─ crossterm EventStream           ├─ ReplyEngine::generate  → AppEvent::Reply
//!   ├─ events_rx (AppEvent) <──────────├─ AuthRequest::execute   → AppEvent::Auth
//!   ├─ SessionHandle::changed          ├─ HistoryLoader::load    → AppEvent::HistoryLoaded
//!   └─ tick (spinner)                  └─ sign_out / close timer
//! ```

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::auth_modal::{AuthModal, AuthModalState, ModalAction};
use super::centered_overlay;
use super::conversation::{
    get_help_text, ConversationComposer, ConversationHistory, ConversationResult, ParsedCommand,
    SlashCommand,
};
use crate::auth::{AuthFlow, AuthOutcome, AuthRequest};
use crate::backend::IdentityProvider;
use crate::conversation::{persist_turn, ConversationController, SendOutcome};
use crate::events::{AppEvent, ModelChoice};
use crate::session::SessionHandle;

const SPINNER: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];

pub struct App {
    conversation: ConversationController,
    auth: AuthFlow,
    modal: AuthModalState,
    composer: ConversationComposer,
    session: SessionHandle,
    identity: Arc<dyn IdentityProvider>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    has_api_key: bool,
    notice: Option<String>,
    show_help: bool,
    scroll: u16,
    tick: usize,
    close_timer: Option<JoinHandle<()>>,
    should_quit: bool,
}

impl App {
    pub fn new(
        conversation: ConversationController,
        auth: AuthFlow,
        session: SessionHandle,
        has_api_key: bool,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let identity = auth.provider();
        let composer = ConversationComposer::new(conversation.model());

        Self {
            conversation,
            auth,
            modal: AuthModalState::default(),
            composer,
            session,
            identity,
            events_tx,
            events_rx,
            has_api_key,
            notice: None,
            show_help: false,
            scroll: 0,
            tick: 0,
            close_timer: None,
            should_quit: false,
        }
    }

    /// Start with the dialog on the new-password form
    pub fn open_recovery(&mut self) {
        self.auth.open(true);
    }

    pub fn notify(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    /// Run the TUI main loop
    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        // Restore the terminal before a panic message is printed
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
            original_hook(info);
        }));

        let result = self.event_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.session.mark_seen();
        self.spawn_history_load();

        let mut terminal_events = EventStream::new();
        let mut tick = tokio::time::interval(Duration::from_millis(250));

        loop {
            terminal.draw(|frame| self.render(frame))?;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(Ok(event)) = terminal_events.next() => {
                    self.handle_terminal_event(event);
                }
                Some(event) = self.events_rx.recv() => {
                    self.handle_app_event(event);
                }
                alive = self.session.changed() => {
                    if alive {
                        self.on_session_changed();
                    } else {
                        tracing::warn!("session owner dropped, quitting");
                        self.should_quit = true;
                    }
                }
                _ = tick.tick() => {
                    self.tick = self.tick.wrapping_add(1);
                }
            }
        }

        Ok(())
    }

    // ==================== Input ====================

    fn handle_terminal_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Paste(text) => {
                if self.auth.is_open() {
                    self.modal.paste(&mut self.auth, &text);
                } else {
                    let content = self.composer.content();
                    self.composer.set_content(format!("{}{}", content, text));
                }
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.auth.is_open() {
            match self.modal.handle_key(&mut self.auth, key) {
                ModalAction::Submit => {
                    if let Some(request) = self.auth.submit() {
                        self.spawn_auth(request);
                    }
                }
                ModalAction::Resend => {
                    if let Some(request) = self.auth.resend() {
                        self.spawn_auth(request);
                    }
                }
                ModalAction::Close => self.close_auth(),
                ModalAction::None => {}
            }
            return;
        }

        if self.show_help {
            self.show_help = false;
            return;
        }

        match key.code {
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_add(5);
                return;
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_sub(5);
                return;
            }
            _ => {}
        }

        match self.composer.handle_key(key) {
            ConversationResult::Submitted(text) => self.submit_message(text),
            ConversationResult::Command(command) => self.run_command(command),
            ConversationResult::None => {}
        }
    }

    fn submit_message(&mut self, text: String) {
        self.conversation.set_input(text.clone());
        match self.conversation.begin_send() {
            Ok(turn) => {
                self.scroll = 0;
                self.notice = None;
                self.composer.set_busy(true);

                let engine = self.conversation.engine();
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let reply = engine.generate(turn).await;
                    let _ = tx.send(AppEvent::Reply(reply));
                });
            }
            Err(SendOutcome::AuthRequired) => {
                self.composer.set_content(text);
                self.notice = Some("请先登录再开始对话".to_string());
                self.auth.open(false);
            }
            Err(_) => {
                self.composer.set_content(text);
            }
        }
    }

    fn run_command(&mut self, command: ParsedCommand) {
        if self.conversation.is_busy() && !command.command.available_while_busy() {
            self.notice = Some("请等小码老师回复完再试".to_string());
            return;
        }

        match command.command {
            SlashCommand::Model => {
                let next = command
                    .model_target()
                    .unwrap_or_else(|| self.conversation.model().toggled());
                self.set_model(next);
            }
            SlashCommand::Login => match self.session.current() {
                Some(session) => {
                    self.notice = Some(format!("你已经登录了：{}", session.email));
                }
                None => self.auth.open(false),
            },
            SlashCommand::Logout => self.spawn_sign_out(),
            SlashCommand::Help => self.show_help = true,
            SlashCommand::Quit => self.should_quit = true,
        }
    }

    fn set_model(&mut self, model: ModelChoice) {
        self.conversation.set_model(model);
        self.composer.update_model(model);
        self.notice = Some(if model == ModelChoice::DeepSeek && !self.has_api_key {
            "已切换到 DeepSeek，但还没有配置 DEEPSEEK_API_KEY".to_string()
        } else {
            format!("已切换到{}", model.display_name())
        });
    }

    // ==================== Background work ====================

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::HistoryLoaded(loaded) => {
                if self.conversation.apply_history(loaded) {
                    self.scroll = 0;
                }
            }
            AppEvent::Reply(reply) => {
                if let Some(rows) = self.conversation.finish_send(reply) {
                    let store = self.conversation.store();
                    tokio::spawn(async move {
                        persist_turn(store.as_ref(), &rows).await;
                    });
                }
                self.composer.set_busy(self.conversation.is_busy());
            }
            AppEvent::Auth(response) => {
                if let AuthOutcome::CloseAfter(delay) = self.auth.apply(response) {
                    self.schedule_close(delay);
                }
            }
            AppEvent::CloseAuthModal => self.close_auth(),
            AppEvent::SignedOut => {
                self.conversation.clear();
                self.composer.set_busy(false);
                self.notice = Some("已退出登录".to_string());
            }
        }
    }

    fn on_session_changed(&mut self) {
        match self.session.current() {
            Some(session) => {
                tracing::info!(email = %session.email, "signed in");
                self.notice = Some(format!("欢迎，{}！", session.email));
            }
            None => self.conversation.clear(),
        }
        self.spawn_history_load();
    }

    fn spawn_history_load(&self) {
        let loader = self.conversation.history_loader();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let loaded = loader.load().await;
            let _ = tx.send(AppEvent::HistoryLoaded(loaded));
        });
    }

    fn spawn_auth(&self, request: AuthRequest) {
        let provider = self.auth.provider();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let response = request.execute(provider.as_ref()).await;
            let _ = tx.send(AppEvent::Auth(response));
        });
    }

    fn spawn_sign_out(&self) {
        let identity = Arc::clone(&self.identity);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = identity.sign_out().await {
                tracing::warn!(error = %e, "sign-out request failed");
            }
            let _ = tx.send(AppEvent::SignedOut);
        });
    }

    fn schedule_close(&mut self, delay: Duration) {
        if let Some(timer) = self.close_timer.take() {
            timer.abort();
        }
        let tx = self.events_tx.clone();
        self.close_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(AppEvent::CloseAuthModal);
        }));
    }

    fn close_auth(&mut self) {
        if let Some(timer) = self.close_timer.take() {
            timer.abort();
        }
        self.auth.close();
        self.modal = AuthModalState::default();
    }

    // ==================== Rendering ====================

    fn render(&self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        let messages = self.conversation.visible_messages();
        frame.render_widget(
            ConversationHistory::new(&messages)
                .scroll(self.scroll)
                .thinking(self.conversation.is_busy()),
            chunks[0],
        );
        frame.render_widget(&self.composer, chunks[1]);
        frame.render_widget(self.status_line(), chunks[2]);

        if self.show_help {
            let help_area = centered_overlay(60, 60, area);
            frame.render_widget(Clear, help_area);
            frame.render_widget(
                Paragraph::new(get_help_text())
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .title(" 帮助 ")
                            .style(Style::default().fg(Color::Cyan)),
                    )
                    .wrap(Wrap { trim: false }),
                help_area,
            );
        }

        if self.auth.is_open() {
            let modal_area = centered_overlay(64, 60, area);
            frame.render_widget(AuthModal::new(&self.auth, &self.modal), modal_area);
        }
    }

    fn status_line(&self) -> Paragraph<'static> {
        let mut spans = Vec::new();
        if self.conversation.is_busy() {
            spans.push(Span::styled(
                format!("{} ", SPINNER[self.tick % SPINNER.len()]),
                Style::default().fg(Color::Yellow),
            ));
        }
        spans.push(Span::styled(
            format!("模型: {}", self.conversation.model().display_name()),
            Style::default().fg(Color::Cyan),
        ));
        spans.push(Span::raw(" │ "));
        let user = match self.session.current() {
            Some(session) => session.email,
            None => "未登录 (/login)".to_string(),
        };
        spans.push(Span::styled(user, Style::default().fg(Color::Gray)));
        if let Some(notice) = &self.notice {
            spans.push(Span::raw(" │ "));
            spans.push(Span::styled(
                notice.clone(),
                Style::default().fg(Color::Yellow),
            ));
        }
        Paragraph::new(Line::from(spans))
    }

    #[cfg(test)]
    fn is_auth_open(&self) -> bool {
        self.auth.is_open()
    }
}
