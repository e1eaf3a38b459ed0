//! Conversation controller: the message list, the composer input and one
//! turn in flight at a time.

use std::sync::Arc;

use crate::backend::{MessageRow, MessageStore};
use crate::error::CompletionError;
use crate::events::{ChatMessage, ModelChoice};
use crate::llm::CompletionClient;
use crate::prompts;
use crate::session::SessionHandle;
use crate::tutor::LocalTutor;

/// Why a send did not go out, or that it did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty input or a turn already in flight
    Ignored,
    /// No session; the host should open the auth modal
    AuthRequired,
    Sent,
}

/// A turn accepted by [`ConversationController::begin_send`], waiting for
/// its reply
#[derive(Debug, Clone)]
pub struct PendingTurn {
    model: ModelChoice,
    transcript: Vec<ChatMessage>,
    user_id: String,
    generation: u64,
}

impl PendingTurn {
    pub fn model(&self) -> ModelChoice {
        self.model
    }

    /// Everything the remote model sees, ending with the new user message
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }
}

/// Outcome of generating a reply for a [`PendingTurn`]
#[derive(Debug)]
pub struct TurnReply {
    user_id: String,
    user_message: ChatMessage,
    generation: u64,
    result: Result<String, CompletionError>,
}

/// Produces assistant replies with either the local tutor or the remote
/// completion client
#[derive(Clone)]
pub struct ReplyEngine {
    completion: Arc<dyn CompletionClient>,
    tutor: LocalTutor,
}

impl ReplyEngine {
    pub fn new(completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            completion,
            tutor: LocalTutor::new(),
        }
    }

    pub async fn generate(&self, turn: PendingTurn) -> TurnReply {
        let Some(user_message) = turn.transcript.last().cloned() else {
            return TurnReply {
                user_id: turn.user_id,
                user_message: ChatMessage::user(""),
                generation: turn.generation,
                result: Err(CompletionError::EmptyResponse),
            };
        };

        let result = match turn.model {
            ModelChoice::DeepSeek => {
                self.completion
                    .complete(prompts::PERSONA, &turn.transcript)
                    .await
            }
            ModelChoice::Local => {
                let (delay, reply) = {
                    let mut rng = rand::rng();
                    (
                        self.tutor.simulated_latency(&mut rng),
                        self.tutor.reply(&user_message.content, &mut rng),
                    )
                };
                tokio::time::sleep(delay).await;
                Ok(reply)
            }
        };

        if let Err(e) = &result {
            tracing::warn!(error = %e, model = turn.model.as_ref(), "reply generation failed");
        }

        TurnReply {
            user_id: turn.user_id,
            user_message,
            generation: turn.generation,
            result,
        }
    }
}

/// Loads stored history off the UI loop
pub struct HistoryLoader {
    store: Arc<dyn MessageStore>,
    user_id: Option<String>,
}

/// History fetched for the account that was signed in when the load began
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedHistory {
    user_id: Option<String>,
    messages: Vec<ChatMessage>,
}

impl HistoryLoader {
    /// Stored messages oldest first; empty when signed out or on error
    pub async fn load(self) -> LoadedHistory {
        let messages = match &self.user_id {
            None => Vec::new(),
            Some(_) => match self.store.load_messages().await {
                Ok(messages) => {
                    tracing::debug!(count = messages.len(), "history loaded");
                    messages
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to load history");
                    Vec::new()
                }
            },
        };
        LoadedHistory {
            user_id: self.user_id,
            messages,
        }
    }
}

/// Write a finished turn. Failures are logged and otherwise ignored.
pub async fn persist_turn(store: &dyn MessageStore, rows: &[MessageRow]) {
    if let Err(e) = store.insert_messages(rows).await {
        tracing::warn!(error = %e, "failed to save messages");
    }
}

pub struct ConversationController {
    session: SessionHandle,
    store: Arc<dyn MessageStore>,
    engine: ReplyEngine,
    model: ModelChoice,
    messages: Vec<ChatMessage>,
    input: String,
    busy: bool,
    generation: u64,
}

impl ConversationController {
    pub fn new(
        session: SessionHandle,
        store: Arc<dyn MessageStore>,
        engine: ReplyEngine,
        model: ModelChoice,
    ) -> Self {
        Self {
            session,
            store,
            engine,
            model,
            messages: Vec::new(),
            input: String::new(),
            busy: false,
            generation: 0,
        }
    }

    pub fn history_loader(&self) -> HistoryLoader {
        HistoryLoader {
            store: Arc::clone(&self.store),
            user_id: self.session.current().map(|s| s.user_id),
        }
    }

    /// Install a finished load. Returns false when it was dropped: the
    /// account changed since the load began, or a turn is in flight.
    pub fn apply_history(&mut self, loaded: LoadedHistory) -> bool {
        let current = self.session.current().map(|s| s.user_id);
        if loaded.user_id != current {
            tracing::debug!("dropping history loaded for another session");
            return false;
        }
        if self.busy {
            tracing::debug!("history arrived mid-turn, keeping current list");
            return false;
        }
        self.set_history(loaded.messages);
        true
    }

    /// Replace the list with freshly loaded history
    pub fn set_history(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    pub async fn load_history(&mut self) {
        let loaded = self.history_loader().load().await;
        self.apply_history(loaded);
    }

    /// The list, or the welcome card while it is empty
    pub fn visible_messages(&self) -> Vec<ChatMessage> {
        if self.messages.is_empty() {
            vec![ChatMessage::assistant(prompts::WELCOME)]
        } else {
            self.messages.clone()
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn model(&self) -> ModelChoice {
        self.model
    }

    pub fn set_model(&mut self, model: ModelChoice) {
        if model != self.model {
            tracing::info!(model = model.as_ref(), "switched model");
        }
        self.model = model;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn engine(&self) -> ReplyEngine {
        self.engine.clone()
    }

    pub fn store(&self) -> Arc<dyn MessageStore> {
        Arc::clone(&self.store)
    }

    /// Forget the conversation, e.g. after sign-out. A reply still in
    /// flight is dropped when it arrives.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.input.clear();
        self.busy = false;
        self.generation += 1;
    }

    /// Accept the current input as a user turn
    pub fn begin_send(&mut self) -> Result<PendingTurn, SendOutcome> {
        let text = self.input.trim();
        if text.is_empty() || self.busy {
            return Err(SendOutcome::Ignored);
        }
        let Some(session) = self.session.current() else {
            return Err(SendOutcome::AuthRequired);
        };

        let message = ChatMessage::user(text);
        self.messages.push(message);
        self.input.clear();
        self.busy = true;

        Ok(PendingTurn {
            model: self.model,
            transcript: self.messages.clone(),
            user_id: session.user_id,
            generation: self.generation,
        })
    }

    /// Append the reply (or the apology) and hand back the rows to persist
    pub fn finish_send(&mut self, reply: TurnReply) -> Option<Vec<MessageRow>> {
        if reply.generation != self.generation {
            tracing::debug!("dropping reply for a cleared conversation");
            return None;
        }
        self.busy = false;

        match reply.result {
            Ok(text) => {
                let assistant = ChatMessage::assistant(text);
                let rows = vec![
                    MessageRow::new(&reply.user_id, &reply.user_message),
                    MessageRow::new(&reply.user_id, &assistant),
                ];
                self.messages.push(assistant);
                Some(rows)
            }
            Err(_) => {
                self.messages.push(ChatMessage::assistant(prompts::APOLOGY));
                None
            }
        }
    }

    /// Run a whole turn in place, persisting it before returning
    pub async fn send(&mut self) -> SendOutcome {
        let turn = match self.begin_send() {
            Ok(turn) => turn,
            Err(outcome) => return outcome,
        };
        let reply = self.engine.generate(turn).await;
        if let Some(rows) = self.finish_send(reply) {
            persist_turn(self.store.as_ref(), &rows).await;
        }
        SendOutcome::Sent
    }
}
