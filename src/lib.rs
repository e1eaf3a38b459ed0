//! htmltutor: a terminal chat tutor for learning HTML.
//!
//! Replies come either from a local keyword responder or from the DeepSeek
//! chat API. Accounts and conversation history live in Supabase.

pub mod auth;
pub mod backend;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod error;
pub mod events;
pub mod llm;
pub mod prompts;
pub mod recovery;
pub mod session;
pub mod storage;
pub mod tutor;
pub mod ui;
