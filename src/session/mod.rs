// ABOUTME: Session module — conversation strategies, the interactive loop, and the interaction log.
// ABOUTME: The session object owns all per-run state; nothing is global.

pub mod log;
pub mod r#loop;
pub mod message;
pub mod strategy;

use std::fmt;

use serde::Deserialize;

pub use log::{InteractionBlock, InteractionLog, normalize_content};
pub use r#loop::{EXIT_TOKENS, SessionSummary, finish_session, is_exit_command, run_session};
pub use message::{GenerationParams, Message, Role};
pub use strategy::{CheckpointSession, ConversationStrategy, ReplaySession};

/// How conversation history is retained between turns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Keep the transcript locally and resend it every turn.
    #[default]
    Replay,
    /// Send only the new message; a checkpoint store keeps the history.
    Checkpoint,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Replay => f.write_str("replay"),
            SessionMode::Checkpoint => f.write_str("checkpoint"),
        }
    }
}
