// ABOUTME: Checkpoint layer — stores per-thread message history for the stateful chat mode.
// ABOUTME: Exposes the narrow CheckpointStore interface plus in-memory and file-backed stores.

pub mod chat;
pub mod file;
pub mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CheckpointError;
use crate::session::message::Message;

pub use chat::{CheckpointedChat, StatefulChat};
pub use file::FileCheckpointStore;
pub use memory::InMemoryCheckpointStore;

/// Key identifying one persisted conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random identifier for a new session.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered message history keyed by thread.
pub trait CheckpointStore: Send + Sync {
    /// Full history of the thread, oldest first. Unknown threads are empty.
    fn get_history(&self, thread_id: &ThreadId) -> Result<Vec<Message>, CheckpointError>;

    /// Append one message to the end of the thread.
    fn append_turn(&mut self, thread_id: &ThreadId, message: Message)
    -> Result<(), CheckpointError>;
}
