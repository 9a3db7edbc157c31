// ABOUTME: In-memory checkpoint store — thread histories live for the process lifetime.

use std::collections::HashMap;

use super::{CheckpointStore, ThreadId};
use crate::error::CheckpointError;
use crate::session::message::Message;

#[derive(Debug, Default)]
pub struct InMemoryCheckpointStore {
    threads: HashMap<ThreadId, Vec<Message>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for InMemoryCheckpointStore {
    fn get_history(&self, thread_id: &ThreadId) -> Result<Vec<Message>, CheckpointError> {
        Ok(self.threads.get(thread_id).cloned().unwrap_or_default())
    }

    fn append_turn(
        &mut self,
        thread_id: &ThreadId,
        message: Message,
    ) -> Result<(), CheckpointError> {
        self.threads
            .entry(thread_id.clone())
            .or_default()
            .push(message);
        Ok(())
    }
}
