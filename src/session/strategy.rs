// ABOUTME: Conversation strategies — replay (resend full transcript) and checkpoint-delegated.
// ABOUTME: Both own their session state explicitly and expose the full history for logging.

use std::sync::Arc;

use async_trait::async_trait;

use super::SessionMode;
use super::message::{GenerationParams, Message};
use crate::checkpoint::{StatefulChat, ThreadId};
use crate::error::{CheckpointError, ModelError};
use crate::llm::ChatModel;

/// How a session submits turns and keeps its history.
#[async_trait]
pub trait ConversationStrategy: Send {
    /// Submit one user message and return the assistant's reply.
    ///
    /// On failure the user message stays in the history and no reply is recorded.
    async fn submit(&mut self, text: &str) -> Result<Message, ModelError>;

    /// Full ordered history of the session.
    fn history(&self) -> Result<Vec<Message>, CheckpointError>;

    fn mode(&self) -> SessionMode;

    fn model_name(&self) -> &str;

    fn params(&self) -> GenerationParams;
}

/// Keeps the transcript in memory and resends all of it on every turn.
pub struct ReplaySession {
    model: Arc<dyn ChatModel>,
    messages: Vec<Message>,
}

impl ReplaySession {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

#[async_trait]
impl ConversationStrategy for ReplaySession {
    async fn submit(&mut self, text: &str) -> Result<Message, ModelError> {
        self.messages.push(Message::user(text));
        let reply = self.model.invoke(&self.messages).await?;
        self.messages.push(reply.clone());
        Ok(reply)
    }

    fn history(&self) -> Result<Vec<Message>, CheckpointError> {
        Ok(self.messages.clone())
    }

    fn mode(&self) -> SessionMode {
        SessionMode::Replay
    }

    fn model_name(&self) -> &str {
        self.model.model_name()
    }

    fn params(&self) -> GenerationParams {
        self.model.params()
    }
}

/// Sends only the new message plus a stable thread id; the endpoint keeps history.
///
/// A resumed thread may already hold turns from earlier runs. Those still reach
/// the model, but [`ConversationStrategy::history`] only reports this run's turns.
pub struct CheckpointSession {
    chat: Box<dyn StatefulChat>,
    thread_id: ThreadId,
    resumed_len: usize,
}

impl CheckpointSession {
    pub fn new(
        chat: Box<dyn StatefulChat>,
        thread_id: ThreadId,
    ) -> Result<Self, CheckpointError> {
        let resumed_len = chat.history(&thread_id)?.len();
        Ok(Self {
            chat,
            thread_id,
            resumed_len,
        })
    }

    pub fn thread_id(&self) -> &ThreadId {
        &self.thread_id
    }
}

#[async_trait]
impl ConversationStrategy for CheckpointSession {
    async fn submit(&mut self, text: &str) -> Result<Message, ModelError> {
        self.chat.invoke(&self.thread_id, Message::user(text)).await
    }

    fn history(&self) -> Result<Vec<Message>, CheckpointError> {
        let mut history = self.chat.history(&self.thread_id)?;
        let start = self.resumed_len.min(history.len());
        Ok(history.split_off(start))
    }

    fn mode(&self) -> SessionMode {
        SessionMode::Checkpoint
    }

    fn model_name(&self) -> &str {
        self.chat.model_name()
    }

    fn params(&self) -> GenerationParams {
        self.chat.params()
    }
}
