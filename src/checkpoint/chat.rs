// ABOUTME: Stateful chat invocation — takes one new message plus a thread id.
// ABOUTME: The checkpoint store supplies prior turns to the model and records the new ones.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{CheckpointStore, ThreadId};
use crate::error::{CheckpointError, ModelError};
use crate::llm::ChatModel;
use crate::session::message::{GenerationParams, Message};

/// A model endpoint that remembers conversations by thread.
#[async_trait]
pub trait StatefulChat: Send + Sync {
    /// Submit one new message on a thread and return the reply.
    async fn invoke(&mut self, thread_id: &ThreadId, message: Message)
    -> Result<Message, ModelError>;

    /// Full ordered history the endpoint holds for the thread.
    fn history(&self, thread_id: &ThreadId) -> Result<Vec<Message>, CheckpointError>;

    fn model_name(&self) -> &str;

    fn params(&self) -> GenerationParams;
}

/// A [`ChatModel`] composed with a [`CheckpointStore`].
///
/// The user message is committed before the model call, so a failed call
/// keeps the message in the thread and records no reply.
pub struct CheckpointedChat {
    model: Arc<dyn ChatModel>,
    store: Box<dyn CheckpointStore>,
}

impl CheckpointedChat {
    pub fn new(model: Arc<dyn ChatModel>, store: Box<dyn CheckpointStore>) -> Self {
        Self { model, store }
    }
}

#[async_trait]
impl StatefulChat for CheckpointedChat {
    async fn invoke(
        &mut self,
        thread_id: &ThreadId,
        message: Message,
    ) -> Result<Message, ModelError> {
        self.store.append_turn(thread_id, message)?;
        let history = self.store.get_history(thread_id)?;
        debug!(thread = %thread_id, messages = history.len(), "invoking model from checkpoint");

        let reply = self.model.invoke(&history).await?;
        self.store.append_turn(thread_id, reply.clone())?;
        Ok(reply)
    }

    fn history(&self, thread_id: &ThreadId) -> Result<Vec<Message>, CheckpointError> {
        self.store.get_history(thread_id)
    }

    fn model_name(&self) -> &str {
        self.model.model_name()
    }

    fn params(&self) -> GenerationParams {
        self.model.params()
    }
}
