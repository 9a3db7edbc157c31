// ABOUTME: App orchestrator — wires together the chat model, strategy, terminal, and interaction log.
// ABOUTME: Builds everything up front so configuration errors stop the program before the loop starts.

use std::sync::Arc;

use tokio::io::BufReader;
use tracing::info;

use crate::checkpoint::{
    CheckpointStore, CheckpointedChat, FileCheckpointStore, InMemoryCheckpointStore, ThreadId,
};
use crate::config::Config;
use crate::error::{CheckpointError, ConfigError};
use crate::llm::{self, ChatModel};
use crate::session::{
    CheckpointSession, ConversationStrategy, InteractionLog, ReplaySession, SessionMode,
    finish_session, run_session,
};

/// Top-level application that owns one chat session.
pub struct App {
    config: Config,
    thread_id: Option<String>,
}

impl App {
    /// Create a new app. `thread_id` names the checkpoint thread to resume.
    pub fn new(config: Config, thread_id: Option<String>) -> Self {
        Self { config, thread_id }
    }

    /// Build the strategy for the configured mode around an existing model.
    pub fn build_strategy(
        &self,
        model: Arc<dyn ChatModel>,
    ) -> Result<Box<dyn ConversationStrategy>, CheckpointError> {
        match self.config.session.mode {
            SessionMode::Replay => Ok(Box::new(ReplaySession::new(model))),
            SessionMode::Checkpoint => {
                let store: Box<dyn CheckpointStore> = match &self.config.session.checkpoint_dir {
                    Some(dir) => Box::new(FileCheckpointStore::new(dir)),
                    None => Box::new(InMemoryCheckpointStore::new()),
                };
                let thread_id = self
                    .thread_id
                    .as_deref()
                    .map(ThreadId::new)
                    .unwrap_or_else(ThreadId::generate);
                info!(thread = %thread_id, "checkpoint thread");
                let chat = CheckpointedChat::new(model, store);
                Ok(Box::new(CheckpointSession::new(Box::new(chat), thread_id)?))
            }
        }
    }

    /// Create the model from config. Fails fast on missing credentials.
    pub fn create_model(&self) -> Result<Arc<dyn ChatModel>, ConfigError> {
        llm::create_model(&self.config.llm)
    }

    /// Run the session on stdin/stdout, then write the interaction log.
    pub async fn run(self) -> anyhow::Result<()> {
        let model = self.create_model()?;
        let mut strategy = self.build_strategy(model)?;
        let log = InteractionLog::new(&self.config.session.log_file);

        info!(
            mode = %strategy.mode(),
            model = strategy.model_name(),
            log = %log.path().display(),
            "session started"
        );

        let mut input = BufReader::new(tokio::io::stdin());
        let mut out = std::io::stdout();

        let summary = run_session(strategy.as_mut(), &mut input, &mut out).await?;
        info!(
            turns = summary.turns,
            failed = summary.failed_turns,
            "session ended"
        );

        finish_session(strategy.as_ref(), &log, &mut out)?;
        Ok(())
    }
}
