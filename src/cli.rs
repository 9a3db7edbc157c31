// ABOUTME: Command-line interface definition and config overrides.
// ABOUTME: Flags given on the command line win over config file and environment values.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::error::ConfigError;
use crate::llm::ModelSpec;
use crate::session::SessionMode;

#[derive(Debug, Parser)]
#[command(name = "parley", version, about = "Terminal chat with a local or hosted LLM")]
pub struct Cli {
    /// History strategy: resend the transcript, or delegate it to a checkpoint store.
    #[arg(long, value_enum)]
    pub mode: Option<SessionMode>,

    /// Model as provider:model, e.g. ollama:deepseek-r1:8b or google_genai:gemini-2.5-flash.
    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub temperature: Option<f64>,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    #[arg(long)]
    pub top_p: Option<f64>,

    /// Interaction log file (JSON array).
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Resume or name a checkpoint thread. Implies --mode checkpoint.
    #[arg(long)]
    pub thread: Option<String>,

    /// Keep checkpoints as JSON files in this directory instead of in memory.
    #[arg(long)]
    pub checkpoint_dir: Option<PathBuf>,

    /// Config file to use instead of ~/.parley/config.toml.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print debug diagnostics to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded config.
    pub fn apply(&self, config: &mut Config) -> Result<(), ConfigError> {
        if let Some(raw) = &self.model {
            let spec: ModelSpec = raw.parse()?;
            config.llm.apply_model_spec(&spec);
        }
        if let Some(t) = self.temperature {
            config.llm.temperature = Some(t);
        }
        if let Some(n) = self.max_tokens {
            config.llm.max_tokens = Some(n);
        }
        if let Some(p) = self.top_p {
            config.llm.top_p = Some(p);
        }
        if let Some(path) = &self.log_file {
            config.session.log_file = path.clone();
        }
        if let Some(dir) = &self.checkpoint_dir {
            config.session.checkpoint_dir = Some(dir.clone());
        }
        match (self.mode, &self.thread) {
            (Some(mode), _) => config.session.mode = mode,
            (None, Some(_)) => config.session.mode = SessionMode::Checkpoint,
            (None, None) => {}
        }
        Ok(())
    }
}
