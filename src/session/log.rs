// ABOUTME: Interaction logger — appends one block per session to a JSON array file.
// ABOUTME: Normalizes message whitespace and writes atomically via tmp file + rename.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::InteractionLogError;
use crate::session::message::{GenerationParams, Message};

/// Default log file name, resolved against the working directory.
pub const DEFAULT_LOG_FILE: &str = "interactions.json";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A message as it appears in the log: role tag plus normalized content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

impl From<&Message> for LoggedMessage {
    fn from(msg: &Message) -> Self {
        Self {
            kind: msg.role.type_tag().to_string(),
            content: normalize_content(&msg.content),
        }
    }
}

/// One persisted record of a full session. Field order is the on-disk key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionBlock {
    pub data_hora: String,
    pub model: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f64>,
    pub messages: Vec<LoggedMessage>,
}

impl InteractionBlock {
    /// Build a block stamped with the current local time.
    pub fn new(messages: &[Message], model: &str, params: &GenerationParams) -> Self {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        Self::with_timestamp(timestamp, messages, model, params)
    }

    pub fn with_timestamp(
        timestamp: String,
        messages: &[Message],
        model: &str,
        params: &GenerationParams,
    ) -> Self {
        Self {
            data_hora: timestamp,
            model: model.to_string(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
            messages: messages.iter().map(LoggedMessage::from).collect(),
        }
    }
}

/// Flatten message text onto one line: newlines, carriage returns and tabs
/// become spaces, runs of spaces collapse, and surrounding whitespace of any
/// kind is trimmed. Interior non-ASCII whitespace is kept.
pub fn normalize_content(content: &str) -> String {
    let mut flat = String::with_capacity(content.len());
    for c in content.chars() {
        let c = if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c };
        if c == ' ' && flat.ends_with(' ') {
            continue;
        }
        flat.push(c);
    }
    flat.trim().to_string()
}

/// The interaction log file: a JSON array of [`InteractionBlock`]s.
#[derive(Debug, Clone)]
pub struct InteractionLog {
    path: PathBuf,
}

impl InteractionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the existing entries. A missing or blank file yields an empty list;
    /// anything other than a JSON array is an error.
    pub fn load(&self) -> Result<Vec<Value>, InteractionLogError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|source| InteractionLogError::Io {
            path: self.path.clone(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let value: Value =
            serde_json::from_str(&content).map_err(|source| InteractionLogError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        match value {
            Value::Array(entries) => Ok(entries),
            _ => Err(InteractionLogError::NotAnArray {
                path: self.path.clone(),
            }),
        }
    }

    /// Append a block and rewrite the whole array.
    pub fn append(&self, block: &InteractionBlock) -> Result<(), InteractionLogError> {
        let mut entries = self.load()?;
        entries.push(serde_json::to_value(block)?);
        let content = serde_json::to_string_pretty(&entries)?;
        self.write_atomic(&content)?;
        debug!(
            path = %self.path.display(),
            blocks = entries.len(),
            "appended interaction block"
        );
        Ok(())
    }

    /// Persist a finished session. Returns `None` without touching the file
    /// when there is nothing to record.
    pub fn save_session(
        &self,
        messages: &[Message],
        model: &str,
        params: &GenerationParams,
    ) -> Result<Option<InteractionBlock>, InteractionLogError> {
        if messages.is_empty() {
            debug!("no messages in session, skipping interaction log");
            return Ok(None);
        }
        let block = InteractionBlock::new(messages, model, params);
        self.append(&block)?;
        Ok(Some(block))
    }

    fn write_atomic(&self, content: &str) -> Result<(), InteractionLogError> {
        let io_err = |source| InteractionLogError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).map_err(io_err)?;
        fs::rename(&tmp_path, &self.path).map_err(io_err)?;
        Ok(())
    }
}
