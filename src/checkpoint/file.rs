// ABOUTME: File-backed checkpoint store — one JSON document per thread in a directory.
// ABOUTME: Lets a checkpoint-mode conversation resume in a later run via atomic file writes.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CheckpointStore, ThreadId};
use crate::error::CheckpointError;
use crate::session::message::Message;

/// Persisted state of one thread.
#[derive(Debug, Serialize, Deserialize)]
pub struct ThreadCheckpoint {
    pub thread_id: ThreadId,
    pub created_at: String,
    pub updated_at: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the checkpoint file for a thread. Characters outside
    /// `[A-Za-z0-9_-]` are replaced so ids cannot escape the directory.
    pub fn thread_path(&self, thread_id: &ThreadId) -> PathBuf {
        let name: String = thread_id
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }

    fn load(&self, thread_id: &ThreadId) -> Result<Option<ThreadCheckpoint>, CheckpointError> {
        let path = self.thread_path(thread_id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|source| CheckpointError::Io {
            path: path.clone(),
            source,
        })?;
        let checkpoint: ThreadCheckpoint = serde_json::from_str(&content).map_err(|source| {
            CheckpointError::Decode {
                path: path.clone(),
                source,
            }
        })?;
        // Sanitized names can collide, so the stored id must match exactly.
        if checkpoint.thread_id != *thread_id {
            return Err(CheckpointError::ThreadMismatch {
                path,
                expected: thread_id.to_string(),
                found: checkpoint.thread_id.to_string(),
            });
        }
        Ok(Some(checkpoint))
    }

    fn save(&self, checkpoint: &ThreadCheckpoint) -> Result<(), CheckpointError> {
        let path = self.thread_path(&checkpoint.thread_id);
        save_atomic(&path, checkpoint)
    }
}

fn save_atomic(path: &Path, checkpoint: &ThreadCheckpoint) -> Result<(), CheckpointError> {
    let io_err = |source| CheckpointError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let tmp_path = path.with_extension("json.tmp");
    let content = serde_json::to_string_pretty(checkpoint).map_err(|source| {
        CheckpointError::Encode {
            path: path.to_path_buf(),
            source,
        }
    })?;
    fs::write(&tmp_path, &content).map_err(io_err)?;
    fs::rename(&tmp_path, path).map_err(io_err)?;
    Ok(())
}

impl CheckpointStore for FileCheckpointStore {
    fn get_history(&self, thread_id: &ThreadId) -> Result<Vec<Message>, CheckpointError> {
        Ok(self
            .load(thread_id)?
            .map(|c| c.messages)
            .unwrap_or_default())
    }

    fn append_turn(
        &mut self,
        thread_id: &ThreadId,
        message: Message,
    ) -> Result<(), CheckpointError> {
        let now = Utc::now().to_rfc3339();
        let mut checkpoint = self.load(thread_id)?.unwrap_or_else(|| ThreadCheckpoint {
            thread_id: thread_id.clone(),
            created_at: now.clone(),
            updated_at: now.clone(),
            messages: Vec::new(),
        });
        checkpoint.messages.push(message);
        checkpoint.updated_at = now;
        self.save(&checkpoint)?;
        debug!(thread = %thread_id, messages = checkpoint.messages.len(), "checkpoint saved");
        Ok(())
    }
}
