// ABOUTME: Interactive session loop — reads lines, submits turns, and prints replies.
// ABOUTME: Stops on an exit token or end of input, then hands the history to the interaction log.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use super::log::{InteractionBlock, InteractionLog};
use super::strategy::ConversationStrategy;
use crate::render;

/// Inputs that end the session, compared case-insensitively.
pub const EXIT_TOKENS: [&str; 4] = ["sair", "exit", "quit", "q"];

/// Whether a line of input asks to leave the session.
pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    EXIT_TOKENS.iter().any(|token| line.eq_ignore_ascii_case(token))
}

/// Counters for a finished session loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub turns: usize,
    pub failed_turns: usize,
}

/// Run the chat loop until an exit token or end of input.
///
/// Model failures are printed and the loop moves on to the next prompt.
/// A read error (e.g. invalid UTF-8) is printed and ends the loop normally.
/// Only write errors on `out` are returned.
pub async fn run_session<S, R, W>(
    strategy: &mut S,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<SessionSummary>
where
    S: ConversationStrategy + ?Sized,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut summary = SessionSummary::default();
    let mut line = String::new();

    loop {
        render::prompt(out)?;
        line.clear();
        let read = match input.read_line(&mut line).await {
            Ok(read) => read,
            Err(e) => {
                // Unreadable input ends the session; the turns so far still get logged.
                warn!(error = %e, "failed to read input");
                render::error(out, &e)?;
                break;
            }
        };
        if read == 0 {
            writeln!(out)?;
            debug!("end of input");
            break;
        }
        render::rule(out)?;

        if is_exit_command(&line) {
            break;
        }

        let text = line.trim_end_matches(['\n', '\r']);
        if text.trim().is_empty() {
            continue;
        }

        match strategy.submit(text).await {
            Ok(reply) => {
                summary.turns += 1;
                render::reply(out, &reply)?;
            }
            Err(e) => {
                summary.failed_turns += 1;
                warn!(error = %e, mode = %strategy.mode(), "model invocation failed");
                render::error(out, &e)?;
            }
        }
    }

    Ok(summary)
}

/// Persist the session history to the interaction log and report the outcome.
///
/// Returns the written block, or `None` when the session had no messages.
pub fn finish_session<S, W>(
    strategy: &S,
    log: &InteractionLog,
    out: &mut W,
) -> anyhow::Result<Option<InteractionBlock>>
where
    S: ConversationStrategy + ?Sized,
    W: Write,
{
    render::exiting(out)?;
    let history = strategy.history()?;
    let block = log.save_session(&history, strategy.model_name(), &strategy.params())?;
    if block.is_some() {
        render::saved(out, log.path())?;
    }
    Ok(block)
}
