// ABOUTME: Terminal rendering for the chat loop — prompt, separators, replies, and errors.
// ABOUTME: Writes to any io::Write so the loop can be driven from tests.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;

use crossterm::style::Stylize;

use crate::session::message::Message;

pub const PROMPT: &str = "Type a message: ";

const MAX_RULE_WIDTH: usize = 80;

pub fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "{}", PROMPT.bold())?;
    out.flush()
}

/// Horizontal separator sized to the terminal, capped at 80 columns.
pub fn rule(out: &mut impl Write) -> io::Result<()> {
    let width = crossterm::terminal::size()
        .map(|(cols, _)| usize::from(cols))
        .unwrap_or(MAX_RULE_WIDTH)
        .clamp(1, MAX_RULE_WIDTH);
    writeln!(out, "{}", "\u{2500}".repeat(width).dark_grey())
}

pub fn reply(out: &mut impl Write, message: &Message) -> io::Result<()> {
    writeln!(out, "{}", message.role.type_tag().bold().cyan())?;
    writeln!(out)?;
    writeln!(out, "{}", message.content)?;
    rule(out)
}

pub fn error(out: &mut impl Write, err: &dyn Display) -> io::Result<()> {
    writeln!(out, "{} {}", "Error:".red().bold(), err)?;
    rule(out)
}

pub fn exiting(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Exiting...")
}

pub fn saved(out: &mut impl Write, path: &Path) -> io::Result<()> {
    writeln!(out, "Interactions saved to: {}", path.display())
}
