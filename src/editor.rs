use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Error, Result};

const FALLBACK_EDITOR: &str = "vi";

/// The user's `$EDITOR`, possibly with flags (`code -n`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    command: Option<String>,
}

impl Editor {
    pub fn new(command: Option<String>) -> Self {
        Self {
            command: command.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("EDITOR").ok())
    }

    /// Shell line that opens `path`, for typing into a terminal session.
    pub fn command_line(&self, path: &Path) -> String {
        let editor = self.command.as_deref().unwrap_or(FALLBACK_EDITOR);
        format!("{editor} {}", shell_quote(&path.to_string_lossy()))
    }

    /// Launch the editor on `path` without waiting for it to exit.
    pub fn open(&self, path: &Path) -> Result<()> {
        let command = self
            .command
            .as_deref()
            .ok_or_else(|| Error::not_found("environment variable", "EDITOR"))?;
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| Error::not_found("environment variable", "EDITOR"))?;

        debug!(editor = program, path = %path.display(), "spawning editor");
        Command::new(program)
            .args(parts)
            .arg(path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::command_failed(command, format!("failed to open editor: {e}")))?;
        Ok(())
    }
}

fn shell_quote(s: &str) -> String {
    let safe = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+=:@,".contains(c));
    if safe {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}
