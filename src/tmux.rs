use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Error, Result};
use crate::session::SessionDriver;

/// `=name` makes tmux match the session name exactly instead of by prefix,
/// so probing a short legacy name never hits a longer session.
fn exact(name: &str) -> String {
    format!("={name}")
}

fn new_session_args(name: &str, dir: &Path, command: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "new-session".to_string(),
        "-d".to_string(),
        "-s".to_string(),
        name.to_string(),
        "-c".to_string(),
        dir.to_string_lossy().to_string(),
    ];
    if let Some(cmd) = command {
        args.push(cmd.to_string());
    }
    args
}

fn new_window_args(session: &str, window: &str, dir: &Path, command: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "new-window".to_string(),
        "-d".to_string(),
        "-t".to_string(),
        format!("{}:", exact(session)),
        "-n".to_string(),
        window.to_string(),
        "-c".to_string(),
        dir.to_string_lossy().to_string(),
    ];
    if let Some(cmd) = command {
        args.push(cmd.to_string());
    }
    args
}

fn send_keys_args(name: &str, command: &str) -> Vec<String> {
    vec![
        "send-keys".to_string(),
        "-t".to_string(),
        format!("{}:", exact(name)),
        command.to_string(),
        "Enter".to_string(),
    ]
}

pub struct Tmux {
    bin: Option<PathBuf>,
    inside: bool,
}

impl Tmux {
    pub fn detect() -> Self {
        Self {
            bin: which::which("tmux").ok(),
            inside: std::env::var_os("TMUX").is_some_and(|v| !v.is_empty()),
        }
    }

    fn command(&self) -> Result<Command> {
        let bin = self
            .bin
            .as_ref()
            .ok_or_else(|| Error::command_failed("tmux", "tmux is not installed"))?;
        Ok(Command::new(bin))
    }

    fn run<S: AsRef<str>>(&self, args: &[S]) -> Result<()> {
        let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
        let line = format!("tmux {}", args.join(" "));
        debug!(command = %line, "running");
        let output = self
            .command()?
            .args(&args)
            .output()
            .map_err(|e| Error::command_failed(&line, e.to_string()))?;
        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(Error::command_failed(line, combined.trim()));
        }
        Ok(())
    }
}

impl SessionDriver for Tmux {
    fn is_available(&self) -> bool {
        self.bin.is_some()
    }

    fn exists(&self, name: &str) -> bool {
        let Ok(mut cmd) = self.command() else {
            return false;
        };
        let target = exact(name);
        cmd.args(["has-session", "-t", target.as_str()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
    }

    fn create(&self, name: &str, dir: &Path) -> Result<()> {
        self.run(&new_session_args(name, dir, None))
    }

    fn create_with_command(&self, name: &str, dir: &Path, command: &str) -> Result<()> {
        self.run(&new_session_args(name, dir, Some(command)))
    }

    fn add_window(&self, session: &str, window: &str, dir: &Path, command: Option<&str>) -> Result<()> {
        self.run(&new_window_args(session, window, dir, command))
    }

    fn send_keys(&self, name: &str, command: &str) -> Result<()> {
        self.run(&send_keys_args(name, command))
    }

    fn switch_or_attach(&self, name: &str) -> Result<()> {
        let target = exact(name);
        if self.inside {
            return self.run(&["switch-client", "-t", target.as_str()]);
        }
        // Hands the terminal over until the user detaches.
        let status = self
            .command()?
            .args(["attach-session", "-t", target.as_str()])
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| Error::command_failed("tmux attach-session", e.to_string()))?;
        if !status.success() {
            return Err(Error::command_failed(
                "tmux attach-session",
                format!("exited with {status}"),
            ));
        }
        Ok(())
    }

    fn kill(&self, name: &str) -> Result<()> {
        let target = exact(name);
        self.run(&["kill-session", "-t", target.as_str()])
    }
}
