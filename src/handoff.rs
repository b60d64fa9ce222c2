//! Handing a worktree over to tmux and the editor once it has been picked
//! or created.

use owo_colors::OwoColorize;
use tracing::warn;

use crate::config::WindowSpec;
use crate::editor::Editor;
use crate::session::{self, SessionDriver, SessionIdentity, SessionOutcome};
use crate::store::Worktree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handed {
    Session(SessionOutcome),
    Editor,
    Nothing,
}

pub struct Handoff<'a, D: SessionDriver> {
    pub driver: &'a D,
    pub editor: &'a Editor,
    pub windows: &'a [WindowSpec],
    pub use_tmux: bool,
    pub use_editor: bool,
}

impl<D: SessionDriver> Handoff<'_, D> {
    /// Open `worktree`. Failures are logged as warnings, never returned.
    pub fn open(&self, project: &str, worktree: &Worktree) -> Handed {
        if self.use_tmux
            && self.driver.is_available()
            && let Some(outcome) = self.open_session(project, worktree)
        {
            return Handed::Session(outcome);
        }
        if !self.use_editor {
            return Handed::Nothing;
        }
        match self.editor.open(&worktree.path) {
            Ok(()) => {
                eprintln!("{}", "Opened in editor".green());
                Handed::Editor
            }
            Err(e) => {
                warn!("failed to open editor: {e}");
                Handed::Nothing
            }
        }
    }

    fn open_session(&self, project: &str, worktree: &Worktree) -> Option<SessionOutcome> {
        let identity = SessionIdentity::new(project, &worktree.name);
        let editor_cmd = self
            .use_editor
            .then(|| self.editor.command_line(&worktree.path));

        let outcome = match session::ensure_session(self.driver, &identity, &worktree.path, editor_cmd.as_deref()) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("failed to create tmux session: {e}");
                return None;
            }
        };

        match &outcome {
            SessionOutcome::AttachedExisting(name) => {
                eprintln!("Switching to existing tmux session: {}", name.cyan());
                if let Some(cmd) = &editor_cmd
                    && let Err(e) = self.driver.send_keys(name, cmd)
                {
                    warn!("failed to open editor in session: {e}");
                }
            }
            SessionOutcome::CreatedNew(name) => {
                eprintln!("Creating new tmux session: {}", name.cyan());
                for window in self.windows {
                    if let Err(e) =
                        self.driver
                            .add_window(name, &window.name, &worktree.path, window.command.as_deref())
                    {
                        warn!("failed to open window '{}': {e}", window.name);
                    }
                }
            }
        }

        if let Err(e) = self.driver.switch_or_attach(outcome.name()) {
            warn!("failed to switch tmux session: {e}");
        }
        Some(outcome)
    }
}
