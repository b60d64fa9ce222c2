//! Multiplexer session naming and the probe order used to find an existing
//! session for a worktree.
//!
//! Sessions are named `<project>-<worktree>`. Older releases named them after
//! the worktree alone; those names are still probed, after the primary one,
//! so existing sessions get reused or killed instead of orphaned.

use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::sanitize;

/// Operations on a terminal multiplexer.
pub trait SessionDriver {
    fn is_available(&self) -> bool;
    fn exists(&self, name: &str) -> bool;
    fn create(&self, name: &str, dir: &Path) -> Result<()>;
    fn create_with_command(&self, name: &str, dir: &Path, command: &str) -> Result<()>;
    fn add_window(&self, session: &str, window: &str, dir: &Path, command: Option<&str>) -> Result<()>;
    fn send_keys(&self, name: &str, command: &str) -> Result<()>;
    /// Blocks while attached when run outside the multiplexer.
    fn switch_or_attach(&self, name: &str) -> Result<()>;
    fn kill(&self, name: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    project: String,
    worktree: String,
}

impl SessionIdentity {
    pub fn new(project: &str, worktree: &str) -> Self {
        Self {
            project: project.to_string(),
            worktree: worktree.to_string(),
        }
    }

    pub fn primary(&self) -> String {
        sanitize::session_name(&format!("{}-{}", self.project, self.worktree))
    }

    pub fn legacy_aliases(&self) -> Vec<String> {
        vec![sanitize::session_name(&self.worktree)]
    }

    /// Names to probe, in order: primary first, then each legacy alias.
    pub fn candidates(&self) -> Vec<String> {
        let mut names = vec![self.primary()];
        for alias in self.legacy_aliases() {
            if !names.contains(&alias) {
                names.push(alias);
            }
        }
        names
    }

    /// First candidate the driver reports as running.
    pub fn find_existing(&self, driver: &impl SessionDriver) -> Option<String> {
        self.candidates().into_iter().find(|name| driver.exists(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    AttachedExisting(String),
    CreatedNew(String),
}

impl SessionOutcome {
    pub fn name(&self) -> &str {
        match self {
            SessionOutcome::AttachedExisting(name) | SessionOutcome::CreatedNew(name) => name,
        }
    }
}

/// Reuse the first existing candidate session, or create one under the
/// primary name in `dir`, optionally running `command` in it.
pub fn ensure_session(
    driver: &impl SessionDriver,
    identity: &SessionIdentity,
    dir: &Path,
    command: Option<&str>,
) -> Result<SessionOutcome> {
    if let Some(existing) = identity.find_existing(driver) {
        debug!(session = %existing, "reusing existing session");
        return Ok(SessionOutcome::AttachedExisting(existing));
    }
    let name = identity.primary();
    info!(session = %name, dir = %dir.display(), "creating session");
    match command {
        Some(cmd) => driver.create_with_command(&name, dir, cmd)?,
        None => driver.create(&name, dir)?,
    }
    Ok(SessionOutcome::CreatedNew(name))
}

/// Kill the session for a worktree, whichever naming scheme it was created
/// under. Returns the killed session's name.
pub fn kill_existing(driver: &impl SessionDriver, identity: &SessionIdentity) -> Result<Option<String>> {
    let Some(name) = identity.find_existing(driver) else {
        return Ok(None);
    };
    info!(session = %name, "killing session");
    driver.kill(&name)?;
    Ok(Some(name))
}
