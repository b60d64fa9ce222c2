//! Project identity: which project directory a repository's worktrees live in.
//!
//! The name comes from the shared git directory rather than the current
//! checkout, so every linked worktree of a repository resolves to the same
//! project as its main checkout.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::vcs::Vcs;

/// The main checkout that owns `common_dir`, which must be absolute.
pub fn main_checkout(common_dir: &Path) -> Result<PathBuf> {
    let absolute = normalize(common_dir);

    if absolute.is_absolute()
        && absolute.file_name().is_some_and(|n| n == ".git")
        && let Some(parent) = absolute.parent()
        && parent.file_name().is_some()
    {
        return Ok(parent.to_path_buf());
    }
    Err(Error::AmbiguousRepositoryName(absolute))
}

/// Project name derived from the repository metadata layout.
pub fn project_name_from(common_dir: &Path) -> Result<String> {
    let root = main_checkout(common_dir)?;
    root.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or(Error::AmbiguousRepositoryName(root))
}

/// The project identity of the repository `vcs` is opened in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIdentity {
    pub name: String,
    /// Working directory of the main checkout (not the current linked worktree).
    pub main_root: PathBuf,
}

impl ProjectIdentity {
    pub fn resolve(vcs: &impl Vcs) -> Result<Self> {
        let common = vcs.common_dir().map_err(|_| Error::NotAGitRepository)?;
        let main_root = main_checkout(&common)?;
        let name = project_name_from(&common)?;
        Ok(Self { name, main_root })
    }
}

/// Lexically fold `.` and `..` components; git hands back paths like
/// `/repo/wt/../.git` for some layouts.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
