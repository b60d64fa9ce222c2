//! On-disk worktree layout: `<base>/<project>/<worktree>/`.
//!
//! The directory tree is the only record of which worktrees exist. Listing
//! scans it; nothing is cached or indexed.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::copy::{self, CopyReport};
use crate::error::{Error, Result};
use crate::sanitize;
use crate::vcs::Vcs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worktree {
    /// Directory name under the project directory.
    pub name: String,
    pub path: PathBuf,
    /// Current branch, `detached@<hash>`, or `unknown`.
    pub branch: String,
}

pub const UNKNOWN_BRANCH: &str = "unknown";

/// Case-insensitive ordering used for every listing.
pub fn cmp_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Read access to per-project worktree listings. The catalog is written
/// against this so the scan can be replaced without touching callers.
pub trait WorktreeSource {
    fn base_dir(&self) -> &Path;
    fn list(&self, project: &str) -> Result<Vec<Worktree>>;
}

#[derive(Debug)]
pub struct Created {
    pub path: PathBuf,
    pub copy_report: CopyReport,
}

pub struct WorktreeStore<'a, V: Vcs> {
    base_dir: PathBuf,
    copy_files: Vec<String>,
    vcs: &'a V,
}

impl<'a, V: Vcs> WorktreeStore<'a, V> {
    pub fn new(config: &Config, vcs: &'a V) -> Self {
        Self {
            base_dir: config.worktrees_location.clone(),
            copy_files: config.copy_files.clone(),
            vcs,
        }
    }

    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.base_dir.join(project)
    }

    fn branch_of(&self, path: &Path) -> String {
        match self.vcs.current_ref(path) {
            Ok(head) => head.to_string(),
            Err(e) => {
                debug!(path = %path.display(), "could not read HEAD: {e}");
                UNKNOWN_BRANCH.to_string()
            }
        }
    }

    /// Create a worktree for `source_branch` named `sanitize(worktree_name)`,
    /// then copy the configured files from `copy_from`.
    ///
    /// The existence check and the `git worktree add` are not atomic. A
    /// concurrent creator winning the race surfaces as git's own failure.
    pub fn create(
        &self,
        project: &str,
        worktree_name: &str,
        source_branch: &str,
        copy_from: &Path,
    ) -> Result<Created> {
        let name = sanitize::branch_dir_name(worktree_name);
        let project_dir = self.project_dir(project);
        let path = project_dir.join(&name);

        if path.exists() {
            return Err(Error::AlreadyExists { name, path });
        }

        fs::create_dir_all(&project_dir)?;
        info!(path = %path.display(), branch = source_branch, "adding worktree");
        self.vcs.add_worktree(&path, source_branch)?;

        let copy_report = copy::copy_matching(copy_from, &path, &self.copy_files);
        Ok(Created { path, copy_report })
    }

    /// Remove a worktree, discarding uncommitted changes.
    pub fn remove(&self, path: &Path) -> Result<()> {
        info!(path = %path.display(), "removing worktree");
        self.vcs.remove_worktree(path, true)?;
        if path.exists() {
            fs::remove_dir_all(path)?;
        }
        Ok(())
    }

    /// The worktree for `branch`, stored under either its sanitized name or,
    /// for worktrees made before names were sanitized, the raw branch name.
    pub fn exists_for_branch(&self, project: &str, branch: &str) -> Option<Worktree> {
        let worktrees = match self.list(project) {
            Ok(w) => w,
            Err(e) => {
                debug!(project, "could not list worktrees: {e}");
                return None;
            }
        };
        let sanitized = sanitize::branch_dir_name(branch);
        worktrees
            .into_iter()
            .find(|wt| wt.name == sanitized || wt.name == branch)
    }

    /// Look a worktree up by the name a user typed.
    pub fn find(&self, project: &str, name: &str) -> Result<Worktree> {
        self.exists_for_branch(project, name)
            .ok_or_else(|| Error::not_found("worktree", name))
    }
}

impl<V: Vcs> WorktreeSource for WorktreeStore<'_, V> {
    fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Every directory under the project directory, in case-insensitive name
    /// order. A project directory that doesn't exist yet lists as empty.
    fn list(&self, project: &str) -> Result<Vec<Worktree>> {
        let dir = self.project_dir(project);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut worktrees = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let branch = self.branch_of(&path);
            worktrees.push(Worktree { name, path, branch });
        }
        worktrees.sort_by(|a, b| cmp_names(&a.name, &b.name));
        Ok(worktrees)
    }
}
