use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::Result;
use crate::store::{Worktree, WorktreeSource, cmp_names};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub path: PathBuf,
    pub worktrees: Vec<Worktree>,
}

/// Every project under the base directory that has at least one worktree.
pub struct ProjectCatalog<'a, S: WorktreeSource> {
    source: &'a S,
}

impl<'a, S: WorktreeSource> ProjectCatalog<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Projects in case-insensitive name order.
    ///
    /// Directories that can't be listed and projects with no worktrees are
    /// left out without an error, so a project whose last worktree was just
    /// deleted disappears from the result.
    pub fn list_all(&self) -> Result<Vec<Project>> {
        let base = self.source.base_dir();
        if !base.exists() {
            return Ok(Vec::new());
        }

        let mut projects = Vec::new();
        for entry in fs::read_dir(base)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let worktrees = match self.source.list(&name) {
                Ok(w) => w,
                Err(e) => {
                    debug!(project = %name, "skipping unreadable project: {e}");
                    continue;
                }
            };
            if worktrees.is_empty() {
                continue;
            }
            projects.push(Project {
                name,
                path,
                worktrees,
            });
        }
        projects.sort_by(|a, b| cmp_names(&a.name, &b.name));
        Ok(projects)
    }

    pub fn find(&self, name: &str) -> Result<Option<Project>> {
        Ok(self.list_all()?.into_iter().find(|p| p.name == name))
    }
}
