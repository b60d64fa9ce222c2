use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// What a working directory's HEAD points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadRef {
    Branch(String),
    /// Detached HEAD, carrying the abbreviated commit hash.
    Detached(String),
}

impl fmt::Display for HeadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadRef::Branch(name) => write!(f, "{name}"),
            HeadRef::Detached(hash) => write!(f, "detached@{hash}"),
        }
    }
}

/// The repository operations the worktree layer depends on.
///
/// Every call is scoped to the repository the implementation was opened in,
/// except `current_ref`, which inspects an arbitrary working directory.
pub trait Vcs {
    fn is_repository(&self) -> bool;
    /// Top-level directory of the checkout this process runs in.
    fn toplevel(&self) -> Result<PathBuf>;
    /// Absolute path of the metadata directory shared by the main checkout
    /// and all linked worktrees.
    fn common_dir(&self) -> Result<PathBuf>;
    fn current_branch(&self) -> Result<String>;
    fn create_branch(&self, name: &str, start_point: Option<&str>) -> Result<()>;
    fn checkout(&self, name: &str) -> Result<()>;
    fn list_local_branches(&self) -> Result<Vec<String>>;
    fn list_remote_branches(&self) -> Result<Vec<String>>;
    fn fetch_all(&self) -> Result<()>;
    fn add_worktree(&self, path: &Path, branch: &str) -> Result<()>;
    fn remove_worktree(&self, path: &Path, force: bool) -> Result<()>;
    fn current_ref(&self, path: &Path) -> Result<HeadRef>;
}

#[cfg(test)]
pub mod fake {
    //! In-memory `Vcs` that records every mutating call.

    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    pub struct FakeVcs {
        pub toplevel: PathBuf,
        pub common_dir: PathBuf,
        pub current: RefCell<String>,
        pub local: Vec<String>,
        pub remote: Vec<String>,
        pub refs: HashMap<PathBuf, HeadRef>,
        pub fail_fetch: bool,
        pub fail_add: bool,
        /// Make `create_branch` also check the new branch out.
        pub switch_on_create: bool,
        pub calls: RefCell<Vec<String>>,
    }

    impl FakeVcs {
        pub fn new() -> Self {
            Self {
                current: RefCell::new("main".to_string()),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn record(&self, call: String) {
            self.calls.borrow_mut().push(call);
        }
    }

    impl Vcs for FakeVcs {
        fn is_repository(&self) -> bool {
            !self.common_dir.as_os_str().is_empty()
        }

        fn toplevel(&self) -> Result<PathBuf> {
            if self.toplevel.as_os_str().is_empty() {
                return Err(Error::NotAGitRepository);
            }
            Ok(self.toplevel.clone())
        }

        fn common_dir(&self) -> Result<PathBuf> {
            if self.common_dir.as_os_str().is_empty() {
                return Err(Error::NotAGitRepository);
            }
            Ok(self.common_dir.clone())
        }

        fn current_branch(&self) -> Result<String> {
            Ok(self.current.borrow().clone())
        }

        fn create_branch(&self, name: &str, start_point: Option<&str>) -> Result<()> {
            self.record(format!("branch {name} {}", start_point.unwrap_or("HEAD")));
            if self.switch_on_create {
                *self.current.borrow_mut() = name.to_string();
            }
            Ok(())
        }

        fn checkout(&self, name: &str) -> Result<()> {
            self.record(format!("checkout {name}"));
            *self.current.borrow_mut() = name.to_string();
            Ok(())
        }

        fn list_local_branches(&self) -> Result<Vec<String>> {
            Ok(self.local.clone())
        }

        fn list_remote_branches(&self) -> Result<Vec<String>> {
            Ok(self.remote.clone())
        }

        fn fetch_all(&self) -> Result<()> {
            self.record("fetch --all".to_string());
            if self.fail_fetch {
                return Err(Error::command_failed("git fetch --all", "could not resolve host"));
            }
            Ok(())
        }

        fn add_worktree(&self, path: &Path, branch: &str) -> Result<()> {
            self.record(format!("worktree add {} {branch}", path.display()));
            if self.fail_add {
                return Err(Error::command_failed(
                    "git worktree add",
                    format!("fatal: invalid reference: {branch}"),
                ));
            }
            std::fs::create_dir_all(path)?;
            Ok(())
        }

        fn remove_worktree(&self, path: &Path, force: bool) -> Result<()> {
            self.record(format!("worktree remove {} force={force}", path.display()));
            if path.exists() {
                std::fs::remove_dir_all(path)?;
            }
            Ok(())
        }

        fn current_ref(&self, path: &Path) -> Result<HeadRef> {
            self.refs
                .get(path)
                .cloned()
                .ok_or_else(|| Error::command_failed("git symbolic-ref", "not a git repository"))
        }
    }
}
