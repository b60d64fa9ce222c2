use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};
use crate::vcs::{HeadRef, Vcs};

fn run_git_in(dir: &Path, args: &[&str]) -> Result<String> {
    let command = format!("git {}", args.join(" "));
    debug!(dir = %dir.display(), %command, "running");
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::command_failed(&command, format!("failed to run git - is it installed? ({e})")))?;
    if !output.status.success() {
        let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        return Err(Error::command_failed(command, combined.trim()));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// `git` command-line backend, scoped to the directory it was opened in.
pub struct GitCli {
    dir: PathBuf,
}

impl GitCli {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_current_dir() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        run_git_in(&self.dir, args)
    }
}

impl Vcs for GitCli {
    fn is_repository(&self) -> bool {
        self.run(&["rev-parse", "--git-dir"]).is_ok()
    }

    fn toplevel(&self) -> Result<PathBuf> {
        let out = self
            .run(&["rev-parse", "--show-toplevel"])
            .map_err(|_| Error::NotAGitRepository)?;
        Ok(PathBuf::from(out.trim()))
    }

    fn common_dir(&self) -> Result<PathBuf> {
        let out = self
            .run(&["rev-parse", "--git-common-dir"])
            .map_err(|_| Error::NotAGitRepository)?;
        // git prints this relative to the directory it ran in, not the toplevel.
        Ok(self.dir.join(out.trim()))
    }

    fn current_branch(&self) -> Result<String> {
        let out = self.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(out.trim().to_string())
    }

    fn create_branch(&self, name: &str, start_point: Option<&str>) -> Result<()> {
        let mut args = vec!["branch", name];
        if let Some(start) = start_point {
            args.push(start);
        }
        self.run(&args)?;
        Ok(())
    }

    fn checkout(&self, name: &str) -> Result<()> {
        self.run(&["checkout", name])?;
        Ok(())
    }

    fn list_local_branches(&self) -> Result<Vec<String>> {
        Ok(lines(&self.run(&["branch", "--format=%(refname:short)"])?))
    }

    fn list_remote_branches(&self) -> Result<Vec<String>> {
        Ok(lines(&self.run(&["branch", "-r", "--format=%(refname:short)"])?))
    }

    fn fetch_all(&self) -> Result<()> {
        self.run(&["fetch", "--all"])?;
        Ok(())
    }

    fn add_worktree(&self, path: &Path, branch: &str) -> Result<()> {
        let path_str = path.to_string_lossy();
        self.run(&["worktree", "add", &path_str, branch])?;
        Ok(())
    }

    fn remove_worktree(&self, path: &Path, force: bool) -> Result<()> {
        let path_str = path.to_string_lossy();
        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(&path_str);
        self.run(&args)?;
        Ok(())
    }

    fn current_ref(&self, path: &Path) -> Result<HeadRef> {
        if let Ok(out) = run_git_in(path, &["symbolic-ref", "--quiet", "--short", "HEAD"]) {
            let name = out.trim();
            if !name.is_empty() {
                return Ok(HeadRef::Branch(name.to_string()));
            }
        }
        let hash = run_git_in(path, &["rev-parse", "--short", "HEAD"])?;
        Ok(HeadRef::Detached(hash.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn git(dir: &Path, args: &[&str]) -> bool {
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// A repo with one commit on `main`, or `None` when git is unavailable.
    fn init_repo() -> Option<tempfile::TempDir> {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("acme");
        std::fs::create_dir(&repo).unwrap();
        if !git(&repo, &["init", "-b", "main"]) {
            return None;
        }
        git(&repo, &["config", "user.email", "wt@example.com"]);
        git(&repo, &["config", "user.name", "wt"]);
        if !git(&repo, &["commit", "--allow-empty", "-m", "init"]) {
            return None;
        }
        Some(dir)
    }

    #[test]
    fn lines_drops_blanks() {
        assert_eq!(lines("main\n\n  dev \n"), vec!["main", "dev"]);
        assert!(lines("").is_empty());
    }

    #[test]
    fn outside_a_repo_is_not_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let cli = GitCli::new(dir.path());
        if !git(dir.path(), &["--version"]) {
            return;
        }
        assert!(!cli.is_repository());
        assert!(matches!(cli.toplevel(), Err(Error::NotAGitRepository)));
    }

    #[test]
    fn integration_toplevel_and_branches() {
        let Some(dir) = init_repo() else { return };
        let repo = dir.path().join("acme");
        let cli = GitCli::new(&repo);

        assert!(cli.is_repository());
        let top = cli.toplevel().unwrap().canonicalize().unwrap();
        assert_eq!(top, repo.canonicalize().unwrap());
        assert_eq!(cli.current_branch().unwrap(), "main");

        cli.create_branch("feat/login", None).unwrap();
        let local = cli.list_local_branches().unwrap();
        assert!(local.contains(&"main".to_string()));
        assert!(local.contains(&"feat/login".to_string()));
    }

    #[test]
    fn integration_worktree_add_and_remove() {
        let Some(dir) = init_repo() else { return };
        let repo = dir.path().join("acme");
        let cli = GitCli::new(&repo);
        cli.create_branch("feature", None).unwrap();

        let wt = dir.path().join("worktrees").join("feature");
        cli.add_worktree(&wt, "feature").unwrap();
        assert!(wt.join(".git").exists());
        assert_eq!(cli.current_ref(&wt).unwrap(), HeadRef::Branch("feature".into()));

        // The linked worktree shares the main checkout's metadata directory.
        let linked = GitCli::new(&wt);
        let common = linked.common_dir().unwrap();
        assert_eq!(
            common.canonicalize().unwrap(),
            repo.join(".git").canonicalize().unwrap()
        );

        std::fs::write(wt.join("dirty.txt"), "uncommitted").unwrap();
        cli.remove_worktree(&wt, true).unwrap();
        assert!(!wt.exists());
    }

    #[test]
    fn integration_identity_from_nested_subdirectory() {
        let Some(dir) = init_repo() else { return };
        let repo = dir.path().join("acme");
        let deep = repo.join("src").join("deep");
        std::fs::create_dir_all(&deep).unwrap();

        let cli = GitCli::new(&deep);
        let common = cli.common_dir().unwrap();
        assert!(common.is_absolute());

        let id = crate::identity::ProjectIdentity::resolve(&cli).unwrap();
        assert_eq!(id.name, "acme");
        assert_eq!(
            id.main_root.canonicalize().unwrap(),
            repo.canonicalize().unwrap()
        );
    }

    #[test]
    fn integration_current_ref_detached() {
        let Some(dir) = init_repo() else { return };
        let repo = dir.path().join("acme");
        assert!(git(&repo, &["checkout", "--detach"]));
        let cli = GitCli::new(&repo);
        match cli.current_ref(&repo).unwrap() {
            HeadRef::Detached(hash) => assert!(!hash.is_empty()),
            other => panic!("expected detached HEAD, got {other:?}"),
        }
    }

    #[test]
    fn integration_add_worktree_failure_carries_output() {
        let Some(dir) = init_repo() else { return };
        let repo = dir.path().join("acme");
        let cli = GitCli::new(&repo);
        let err = cli
            .add_worktree(&dir.path().join("wt"), "no-such-branch")
            .unwrap_err();
        match err {
            Error::CommandFailed { command, output } => {
                assert!(command.starts_with("git worktree add"));
                assert!(!output.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
