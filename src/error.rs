//! Error types shared by the worktree, branch and session layers.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not in a git repository")]
    NotAGitRepository,

    /// The shared git directory does not sit inside a recognisable checkout.
    #[error("unable to determine repository name from {}", .0.display())]
    AmbiguousRepositoryName(PathBuf),

    #[error("worktree '{name}' already exists at {}", path.display())]
    AlreadyExists { name: String, path: PathBuf },

    /// An external command exited unsuccessfully. `output` is its raw combined output.
    #[error("{command} failed: {output}")]
    CommandFailed { command: String, output: String },

    #[error("selection cancelled")]
    SelectionCancelled,

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("{0}")]
    Forbidden(String),

    #[error("failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn command_failed(command: impl Into<String>, output: impl Into<String>) -> Self {
        Error::CommandFailed {
            command: command.into(),
            output: output.into(),
        }
    }

    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_keeps_raw_output() {
        let err = Error::command_failed("git worktree add", "fatal: invalid reference: nope\n");
        assert_eq!(
            err.to_string(),
            "git worktree add failed: fatal: invalid reference: nope\n"
        );
    }

    #[test]
    fn already_exists_mentions_path() {
        let err = Error::AlreadyExists {
            name: "feat_login".to_string(),
            path: PathBuf::from("/w/acme/feat_login"),
        };
        assert_eq!(
            err.to_string(),
            "worktree 'feat_login' already exists at /w/acme/feat_login"
        );
    }

    #[test]
    fn not_found_names_the_kind() {
        assert_eq!(
            Error::not_found("worktree", "gone").to_string(),
            "worktree 'gone' not found"
        );
    }
}
