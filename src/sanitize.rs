//! Name sanitization for the two namespaces names cross into: directories on
//! disk and tmux session names.
//!
//! Both use the same shape: every character from a fixed table (plus any
//! whitespace) becomes `_`. `_` is in neither table, so sanitizing is
//! idempotent.

const REPLACEMENT: char = '_';

/// Characters that are unsafe in a worktree directory name.
const FILESYSTEM_FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '<', '>', '|', '"'];

/// Characters tmux rejects or interprets inside a session target.
const SESSION_FORBIDDEN: &[char] = &['/', '\\', ':', '.'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Filesystem,
    Session,
}

impl Namespace {
    fn forbidden(self) -> &'static [char] {
        match self {
            Namespace::Filesystem => FILESYSTEM_FORBIDDEN,
            Namespace::Session => SESSION_FORBIDDEN,
        }
    }

    pub fn sanitize(self, raw: &str) -> String {
        let forbidden = self.forbidden();
        raw.chars()
            .map(|c| {
                if c.is_whitespace() || forbidden.contains(&c) {
                    REPLACEMENT
                } else {
                    c
                }
            })
            .collect()
    }
}

/// Directory name used for a worktree created from `branch`.
pub fn branch_dir_name(branch: &str) -> String {
    Namespace::Filesystem.sanitize(branch)
}

pub fn session_name(raw: &str) -> String {
    Namespace::Session.sanitize(raw)
}
