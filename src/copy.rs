//! Copying untracked files (`.env`, local settings) from the main checkout
//! into a freshly created worktree.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct CopyReport {
    /// Paths relative to the checkout root.
    pub copied: Vec<PathBuf>,
    pub failures: Vec<String>,
}

impl CopyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// All failures folded into one message.
    pub fn failure_summary(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        Some(format!(
            "failed to copy some files:\n  {}",
            self.failures.join("\n  ")
        ))
    }
}

/// Copy every file matching `patterns` (globs relative to `source_root`) to
/// the same relative path under `dest_root`, keeping permissions.
///
/// Never fails as a whole; each problem is recorded in the report. Patterns
/// that match nothing are skipped, as are matched directories.
pub fn copy_matching(source_root: &Path, dest_root: &Path, patterns: &[String]) -> CopyReport {
    let mut report = CopyReport::default();
    let escaped_root = glob::Pattern::escape(&source_root.to_string_lossy());

    for pattern in patterns {
        let full = format!("{escaped_root}/{pattern}");
        let matches = match glob::glob(&full) {
            Ok(paths) => paths,
            Err(e) => {
                report.failures.push(format!("{pattern}: {e}"));
                continue;
            }
        };

        for entry in matches {
            let source = match entry {
                Ok(p) => p,
                Err(e) => {
                    report.failures.push(format!("{pattern}: {e}"));
                    continue;
                }
            };
            if source.is_dir() {
                debug!(path = %source.display(), "skipping matched directory");
                continue;
            }
            let Ok(relative) = source.strip_prefix(source_root) else {
                report
                    .failures
                    .push(format!("{}: outside of {}", source.display(), source_root.display()));
                continue;
            };
            let relative = relative.to_path_buf();
            match copy_file(&source, &dest_root.join(&relative)) {
                Ok(()) => {
                    info!(file = %relative.display(), "copied");
                    report.copied.push(relative);
                }
                Err(e) => report.failures.push(format!("{}: {e}", relative.display())),
            }
        }
    }
    report
}

fn copy_file(source: &Path, dest: &Path) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    // fs::copy carries the permission bits over.
    fs::copy(source, dest)?;
    Ok(())
}
