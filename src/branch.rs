use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::Result;
use crate::vcs::Vcs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub is_local: bool,
    pub is_remote: bool,
}

impl Branch {
    pub fn location_label(&self) -> &'static str {
        match (self.is_local, self.is_remote) {
            (true, true) => "local+remote",
            (true, false) => "local",
            _ => "remote",
        }
    }
}

/// Strip the remote name from a remote-tracking ref (`origin/feat/x` -> `feat/x`).
///
/// Returns `None` for symbolic pointers (`origin/HEAD`, or the bare `origin`
/// that newer git prints for it) which are not branches.
pub fn strip_remote(remote_ref: &str) -> Option<&str> {
    let (_, name) = remote_ref.split_once('/')?;
    if name.is_empty() || name == "HEAD" || remote_ref.ends_with("/HEAD") {
        return None;
    }
    Some(name)
}

/// Merge local and remote branch names into one record per stripped name,
/// ordered by name.
pub fn merge_branches(local: &[String], remote: &[String]) -> Vec<Branch> {
    let mut merged: BTreeMap<String, Branch> = BTreeMap::new();
    for name in local.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        merged.insert(
            name.to_string(),
            Branch {
                name: name.to_string(),
                is_local: true,
                is_remote: false,
            },
        );
    }
    for remote_ref in remote.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let Some(name) = strip_remote(remote_ref) else {
            continue;
        };
        merged
            .entry(name.to_string())
            .or_insert_with(|| Branch {
                name: name.to_string(),
                is_local: false,
                is_remote: true,
            })
            .is_remote = true;
    }
    merged.into_values().collect()
}

/// Sort for presentation: local branches first, then by name.
pub fn sort_for_selection(branches: &mut [Branch]) {
    branches.sort_by(|a, b| b.is_local.cmp(&a.is_local).then_with(|| a.name.cmp(&b.name)));
}

pub struct BranchCatalog<'a, V: Vcs> {
    vcs: &'a V,
}

impl<'a, V: Vcs> BranchCatalog<'a, V> {
    pub fn new(vcs: &'a V) -> Self {
        Self { vcs }
    }

    pub fn list_all(&self) -> Result<Vec<Branch>> {
        let local = self.vcs.list_local_branches()?;
        let remote = self.vcs.list_remote_branches()?;
        let branches = merge_branches(&local, &remote);
        debug!(count = branches.len(), "listed branches");
        Ok(branches)
    }

    pub fn fetch_remotes(&self) -> Result<()> {
        self.vcs.fetch_all()
    }

    /// Fetch, then list. A failed fetch is reported and the listing proceeds
    /// with whatever remote-tracking refs are already present.
    pub fn refresh_and_list(&self) -> Result<Vec<Branch>> {
        if let Err(e) = self.fetch_remotes() {
            warn!("failed to fetch remote branches, using cached remote state: {e}");
        }
        self.list_all()
    }

    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.list_all()?.iter().any(|b| b.name == name))
    }
}
