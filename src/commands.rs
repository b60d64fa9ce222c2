use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use tracing::warn;

use crate::branch::{self, BranchCatalog};
use crate::catalog::{Project, ProjectCatalog};
use crate::config::Config;
use crate::editor::Editor;
use crate::error::Error;
use crate::handoff::Handoff;
use crate::identity::ProjectIdentity;
use crate::names;
use crate::sanitize;
use crate::session::{self, SessionDriver, SessionIdentity};
use crate::store::{Worktree, WorktreeSource, WorktreeStore};
use crate::tui::{self, SelectItem, Selector};
use crate::vcs::Vcs;

/// Everything a command needs, with the outside world behind traits.
pub struct App<'a, V: Vcs, D: SessionDriver, S: Selector> {
    pub config: &'a Config,
    pub vcs: &'a V,
    pub driver: &'a D,
    pub selector: &'a S,
    pub editor: Editor,
    pub use_tmux: bool,
    pub use_editor: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    pub project: String,
    pub name: String,
    pub path: PathBuf,
    pub branch: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    Table,
    Json,
    PathOnly,
}

impl<'a, V: Vcs, D: SessionDriver, S: Selector> App<'a, V, D, S> {
    fn store(&self) -> WorktreeStore<'a, V> {
        WorktreeStore::new(self.config, self.vcs)
    }

    fn handoff(&self) -> Handoff<'_, D> {
        Handoff {
            driver: self.driver,
            editor: &self.editor,
            windows: &self.config.windows,
            use_tmux: self.use_tmux,
            use_editor: self.use_editor,
        }
    }

    fn project(&self) -> Result<ProjectIdentity> {
        if !self.vcs.is_repository() {
            return Err(Error::NotAGitRepository.into());
        }
        Ok(ProjectIdentity::resolve(self.vcs)?)
    }

    pub fn list(&self, all: bool, format: ListFormat, out: &mut impl Write) -> Result<()> {
        let store = self.store();
        let projects: Vec<(String, Vec<Worktree>)> = if all {
            ProjectCatalog::new(&store)
                .list_all()?
                .into_iter()
                .map(|p| (p.name, p.worktrees))
                .collect()
        } else {
            let project = self.project()?;
            let worktrees = store.list(&project.name)?;
            vec![(project.name, worktrees)]
        };

        match format {
            ListFormat::Json => {
                let entries: Vec<ListEntry> = projects
                    .into_iter()
                    .flat_map(|(project, worktrees)| {
                        worktrees.into_iter().map(move |wt| ListEntry {
                            project: project.clone(),
                            name: wt.name,
                            path: wt.path,
                            branch: wt.branch,
                        })
                    })
                    .collect();
                serde_json::to_writer_pretty(&mut *out, &entries).map_err(Error::from)?;
                writeln!(out)?;
            }
            ListFormat::PathOnly => {
                for wt in projects.iter().flat_map(|(_, w)| w) {
                    writeln!(out, "{}", wt.path.display())?;
                }
            }
            ListFormat::Table => {
                if projects.iter().all(|(_, w)| w.is_empty()) {
                    match projects.first() {
                        Some((name, _)) if !all => {
                            writeln!(out, "no worktrees found for repository '{name}'")?;
                            writeln!(out, "worktree directory: {}", store.project_dir(name).display())?;
                        }
                        _ => {
                            writeln!(out, "no worktrees found")?;
                            writeln!(out, "worktree directory: {}", store.base_dir().display())?;
                        }
                    }
                    return Ok(());
                }
                for (i, (project, worktrees)) in projects.iter().enumerate() {
                    if i > 0 {
                        writeln!(out)?;
                    }
                    write_table(out, project, worktrees)?;
                }
            }
        }
        Ok(())
    }

    pub fn new_worktree(&self, name: Option<String>, from: Option<&str>) -> Result<()> {
        let project = self.project()?;
        let store = self.store();
        let project_dir = store.project_dir(&project.name);

        let name = match name {
            Some(name) => name,
            None => {
                let branches = BranchCatalog::new(self.vcs);
                let name = names::generate_unique(|n| {
                    project_dir.join(n).exists() || branches.exists(n).unwrap_or(false)
                });
                eprintln!("generated name: {}", name.bold());
                name
            }
        };

        let original = match self.vcs.current_branch() {
            Ok(b) => Some(b),
            Err(e) => {
                warn!("could not determine current branch: {e}");
                None
            }
        };

        eprintln!("creating branch '{name}'...");
        self.vcs
            .create_branch(&name, from)
            .with_context(|| format!("failed to create branch '{name}'"))?;

        eprintln!("creating worktree...");
        let created = store.create(&project.name, &name, &name, &project.main_root);
        self.restore_branch(original.as_deref());
        let created = created.with_context(|| format!("failed to create worktree for '{name}'"))?;

        report_copies(&created.copy_report);
        eprintln!(
            "worktree '{}' created at {}",
            name.green(),
            created.path.display()
        );

        let worktree = Worktree {
            name: sanitize::branch_dir_name(&name),
            path: created.path,
            branch: name,
        };
        self.handoff().open(&project.name, &worktree);
        Ok(())
    }

    fn restore_branch(&self, original: Option<&str>) {
        let Some(original) = original else {
            return;
        };
        match self.vcs.current_branch() {
            Ok(current) if current == original => {}
            _ => {
                if let Err(e) = self.vcs.checkout(original) {
                    warn!("could not switch back to '{original}': {e}");
                }
            }
        }
    }

    pub fn checkout(&self, branch: Option<String>, input: &mut impl BufRead) -> Result<()> {
        let project = self.project()?;
        let store = self.store();
        let catalog = BranchCatalog::new(self.vcs);

        eprintln!("fetching remote branches...");
        let branch = match branch {
            Some(branch) => {
                if let Err(e) = catalog.fetch_remotes() {
                    warn!("failed to fetch remote branches: {e}");
                }
                branch
            }
            None => {
                let current = self.vcs.current_branch().ok();
                let mut branches: Vec<_> = catalog
                    .refresh_and_list()?
                    .into_iter()
                    .filter(|b| Some(&b.name) != current.as_ref())
                    .collect();
                if branches.is_empty() {
                    bail!("no other branches available");
                }
                branch::sort_for_selection(&mut branches);
                let items = branches
                    .into_iter()
                    .map(|b| SelectItem::new(b.name.clone(), format!("[{}]", b.location_label()), b.name))
                    .collect();
                tui::choose(self.selector, "Select branch", items)?
            }
        };

        if let Some(existing) = store.exists_for_branch(&project.name, &branch) {
            eprintln!(
                "a worktree for branch '{}' already exists at {}",
                branch.yellow(),
                existing.path.display()
            );
            eprint!("switch to it? (y/n): ");
            if !read_yes_no(input)? {
                eprintln!("cancelled");
                return Ok(());
            }
            self.handoff().open(&project.name, &existing);
            return Ok(());
        }

        eprintln!("creating worktree for '{branch}'...");
        let created = store
            .create(&project.name, &branch, &branch, &project.main_root)
            .with_context(|| format!("failed to create worktree for '{branch}'"))?;
        report_copies(&created.copy_report);
        eprintln!("worktree created at {}", created.path.display());

        let worktree = Worktree {
            name: sanitize::branch_dir_name(&branch),
            path: created.path,
            branch,
        };
        self.handoff().open(&project.name, &worktree);
        Ok(())
    }

    pub fn switch(&self, name: Option<String>) -> Result<()> {
        let project = self.project()?;
        let store = self.store();
        let worktrees = store.list(&project.name)?;
        if worktrees.is_empty() {
            bail!(
                "no worktrees found for repository '{}'; create one with 'wt new'",
                project.name
            );
        }

        let worktree = match name {
            Some(name) => store.find(&project.name, &name).map_err(|e| {
                eprintln!("available worktrees:");
                for wt in &worktrees {
                    eprintln!("  {}", wt.name);
                }
                e
            })?,
            None => select_worktree(self.selector, &project.name, worktrees)?,
        };
        self.handoff().open(&project.name, &worktree);
        Ok(())
    }

    pub fn open(&self, all: bool, project: Option<&str>) -> Result<()> {
        let store = self.store();
        let catalog = ProjectCatalog::new(&store);

        let projects = match project {
            Some(name) => vec![
                catalog
                    .find(name)?
                    .ok_or_else(|| Error::not_found("project", name))?,
            ],
            None => {
                let mut projects = catalog.list_all()?;
                if !all
                    && let Ok(current) = self.project()
                    && projects.iter().any(|p| p.name == current.name)
                {
                    projects.retain(|p| p.name == current.name);
                }
                projects
            }
        };

        if projects.is_empty() {
            bail!(
                "no projects with worktrees found in {}",
                store.base_dir().display()
            );
        }

        let items = projects
            .into_iter()
            .map(|p| {
                let description = format!("({} worktrees) {}", p.worktrees.len(), p.path.display());
                SelectItem::new(p.name.clone(), description, p)
            })
            .collect();
        let Project { name, worktrees, .. } = tui::choose(self.selector, "Select project", items)?;
        let worktree = select_worktree(self.selector, &name, worktrees)?;
        self.handoff().open(&name, &worktree);
        Ok(())
    }

    pub fn delete(&self, name: Option<String>, force: bool, input: &mut impl BufRead) -> Result<()> {
        let project = self.project()?;
        let store = self.store();
        let worktrees = store.list(&project.name)?;
        if worktrees.is_empty() {
            bail!("no worktrees found for repository '{}'", project.name);
        }

        let worktree = match name {
            Some(name) => store.find(&project.name, &name)?,
            None => select_worktree(self.selector, &project.name, worktrees)?,
        };

        ensure_not_main(&worktree.path, &project.main_root)?;
        if let Ok(current) = self.vcs.toplevel() {
            ensure_not_current(&worktree.path, &current)?;
        }

        if !force {
            eprintln!("{}", "about to delete:".bold());
            eprintln!("  worktree: {}", worktree.name);
            eprintln!("  branch:   {}", worktree.branch);
            eprintln!("  path:     {}", worktree.path.display());
            eprintln!("uncommitted changes in this worktree will be lost.");
            eprint!("type 'yes' to confirm: ");
            if !confirm_deletion(input)? {
                eprintln!("deletion cancelled");
                return Ok(());
            }
        }

        if self.use_tmux && self.driver.is_available() {
            let identity = SessionIdentity::new(&project.name, &worktree.name);
            match session::kill_existing(self.driver, &identity) {
                Ok(Some(killed)) => eprintln!("killed tmux session '{killed}'"),
                Ok(None) => {}
                Err(e) => warn!("failed to kill tmux session: {e}"),
            }
        }

        eprintln!("removing {}...", worktree.path.display());
        store
            .remove(&worktree.path)
            .with_context(|| format!("failed to delete worktree '{}'", worktree.name))?;
        eprintln!("worktree '{}' deleted", worktree.name.green());
        Ok(())
    }
}

fn write_table(out: &mut impl Write, project: &str, worktrees: &[Worktree]) -> Result<()> {
    writeln!(
        out,
        "{}",
        format!("worktrees for '{project}':").if_supports_color(Stream::Stdout, |t| t.bold())
    )?;
    let name_width = worktrees.iter().map(|w| w.name.len()).max().unwrap_or(0);
    let branch_width = worktrees.iter().map(|w| w.branch.len()).max().unwrap_or(0) + 2;
    for wt in worktrees {
        let name = format!("{:<name_width$}", wt.name);
        let branch = format!("{:<branch_width$}", format!("[{}]", wt.branch));
        writeln!(
            out,
            "  {}  {}  {}",
            name.if_supports_color(Stream::Stdout, |t| t.cyan()),
            branch.if_supports_color(Stream::Stdout, |t| t.yellow()),
            wt.path.display().if_supports_color(Stream::Stdout, |t| t.dimmed()),
        )?;
    }
    Ok(())
}

fn select_worktree(selector: &impl Selector, project: &str, worktrees: Vec<Worktree>) -> Result<Worktree> {
    let items = worktrees
        .into_iter()
        .map(|wt| {
            let description = format!("[{}] {}", wt.branch, wt.path.display());
            let mut item = SelectItem::new(wt.name.clone(), description, wt);
            item.filter_key = format!("{} {}", item.title, item.value.branch);
            item
        })
        .collect();
    Ok(tui::choose(selector, &format!("Select worktree ({project})"), items)?)
}

fn report_copies(report: &crate::copy::CopyReport) {
    for path in &report.copied {
        eprintln!("copied {}", path.display());
    }
    if !report.is_clean() {
        warn!("{}", report.failure_summary().unwrap_or_default());
    }
}

/// The main checkout is never deletable, `--force` or not.
pub fn ensure_not_main(path: &Path, main_root: &Path) -> Result<(), Error> {
    if same_path(path, main_root) {
        return Err(Error::Forbidden(
            "cannot delete the main repository worktree".to_string(),
        ));
    }
    Ok(())
}

/// The checkout this process runs in is not deletable either.
pub fn ensure_not_current(path: &Path, toplevel: &Path) -> Result<(), Error> {
    if same_path(path, toplevel) {
        return Err(Error::Forbidden(
            "cannot delete the worktree you are currently in".to_string(),
        ));
    }
    Ok(())
}

fn same_path(a: &Path, b: &Path) -> bool {
    let canonical = |p: &Path| p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
    canonical(a) == canonical(b)
}

/// Only an exact `yes` confirms.
pub fn confirm_deletion(input: &mut impl BufRead) -> Result<bool> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim() == "yes")
}

fn read_yes_no(input: &mut impl BufRead) -> Result<bool> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
