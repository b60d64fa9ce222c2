mod branch;
mod catalog;
mod cli;
mod commands;
mod config;
mod copy;
mod editor;
mod error;
mod git;
mod handoff;
mod identity;
mod logging;
mod names;
mod sanitize;
mod session;
mod store;
mod tmux;
mod tui;
mod vcs;

use std::io;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use commands::{App, ListFormat};
use config::Config;
use editor::Editor;
use error::Error;
use git::GitCli;
use tmux::Tmux;
use tui::TerminalSelector;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load();
    let vcs = GitCli::from_current_dir()?;
    let driver = Tmux::detect();
    let app = App {
        config: &config,
        vcs: &vcs,
        driver: &driver,
        selector: &TerminalSelector,
        editor: Editor::from_env(),
        use_tmux: !cli.no_tmux,
        use_editor: !cli.no_editor,
    };

    let command = cli.command.unwrap_or(Commands::List {
        all: false,
        json: false,
        path_only: false,
    });
    let result = match command {
        Commands::List {
            all,
            json,
            path_only,
        } => {
            let format = if json {
                ListFormat::Json
            } else if path_only {
                ListFormat::PathOnly
            } else {
                ListFormat::Table
            };
            app.list(all, format, &mut io::stdout().lock())
        }
        Commands::New { name, from } => app.new_worktree(name, from.as_deref()),
        Commands::Checkout { branch } => app.checkout(branch, &mut io::stdin().lock()),
        Commands::Switch { name } => app.switch(name),
        Commands::Open { all, project } => app.open(all, project.as_deref()),
        Commands::Delete { name, force } => app.delete(name, force, &mut io::stdin().lock()),
    };

    match result {
        Err(e) if matches!(e.downcast_ref::<Error>(), Some(Error::SelectionCancelled)) => Ok(()),
        other => other,
    }
}
