use clap::{ArgAction, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "wt", version, about = "Git worktrees with tmux and editor handoff")]
pub struct Cli {
    /// Don't open the editor
    #[arg(long, global = true)]
    pub no_editor: bool,
    /// Don't create or switch tmux sessions
    #[arg(long, global = true)]
    pub no_tmux: bool,
    /// Increase log output (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List worktrees for the current repository
    List {
        /// List worktrees of every project
        #[arg(long)]
        all: bool,
        /// Print as JSON
        #[arg(long, conflicts_with = "path_only")]
        json: bool,
        /// Print only worktree paths
        #[arg(long)]
        path_only: bool,
    },
    /// Create a new branch and a worktree for it
    New {
        /// Branch and worktree name (generated if omitted)
        name: Option<String>,
        /// Start the branch from this branch instead of HEAD
        #[arg(long)]
        from: Option<String>,
    },
    /// Create (or reuse) a worktree for an existing local or remote branch
    Checkout {
        /// Branch name (pick interactively if omitted)
        branch: Option<String>,
    },
    /// Switch to a worktree of the current repository
    Switch {
        /// Worktree name (pick interactively if omitted)
        name: Option<String>,
    },
    /// Pick a project and worktree and open it
    Open {
        /// Choose from every project, even inside a repository
        #[arg(long, conflicts_with = "project")]
        all: bool,
        /// Only consider this project
        #[arg(long)]
        project: Option<String>,
    },
    /// Delete a worktree and its tmux session
    Delete {
        /// Worktree name (pick interactively if omitted)
        name: Option<String>,
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_args_defaults_to_list() {
        let cli = Cli::try_parse_from(["wt"]).unwrap();
        assert!(cli.command.is_none(), "no subcommand should yield None (defaults to list)");
    }

    #[test]
    fn list_flags() {
        let cli = Cli::try_parse_from(["wt", "list", "--all", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::List { all: true, json: true, path_only: false })
        ));
    }

    #[test]
    fn json_and_path_only_conflict() {
        let err = Cli::try_parse_from(["wt", "list", "--json", "--path-only"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn help_flag_is_recognized() {
        let err = Cli::try_parse_from(["wt", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn new_with_from() {
        let cli = Cli::try_parse_from(["wt", "new", "feat/login", "--from", "develop"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::New { name: Some(n), from: Some(f) }) if n == "feat/login" && f == "develop"
        ));
    }

    #[test]
    fn new_without_name() {
        let cli = Cli::try_parse_from(["wt", "new"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::New { name: None, from: None })));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["wt", "open", "--no-tmux", "--no-editor", "-vv"]).unwrap();
        assert!(cli.no_tmux);
        assert!(cli.no_editor);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn open_all_conflicts_with_project() {
        let err = Cli::try_parse_from(["wt", "open", "--all", "--project", "acme"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
        let cli = Cli::try_parse_from(["wt", "open", "--project", "acme"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Open { all: false, project: Some(p) }) if p == "acme"));
    }

    #[test]
    fn delete_with_force() {
        let cli = Cli::try_parse_from(["wt", "delete", "foo", "--force"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Delete { name: Some(n), force: true }) if n == "foo"));
    }

    #[test]
    fn checkout_and_switch_take_optional_names() {
        let cli = Cli::try_parse_from(["wt", "checkout"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Checkout { branch: None })));
        let cli = Cli::try_parse_from(["wt", "switch", "feat_x"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Switch { name: Some(n) }) if n == "feat_x"));
    }

    #[test]
    fn unknown_subcommand_errors() {
        let err = Cli::try_parse_from(["wt", "bogus"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidSubcommand);
    }
}
