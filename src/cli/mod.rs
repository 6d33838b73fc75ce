//! CLI argument parsing for joblock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// joblock: run jobs at most once concurrently across workers.
///
/// Each job type plus argument list maps to a lock key in a shared store.
/// A run whose lock is already held is skipped, not queued.
#[derive(Parser, Debug)]
#[command(name = "joblock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file (defaults apply if it does not exist).
    #[arg(long, global = true, default_value = "joblock.yaml")]
    pub config: PathBuf,

    /// Enable debug diagnostics on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for joblock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a command under a job's lock.
    ///
    /// If another worker holds the lock, the command is not run and
    /// joblock exits successfully (see --fail-on-skip).
    Run(RunArgs),

    /// Show whether a job's lock is currently held.
    Status(JobArgs),

    /// Print the lock key a job derives.
    Key(JobArgs),

    /// Lock management commands.
    ///
    /// List or clear job locks.
    Lock(LockCommand),
}

/// Job identity arguments shared by several commands.
#[derive(Args, Debug)]
pub struct JobArgs {
    /// Job type name (e.g., SyncAccount).
    pub job: String,

    /// Job argument, parsed as JSON (plain text becomes a JSON string).
    /// Repeat for each argument, in order.
    #[arg(long = "arg", value_name = "JSON")]
    pub args: Vec<String>,
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// Exit with the lock-held code (4) instead of 0 when skipped.
    #[arg(long)]
    pub fail_on_skip: bool,

    /// Command line to run, split with shell quoting rules (no shell is invoked).
    #[arg(long, conflicts_with = "argv")]
    pub command: Option<String>,

    /// Command and arguments to run, after `--`.
    #[arg(last = true, value_name = "CMD")]
    pub argv: Vec<String>,
}

/// Lock subcommands.
#[derive(Args, Debug)]
pub struct LockCommand {
    #[command(subcommand)]
    pub action: LockAction,
}

/// Available lock actions.
#[derive(Subcommand, Debug)]
pub enum LockAction {
    /// List all held locks.
    ///
    /// Shows every lock in the configured namespace with its age and owner.
    List,

    /// Clear a specific lock.
    ///
    /// Requires --force unless the lock is stale.
    Clear(LockClearArgs),
}

/// Arguments for the `lock clear` command.
#[derive(Args, Debug)]
pub struct LockClearArgs {
    /// Full lock key, as printed by `joblock lock list` or `joblock key`.
    pub key: String,

    /// Clear even if the lock is not stale.
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_run_with_trailing_command() {
        let cli = Cli::try_parse_from([
            "joblock", "run", "SyncAccount", "--arg", "42", "--arg", "eu", "--", "sync", "--all",
        ])
        .unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.job.job, "SyncAccount");
            assert_eq!(args.job.args, vec!["42", "eu"]);
            assert_eq!(args.argv, vec!["sync", "--all"]);
            assert!(args.command.is_none());
            assert!(!args.fail_on_skip);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_with_command_string() {
        let cli = Cli::try_parse_from([
            "joblock",
            "run",
            "Nightly",
            "--fail-on-skip",
            "--command",
            "report --day 'last monday'",
        ])
        .unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.command.as_deref(), Some("report --day 'last monday'"));
            assert!(args.argv.is_empty());
            assert!(args.fail_on_skip);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_rejects_both_command_forms() {
        let result = Cli::try_parse_from([
            "joblock", "run", "Job", "--command", "true", "--", "false",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_status() {
        let cli = Cli::try_parse_from(["joblock", "status", "Job", "--arg", "1"]).unwrap();
        if let Command::Status(args) = cli.command {
            assert_eq!(args.job, "Job");
            assert_eq!(args.args, vec!["1"]);
        } else {
            panic!("Expected Status command");
        }
    }

    #[test]
    fn parse_key_without_args() {
        let cli = Cli::try_parse_from(["joblock", "key", "Job"]).unwrap();
        assert!(matches!(cli.command, Command::Key(ref args) if args.args.is_empty()));
    }

    #[test]
    fn parse_lock_list() {
        let cli = Cli::try_parse_from(["joblock", "lock", "list"]).unwrap();
        if let Command::Lock(lock_cmd) = cli.command {
            assert!(matches!(lock_cmd.action, LockAction::List));
        } else {
            panic!("Expected Lock command");
        }
    }

    #[test]
    fn parse_lock_clear_with_force() {
        let cli = Cli::try_parse_from(["joblock", "lock", "clear", "locked:Job-[1]", "--force"])
            .unwrap();
        if let Command::Lock(lock_cmd) = cli.command {
            if let LockAction::Clear(args) = lock_cmd.action {
                assert_eq!(args.key, "locked:Job-[1]");
                assert!(args.force);
            } else {
                panic!("Expected Clear action");
            }
        } else {
            panic!("Expected Lock command");
        }
    }

    #[test]
    fn parse_global_options() {
        let cli = Cli::try_parse_from([
            "joblock", "lock", "list", "--config", "/etc/joblock.yaml", "-v",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/joblock.yaml"));
        assert!(cli.verbose);
    }

    #[test]
    fn default_config_path() {
        let cli = Cli::try_parse_from(["joblock", "lock", "list"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("joblock.yaml"));
        assert!(!cli.verbose);
    }
}
