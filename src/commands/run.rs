//! `joblock run`: execute a command under a job's lock.

use super::{open_store, record_event};
use crate::cli::RunArgs;
use joblock::config::Config;
use joblock::error::{JoblockError, Result};
use joblock::events::{Event, EventAction};
use joblock::job::JobIdentity;
use joblock::locks::{GuardError, LockGuard, RunOutcome};
use serde_json::json;
use std::process::Command;

pub(super) fn cmd_run(config: &Config, args: RunArgs) -> Result<()> {
    let argv = command_line(&args)?;
    let job = JobIdentity::from_cli_args(args.job.job.as_str(), &args.job.args);

    let guard = LockGuard::new(open_store(config)?)
        .with_derivers(config.deriver_registry())
        .with_release_mode(config.release_mode);
    let key = guard.derive_key(job.job_type(), job.args());
    tracing::debug!(key = %key, job = job.job_type(), "attempting job lock");

    let outcome = guard.run_job(&job, || {
        record_event(
            config,
            Event::new(EventAction::Acquired, key.clone())
                .with_details(json!({ "job": job.job_type(), "command": argv })),
        );
        run_command(&argv)
    });

    match outcome {
        Ok(RunOutcome::Completed(())) => {
            record_event(
                config,
                Event::new(EventAction::Released, key).with_details(json!({ "job": job.job_type() })),
            );
            Ok(())
        }
        Ok(RunOutcome::Skipped { key }) => {
            record_event(
                config,
                Event::new(EventAction::Skipped, key.clone())
                    .with_details(json!({ "job": job.job_type() })),
            );
            eprintln!("Skipped: lock '{}' is held by another worker.", key);
            if args.fail_on_skip {
                Err(JoblockError::LockHeld(key))
            } else {
                Ok(())
            }
        }
        Err(GuardError::Work(e)) => {
            record_event(
                config,
                Event::new(EventAction::WorkFailed, key)
                    .with_details(json!({ "job": job.job_type(), "error": e.to_string() })),
            );
            Err(e)
        }
        Err(GuardError::Store(e)) => Err(e.into()),
        Err(GuardError::Release {
            key,
            source,
            work_error,
        }) => {
            record_event(
                config,
                Event::new(EventAction::ReleaseFailed, key.clone()).with_details(json!({
                    "job": job.job_type(),
                    "error": source.to_string(),
                    "work_error": work_error.as_ref().map(|e| e.to_string()),
                })),
            );
            if let Some(e) = work_error {
                eprintln!("Error: {}", e);
            }
            Err(JoblockError::StaleLock { key, source })
        }
    }
}

/// The argv to execute, from `--command` or the arguments after `--`.
fn command_line(args: &RunArgs) -> Result<Vec<String>> {
    let argv = match &args.command {
        Some(command) => shell_words::split(command).map_err(|e| {
            JoblockError::UserError(format!(
                "failed to parse --command '{}': {}\n\n\
                 Fix: check for unmatched quotes or invalid escape sequences.",
                command, e
            ))
        })?,
        None => args.argv.clone(),
    };

    if argv.is_empty() {
        return Err(JoblockError::UserError(
            "no command to run.\n\n\
             Fix: pass the command after `--` (joblock run Job -- cmd args) or with --command."
                .to_string(),
        ));
    }

    Ok(argv)
}

/// Run the guarded command with inherited stdio; a non-zero exit is a job failure.
fn run_command(argv: &[String]) -> Result<()> {
    let Some((program, cmd_args)) = argv.split_first() else {
        return Err(JoblockError::UserError("no command to run".to_string()));
    };

    let status = Command::new(program).args(cmd_args).status().map_err(|e| {
        JoblockError::WorkFailed(format!(
            "failed to execute '{}': {}\n\n\
             Fix: ensure the command is installed and in PATH.",
            program, e
        ))
    })?;

    if status.success() {
        Ok(())
    } else {
        Err(JoblockError::WorkFailed(format!(
            "'{}' exited with {}",
            program, status
        )))
    }
}
