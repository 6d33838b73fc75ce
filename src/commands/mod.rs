//! Command implementations for joblock.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the helpers they share: opening the configured
//! store and recording audit events.

mod lock;
mod run;
mod status;


use crate::cli::{Cli, Command, LockAction};
use joblock::config::{Config, StoreBackend};
use joblock::error::{JoblockError, Result};
use joblock::events::{Event, append_event};
use joblock::store::{FileStore, LockStore};
use std::path::Path;

/// Dispatch a command to its implementation.
///
/// Loads the config named on the command line first; every command needs it.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load_or_default(&cli.config)?;
    tracing::debug!(config = %cli.config.display(), backend = ?config.store.backend, "config loaded");

    match cli.command {
        Command::Run(args) => run::cmd_run(&config, args),
        Command::Status(args) => status::cmd_status(&config, args),
        Command::Key(args) => status::cmd_key(&config, args),
        Command::Lock(lock_cmd) => match lock_cmd.action {
            LockAction::List => lock::cmd_lock_list(&config),
            LockAction::Clear(args) => lock::cmd_lock_clear(&config, args),
        },
    }
}

/// Open the store the config points at.
pub(crate) fn open_store(config: &Config) -> Result<Box<dyn LockStore>> {
    match config.store.backend {
        StoreBackend::File => Ok(Box::new(FileStore::new(&config.store.dir))),
        StoreBackend::Redis => open_redis(&config.store.redis_url),
    }
}

#[cfg(feature = "redis")]
fn open_redis(redis_url: &str) -> Result<Box<dyn LockStore>> {
    Ok(Box::new(joblock::store::RedisStore::open(redis_url)?))
}

#[cfg(not(feature = "redis"))]
fn open_redis(_redis_url: &str) -> Result<Box<dyn LockStore>> {
    Err(JoblockError::UserError(
        "config selects the redis store backend, but joblock was built without it.\n\n\
         Fix: rebuild with `--features redis`, or set `store.backend: file`."
            .to_string(),
    ))
}

/// Append an event to the audit log if recording is enabled.
///
/// Best-effort: a failed append is reported but never fails the command.
pub(crate) fn record_event(config: &Config, event: Event) {
    if !config.record_events {
        return;
    }
    if let Err(e) = append_event(Path::new(&config.events_file), &event) {
        tracing::warn!(action = %event.action, key = %event.key, error = %e, "failed to record event");
    }
}
