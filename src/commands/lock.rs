//! `joblock lock list` and `joblock lock clear`.

use super::{open_store, record_event};
use crate::cli::LockClearArgs;
use joblock::config::Config;
use joblock::error::{JoblockError, Result};
use joblock::events::{Event, EventAction};
use joblock::key::LockKey;
use joblock::locks::{LockInfo, LockInspector};
use serde_json::json;

pub(super) fn cmd_lock_list(config: &Config) -> Result<()> {
    let inspector = LockInspector::new(open_store(config)?, config.deriver_registry())
        .with_stale_minutes(config.lock_stale_minutes);

    let locks = inspector.list()?;

    if locks.is_empty() {
        println!("No active locks.");
        return Ok(());
    }

    println!("Active locks ({}):", locks.len());
    println!();

    for lock in &locks {
        println!("  {}:", lock.key);
        print_details(lock, config.lock_stale_minutes, "    ");
        println!();
    }

    let stale_count = locks.iter().filter(|l| l.is_stale).count();
    if stale_count > 0 {
        println!(
            "Note: {} lock(s) are stale. Use `joblock lock clear <key>` to clear.",
            stale_count
        );
    }

    Ok(())
}

pub(super) fn cmd_lock_clear(config: &Config, args: LockClearArgs) -> Result<()> {
    let inspector = LockInspector::new(open_store(config)?, config.deriver_registry())
        .with_stale_minutes(config.lock_stale_minutes);
    let key = LockKey::new(args.key);

    let Some(current) = inspector.describe_key(&key)? else {
        return Err(JoblockError::UserError(format!(
            "lock '{}' does not exist.\n\n\
             Run `joblock lock list` to see held locks.",
            key
        )));
    };

    if !current.is_stale && !args.force {
        return Err(JoblockError::UserError(format!(
            "refusing to clear lock '{}': it is not stale.\n\n\
             Clearing a lock lets another worker start the job while the holder may still be running.\n\
             Only clear it if you are certain the holder has crashed.\n\n\
             To clear the lock, run:\n  joblock lock clear {} --force",
            key, key
        )));
    }

    // Released between the check and the clear: nothing left to do.
    let Some(cleared) = inspector.clear(&key)? else {
        println!("Lock '{}' was already released.", key);
        return Ok(());
    };

    record_event(
        config,
        Event::new(EventAction::LockClear, cleared.key.clone()).with_details(json!({
            "was_stale": cleared.is_stale,
            "force": args.force,
            "age_minutes": cleared.metadata.as_ref().map(|m| m.age().num_minutes()),
            "owner": cleared.metadata.as_ref().map(|m| m.owner.clone()),
            "job": cleared.metadata.as_ref().map(|m| m.job.clone()),
        })),
    );

    println!("Cleared lock: {}", cleared.key);
    println!();
    println!("Lock details:");
    print_details(&cleared, config.lock_stale_minutes, "  ");

    Ok(())
}

fn print_details(lock: &LockInfo, stale_minutes: u32, indent: &str) {
    let Some(meta) = &lock.metadata else {
        println!("{}(no metadata)", indent);
        return;
    };
    println!("{}Owner:      {}", indent, meta.owner);
    if let Some(pid) = meta.pid {
        println!("{}PID:        {}", indent, pid);
    }
    println!(
        "{}Created:    {}",
        indent,
        meta.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("{}Age:        {}", indent, meta.age_string());
    println!("{}Job:        {}", indent, meta.job);
    if lock.is_stale {
        println!(
            "{}Status:     STALE (exceeds {} min threshold)",
            indent, stale_minutes
        );
    }
}
