//! `joblock status` and `joblock key`: read-only views of one job's lock.

use super::open_store;
use crate::cli::JobArgs;
use joblock::config::Config;
use joblock::error::Result;
use joblock::job::JobIdentity;
use joblock::key::KeyDeriver;
use joblock::locks::LockInspector;

pub(super) fn cmd_status(config: &Config, args: JobArgs) -> Result<()> {
    let job = JobIdentity::from_cli_args(args.job.as_str(), &args.args);
    let inspector = LockInspector::new(open_store(config)?, config.deriver_registry())
        .with_stale_minutes(config.lock_stale_minutes);
    let key = config.deriver_registry().derive_key(job.job_type(), job.args());

    match inspector.describe(job.job_type(), job.args())? {
        None => println!("Unlocked: {}", key),
        Some(info) => {
            println!("Locked: {}", info.key);
            if let Some(meta) = &info.metadata {
                println!("  Owner:      {}", meta.owner);
                if let Some(pid) = meta.pid {
                    println!("  PID:        {}", pid);
                }
                println!("  Created:    {}", meta.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
                println!("  Age:        {}", meta.age_string());
                println!("  Job:        {}", meta.job);
            }
            if info.is_stale {
                println!(
                    "  Status:     STALE (exceeds {} min threshold)",
                    config.lock_stale_minutes
                );
            }
        }
    }

    Ok(())
}

pub(super) fn cmd_key(config: &Config, args: JobArgs) -> Result<()> {
    let job = JobIdentity::from_cli_args(args.job.as_str(), &args.args);
    println!(
        "{}",
        config.deriver_registry().derive_key(job.job_type(), job.args())
    );
    Ok(())
}
