//! Disable core dumps so a crash cannot write passwords or tokens to disk.

use anyhow::{Context, Result};
use std::env;
#[cfg(unix)]
use std::io;

const GANTT_ALLOW_COREDUMPS: &str = "GANTT_ALLOW_COREDUMPS";

pub fn disable() -> Result<()> {
    if allowed_by_override(env::var(GANTT_ALLOW_COREDUMPS).ok().as_deref()) {
        tracing::debug!(
            env_var = GANTT_ALLOW_COREDUMPS,
            "Core dump hardening disabled by environment override"
        );
        return Ok(());
    }

    apply_platform_hardening().context("failed to disable core dumps")
}

fn allowed_by_override(raw: Option<&str>) -> bool {
    raw.is_some_and(|raw| {
        matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        )
    })
}

#[cfg(unix)]
fn apply_platform_hardening() -> Result<()> {
    let limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    let rc = unsafe { libc::setrlimit(libc::RLIMIT_CORE, &raw const limit) };
    if rc != 0 {
        return Err(io::Error::last_os_error()).context("setrlimit(RLIMIT_CORE=0) failed");
    }

    #[cfg(target_os = "linux")]
    {
        let rc = unsafe { libc::prctl(libc::PR_SET_DUMPABLE, 0, 0, 0, 0) };
        if rc != 0 {
            return Err(io::Error::last_os_error()).context("prctl(PR_SET_DUMPABLE=0) failed");
        }
    }

    Ok(())
}

#[cfg(not(unix))]
fn apply_platform_hardening() -> Result<()> {
    Ok(())
}
