//! Keeps a second eventdir-server from binding the same address.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File};
use std::path::PathBuf;

/// Holds the lock until dropped.
pub struct LockGuard {
    _file: File,
}

/// One lock file per listen address, so two servers on different ports can coexist.
fn lock_path(listen_addr: &str) -> Result<PathBuf> {
    let runtime_dir = dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .ok_or_else(|| anyhow::anyhow!("Could not determine runtime directory"))?;

    let dir = runtime_dir.join("eventdir");
    fs::create_dir_all(&dir)?;

    let name: String = listen_addr
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    Ok(dir.join(format!("server-{name}.lock")))
}

pub fn acquire_lock(listen_addr: &str) -> Result<LockGuard> {
    let path = lock_path(listen_addr)?;
    let file = File::create(&path).context("Failed to create lock file")?;

    file.try_lock_exclusive().map_err(|_| {
        anyhow::anyhow!(
            "Another eventdir-server is already serving {listen_addr}.\n\
            If you believe this is an error, remove: {}",
            path.display()
        )
    })?;

    Ok(LockGuard { _file: file })
}
