//! nullmount - Mount a content-free nullfs namespace.
//!
//! Usage: nullmount <MOUNTPOINT> [--config FILE] [--auto-vivify] [--strict-rmdir]
//!
//! Everything written is discarded. Directory and file entries persist for
//! the lifetime of the mount.

use anyhow::{Context, Result};
use clap::Parser;
use nullfs_core::RmdirPolicy;
use nullfs_fuse::{spawn_mount, MountConfig, NullFS};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nullmount")]
#[command(about = "Mount a filesystem that stores names but no data")]
#[command(version)]
struct Cli {
    /// Mountpoint for the filesystem
    mount: PathBuf,

    /// TOML configuration file (flags below override its values)
    #[arg(short, long, env = "NULLFS_CONFIG")]
    config: Option<PathBuf>,

    /// Create an empty file whenever an unknown path is queried
    #[arg(long, env = "NULLFS_AUTO_VIVIFY")]
    auto_vivify: bool,

    /// Make rmdir remove the directory entry instead of aliasing unlink
    #[arg(long, env = "NULLFS_STRICT_RMDIR")]
    strict_rmdir: bool,

    /// Attribute cache TTL handed to the kernel (e.g. "1s", "250ms")
    #[arg(long, value_parser = parse_duration)]
    attr_ttl: Option<Duration>,

    /// Filesystem name shown in the mount table
    #[arg(long)]
    fsname: Option<String>,

    /// Allow other users to access the mount
    #[arg(long)]
    allow_other: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn parse_duration(s: &str) -> Result<Duration, humantime_serde::re::humantime::DurationError> {
    humantime_serde::re::humantime::parse_duration(s)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    if !cli.mount.is_dir() {
        anyhow::bail!("Mountpoint is not a directory: {}", cli.mount.display());
    }

    let config = build_config(&cli)?;
    info!(
        mount = %cli.mount.display(),
        auto_vivify = config.namespace.auto_vivify_files,
        rmdir_policy = ?config.namespace.rmdir_policy,
        attr_ttl = ?config.attr_ttl,
        "Mounting nullfs"
    );

    mount_and_wait(&cli, config)
}

/// Layers CLI flags over the configuration file, if any.
fn build_config(cli: &Cli) -> Result<MountConfig> {
    let mut config = match &cli.config {
        Some(path) => MountConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MountConfig::default(),
    };

    if cli.auto_vivify {
        config.namespace.auto_vivify_files = true;
    }
    if cli.strict_rmdir {
        config.namespace.rmdir_policy = RmdirPolicy::RemoveDirectory;
    }
    if let Some(ttl) = cli.attr_ttl {
        config.attr_ttl = ttl;
    }
    if let Some(name) = &cli.fsname {
        config.fsname.clone_from(name);
    }
    if cli.allow_other {
        config.allow_other = true;
    }
    Ok(config)
}

/// Mount the filesystem and wait for Ctrl+C.
fn mount_and_wait(cli: &Cli, config: MountConfig) -> Result<()> {
    let (tx, rx) = mpsc::channel::<()>();

    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .context("Failed to set signal handler")?;

    info!("Mounting filesystem (press Ctrl+C to unmount)");

    let fs = NullFS::new(config.clone());
    let session = spawn_mount(fs, &cli.mount, &config).map_err(|e| {
        error!(error = %e, "Mount failed");
        anyhow::anyhow!("Failed to mount filesystem: {e}")
    })?;

    match rx.recv() {
        Ok(()) => {
            info!("Received interrupt signal, unmounting...");
        }
        Err(_) => {
            warn!("Signal channel closed unexpectedly");
        }
    }

    drop(session);
    info!("Filesystem unmounted");
    Ok(())
}
