use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{info, trace, warn};

use peripherald_core::{
    backend::LoggingHapticBackend,
    ipc::is_daemon_running as is_socket_reachable,
    scheduler::TokioScheduler,
    AppConfig, DaemonClient, DaemonServer, Device,
};

/// Get the PID file path
fn pid_file_path() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("peripherald")
        .join("daemon.pid")
}

/// Check if daemon is running
fn is_daemon_running() -> Option<u32> {
    let pid_path = pid_file_path();
    if !pid_path.exists() {
        return None;
    }

    let mut file = fs::File::open(&pid_path).ok()?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).ok()?;
    let pid: u32 = contents.trim().parse().ok()?;

    // Check if process is still running
    #[cfg(unix)]
    {
        use std::process::Command;
        let output = Command::new("kill")
            .arg("-0")
            .arg(pid.to_string())
            .output()
            .ok()?;
        if output.status.success() {
            return Some(pid);
        }
    }

    #[cfg(windows)]
    {
        return Some(pid);
    }

    // Process not running, clean up stale PID file
    remove_pid_file();
    None
}

/// Write PID file
fn write_pid_file() -> Result<()> {
    let pid_path = pid_file_path();
    if let Some(parent) = pid_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(&pid_path)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(())
}

/// Remove PID file
fn remove_pid_file() {
    if let Err(e) = fs::remove_file(pid_file_path()) {
        trace!("No PID file removed: {}", e);
    }
}

/// Start the daemon
pub async fn start(config: AppConfig) -> Result<()> {
    if let Some(pid) = is_daemon_running() {
        println!("Daemon is already running (PID: {})", pid);
        return Ok(());
    }

    println!("Starting peripherald daemon...");
    write_pid_file()?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Setup signal handlers for graceful shutdown
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Received shutdown signal");
        if shutdown_tx.send(true).is_err() {
            warn!("Shutdown signal had no receivers");
        }
    });

    // No hardware transport is attached; haptic requests are logged.
    let scheduler = Arc::new(TokioScheduler::try_current()?);
    let device = Device::new(
        "default",
        &config.profile,
        scheduler,
        Arc::new(LoggingHapticBackend::new()),
    )?;
    device.scroll().set_on_chunk(|chunk| trace!(chunk, "Scroll chunk ready for injection"));

    if let Err(e) = device.configure_all().await {
        warn!("Device configuration incomplete: {}", e);
    }

    let server = DaemonServer::new(Arc::new(device), &config);

    println!(
        "Daemon started (PID: {}). Press Ctrl+C or run 'peripherald daemon stop' to stop.",
        std::process::id()
    );
    println!("  Control socket: {}", server.socket_path().display());
    println!(
        "  Scroll smoothing: interval {} ms, steps {}",
        config.profile.scroll.interval_ms, config.profile.scroll.steps
    );

    // Serve until shutdown
    let result = server.run(shutdown_rx).await;

    remove_pid_file();
    println!("Daemon stopped.");

    result?;
    Ok(())
}

/// Stop the daemon
pub async fn stop() -> Result<()> {
    match is_daemon_running() {
        Some(pid) => {
            println!("Stopping daemon (PID: {})...", pid);

            #[cfg(unix)]
            {
                use std::process::Command;
                let output = Command::new("kill")
                    .arg("-INT")
                    .arg(pid.to_string())
                    .output()?;

                if output.status.success() {
                    // Wait a moment for graceful shutdown
                    tokio::time::sleep(tokio::time::Duration::from_secs(2)).await;

                    if is_daemon_running().is_none() {
                        println!("Daemon stopped successfully.");
                    } else {
                        Command::new("kill").arg("-9").arg(pid.to_string()).output()?;
                        remove_pid_file();
                        println!("Daemon forcefully terminated.");
                    }
                } else {
                    println!("Failed to stop daemon. You may need to kill it manually: kill {}", pid);
                }
            }

            #[cfg(windows)]
            {
                println!("Please stop the daemon manually on Windows (PID: {})", pid);
            }
        }
        None => {
            println!("Daemon is not running.");
        }
    }

    Ok(())
}

/// Show daemon status
pub async fn status(config: &AppConfig) -> Result<()> {
    match is_daemon_running() {
        Some(pid) => {
            println!("Daemon is running (PID: {})", pid);
            println!("PID file: {}", pid_file_path().display());
        }
        None => {
            println!("Daemon is not running.");
            return Ok(());
        }
    }

    let socket_path = config.socket_path();
    if !is_socket_reachable(&socket_path).await {
        println!("Control socket not reachable: {}", socket_path.display());
        return Ok(());
    }

    let status = DaemonClient::new(socket_path).status().await?;
    println!("Device: {}", status.device);
    println!("Features: {}", status.features.join(", "));
    println!(
        "Up since {} ({} seconds)",
        status.started_at.format("%Y-%m-%d %H:%M:%S"),
        status.uptime_secs
    );

    Ok(())
}
