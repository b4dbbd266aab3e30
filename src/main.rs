use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use audio_cast_guard::AudioEndpoint;
use audio_cast_guard::config::Config;
use audio_cast_guard::logging::{
    LoggingConfig, bootstrap_subscriber, cleanup_old_logs, initialize_logging,
};
use audio_cast_guard::service::supervisor::{InstanceLock, LaunchAgent, LaunchOutcome};
use audio_cast_guard::service::{SignalHandler, launch_detached, run_daemon};
use audio_cast_guard::system::{DeviceInspector, PlatformChangeSource, PlatformInspector};

#[derive(Parser)]
#[command(name = "audio-cast-guard")]
#[command(about = "Keeps the default audio output off AirPlay by reverting to your preferred device")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitor in the foreground
    Daemon,
    /// Start the monitor in the background unless one is already running
    Launch,
    /// List output devices and how they are classified
    ListDevices,
    /// Show the current default output device
    ShowDefault,
    /// Validate configuration file
    CheckConfig,
    /// Install the login LaunchAgent
    Install,
    /// Remove the login LaunchAgent
    Uninstall,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The configured subscriber depends on the config, so loading logs to stderr
    let bootstrap = bootstrap_subscriber(cli.verbose, std::io::stderr);
    let config =
        tracing::subscriber::with_default(bootstrap, || Config::load(cli.config.as_deref()))?;

    let is_daemon = matches!(cli.command, None | Some(Commands::Daemon));
    let mut logging_config =
        LoggingConfig::from_settings(&config.logging, &config.general.log_level, cli.verbose);
    if !is_daemon {
        logging_config.file_output = false;
    }
    let (_log_guard, log_dir) = initialize_logging(logging_config)?;

    if let Some(log_dir) = log_dir {
        if let Err(e) = cleanup_old_logs(&log_dir, config.logging.retention_days) {
            warn!("Failed to clean up old logs: {:#}", e);
        }
    }

    match cli.command {
        Some(Commands::Daemon) | None => daemon(&config).await,
        Some(Commands::Launch) => launch(&config, cli.config.as_deref()),
        Some(Commands::ListDevices) => list_devices(),
        Some(Commands::ShowDefault) => show_default(),
        Some(Commands::CheckConfig) => check_config(&config),
        Some(Commands::Install) => install(cli.config.as_deref()),
        Some(Commands::Uninstall) => uninstall(),
    }
}

fn lock_path(config: &Config) -> Result<PathBuf> {
    match &config.service.lock_file {
        Some(path) => Ok(path.clone()),
        None => InstanceLock::default_path(),
    }
}

async fn daemon(config: &Config) -> Result<()> {
    let lock_path = lock_path(config)?;
    let Some(lock) = InstanceLock::acquire(&lock_path)? else {
        warn!("Another monitor holds {}, exiting", lock_path.display());
        return Ok(());
    };

    info!(
        "Starting audio-cast-guard daemon (pid {}, lock {})",
        std::process::id(),
        lock.path().display()
    );

    let inspector = PlatformInspector::new()?;
    let events = PlatformChangeSource::new()?;

    let (signal_tx, signal_rx) = mpsc::unbounded_channel();
    let _signal_task = SignalHandler::new(signal_tx).spawn()?;

    if let Err(e) = run_daemon(inspector, &events, config, signal_rx).await {
        error!("Monitor stopped: {:#}", e);
        return Err(e);
    }
    Ok(())
}

fn launch(config: &Config, config_arg: Option<&str>) -> Result<()> {
    let exe = std::env::current_exe().context("Failed to locate current executable")?;

    let mut args = Vec::new();
    if let Some(config_arg) = config_arg {
        args.push("--config".to_string());
        args.push(config_arg.to_string());
    }
    args.push("daemon".to_string());

    match launch_detached(&lock_path(config)?, &exe, &args)? {
        LaunchOutcome::AlreadyRunning => println!("Monitor already running"),
        LaunchOutcome::Launched(pid) => println!("Monitor started (pid {})", pid),
    }
    Ok(())
}

fn list_devices() -> Result<()> {
    let inspector = PlatformInspector::new()?;
    let devices = inspector.list_output_endpoints()?;
    let default_id = inspector.default_output_endpoint().ok().map(|d| d.id);

    println!("Output devices:");
    if devices.is_empty() {
        println!("  No output devices found!");
        return Ok(());
    }

    for device in &devices {
        println!("{}", device_line(device, Some(device.id) == default_id));
    }

    Ok(())
}

fn device_line(device: &AudioEndpoint, is_default: bool) -> String {
    let marker = if is_default { "*" } else { " " };
    let eligibility = if device.is_eligible() {
        ""
    } else {
        " (reverted away from)"
    };
    format!(" {} {}{}", marker, device, eligibility)
}

fn show_default() -> Result<()> {
    let inspector = PlatformInspector::new()?;
    match inspector.default_output_endpoint() {
        Ok(device) => println!("Default output: {}", device),
        Err(e) => println!("Default output: unavailable ({})", e),
    }
    Ok(())
}

fn check_config(config: &Config) -> Result<()> {
    println!("Configuration validation:");
    println!("  ✓ Configuration file parsed and validated");
    println!(
        "  ✓ Fallback order: {}",
        config
            .policy
            .fallback_order
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  ✓ Follow user selection: {}", config.policy.follow_user_selection);
    Ok(())
}

fn install(config_arg: Option<&str>) -> Result<()> {
    let exe = std::env::current_exe().context("Failed to locate current executable")?;
    let agent = LaunchAgent::at_default_path()?;
    let config_path =
        config_arg.map(|p| std::fs::canonicalize(p).unwrap_or_else(|_| PathBuf::from(p)));
    agent.install(&exe, config_path.as_deref())?;
    println!("LaunchAgent installed: {}", agent.plist_path().display());
    Ok(())
}

fn uninstall() -> Result<()> {
    let agent = LaunchAgent::at_default_path()?;
    if agent.uninstall()? {
        println!("LaunchAgent removed: {}", agent.plist_path().display());
    } else {
        println!("No LaunchAgent installed");
    }
    Ok(())
}
