use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peripherald_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "peripherald")]
#[command(author, version, about = "Peripheral configuration daemon")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Background daemon exposing device features on the control socket
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
    /// Inspect or change scroll smoothing on the running daemon
    Scroll {
        #[command(subcommand)]
        action: ScrollAction,
    },
    /// Inspect or change haptic feedback on the running daemon
    Haptic {
        #[command(subcommand)]
        action: HapticAction,
    },
    /// Feed deltas into a local smoother and print the chunks it emits
    Simulate {
        /// Raw scroll deltas, fed in order
        #[arg(required = true, allow_negative_numbers = true)]
        deltas: Vec<i32>,
        /// Delay between drain ticks in milliseconds
        #[arg(short, long, allow_negative_numbers = true)]
        interval: Option<i32>,
        /// Release divisor
        #[arg(short, long, allow_negative_numbers = true)]
        steps: Option<i32>,
        /// Pause between fed deltas in milliseconds
        #[arg(short, long, default_value_t = 0)]
        gap: u64,
    },
}

#[derive(Subcommand)]
enum DaemonAction {
    /// Start the daemon in the foreground
    Start,
    /// Stop the running daemon
    Stop,
    /// Check daemon status
    Status,
}

#[derive(Subcommand)]
pub enum ScrollAction {
    /// Show interval and steps
    Get,
    /// Set the delay between drain ticks (milliseconds, minimum 1)
    SetInterval {
        #[arg(allow_negative_numbers = true)]
        interval: i32,
    },
    /// Set the release divisor (minimum 1)
    SetSteps {
        #[arg(allow_negative_numbers = true)]
        steps: i32,
    },
}

#[derive(Subcommand)]
pub enum HapticAction {
    /// Show haptic settings
    Get,
    /// Enable haptic effects
    Enable,
    /// Disable haptic effects
    Disable,
    /// Set effect strength (1-100)
    SetStrength {
        #[arg(allow_negative_numbers = true)]
        strength: i32,
    },
    /// Turn battery saving on or off
    BatterySaving {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Play an effect by id
    Play { effect: u8 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Daemon { action } => match action {
            DaemonAction::Start => commands::daemon::start(config).await,
            DaemonAction::Stop => commands::daemon::stop().await,
            DaemonAction::Status => commands::daemon::status(&config).await,
        },
        Commands::Scroll { action } => commands::scroll::run(&config, action).await,
        Commands::Haptic { action } => commands::haptic::run(&config, action).await,
        Commands::Simulate {
            deltas,
            interval,
            steps,
            gap,
        } => commands::simulate::run(&config, &deltas, interval, steps, gap).await,
    }
}
