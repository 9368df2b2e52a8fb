use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "mashaaer", version, about = "Mashaaer emotion timeline CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an observed emotion
    Record {
        /// Emotion tag (e.g. "happy") or its Arabic name
        emotion: String,
        /// Intensity between 0 and 1
        #[arg(short, long, default_value_t = 0.5)]
        intensity: f64,
    },
    /// Timeline views, statistics and export
    Timeline {
        #[command(subcommand)]
        action: commands::timeline::TimelineAction,
    },
    /// Push recent entries to the configured endpoint
    Sync,
    /// Subscription level and feature access
    Access {
        #[command(subcommand)]
        action: commands::access::AccessAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    // stdout carries command output; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Record { emotion, intensity } => commands::record::run(&emotion, intensity).await,
        Commands::Timeline { action } => commands::timeline::run(action),
        Commands::Sync => commands::sync::run().await,
        Commands::Access { action } => commands::access::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
