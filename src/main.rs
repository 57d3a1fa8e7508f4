use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use d2d_analysis::coordinates::Frame;

mod app;
mod config;

use app::App;
use config::Config;

#[derive(Parser, Debug)]
#[command(name = "d2d-analysis")]
#[command(about = "Arrival error analysis for debris-to-debris transfers")]
#[command(version)]
struct Cli {
    /// Configuration file, defaults to ~/.config/d2d-analysis/config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Express error vectors in the ECI or RTN frame
    Convert {
        /// JSON array of error samples
        input: PathBuf,

        /// Overrides the configured frame
        #[arg(short, long)]
        frame: Option<Frame>,

        /// Output file, defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Summarize error magnitudes and components
    Stats {
        /// JSON array of error samples
        input: PathBuf,

        /// Overrides the configured frame
        #[arg(short, long)]
        frame: Option<Frame>,

        /// Output file, defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Bin error magnitudes and components
    Histogram {
        /// JSON array of error samples
        input: PathBuf,

        /// Overrides the configured frame
        #[arg(short, long)]
        frame: Option<Frame>,

        /// Output file, defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare SGP4 predictions against reference arrival states
    Propagate {
        /// Two-line element set of the transfer object
        #[arg(long)]
        tle: PathBuf,

        /// JSON array of reference arrivals
        input: PathBuf,

        /// Output file, defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rank the best Lambert transfer of each object pair by delta-v
    TopList {
        /// JSON array of Lambert transfers
        input: PathBuf,

        /// Output file, defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Bin Lambert transfer delta-v
    DeltaV {
        /// JSON array of Lambert transfers
        input: PathBuf,

        /// Leaves out transfers at or above this delta-v [km/s]
        #[arg(long)]
        cutoff: Option<f64>,

        /// Output file, defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;
    tracing::debug!(?config, "loaded configuration");

    let app = App::with_config(config);
    match cli.command {
        Command::Convert {
            input,
            frame,
            output,
        } => app.convert(&input, frame, output.as_deref()),
        Command::Stats {
            input,
            frame,
            output,
        } => app.stats(&input, frame, output.as_deref()),
        Command::Histogram {
            input,
            frame,
            output,
        } => app.histogram(&input, frame, output.as_deref()),
        Command::Propagate { tle, input, output } => {
            app.propagate(&tle, &input, output.as_deref())
        }
        Command::TopList { input, output } => app.top_list(&input, output.as_deref()),
        Command::DeltaV {
            input,
            cutoff,
            output,
        } => app.delta_v(&input, cutoff, output.as_deref()),
    }
}

/// Loads the configuration from `path`, or from the default location.
///
/// A missing default file yields the default configuration.
fn load_config(path: Option<PathBuf>) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_file(&path);
    }

    match app::default_config_path() {
        Some(path) if path.exists() => Config::from_file(&path),
        _ => Ok(Config::default()),
    }
}
