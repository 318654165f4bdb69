/// PodCue - headless podcast player
use clap::{Parser, Subcommand};
use podcue_cli::{commands, PodcueConfig, SessionOptions};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "podcue")]
#[command(about = "PodCue headless podcast player", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./podcue.toml when present)
    #[arg(short, long, global = true, env = "PODCUE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an episode on the simulated engine and print the session
    Session {
        /// Episode descriptor (JSON)
        episode: PathBuf,
        /// Seconds to listen before and after seeking
        #[arg(short, long, default_value_t = 3.0)]
        listen: f64,
        /// Seek to this position after the first listen
        #[arg(short, long)]
        seek: Option<f64>,
        /// Playback rate
        #[arg(short, long)]
        rate: Option<f64>,
    },
    /// Show the section and nearby bookmarks at a position
    Locate {
        /// Episode descriptor (JSON)
        episode: PathBuf,
        /// Position in seconds
        position: f64,
    },
    /// Extract the colour palette of an artwork URL
    Palette {
        /// Artwork URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "podcue_cli=info,podcue_playback=info,podcue_theme=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = PodcueConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Session {
            episode,
            listen,
            seek,
            rate,
        } => {
            let listen = Duration::try_from_secs_f64(listen)
                .map_err(|e| anyhow::anyhow!("Invalid listen duration {listen}: {e}"))?;
            let episode = commands::load_episode(&episode)?;
            let options = SessionOptions { listen, seek, rate };

            let summary = commands::run_session(&config, episode, &options).await?;
            print!("{summary}");
        }
        Commands::Locate { episode, position } => {
            let episode = commands::load_episode(&episode)?;
            print!("{}", commands::run_locate(&config, &episode, position));
        }
        Commands::Palette { url } => {
            let report = commands::run_palette(&config, &url).await?;
            print!("{report}");
        }
    }

    Ok(())
}
