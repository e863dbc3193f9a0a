use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use paylens_client::{AnalysisClient, RelayConfig};
use paylens_core::viewmodel::ResultsView;
use paylens_core::{directory, Session};
use paylens_ingest::{normalize_dropped_path, InputSource, UploadCandidate};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod state;
mod tui;
mod worker;

pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PAYLENS_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "paylens", version = VERSION, about = "UPI statement analyzer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload one statement PDF and print the analysis
    Analyze {
        /// Statement PDF
        file: PathBuf,

        /// Analysis endpoint (default: [client].endpoint, the local relay)
        #[arg(long)]
        endpoint: Option<String>,

        /// Print the derived results view as JSON
        #[arg(long)]
        json: bool,

        /// Treat FILE as dropped text (quoted, file:// or escaped spaces)
        #[arg(long)]
        drop: bool,
    },

    /// Interactive terminal UI
    Tui {
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Serve POST /api/analyze-statement and forward uploads to the backend
    Relay {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        /// Backend base URL (overrides PAYLENS_API_URL and [backend].base_url)
        #[arg(long)]
        backend_url: Option<String>,
    },

    /// Manage ~/.paylens/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Favorite UPI apps and banks
    Favorites {
        #[command(subcommand)]
        command: FavoritesCommand,
    },

    /// Search supported UPI apps and banks
    Search { query: String },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum FavoritesCommand {
    /// Add or remove a source by name
    Toggle { name: String },
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = match cli.command {
        Command::Tui { .. } => Some(state::log_path()?),
        _ => None,
    };
    init_logging(log_file.as_deref())?;

    match cli.command {
        Command::Analyze {
            file,
            endpoint,
            json,
            drop,
        } => {
            let cfg = config::load_config()?;
            let client = build_client(endpoint, &cfg)?;
            analyze(&client, &file, json, drop).await?;
        }

        Command::Tui { endpoint } => {
            let cfg = config::load_config()?;
            let client = build_client(endpoint, &cfg)?;
            let settings = tui::TuiSettings {
                endpoint: client.endpoint().to_string(),
                favorites_path: state::favorites_path()?,
                log_path: log_file,
            };
            tui::run_tui(client, settings).await?;
        }

        Command::Relay {
            host,
            port,
            backend_url,
        } => {
            let cfg = config::load_config()?;
            let backend = match backend_url {
                Some(url) => url,
                None => config::resolve_backend_url(std::env::var(config::API_URL_ENV).ok(), &cfg)?,
            };

            let mut relay = RelayConfig::new(backend);
            relay.host = host.unwrap_or(cfg.relay.host);
            relay.port = port.unwrap_or(cfg.relay.port);
            relay.max_upload_bytes = cfg.relay.max_upload_bytes;

            paylens_client::run_relay(relay).await.context("relay server")?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                println!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
                match config::resolve_backend_url(std::env::var(config::API_URL_ENV).ok(), &cfg) {
                    Ok(url) => println!("# effective backend: {url}"),
                    Err(e) => println!("# {e}"),
                }
            }
        },

        Command::Favorites { command } => {
            let path = state::favorites_path()?;
            let mut favs = state::read_favorites(&path)?;
            match command {
                FavoritesCommand::Toggle { name } => {
                    let Some(source) = directory::find(&name) else {
                        bail!("unknown source: {name} (try: paylens search {name})");
                    };
                    let now = favs.toggle(source.name);
                    state::write_favorites(&path, &favs)?;
                    println!("{} {}", if now { "Added" } else { "Removed" }, source.name);
                }
                FavoritesCommand::List => {
                    if favs.is_empty() {
                        println!("No favorites yet.");
                    }
                    for name in favs.iter() {
                        println!("★ {name}");
                    }
                }
            }
        }

        Command::Search { query } => {
            let favs = state::read_favorites(&state::favorites_path()?)?;
            let hits = directory::search(&query);
            if hits.is_empty() {
                println!("No matches for {query:?}");
            }
            for s in hits {
                let star = if favs.contains(s.name) { "★" } else { " " };
                let note = if s.analysis_supported { "  [analysis supported]" } else { "" };
                println!("{star} {:<22} {}{note}", s.name, s.description);
            }
        }
    }

    Ok(())
}

/// stderr for one-shot commands; the TUI owns the terminal, so it logs to a file.
fn init_logging(file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match file {
        Some(path) => {
            let f = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(f))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn build_client(endpoint: Option<String>, cfg: &config::Config) -> Result<AnalysisClient> {
    let endpoint = endpoint.unwrap_or_else(|| cfg.client.endpoint.clone());
    Ok(AnalysisClient::with_timeout(
        &endpoint,
        Duration::from_secs(cfg.client.timeout_secs),
    )?)
}

async fn analyze(client: &AnalysisClient, file: &Path, json: bool, drop: bool) -> Result<()> {
    let (source, path) = if drop {
        (InputSource::DragDrop, normalize_dropped_path(&file.to_string_lossy()))
    } else {
        (InputSource::FilePicker, file.to_path_buf())
    };

    let candidate = UploadCandidate::from_path(&path).with_context(|| format!("loading {}", path.display()))?;
    let file_name = candidate.file_name.clone();

    let mut session = Session::new();
    let result = match session.run(client, source, Some(candidate)).await {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(error = %e, "analysis did not complete");
            bail!("{}", e.user_message());
        }
    };

    let view = ResultsView::build(result);
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render::report(&file_name, &view));
    }
    Ok(())
}
