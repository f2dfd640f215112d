use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sharefile::Config;

mod files_cmd;
mod page_cmd;

#[derive(Parser)]
#[command(name = "sharefile", version, about = "Upload files and share them by link or QR code")]
struct Cli {
    /// Backend API base (default from ~/.sharefile/config.toml or http://localhost:8080/api)
    #[arg(long, global = true)]
    api: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List uploaded files
    #[command(name = "list")]
    List,

    /// Upload one or more files, one after another
    #[command(name = "upload")]
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Days until the files expire (default from config or 7)
        #[arg(long)]
        expiry_days: Option<u32>,
    },

    /// Delete a file from the server
    #[command(name = "delete")]
    Delete {
        id: String,
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show one file's details
    #[command(name = "info")]
    Info { id: String },

    /// Download a file
    #[command(name = "download")]
    Download {
        id: String,
        /// Directory to save into (default: current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the share link for a file id or backend share URL
    #[command(name = "link")]
    Link {
        reference: String,
        /// Also copy it to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Print a QR code for a file's share link
    #[command(name = "qr")]
    Qr {
        id: String,
        /// Write an SVG image instead of printing to the terminal
        #[arg(long)]
        svg: Option<PathBuf>,
    },

    /// Open a page URL (e.g. a share link) and browse it interactively
    #[command(name = "open")]
    Open {
        /// Page URL (default: configured page_url)
        url: Option<String>,
    },

    /// Write the view a page URL selects as an HTML file
    #[command(name = "render")]
    Render {
        url: Option<String>,
        #[arg(long)]
        out: PathBuf,
    },

    /// Ask the server to purge expired files
    #[command(name = "cleanup")]
    Cleanup,

    /// View or modify config (~/.sharefile/config.toml)
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current config
    Show,
    /// Set a config value
    Set {
        /// Key to set (api_base_url, page_url, share_hash_prefix, default_expiry_days, log_level, request_timeout_secs)
        key: String,
        /// Value to set
        value: String,
    },
    /// Reset config to defaults
    Reset,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load().unwrap_or_default();
    init_tracing(&config);
    if let Some(api) = cli.api {
        config.api_base_url = api.trim_end_matches('/').to_string();
    }

    match cli.command {
        None => page_cmd::open(&config, None)?,
        Some(Commands::List) => files_cmd::list(&config)?,
        Some(Commands::Upload { paths, expiry_days }) => {
            files_cmd::upload(&config, &paths, expiry_days.unwrap_or(config.default_expiry_days))?
        }
        Some(Commands::Delete { id, yes }) => files_cmd::delete(&config, &id, yes)?,
        Some(Commands::Info { id }) => files_cmd::info(&config, &id)?,
        Some(Commands::Download { id, out }) => files_cmd::download(&config, &id, out)?,
        Some(Commands::Link { reference, copy }) => files_cmd::link(&config, &reference, copy)?,
        Some(Commands::Qr { id, svg }) => files_cmd::qr(&config, &id, svg)?,
        Some(Commands::Open { url }) => page_cmd::open(&config, url.as_deref())?,
        Some(Commands::Render { url, out }) => page_cmd::render(&config, url.as_deref(), &out)?,
        Some(Commands::Cleanup) => files_cmd::cleanup(&config)?,
        Some(Commands::Config { action }) => handle_config(action)?,
    }
    Ok(())
}

fn handle_config(action: Option<ConfigAction>) -> Result<()> {
    match action {
        None | Some(ConfigAction::Show) => {
            let config = Config::load().unwrap_or_default();
            println!("api_base_url = \"{}\"", config.api_base_url);
            println!("page_url = \"{}\"", config.page_url);
            println!("share_hash_prefix = \"{}\"", config.share_hash_prefix);
            println!("default_expiry_days = {}", config.default_expiry_days);
            println!("log_level = \"{}\"", config.log_level);
            println!("request_timeout_secs = {}", config.request_timeout_secs);
        }
        Some(ConfigAction::Set { key, value }) => {
            let mut config = Config::load().unwrap_or_default();
            config.set(&key, &value)?;
            let path = config.save()?;
            println!("saved to {}", path.display());
        }
        Some(ConfigAction::Reset) => {
            let config = Config::default();
            let path = config.save()?;
            println!("reset to defaults at {}", path.display());
        }
    }
    Ok(())
}
