//! formscope: extract form metadata from Google Forms and SurveyMonkey.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use formscope::FormExtractor;
use formscope_cli::commands;
use formscope_cli::options::ConfigOverrides;

#[derive(Parser)]
#[command(
    name = "formscope",
    about = "Extract title, description, question count and submit URL from online forms",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Static fetch timeout in seconds.
    #[arg(long, global = true)]
    static_timeout: Option<u64>,

    /// Rendered fetch navigation timeout in seconds.
    #[arg(long, global = true)]
    render_timeout: Option<u64>,

    /// Delay after network idle before capturing markup, in milliseconds.
    #[arg(long, global = true)]
    settle_ms: Option<u64>,

    /// Path to a Chrome/Chromium binary.
    #[arg(long, global = true)]
    chromium: Option<PathBuf>,

    /// Never launch a browser; pages needing rendering fail.
    #[arg(long, global = true)]
    no_render: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract form metadata from a URL.
    Extract {
        /// Form URL.
        url: String,

        /// Print the JSON envelope instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Serve POST /get_form_info over HTTP.
    Serve {
        /// Listen address (host:port).
        #[arg(long, default_value = "127.0.0.1:5000")]
        addr: String,
    },

    /// Show effective configuration and browser availability.
    Doctor,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   formscope completions bash > ~/.local/share/bash-completion/completions/formscope
    ///   formscope completions zsh > ~/.zfunc/_formscope
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ConfigOverrides {
        static_timeout_secs: cli.static_timeout,
        render_timeout_secs: cli.render_timeout,
        settle_delay_ms: cli.settle_ms,
        chromium_path: cli.chromium,
        no_render: cli.no_render,
    }
    .resolve();

    match cli.command {
        Commands::Extract { url, json } => {
            let extractor = FormExtractor::from_config(&config)?;
            if !commands::extract::run(&extractor, &url, json).await? {
                std::process::exit(1);
            }
        }

        Commands::Serve { addr } => {
            let extractor = FormExtractor::from_config(&config)?;
            tracing::info!(
                render = config.render_enabled,
                static_timeout = config.static_timeout_secs,
                "starting formscope server"
            );
            formscope_cli::server::serve(&addr, extractor).await?;
        }

        Commands::Doctor => {
            commands::doctor::run(&config)?;
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "formscope", &mut std::io::stdout());
        }
    }

    Ok(())
}
