//! Liuren plugin entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use liuren_plugin::config::PluginConfig;
use liuren_plugin::transport::StdioTransport;
use liuren_plugin::types::{Envelope, PluginEvent};

#[derive(Parser)]
#[command(
    name = "liuren",
    about = "Six Ren (六壬) boards — cast a board from a seed and a time",
    version
)]
struct Cli {
    /// Renderer base URL (also LIUREN_BASE_URL).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Render wait bound in milliseconds (also LIUREN_RENDER_TIMEOUT_MS).
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Chromium executable (also LIUREN_CHROMIUM_PATH).
    #[arg(long, global = true)]
    chromium_path: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve plugin events over stdio, one JSON object per line (default).
    Serve,

    /// Cast one board and print the response envelope.
    Divine {
        /// Seed number.
        seed: String,
        /// HH:MM or YYYY-MM-DD-HH:MM.
        time: String,
    },

    /// Print the renderer URL for a seed and time without fetching it.
    Url {
        seed: String,
        time: String,
    },

    /// Parse a saved rendered page and print the response envelope.
    Parse {
        /// Path to the HTML file.
        file: String,
        /// Source URL to record in the result.
        #[arg(long, default_value = "")]
        url: String,
    },

    /// Launch interactive REPL mode.
    Repl,

    /// Check that a browser is available and show the effective settings.
    Doctor,

    /// Generate shell completion scripts.
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

    let config = PluginConfig::resolve(
        cli.base_url.as_deref(),
        cli.timeout_ms,
        cli.chromium_path.as_deref(),
    );

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            tracing::info!("Liuren plugin (stdio)");
            tracing::info!("Renderer: {}", config.base_url);
            let transport = StdioTransport::new(config.chromium_handler());
            transport.run().await?;
        }

        Commands::Divine { seed, time } => {
            let handler = config.chromium_handler();
            let envelope = handler
                .handle_event(&PluginEvent::new(format!("{seed} {time}")))
                .await;
            print_envelope(&envelope)?;
            if !envelope.is_success() {
                std::process::exit(1);
            }
        }

        Commands::Url { seed, time } => {
            let handler = config.chromium_handler();
            match handler.board_url(&seed, &time) {
                Ok(url) => println!("{url}"),
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            }
        }

        Commands::Parse { file, url } => {
            let html = tokio::fs::read_to_string(&file).await?;
            let envelope = match liuren_board::parse(&html, &url) {
                Ok(board) => Envelope::success(&board),
                Err(e) => Envelope::from_error(&e.into()),
            };
            print_envelope(&envelope)?;
            if !envelope.is_success() {
                std::process::exit(1);
            }
        }

        Commands::Repl => {
            let handler = config.chromium_handler();
            liuren_plugin::repl::run(&handler).await?;
        }

        Commands::Doctor => doctor(&config),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "liuren", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn print_envelope(envelope: &Envelope) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(envelope)?);
    Ok(())
}

fn doctor(config: &PluginConfig) {
    println!("Liuren Doctor");
    println!("=============");
    println!();
    println!("OS:   {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
    println!();

    let chromium = config.chromium_path.as_ref().filter(|p| p.exists());
    match chromium {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!("[!!] Chromium NOT found. Install Chrome or set LIUREN_CHROMIUM_PATH."),
    }
    println!("[--] Renderer:       {}", config.base_url);
    println!("[--] Render timeout: {}ms", config.render_timeout_ms);

    println!();
    if chromium.is_some() {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }
}
