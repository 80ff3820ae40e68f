//! ocr-bridge command-line interface.
//!
//! ```bash
//! # Serve on the default 127.0.0.1:5000 with English recognition on GPU
//! ocr-bridge serve
//!
//! # Custom bind address and CPU inference
//! ocr-bridge serve -H 0.0.0.0 -p 8080 --device cpu
//!
//! # Recognize a local file once and print JSON
//! ocr-bridge recognize receipt.png
//!
//! # Show the effective configuration
//! ocr-bridge config -c ocr-bridge.toml
//! ```

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ocr_bridge::{BridgeConfig, Device, api::OcrResponse};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ocr-bridge", version)]
#[command(about = "HTTP bridge for a PaddleOCR engine", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Recognize a local image file and print the result as JSON
    Recognize {
        /// Path to the image file
        image: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print the effective configuration as TOML
    Config {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// Configuration file (.toml, .yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Recognition language (e.g. en, ch, fr)
    #[arg(long)]
    lang: Option<String>,

    /// Execution device: cpu, gpu or gpu:N
    #[arg(long)]
    device: Option<Device>,
}

impl ConfigArgs {
    /// File (explicit or discovered) -> env overrides -> flags.
    fn load(&self) -> Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => match BridgeConfig::discover()? {
                Some(config) => {
                    tracing::info!("Loaded config from discovered ocr-bridge.toml");
                    config
                }
                None => {
                    tracing::debug!("No config file found, using defaults");
                    BridgeConfig::default()
                }
            },
        };

        config.apply_env_overrides();

        if let Some(lang) = &self.lang {
            config.engine.language = lang.clone();
        }
        if let Some(device) = self.device {
            config.engine.device = device;
        }

        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Serve { host, port, config } => {
            let mut config = config.load()?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            // Build the engine before the runtime exists so nothing is served
            // unless construction succeeded.
            let engine = ocr_bridge::build_engine(&config.engine).context("Failed to initialize OCR engine")?;

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?;

            runtime.block_on(ocr_bridge::api::serve(&config, engine))?;
        }
        Commands::Recognize { image, config } => {
            let config = config.load()?;
            config.validate()?;

            let bytes = std::fs::read(&image).with_context(|| format!("Failed to read {}", image.display()))?;
            let engine = ocr_bridge::build_engine(&config.engine).context("Failed to initialize OCR engine")?;

            let start = Instant::now();
            let lines = ocr_bridge::recognize_bytes(engine.as_ref(), &bytes)
                .with_context(|| format!("OCR failed for {}", image.display()))?;

            let response = OcrResponse {
                success: true,
                lines,
                processing_time: (start.elapsed().as_secs_f64() * 100_000.0).round() / 100.0,
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Config { config } => {
            let config = config.load()?;
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
