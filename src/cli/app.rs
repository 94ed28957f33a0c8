// ABOUTME: Main application orchestration for the kompoze CLI
// ABOUTME: Coordinates between CLI arguments, configuration, logging, and rendering

use anyhow::Result;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use super::commands;
use super::{Args, Config};
use crate::engine::RunSummary;

pub struct App {
    config: Config,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Initialize logging based on configuration; logs go to stderr so stdout stays clean
    pub fn init_logging(&self, debug: bool, no_color: bool) -> Result<()> {
        let log_level = if debug {
            "debug"
        } else {
            &self.config.logging.level
        };

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        match self.config.logging.format.as_str() {
            "compact" => {
                tracing_subscriber::fmt()
                    .compact()
                    .with_env_filter(env_filter)
                    .with_writer(std::io::stderr)
                    .with_ansi(!no_color)
                    .with_target(false)
                    .init();
            }
            _ => {
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_writer(std::io::stderr)
                    .with_ansi(!no_color)
                    .with_target(false)
                    .init();
            }
        }

        debug!("Logging initialized with level: {}", log_level);
        Ok(())
    }

    /// Run the application with parsed arguments
    pub async fn run(&mut self, args: Args) -> Result<RunSummary> {
        self.init_logging(args.debug, args.no_color)?;

        info!("Starting kompoze v{}", env!("CARGO_PKG_VERSION"));
        debug!("Configuration loaded from: {:?}", args.config);

        let settings = commands::build_settings(&args, &self.config)?;
        let max_concurrent = args
            .max_concurrent
            .unwrap_or(self.config.max_concurrent_definitions);
        let fail_fast = self.config.fail_fast && !args.keep_going;

        commands::render_definitions(args.definitions, settings, max_concurrent, fail_fast).await
    }

    /// Create application from command line arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let config = Config::load(args.config.clone())?;
        Ok(Self::new(config))
    }
}
