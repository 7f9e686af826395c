//! Configuration and CLI argument handling

use clap::Parser;

use crate::interval::DEFAULT_DURATION;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "screen-awake")]
#[command(about = "A state-managed HTTP server that keeps a host awake with periodic pointer nudges")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20731")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Default nudge interval label (e.g. "30 sec", "5 min")
    #[arg(short, long, default_value = DEFAULT_DURATION)]
    pub interval: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
