//! Configuration and CLI argument handling

use std::time::Duration;

use anyhow::ensure;
use clap::Parser;

use crate::flow::FlowConfig;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "step-flow")]
#[command(about = "A timed step-progression controller with an HTTP control surface")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20553")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Number of steps to cycle through
    #[arg(short, long, default_value = "3")]
    pub steps: usize,

    /// Delay between automatic advances in milliseconds
    #[arg(short, long, default_value = "2000")]
    pub delay: u64,

    /// Wrap to the first step after the last one
    #[arg(long = "loop")]
    pub looping: bool,

    /// Stay paused until POST /resume
    #[arg(long)]
    pub no_auto_start: bool,

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

    /// Build the controller configuration, rejecting an empty flow or a zero delay
    pub fn flow_config(&self) -> anyhow::Result<FlowConfig> {
        ensure!(self.steps > 0, "--steps must be at least 1");
        ensure!(self.delay > 0, "--delay must be at least 1ms");

        Ok(FlowConfig::new(self.steps)
            .delay(Duration::from_millis(self.delay))
            .auto_start(!self.no_auto_start)
            .looping(self.looping))
    }
}
