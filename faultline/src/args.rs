use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use faultline_core::ErrorStatus;

/// Faultline error renderer
#[derive(Debug, Parser)]
#[command(name = "faultline", about = "Render HTTP error responses the way faultline builds them")]
pub struct Args {
    /// Log filter directive
    #[arg(long, global = true, default_value = "warn", env = "RUST_LOG")]
    pub log_filter: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the response a fault would produce
    Render(RenderArgs),
    /// Print the class and reason phrase of a status code
    Classify {
        /// Status code (400-999)
        status: ErrorStatus,
    },
}

#[derive(Debug, ClapArgs)]
pub struct RenderArgs {
    /// Status code (400-999)
    #[arg(short, long, default_value = "500")]
    pub status: ErrorStatus,

    /// Error message
    #[arg(short, long)]
    pub message: Option<String>,

    /// JSON value attached as fault data
    #[arg(long)]
    pub data: Option<String>,

    /// Authentication scheme for 401/407; repeat to advertise several
    #[arg(long = "scheme")]
    pub schemes: Vec<String>,

    /// Challenge parameter as `name=value`
    #[arg(long = "param", value_parser = parse_param, requires = "schemes")]
    pub params: Vec<(String, String)>,

    /// Token68 challenge value
    #[arg(long, conflicts_with = "params", requires = "schemes")]
    pub token: Option<String>,

    /// Allowed method for 405; repeatable
    #[arg(long = "allow")]
    pub allow: Vec<String>,

    /// `Retry-After` in seconds for 429/503
    #[arg(long)]
    pub retry_after: Option<u64>,

    /// Show server error messages
    #[arg(long)]
    pub debug: bool,

    /// Path to a configuration file
    #[arg(short, long, env = "FAULTLINE_CONFIG")]
    pub config: Option<PathBuf>,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_owned(), value.to_owned()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected `name=value`, got {raw:?}"))
}
