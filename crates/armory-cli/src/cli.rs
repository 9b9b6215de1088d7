use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "armory",
    about = "Armory: vehicle and nation reference data over HTTP",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Load every data document and report what failed
    Check(CheckArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML config file; values are overridden by environment and flags
    #[arg(short, long, env = "ARMORY_CONFIG")]
    pub config: Option<PathBuf>,
    /// Listen address (IP)
    #[arg(long)]
    pub host: Option<String>,
    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,
    /// Directory holding nations.json and the category documents
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Directory served for non-API paths
    #[arg(long)]
    pub public_dir: Option<PathBuf>,
    /// Expose internal error details in responses
    #[arg(long)]
    pub dev: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,
}
