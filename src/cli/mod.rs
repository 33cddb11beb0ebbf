//! Command-line interface for the `annygate` binary.

pub(crate) mod key;
pub(crate) mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "annygate", version, about = "Analytics API gateway with a shared query cache")]
pub(crate) struct Cli {
    /// JSON config file (environment variables override it)
    #[arg(long, global = true, env = "ANNY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Start the REST server
    Serve {
        /// Override the listen port
        #[arg(long)]
        port: Option<u16>,
        /// Override the bind address
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print the cache fingerprint for an API name and JSON parameters
    Key {
        /// Logical API name, e.g. `ga4_top_pages`
        api: String,
        /// Parameters as a JSON object
        #[arg(default_value = "{}")]
        params: String,
    },
}
