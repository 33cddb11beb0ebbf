//! Annygate - analytics API gateway.

mod cli;

use anyhow::Result;
use clap::Parser;

use annygate::config::Config;
use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    annygate::logging::init(cli.json_logs);

    match cli.command {
        Command::Serve { port, bind } => {
            let config = Config::load(cli.config.as_deref())?;
            cli::serve::cmd_serve(config, port, bind).await
        }
        Command::Key { api, params } => cli::key::cmd_key(&api, &params),
    }
}
