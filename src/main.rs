mod cli;
mod config;
mod logging;
mod model;
mod providers;
mod server;
mod sync;

use anyhow::Result;

use cli::Command;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = cli::parse_args(&args)?;
    if command == Command::Help {
        cli::print_help();
        return Ok(());
    }

    let config = config::load_config()?;
    logging::init_logging(config.log_level.as_deref());

    match command {
        Command::Serve => server::serve(&config).await,
        Command::Once { pretty } => cli::run_once(&config, pretty).await,
        Command::Help => Ok(()),
    }
}
