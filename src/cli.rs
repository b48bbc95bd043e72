use anyhow::{bail, Result};

use crate::config::AppConfig;
use crate::server::AppState;

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Serve,
    Once { pretty: bool },
    Help,
}

/// Parse command line arguments (without the program name).
///
/// Supported forms:
///   trello-sync
///   trello-sync serve
///   trello-sync once [--pretty]
///   trello-sync help
pub fn parse_args(args: &[String]) -> Result<Command> {
    let Some(first) = args.first() else {
        return Ok(Command::Serve);
    };

    match first.as_str() {
        "serve" => {
            if let Some(extra) = args.get(1) {
                bail!("Unexpected argument for serve: {extra}");
            }
            Ok(Command::Serve)
        }
        "once" => {
            let mut pretty = false;
            for arg in &args[1..] {
                match arg.as_str() {
                    "-p" | "--pretty" => pretty = true,
                    other => bail!("Unknown option for once: {other}"),
                }
            }
            Ok(Command::Once { pretty })
        }
        "help" | "-h" | "--help" => Ok(Command::Help),
        other => bail!("Unknown command: {other}\n\nRun `trello-sync help` for usage."),
    }
}

/// Run a single sync pass and print the payload `/sync` would return.
pub async fn run_once(config: &AppConfig, pretty: bool) -> Result<()> {
    let state = AppState::from_config(config)?;
    let report = state.sync().await?;
    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}

pub fn print_help() {
    println!("trello-sync — flatten Trello boards into task records\n");
    println!("USAGE:");
    println!("  trello-sync              Start the HTTP server (same as `serve`)");
    println!("  trello-sync serve        Start the HTTP server");
    println!("  trello-sync once         Run one sync and print the JSON payload");
    println!();
    println!("ONCE OPTIONS:");
    println!("  -p, --pretty  Pretty-print the JSON output");
    println!();
    println!("ENVIRONMENT:");
    println!("  TRELLO_API_KEY, TRELLO_TOKEN   Trello credentials (required for sync)");
    println!("  BIND_ADDRESS, PORT             Server address (default 0.0.0.0:5000)");
    println!("  TRELLO_SYNC_EMIT_BARE_CARDS    Emit cards that have no checklist items");
    println!("  RUST_LOG                       Log filter (default info)");
}
