//! Clue-Less game server binary.
//!
//! Binds a TCP listener and runs a single game session behind an
//! async actor.

mod config;

use anyhow::Error;
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;

use config::ServerConfig;

const HELP: &str = "\
Run a Clue-Less game server

USAGE:
  cl_server [OPTIONS]

OPTIONS:
  --bind              IP:PORT  Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:7878]
  --disprove-timeout  SECONDS  Seconds an offered player gets to pick a card to show
                               before their offer is skipped  [default: env DISPROVE_TIMEOUT_SECS or no timeout]

FLAGS:
  -h, --help                   Print help information

ENVIRONMENT:
  SERVER_BIND                  Server bind address (e.g., 0.0.0.0:7878)
  DISPROVE_TIMEOUT_SECS        Disprove offer timeout in seconds
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists.
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override = pargs.opt_value_from_str("--bind")?;
    let timeout_override = pargs.opt_value_from_str("--disprove-timeout")?;

    let config = ServerConfig::from_env(bind_override, timeout_override)?;
    config.validate()?;

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();
    info!("Starting Clue-Less server at {}", config.bind);

    clueless::server::run(&config.bind.to_string(), config.session).await?;

    Ok(())
}
