//! Hide and seek match host using async actor model.
//!
//! This server spawns a single MatchActor, logs every match event and can
//! drive it with synthetic participants for demonstration.

mod config;
mod demo;
mod logging;

use std::{path::PathBuf, sync::Arc};

use anyhow::Error;
use ctrlc::set_handler;
use hide_seek::{
    EventSink, LogSink, MatchActor,
    session::SharedSettings,
};
use log::info;
use pico_args::Arguments;
use tokio::sync::mpsc;

use config::{CliOverrides, ServerConfig};

const HELP: &str = "\
Run a hide and seek match host

USAGE:
  hs_server [OPTIONS]

OPTIONS:
  --config        PATH    JSON match config file     [default: env HNS_CONFIG_FILE]
  --seed          N       Seed for team assignment   [default: env HNS_SEED or random]
  --demo-players  N       Synthetic participants     [default: 0, demo disabled]
  --demo-rounds   N       Matches for the demo       [default: 1]

FLAGS:
  -h, --help              Print help information

ENVIRONMENT:
  HNS_COUNTDOWN_SECS      Countdown before roles are assigned
  HNS_HIDE_SECS           Hiding phase length
  HNS_SEEK_SECS           Seeking phase length
  HNS_GRACE_SECS          Pause after a result before the next match
  HNS_MIN_PLAYERS         Participants needed to start
  HNS_MIN_HIDERS          Lower bound on hiders
  HNS_MAX_HIDERS          Upper bound on hiders
  HNS_SEED                Seed for team assignment
  HNS_CONFIG_FILE         JSON match config file, overridden by the variables above
  HNS_DEMO_PLAYERS        Synthetic participants for the demo
  HNS_DEMO_ROUNDS         Matches for the demo
  RUST_LOG                Log filter (e.g., hide_seek=debug)
  Variables may also be set in a .env file in the working directory.
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = CliOverrides {
        config_file: pargs.opt_value_from_os_str("--config", |s| {
            Ok::<_, std::convert::Infallible>(PathBuf::from(s))
        })?,
        seed: pargs.opt_value_from_str("--seed")?,
        demo_players: pargs.opt_value_from_str("--demo-players")?,
        demo_rounds: pargs.opt_value_from_str("--demo-rounds")?,
    };

    logging::init();

    let config = ServerConfig::from_env(overrides)?;
    config.validate()?;
    if let Some(path) = &config.config_file {
        info!("Loaded match config from {}", path.display());
    }
    info!(
        "Phases: countdown {}s, hiding {}s, seeking {}s, grace {}s",
        config.game.countdown_secs,
        config.game.hide_secs,
        config.game.seek_secs,
        config.game.ending_grace_secs
    );

    // Catching signals for exit.
    let (stop_tx, mut stop_rx) = mpsc::unbounded_channel();
    set_handler(move || {
        let _ = stop_tx.send(());
    })?;

    let settings = SharedSettings::new(config.game.clone())?;
    let sinks: Vec<Box<dyn EventSink>> = vec![Box::new(LogSink)];
    let handle = MatchActor::spawn(Arc::new(settings), sinks);

    if config.demo.is_enabled() {
        info!(
            "Running demo: {} participants, {} rounds",
            config.demo.players, config.demo.rounds
        );

        tokio::select! {
            summary = demo::run(handle.clone(), config.demo.players, config.demo.rounds, config.game.seed) => {
                let summary = summary?;
                info!("Demo finished: {}", serde_json::to_string(&summary)?);
            }
            _ = stop_rx.recv() => {
                info!("Interrupted, stopping demo");
            }
        }
    } else {
        info!("Match host ready. Press Ctrl+C to stop.");
        stop_rx.recv().await;
    }

    info!("Shutting down match host...");
    let removed = handle.stop().await?;
    info!("Released {removed} participants");
    handle.shutdown().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::HELP;

    #[test]
    fn test_help_lists_every_variable() {
        for var in [
            "HNS_COUNTDOWN_SECS",
            "HNS_HIDE_SECS",
            "HNS_SEEK_SECS",
            "HNS_GRACE_SECS",
            "HNS_MIN_PLAYERS",
            "HNS_MIN_HIDERS",
            "HNS_MAX_HIDERS",
            "HNS_SEED",
            "HNS_CONFIG_FILE",
            "HNS_DEMO_PLAYERS",
            "HNS_DEMO_ROUNDS",
            "RUST_LOG",
        ] {
            assert!(HELP.contains(var), "{var} missing from help");
        }
    }
}
