//! Terminal runner for the Set game.
//!
//! Human key presses are read from stdin as `<player> <slot>` lines,
//! computer players run on their own. Display events go to the log or,
//! with `--json`, to stdout as JSON lines.

mod config;
mod display;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Error;
use ctrlc::set_handler;
use log::{info, warn};
use pico_args::Arguments;
use set_game::{
    Game, PlayerHandle, PlayerId, Slot,
    ui::{GameUi, LogUi},
};

use config::{Overrides, RunnerConfig};
use display::JsonUi;

const HELP: &str = "\
Play a game of Set in the terminal

USAGE:
  set_runner [OPTIONS]

OPTIONS:
  --humans     N           Number of human players     [default: env SET_HUMANS or 2]
  --computers  N           Number of computer players  [default: env SET_COMPUTERS or 0]
  --timeout    MS          Turn timeout in milliseconds [default: env SET_TURN_TIMEOUT_MILLIS or 60000]
  --config     FILE        JSON game configuration     [default: env SET_CONFIG]

FLAGS:
  --json                   Print display events as JSON lines
  -h, --help               Print help information

INPUT:
  One key press per line on stdin: <player> <slot>

ENVIRONMENT:
  SET_DECK_SIZE, SET_TABLE_SIZE, SET_POINT_FREEZE_MILLIS,
  SET_PENALTY_FREEZE_MILLIS, SET_HINTS, SET_JSON
  (A .env file in the working directory is loaded first)
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

    let overrides = Overrides {
        humans: pargs.opt_value_from_str("--humans")?,
        computers: pargs.opt_value_from_str("--computers")?,
        timeout_millis: pargs.opt_value_from_str("--timeout")?,
        config_file: pargs.opt_value_from_str::<_, PathBuf>("--config")?,
        json: pargs.contains("--json"),
    };

    env_logger::builder().format_target(false).init();

    let config = RunnerConfig::from_env(overrides)?;
    let (ui, display) = if config.json {
        let (ui, writer) = JsonUi::stdout();
        (Arc::new(ui) as Arc<dyn GameUi>, Some(writer))
    } else {
        (Arc::new(LogUi) as Arc<dyn GameUi>, None)
    };

    let game = Game::with_classic_rules(config.game.clone(), ui)?;

    // Catching signals for a clean end of game.
    let cancel = game.cancel_token();
    set_handler(move || cancel.cancel())?;

    let humans: Vec<PlayerHandle> = game
        .players()
        .iter()
        .filter(|player| player.is_human())
        .cloned()
        .collect();
    if !humans.is_empty() {
        std::thread::spawn(move || read_key_presses(&humans));
    }

    info!(
        "Starting game with {} human and {} computer players",
        config.game.human_players, config.game.computer_players
    );
    let outcome = game.run().await?;
    if let Some(writer) = display
        && writer.join().is_err()
    {
        warn!("Display writer panicked");
    }

    for (player, score) in outcome.scores.iter().enumerate() {
        info!("player {player}: {score} point(s)");
    }
    match outcome.winners.as_slice() {
        [winner] => println!("Player {winner} wins"),
        winners => println!("Tie between players {winners:?}"),
    }

    Ok(())
}

/// Route stdin lines to human players until stdin closes.
fn read_key_presses(humans: &[PlayerHandle]) {
    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else {
            break;
        };
        let Some((player, slot)) = parse_key_press(&line) else {
            warn!("Ignoring input {line:?}, expected <player> <slot>");
            continue;
        };
        match humans.iter().find(|handle| handle.id() == player) {
            Some(handle) => {
                handle.key_pressed(slot);
            }
            None => warn!("Player {player} is not a human player"),
        }
    }
}

fn parse_key_press(line: &str) -> Option<(PlayerId, Slot)> {
    let mut parts = line.split_whitespace();
    let player = parts.next()?.parse().ok()?;
    let slot = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some((player, slot))
}
