//! Command-line front end.
//!
//! Reads SAN notation (from `--notation` or stdin), replays it, optionally
//! lets two computer players continue for `--autoplay` plies and prints the
//! resulting notation, FEN and status.

use std::io::{self, IsTerminal};
use std::time::Duration;

use tracing::{info, warn, Level};

use chess_core::game_state::game_state::GameState;
use chess_core::game_state::game_status::{GameConfig, GameStatus, Player};
use chess_core::notation::san_decode::decode_from;
use chess_core::notation::san_encode::encode;
use chess_core::search::threading::{SearchConfig, ThreadedSearchScheduler};

const PROPOSAL_TIMEOUT: Duration = Duration::from_secs(10);

const USAGE: &str = "usage: chess_core [--notation <san>] [--fen <fen>] [--autoplay <plies>] \
                     [--seed <n>] [--json] [--verbose]";

#[derive(Debug, Default)]
struct CliOptions {
    notation: Option<String>,
    fen: Option<String>,
    autoplay: usize,
    seed: Option<u64>,
    json: bool,
    verbose: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| args.next().ok_or_else(|| format!("{flag} needs a value\n{USAGE}"));
        match arg.as_str() {
            "--notation" => options.notation = Some(value("--notation")?),
            "--fen" => options.fen = Some(value("--fen")?),
            "--autoplay" => {
                let raw = value("--autoplay")?;
                options.autoplay = raw.parse().map_err(|_| format!("invalid ply count: {raw}"))?;
            }
            "--seed" => {
                let raw = value("--seed")?;
                options.seed = Some(raw.parse().map_err(|_| format!("invalid seed: {raw}"))?);
            }
            "--json" => options.json = true,
            "--verbose" | "-v" => options.verbose = true,
            "--help" | "-h" => return Err(USAGE.to_owned()),
            other => return Err(format!("unknown argument: {other}\n{USAGE}")),
        }
    }
    Ok(options)
}

fn init_tracing(json: bool, verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_notation(options: &CliOptions) -> Result<String, String> {
    if let Some(notation) = &options.notation {
        return Ok(notation.clone());
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }
    io::read_to_string(stdin).map_err(|err| format!("failed to read stdin: {err}"))
}

fn autoplay(game: &mut GameState, plies: usize, seed: Option<u64>) -> Result<(), String> {
    let (scheduler, proposals) = ThreadedSearchScheduler::random(SearchConfig {
        time_budget_ms: Some(1_000),
        seed,
    });
    game.set_search_scheduler(Box::new(scheduler));
    game.start();
    if !game.has_pending_search() {
        game.request_search();
    }

    let mut played = 0;
    while played < plies && game.status() == GameStatus::Running {
        let proposal = proposals
            .recv_timeout(PROPOSAL_TIMEOUT)
            .map_err(|err| format!("no search result: {err}"))?;
        match game.apply_search_proposal(proposal) {
            Ok(_) => played += 1,
            Err(err) => warn!(%err, "search proposal skipped"),
        }
    }
    info!(played, "autoplay finished");
    Ok(())
}

fn main() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1))?;
    init_tracing(options.json, options.verbose);

    let config = if options.autoplay > 0 {
        GameConfig {
            white: Player::computer("Random White"),
            black: Player::computer("Random Black"),
            ..GameConfig::default()
        }
    } else {
        GameConfig::default()
    };
    let start = match &options.fen {
        Some(fen) => GameState::from_fen_with_config(fen, config).map_err(|err| err.to_string())?,
        None => GameState::with_config(config),
    };

    let notation = read_notation(&options)?;
    let mut game = decode_from(start, &notation).map_err(|err| err.to_string())?;

    if options.autoplay > 0 && !game.status().is_finished() {
        autoplay(&mut game, options.autoplay, options.seed)?;
    }

    println!("{}", encode(&game));
    println!("fen: {}", game.to_fen());
    println!("status: {:?}", game.status());
    println!("elapsed: {} ms", game.elapsed().num_milliseconds());
    Ok(())
}
