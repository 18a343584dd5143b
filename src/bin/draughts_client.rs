//! Line-driven terminal client.
//!
//! Connects to a relay and plays one seat. Commands are read from stdin:
//!
//! ```text
//! join <lobby>      take a seat
//! <row> <col>       tap a square (select, then tap a highlighted target)
//! rematch           ask for a rematch
//! yes | no          answer the last rematch prompt
//! leave | quit
//! ```

use std::io::BufRead;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use draughts::core::Board;
use draughts::engine::TapOutcome;
use draughts::sync::{ClientConfig, ClientEvent, MatchClient, RelayLink, SessionContext};
use draughts::types::{Player, Pos, Rank, BOARD_SIZE};

const TICK_MS: u64 = 16;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let identity = std::env::args().nth(1).unwrap_or_else(|| "player".to_string());
    let config = ClientConfig::from_env();
    let mut link = RelayLink::connect(config.socket_addr()?)?;
    let mut client = MatchClient::new(SessionContext::new(identity), &config);

    let (line_tx, line_rx) = mpsc::channel::<String>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines().map_while(Result::ok) {
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    println!("connected; type `join <lobby>`");
    let mut last_prompt: Option<String> = None;
    let mut last_tick = Instant::now();

    loop {
        while let Ok(line) = line_rx.try_recv() {
            if !run_command(&mut client, line.trim(), &mut last_prompt) {
                link.flush_from(&mut client)?;
                return Ok(());
            }
        }

        while let Some(event) = link.try_recv() {
            for ev in client.handle(event) {
                report(&client, &ev, &mut last_prompt);
            }
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= Duration::from_millis(TICK_MS) {
            last_tick = Instant::now();
            if let Some(ev) = client.tick(elapsed.as_millis() as u32) {
                report(&client, &ev, &mut last_prompt);
            }
        }

        link.flush_from(&mut client)?;
        std::thread::sleep(Duration::from_millis(TICK_MS / 4));
    }
}

/// Returns false to quit
fn run_command(client: &mut MatchClient, cmd: &str, last_prompt: &mut Option<String>) -> bool {
    let parts: Vec<&str> = cmd.split_whitespace().collect();
    let result = match parts.as_slice() {
        ["quit"] => {
            let _ = client.leave();
            return false;
        }
        ["join", lobby] => {
            client.join(lobby);
            Ok(())
        }
        ["leave"] => client.leave(),
        ["rematch"] => client.request_rematch(),
        [answer @ ("yes" | "no")] => match last_prompt.take() {
            Some(id) => client.answer_rematch(&id, *answer == "yes"),
            None => {
                println!("no rematch offer to answer");
                Ok(())
            }
        },
        [row, col] => match (row.parse::<u8>(), col.parse::<u8>()) {
            (Ok(r), Ok(c)) if r < BOARD_SIZE && c < BOARD_SIZE => client.tap(Pos::new(r, c)).map(|outcome| match outcome {
                TapOutcome::Selected { candidates, .. } => {
                    let targets: Vec<String> = candidates
                        .as_slice()
                        .iter()
                        .map(|m| format!("{} {}", m.target.row, m.target.col))
                        .collect();
                    println!("targets: [{}]", targets.join(", "));
                }
                TapOutcome::Committed(done) => {
                    println!("moved to {} {}", done.landing.row, done.landing.col);
                    print_board(client.state().board());
                }
                TapOutcome::Ignored => println!("not your turn"),
                TapOutcome::Cleared => {}
                TapOutcome::Rejected(e) => println!("rejected: {e}"),
            }),
            _ => {
                println!("squares are 0-7");
                Ok(())
            }
        },
        [] => Ok(()),
        _ => {
            println!("unknown command");
            Ok(())
        }
    };
    if let Err(e) = result {
        println!("warning: {e}");
    }
    true
}

fn report(client: &MatchClient, event: &ClientEvent, last_prompt: &mut Option<String>) {
    match event {
        ClientEvent::Joined { lobby_id, role } => {
            println!("joined {lobby_id} as player {}; waiting for opponent", role.number())
        }
        ClientEvent::GameStarted => {
            println!("game started");
            print_board(client.state().board());
        }
        ClientEvent::StateSynced { turn, winner } => {
            print_board(client.state().board());
            match winner {
                Some(w) => println!("game over, player {} wins", w.number()),
                None => println!("player {} to move", turn.number()),
            }
        }
        ClientEvent::RematchPrompt { id, from } => {
            println!("{from} offers a rematch; answer yes or no");
            *last_prompt = Some(id.clone());
        }
        ClientEvent::RematchStarted => {
            println!("rematch started");
            print_board(client.state().board());
        }
        ClientEvent::RematchDeclined => println!("rematch declined"),
        ClientEvent::RematchExpired => println!("no answer to the rematch request"),
        ClientEvent::OpponentLeft => println!("opponent left"),
        ClientEvent::LobbyLost => println!("lobby not found"),
        ClientEvent::Notice(msg) => println!("relay: {msg}"),
    }
}

fn print_board(board: &Board) {
    println!("   0 1 2 3 4 5 6 7");
    for row in 0..BOARD_SIZE {
        let cells: Vec<&str> = (0..BOARD_SIZE)
            .map(|col| match board.get(Pos::new(row, col)) {
                Some(p) => match (p.owner, p.rank) {
                    (Player::One, Rank::Man) => "w",
                    (Player::One, Rank::King) => "W",
                    (Player::Two, Rank::Man) => "b",
                    (Player::Two, Rank::King) => "B",
                },
                None if Pos::new(row, col).is_playable() => ".",
                None => " ",
            })
            .collect();
        println!("{row}  {}", cells.join(" "));
    }
}
