//! UCI protocol front-end.
//!
//! Speaks the subset of UCI a GUI or match runner needs: `uci`, `isready`,
//! `ucinewgame`, `position`, `go` (time controls, movetime, depth,
//! infinite), `stop` and `quit`. The search runs synchronously inside
//! `go`; the stop flag is shared with the search config so an embedding
//! driver can cancel from another thread.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::board::{
    is_mate_score, Position, Search, SearchConfig, SearchInfo, MATE,
};
use crate::engine::time::allocate;
use crate::tt::TranspositionTable;

const ENGINE_NAME: &str = concat!("Ivory ", env!("CARGO_PKG_VERSION"));
const ENGINE_AUTHOR: &str = "the Ivory authors";

/// Transposition table size in megabytes
const TT_MB: usize = 128;
/// Stand-in budget for `go infinite` / `go depth N`
const NO_TIME_LIMIT: Duration = Duration::from_secs(3600);

pub struct UciEngine {
    pos: Position,
    /// Hashes of every position reached before the current one, oldest
    /// first. Handed to the search for three-fold detection.
    history: Vec<u64>,
    tt: TranspositionTable,
    stop: Arc<AtomicBool>,
}

impl Default for UciEngine {
    fn default() -> Self {
        UciEngine::new()
    }
}

impl UciEngine {
    #[must_use]
    pub fn new() -> Self {
        UciEngine {
            pos: Position::startpos(),
            history: Vec::new(),
            tt: TranspositionTable::new(TT_MB),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared stop flag; setting it interrupts a running search at its
    /// next node-count check.
    #[must_use]
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Handle one command line. Returns `false` when the engine should
    /// exit (on `quit`).
    pub fn handle_command(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = parts.first() else {
            return Ok(true);
        };

        match command {
            "uci" => {
                writeln!(out, "id name {ENGINE_NAME}")?;
                writeln!(out, "id author {ENGINE_AUTHOR}")?;
                writeln!(out, "uciok")?;
            }
            "isready" => {
                writeln!(out, "readyok")?;
            }
            "ucinewgame" => {
                self.pos = Position::startpos();
                self.history.clear();
                self.tt.clear();
            }
            "position" => {
                self.handle_position(&parts);
            }
            "go" => {
                self.handle_go(&parts, out)?;
            }
            "stop" => {
                self.stop.store(true, Ordering::Relaxed);
            }
            "quit" => {
                return Ok(false);
            }
            _ => {
                // Unknown commands are ignored, as the protocol requires
            }
        }
        Ok(true)
    }

    fn handle_position(&mut self, parts: &[&str]) {
        let mut moves_at = None;

        let pos = if parts.get(1) == Some(&"startpos") {
            moves_at = parts.iter().position(|&p| p == "moves");
            Some(Position::startpos())
        } else if parts.get(1) == Some(&"fen") {
            moves_at = parts.iter().position(|&p| p == "moves");
            let fen_end = moves_at.unwrap_or(parts.len());
            let fen = parts[2..fen_end].join(" ");
            Position::from_fen(&fen).ok()
        } else {
            None
        };

        let Some(mut pos) = pos else { return };

        self.history.clear();
        if let Some(at) = moves_at {
            for uci in &parts[at + 1..] {
                self.history.push(pos.hash());
                if pos.make_move_uci(uci).is_err() {
                    self.history.pop();
                    break;
                }
            }
        }
        self.pos = pos;
    }

    fn handle_go(&mut self, parts: &[&str], out: &mut impl Write) -> io::Result<()> {
        let mut search_time = None;
        let mut max_depth = 64;
        let mut time_left = None;
        let mut increment = Duration::ZERO;
        let white = self.pos.side_to_move() == crate::board::Color::White;

        let mut i = 1;
        while i < parts.len() {
            let value = parts.get(i + 1).and_then(|v| v.parse::<u64>().ok());
            match parts[i] {
                "wtime" if white => {
                    time_left = value.map(Duration::from_millis);
                    i += 2;
                }
                "btime" if !white => {
                    time_left = value.map(Duration::from_millis);
                    i += 2;
                }
                "winc" if white => {
                    increment = value.map_or(Duration::ZERO, Duration::from_millis);
                    i += 2;
                }
                "binc" if !white => {
                    increment = value.map_or(Duration::ZERO, Duration::from_millis);
                    i += 2;
                }
                "movetime" => {
                    search_time = value.map(Duration::from_millis);
                    i += 2;
                }
                "depth" => {
                    if let Some(d) = value {
                        max_depth = d as i32;
                        search_time.get_or_insert(NO_TIME_LIMIT);
                    }
                    i += 2;
                }
                "infinite" => {
                    search_time = Some(NO_TIME_LIMIT);
                    i += 1;
                }
                _ => i += 1,
            }
        }

        let search_time = search_time
            .or_else(|| time_left.map(|left| allocate(left, increment)))
            .unwrap_or_else(|| Duration::from_secs(1));

        self.stop.store(false, Ordering::Relaxed);
        let config = SearchConfig {
            search_time,
            max_depth,
            stop: Some(Arc::clone(&self.stop)),
        };

        let mut lines: Vec<String> = Vec::new();
        let best = {
            let mut search = Search::new(&self.pos, config, &mut self.tt)
                .with_game_history(self.history.clone())
                .with_info_callback(Box::new(|info: &SearchInfo| {
                    lines.push(format_info(info));
                }));
            search.find_best_move()
        };

        for line in lines {
            writeln!(out, "{line}")?;
        }
        match best {
            Some(mv) => writeln!(out, "bestmove {mv}")?,
            None => writeln!(out, "bestmove 0000")?,
        }
        out.flush()
    }
}

fn format_info(info: &SearchInfo) -> String {
    let score = if is_mate_score(info.score) {
        let mate_in = if info.score > 0 {
            (MATE - info.score + 1) / 2
        } else {
            -(MATE + info.score + 1) / 2
        };
        format!("score mate {mate_in}")
    } else {
        format!("score cp {}", info.score)
    };

    let nps = if info.time_ms > 0 {
        info.nodes * 1000 / info.time_ms
    } else {
        0
    };

    let pv = info
        .pv
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "info depth {} {} nodes {} nps {} time {} pv {}",
        info.depth, score, info.nodes, nps, info.time_ms, pv
    )
}

/// Blocking UCI loop over stdin/stdout. The binary's whole job.
pub fn run() -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut engine = UciEngine::new();

    for line in stdin.lock().lines() {
        let line = line?;
        if !engine.handle_command(&line, &mut stdout)? {
            break;
        }
        stdout.flush()?;
    }
    Ok(())
}
