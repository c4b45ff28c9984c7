//! Go Text Protocol (GTP) implementation.
//!
//! GTP is a text-based protocol for communicating with Go-playing programs.
//! This module implements GTP version 2, allowing the engine to be used
//! with graphical Go interfaces like Sabaki, GoGui, or Lizzie.
//!
//! ## Supported Commands
//!
//! - `name` - Return engine name
//! - `version` - Return engine version
//! - `protocol_version` - Return GTP protocol version (2)
//! - `list_commands` - List all supported commands
//! - `known_command <cmd>` - Check if a command is supported
//! - `quit` - Exit the program
//! - `boardsize <size>` - Set board size (9, 11, 13, 15 or 19)
//! - `clear_board` - Reset the board to empty
//! - `komi <value>` - Set komi
//! - `play <color> <vertex>` - Play a move
//! - `genmove <color>` - Generate and play a move for the given color
//! - `showboard` - Draw the board and the prisoner counts
//! - `final_score` - Area score of the current board
//!
//! ## Example
//!
//! ```ignore
//! use isana::gtp::GtpEngine;
//! let mut engine = GtpEngine::new(Config::default(), Size::B19x19);
//! engine.run()?;
//! ```

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, warn};

use crate::board::{Size, Stone, Vertex};
use crate::constants::{ENGINE_NAME, MAX_LINE, PROTOCOL_VERSION};
use crate::game::Game;
use crate::mcts::{Config, Engine};
use crate::moves::Move;
use crate::position::Position;

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "final_score",
    "genmove",
    "known_command",
    "komi",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// Column letters; `I` is skipped by convention.
const COLUMNS: &[u8; MAX_LINE] = b"ABCDEFGHJKLMNOPQRST";

/// Parse a colour argument (`b`, `black`, `w`, `white`, any case).
pub fn parse_stone(s: &str) -> Result<Stone> {
    match s.to_ascii_lowercase().as_str() {
        "b" | "black" => Ok(Stone::Black),
        "w" | "white" => Ok(Stone::White),
        _ => bail!("invalid color: {s}"),
    }
}

/// Parse a vertex such as `D4` or `pass`.
///
/// Columns are letters from `A` (skipping `I`), rows count up from 1 at the
/// bottom edge.
pub fn parse_vertex(s: &str, size: Size) -> Result<Vertex> {
    if s.eq_ignore_ascii_case("pass") {
        return Ok(Vertex::Outbound);
    }
    let mut chars = s.chars();
    let letter = chars
        .next()
        .ok_or_else(|| anyhow!("empty vertex"))?
        .to_ascii_uppercase();
    let col = COLUMNS
        .iter()
        .take(size.line())
        .position(|&c| char::from(c) == letter)
        .ok_or_else(|| anyhow!("invalid column in vertex: {s}"))?;
    let digits = chars.as_str();
    if !digits.starts_with(|c: char| c.is_ascii_digit()) {
        bail!("invalid row in vertex: {s}");
    }
    let row: usize = digits
        .parse()
        .with_context(|| format!("invalid row in vertex: {s}"))?;
    if row == 0 || row > size.line() {
        bail!("vertex off the board: {s}");
    }
    Ok(Vertex::new(col, row - 1, size))
}

/// Convert a vertex to its GTP text (`D4`, `pass`).
pub fn str_vertex(vertex: Vertex, size: Size) -> String {
    match vertex.col_row(size) {
        Some((col, row)) => format!("{}{}", char::from(COLUMNS[col]), row + 1),
        None => "pass".into(),
    }
}

/// Draw the board, top row first, followed by the prisoner counts.
pub fn render(position: &Position) -> String {
    let size = position.size;
    let line = size.line();
    let header: String = COLUMNS[..line]
        .iter()
        .map(|&c| format!(" {}", char::from(c)))
        .collect();

    let mut out = format!("   {header}\n");
    for row in (0..line).rev() {
        out.push_str(&format!("{:>2} ", row + 1));
        for col in 0..line {
            out.push(' ');
            out.push(position.stone_at(Vertex::new(col, row, size)).to_char());
        }
        out.push_str(&format!(" {}\n", row + 1));
    }
    out.push_str(&format!("   {header}\n"));
    out.push_str(&format!(
        "Black (X) : {} stones\nWhite (O) : {} stones",
        position.black_prisoners, position.white_prisoners
    ));
    out
}

/// GTP engine state.
pub struct GtpEngine {
    game: Game,
    engine: Engine,
}

impl GtpEngine {
    pub fn new(config: Config, size: Size) -> Self {
        let game = Game::new(size, config.komi);
        Self {
            game,
            engine: Engine::new(config),
        }
    }

    /// Run the GTP command loop, reading from stdin and writing to stdout.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();
            debug!("gtp <- {command_line}");

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(stdout, "{prefix}{id_str} {message}\n")?;
            stdout.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end == 0 {
            return (None, trimmed);
        }
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a GTP command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match self.dispatch(command, args) {
            Ok(response) => (true, response),
            Err(err) => {
                warn!("{command} {}: {err:#}", args.join(" "));
                (false, err.to_string())
            }
        }
    }

    fn dispatch(&mut self, command: &str, args: &[&str]) -> Result<String> {
        match command {
            "name" => Ok(ENGINE_NAME.to_string()),

            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => Ok(PROTOCOL_VERSION.to_string()),

            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let name = args.first().ok_or_else(|| anyhow!("missing argument"))?;
                let known = KNOWN_COMMANDS.contains(&name.to_lowercase().as_str());
                Ok(known.to_string())
            }

            "quit" => Ok(String::new()),

            "boardsize" => {
                let arg = args
                    .first()
                    .ok_or_else(|| anyhow!("boardsize must be an integer"))?;
                let line: usize = arg
                    .parse()
                    .map_err(|_| anyhow!("boardsize must be an integer"))?;
                let size = Size::from_line(line).ok_or_else(|| anyhow!("unacceptable size"))?;
                self.game.set_size(size);
                Ok(String::new())
            }

            "clear_board" => {
                self.game.clear();
                Ok(String::new())
            }

            "komi" => {
                let arg = args.first().ok_or_else(|| anyhow!("komi must be a float"))?;
                let komi: f64 = arg.parse().map_err(|_| anyhow!("komi must be a float"))?;
                self.game.set_komi(komi);
                self.engine.config.komi = komi;
                Ok(String::new())
            }

            "play" => {
                let [color, vertex, ..] = args else {
                    bail!("invalid parameter(s)");
                };
                let stone = parse_stone(color)?;
                let vertex = parse_vertex(vertex, self.game.size)?;
                if vertex.is_outbound() {
                    self.game.pass(stone);
                    return Ok(String::new());
                }
                self.game
                    .make_move(&Move::new(stone, vertex))
                    .map_err(|_| anyhow!("illegal move"))?;
                Ok(String::new())
            }

            "genmove" => {
                let color = args.first().ok_or_else(|| anyhow!("invalid parameter(s)"))?;
                let stone = parse_stone(color)?;
                let selected = self
                    .engine
                    .answer(self.game.current(), stone, self.game.last_move());

                if selected.is_pass() || self.game.make_move(&selected).is_err() {
                    self.game.pass(stone);
                    return Ok("pass".to_string());
                }
                Ok(str_vertex(selected.vertex, self.game.size))
            }

            "showboard" => Ok(format!("\n{}", render(self.game.current()))),

            "final_score" => {
                let score = self.game.final_score();
                Ok(if score > 0.0 {
                    format!("B+{score}")
                } else if score < 0.0 {
                    format!("W+{}", -score)
                } else {
                    "0".to_string()
                })
            }

            _ => Err(anyhow!("unknown command: {command}")),
        }
    }
}
