//! Request/response protocol and the session loop.
//!
//! Messages are newline-delimited JSON objects tagged by a `type` field:
//! `move` (also accepted as `test`), `evaluate`, and `reset`. The session
//! answers every request on the same stream; recoverable failures become
//! `{"error": ...}` payloads and the loop continues. Only transport
//! closure (EOF or a failed write) ends a session.
//!
//! The framing that carries these lines (websocket, pipe, ...) is the
//! caller's concern; [`Session::run`] works over any `BufRead`/`Write`
//! pair and the bundled binary serves them over stdio.

use std::io::{self, BufRead, Write};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::board::{Action, Board, Player};
use crate::constants::DEFAULT_GOAL;
use crate::engine::{Engine, value_to_percentage};
use crate::error::{Error, Result};
use crate::state::{CaptureEvent, GameState, Rules};

// =============================================================================
// Message shapes
// =============================================================================

#[derive(Debug, Copy, Clone, Deserialize, Serialize)]
pub struct Coordinate {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastPlay {
    pub coordinate: Coordinate,
    pub stone: String,
}

/// Body shared by `move`, `test` and `evaluate` requests.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRequest {
    pub board: Vec<Vec<String>>,
    pub next_player: String,
    #[serde(default)]
    pub last_play: Option<LastPlay>,
    #[serde(default)]
    pub goal: Option<usize>,
    #[serde(default)]
    pub enable_capture: bool,
    #[serde(default)]
    pub enable_double_three_restriction: bool,
    /// Per-request search budget override; takes precedence over the
    /// configured budget when present.
    #[serde(default)]
    pub num_searches: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CapturedStone {
    pub x: usize,
    pub y: usize,
    pub stone: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    pub action: Action,
    pub stone: String,
    pub board: Vec<Vec<String>>,
    pub captures: Vec<CapturedStone>,
    pub elapsed_nanoseconds: u128,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    pub x_evaluation: f64,
    pub o_evaluation: f64,
    pub x_percentage: f64,
    pub o_percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// =============================================================================
// Payload conversion
// =============================================================================

fn parse_board(rows: &[Vec<String>]) -> Result<Board> {
    if rows.is_empty() || rows[0].is_empty() {
        return Err(Error::InvalidPayload("board must be non-empty".to_string()));
    }
    let cols = rows[0].len();
    if rows.iter().any(|row| row.len() != cols) {
        return Err(Error::InvalidPayload(
            "board rows must all have the same length".to_string(),
        ));
    }

    let mut board = Board::new(rows.len(), cols);
    for (y, row) in rows.iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            match cell.as_str() {
                "." => {}
                "X" => board.set(x, y, Some(Player::X)),
                "O" => board.set(x, y, Some(Player::O)),
                other => {
                    return Err(Error::InvalidPayload(format!(
                        "invalid cell marker '{other}' at ({x}, {y})"
                    )));
                }
            }
        }
    }
    Ok(board)
}

fn render_board(board: &Board) -> Vec<Vec<String>> {
    (0..board.rows)
        .map(|y| {
            (0..board.cols)
                .map(|x| match board.get(x, y) {
                    Some(p) => p.marker().to_string(),
                    None => ".".to_string(),
                })
                .collect()
        })
        .collect()
}

fn request_to_state(request: &GameRequest) -> Result<GameState> {
    let board = parse_board(&request.board)?;
    let next_player = Player::from_marker(&request.next_player)?;
    let rules = Rules {
        goal: request.goal.unwrap_or(DEFAULT_GOAL),
        capture: request.enable_capture,
        double_three: request.enable_double_three_restriction,
    };
    Ok(GameState::from_board(board, next_player, rules))
}

fn captures_to_messages(event: &CaptureEvent) -> Vec<CapturedStone> {
    let stone = event.by.opponent().marker().to_string();
    event
        .stones
        .iter()
        .map(|&(x, y)| CapturedStone {
            x,
            y,
            stone: stone.clone(),
        })
        .collect()
}

// =============================================================================
// Session
// =============================================================================

/// One logical game session over a line-delimited JSON stream.
///
/// Requests on a session are handled strictly one at a time: the loop does
/// not read the next line before the previous reply has been written, so a
/// search is never started while another is still running for the same
/// session.
pub struct Session {
    engine: Engine,
}

impl Session {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    /// Serve requests until EOF. A failed write means the peer is gone;
    /// the request is abandoned and the loop ends without retrying.
    pub fn run<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> io::Result<()> {
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let reply = self.handle(line);
            if let Err(e) = writeln!(writer, "{reply}").and_then(|_| writer.flush()) {
                eprintln!("session closed while sending reply: {e}");
                return Ok(());
            }
        }
        Ok(())
    }

    /// Handle one raw request line and produce the reply payload.
    pub fn handle(&self, line: &str) -> String {
        match self.dispatch(line) {
            Ok(reply) => reply,
            Err(err) => encode_reply(&ErrorResponse {
                error: err.to_string(),
            }),
        }
    }

    fn dispatch(&self, line: &str) -> Result<String> {
        let value: serde_json::Value = serde_json::from_str(line)
            .map_err(|e| Error::InvalidPayload(format!("not a JSON object: {e}")))?;
        if !value.is_object() {
            return Err(Error::InvalidPayload("expected a JSON object".to_string()));
        }

        let kind = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| Error::InvalidPayload("missing 'type' field".to_string()))?;

        match kind {
            "move" | "test" => self.handle_move(value),
            "evaluate" => self.handle_evaluate(value),
            "reset" => Ok(encode_reply(&ResetResponse {
                kind: "reset".to_string(),
            })),
            other => Err(Error::UnknownMessageType(other.to_string())),
        }
    }

    fn handle_move(&self, value: serde_json::Value) -> Result<String> {
        let request: GameRequest = serde_json::from_value(value)
            .map_err(|e| Error::InvalidPayload(e.to_string()))?;
        let state = request_to_state(&request)?;
        log_move_request(&request);

        let start = Instant::now();
        let action = self
            .engine
            .get_best_move(&state, request.num_searches)?;
        let (new_state, captures) = self.engine.apply_move(&state, action)?;
        let elapsed_nanoseconds = start.elapsed().as_nanos();

        let (x, y) = state.board.action_to_xy(action);
        let stone = state.next_player.marker().to_string();
        eprintln!("AI played: ({x}, {y}) by {stone}");

        Ok(encode_reply(&MoveResponse {
            action,
            stone,
            board: render_board(&new_state.board),
            captures: captures_to_messages(&captures),
            elapsed_nanoseconds,
        }))
    }

    fn handle_evaluate(&self, value: serde_json::Value) -> Result<String> {
        let request: GameRequest = serde_json::from_value(value)
            .map_err(|e| Error::InvalidPayload(e.to_string()))?;
        let state = request_to_state(&request)?;

        let last_play = request.last_play.as_ref().ok_or_else(|| {
            Error::InvalidPayload("evaluate requires lastPlay.coordinate".to_string())
        })?;
        let Coordinate { x, y } = last_play.coordinate;
        if x >= state.board.cols || y >= state.board.rows {
            return Err(Error::InvalidMove {
                x,
                y,
                reason: "coordinate is off the board".to_string(),
            });
        }
        let candidate = state.board.xy_to_action(x, y);

        // Value for the player who would place the candidate stone.
        let mover = state.next_player;
        let value = f64::from(self.engine.evaluate_position(&state, candidate)?);
        let mover_pct = f64::from(value_to_percentage(value as f32));

        let response = match mover {
            Player::X => EvaluateResponse {
                x_evaluation: value,
                o_evaluation: -value,
                x_percentage: mover_pct,
                o_percentage: 100.0 - mover_pct,
            },
            Player::O => EvaluateResponse {
                x_evaluation: -value,
                o_evaluation: value,
                x_percentage: 100.0 - mover_pct,
                o_percentage: mover_pct,
            },
        };
        Ok(encode_reply(&response))
    }
}

fn encode_reply<T: Serialize>(reply: &T) -> String {
    // The reply shapes serialize infallibly (string keys, plain values);
    // if that ever changes, answer with a generic error payload instead
    // of poisoning the stream.
    serde_json::to_string(reply)
        .unwrap_or_else(|e| format!("{{\"error\":\"failed to encode response: {e}\"}}"))
}

/// Mirror of the request summary the original server wrote to its log:
/// players, flags, and the board with `1`/`2` stone markers.
fn log_move_request(request: &GameRequest) {
    eprintln!("Move received:");
    if let Some(last) = &request.last_play {
        eprintln!(
            "  Last Play: ({}, {}) by {}",
            last.coordinate.x, last.coordinate.y, last.stone
        );
    }
    eprintln!("  Next Player: {}", request.next_player);
    eprintln!("  Goal: {}", request.goal.unwrap_or(DEFAULT_GOAL));
    eprintln!("  Enable Capture: {}", request.enable_capture as u8);
    eprintln!(
        "  Enable Double Three Restriction: {}",
        request.enable_double_three_restriction as u8
    );
    for row in &request.board {
        let line: String = row
            .iter()
            .map(|cell| match cell.as_str() {
                "X" => "1 ",
                "O" => "2 ",
                _ => ". ",
            })
            .collect();
        eprintln!("{line}");
    }
}
