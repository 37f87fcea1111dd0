//! Game state: one immutable snapshot per ply.
//!
//! `GameState` owns its board exclusively. Applying an action never mutates
//! the receiver; it clones the board, performs the placement and capture
//! bookkeeping, and hands back a fresh state together with the capture
//! side effects of that one move.

use crate::board::{Action, Board, Player};
use crate::constants::DEFAULT_GOAL;
use crate::error::{Error, Result};
use crate::rules::{detect_captures, detect_double_three, has_capture, winning_run};

/// Rule toggles for a match, fixed at setup time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rules {
    /// Run length required to win.
    pub goal: usize,
    /// Bracket-capture extension enabled.
    pub capture: bool,
    /// Double-three restriction enabled.
    pub double_three: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            goal: DEFAULT_GOAL,
            capture: false,
            double_three: false,
        }
    }
}

/// Stones removed as the side effect of a single move.
///
/// Produced by [`GameState::apply`] and consumed immediately by the caller;
/// the new state already has the stones removed and the counters updated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureEvent {
    /// The player whose move performed the capture.
    pub by: Player,
    /// Cells cleared by the capture, as `(x, y)`.
    pub stones: Vec<(usize, usize)>,
}

impl CaptureEvent {
    fn none(by: Player) -> Self {
        Self {
            by,
            stones: Vec::new(),
        }
    }
}

/// A board position between two plies.
#[derive(Clone, Debug)]
pub struct GameState {
    pub board: Board,
    pub next_player: Player,
    pub last_player: Player,
    /// Stones captured by X / by O so far. Monotonically non-decreasing
    /// along a game's move sequence.
    pub captures_x: u32,
    pub captures_o: u32,
    /// Number of plies played before this state.
    pub move_index: usize,
    /// The player whose move completed a goal-length run, if any.
    pub winner: Option<Player>,
    pub rules: Rules,
}

impl GameState {
    /// Fresh empty-board state.
    pub fn empty(rows: usize, cols: usize, next_player: Player, rules: Rules) -> Self {
        Self::from_board(Board::new(rows, cols), next_player, rules)
    }

    /// Wrap a board arriving from outside (for example a request payload).
    /// The move index is reconstructed from the stone count.
    pub fn from_board(board: Board, next_player: Player, rules: Rules) -> Self {
        let move_index = board.stone_count();
        Self {
            board,
            next_player,
            last_player: next_player.opponent(),
            captures_x: 0,
            captures_o: 0,
            move_index,
            winner: None,
            rules,
        }
    }

    /// Stones captured by `player` so far.
    #[inline]
    pub fn captures(&self, player: Player) -> u32 {
        match player {
            Player::X => self.captures_x,
            Player::O => self.captures_o,
        }
    }

    /// All legal actions for the player to move.
    ///
    /// Every empty cell qualifies unless the double-three restriction is on
    /// and the placement would create two open threes; a placement that
    /// simultaneously captures is exempt from that restriction.
    pub fn legal_moves(&self) -> Vec<Action> {
        let player = self.next_player;
        self.board
            .empty_actions()
            .filter(|&action| {
                if !self.rules.double_three {
                    return true;
                }
                let (x, y) = self.board.action_to_xy(action);
                if !detect_double_three(&self.board, x, y, player) {
                    return true;
                }
                self.rules.capture && has_capture(&self.board, x, y, player)
            })
            .collect()
    }

    /// Whether this position admits no further play.
    pub fn is_terminal(&self) -> bool {
        self.winner.is_some() || self.board.is_full() || self.legal_moves().is_empty()
    }

    /// Rule-derived outcome from the perspective of the player to move:
    /// -1 when the opponent's last move won, 0 for a drawn (full or dead)
    /// position, `None` while the game is still live.
    pub fn terminal_value(&self) -> Option<f32> {
        if let Some(winner) = self.winner {
            return Some(if winner == self.next_player { 1.0 } else { -1.0 });
        }
        if self.board.is_full() {
            return Some(0.0);
        }
        None
    }

    /// Apply one action for the player to move, producing the successor
    /// state and the capture side effects of the move.
    pub fn apply(&self, action: Action) -> Result<(GameState, CaptureEvent)> {
        let player = self.next_player;
        let (rows, cols) = (self.board.rows, self.board.cols);
        if action >= rows * cols {
            return Err(Error::ActionOutOfRange { action, rows, cols });
        }
        let (x, y) = self.board.action_to_xy(action);
        if !self.board.is_empty(x, y) {
            return Err(Error::InvalidMove {
                x,
                y,
                reason: "cell is occupied".to_string(),
            });
        }

        // Capture and double-three are both judged against the pre-move
        // board with the placement simulated; a capturing move is exempt
        // from the double-three restriction.
        let captured = if self.rules.capture {
            detect_captures(&self.board, x, y, player)
        } else {
            Vec::new()
        };
        if captured.is_empty()
            && self.rules.double_three
            && detect_double_three(&self.board, x, y, player)
        {
            return Err(Error::InvalidMove {
                x,
                y,
                reason: "creates a double-three".to_string(),
            });
        }

        let mut board = self.board.clone();
        board.set(x, y, Some(player));
        for &(cx, cy) in &captured {
            board.set(cx, cy, None);
        }

        let (mut captures_x, mut captures_o) = (self.captures_x, self.captures_o);
        match player {
            Player::X => captures_x += captured.len() as u32,
            Player::O => captures_o += captured.len() as u32,
        }

        let winner = if winning_run(&board, x, y, player, self.rules.goal) {
            Some(player)
        } else {
            None
        };

        let event = if captured.is_empty() {
            CaptureEvent::none(player)
        } else {
            CaptureEvent {
                by: player,
                stones: captured,
            }
        };

        Ok((
            GameState {
                board,
                next_player: player.opponent(),
                last_player: player,
                captures_x,
                captures_o,
                move_index: self.move_index + 1,
                winner,
                rules: self.rules,
            },
            event,
        ))
    }
}
