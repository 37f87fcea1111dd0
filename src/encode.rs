//! State encoding: fixed-shape tensor projection of a position.
//!
//! The encoder is a pure projection with no learned parameters. Plane
//! layout (version [`ENCODING_VERSION`]):
//!
//! - plane 0: stones of the player to move (1.0 where present)
//! - plane 1: stones of the opponent
//! - plane 2: side-to-move constant (all 1.0 when X is to move, else 0.0)
//!
//! Data is laid out `[plane][row][col]`, row-major within a plane, so the
//! flat index of `(plane, y, x)` is `plane * rows * cols + y * cols + x`.

use crate::board::Player;
use crate::constants::{ENCODING_PLANES, ENCODING_VERSION};
use crate::state::GameState;

/// An encoded position ready for evaluator consumption.
#[derive(Clone, Debug, PartialEq)]
pub struct Encoding {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f32>,
}

impl Encoding {
    /// Number of planes in this encoding.
    #[inline]
    pub fn planes(&self) -> usize {
        ENCODING_PLANES
    }

    /// Layout version of this encoding.
    #[inline]
    pub fn version(&self) -> u32 {
        ENCODING_VERSION
    }

    /// One plane as a contiguous slice.
    pub fn plane(&self, p: usize) -> &[f32] {
        let area = self.rows * self.cols;
        &self.data[p * area..(p + 1) * area]
    }
}

/// Encode a state into the versioned plane layout.
pub fn encode(state: &GameState) -> Encoding {
    let rows = state.board.rows;
    let cols = state.board.cols;
    let area = rows * cols;
    let me = state.next_player;
    let side = if me == Player::X { 1.0 } else { 0.0 };

    let mut data = vec![0.0f32; ENCODING_PLANES * area];
    for y in 0..rows {
        for x in 0..cols {
            let i = y * cols + x;
            match state.board.get(x, y) {
                Some(p) if p == me => data[i] = 1.0,
                Some(_) => data[area + i] = 1.0,
                None => {}
            }
            data[2 * area + i] = side;
        }
    }

    Encoding { rows, cols, data }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{GameState, Rules};

    #[test]
    fn test_encoding_layout() {
        let state = GameState::empty(3, 3, Player::X, Rules::default());
        let (state, _) = state.apply(4).unwrap(); // X center, O to move

        let enc = encode(&state);
        assert_eq!(enc.data.len(), 3 * 9);

        // Plane 0 holds the to-move player's stones: O has none yet.
        assert!(enc.plane(0).iter().all(|&v| v == 0.0));
        // Plane 1 holds the opponent's stones: the X at (1, 1).
        assert_eq!(enc.plane(1)[4], 1.0);
        assert_eq!(enc.plane(1).iter().sum::<f32>(), 1.0);
        // Side-to-move plane is all zeros when O moves next.
        assert!(enc.plane(2).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let state = GameState::empty(5, 5, Player::O, Rules::default());
        assert_eq!(encode(&state), encode(&state));
    }

    #[test]
    fn test_side_plane_tracks_player() {
        let x_to_move = GameState::empty(4, 4, Player::X, Rules::default());
        let o_to_move = GameState::empty(4, 4, Player::O, Rules::default());
        assert!(encode(&x_to_move).plane(2).iter().all(|&v| v == 1.0));
        assert!(encode(&o_to_move).plane(2).iter().all(|&v| v == 0.0));
    }
}
