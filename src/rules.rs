//! Rule checks: bracket capture, double-three restriction, winning runs.
//!
//! Everything here is a pure function of a board snapshot plus a trial
//! coordinate. No mutable rule state exists, so the search engine can probe
//! hypothetical placements freely; committing a move is the job of
//! [`GameState::apply`](crate::state::GameState::apply).

use crate::board::{Board, Player};
use crate::constants::{AXES, DIRECTIONS};

/// What a cell looks like from the perspective of one player along a line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum LineCell {
    Own,
    Opp,
    Empty,
    Edge,
}

/// Read the cell `k` steps along `(dx, dy)` from `(x, y)`.
fn line_cell(board: &Board, player: Player, x: usize, y: usize, dx: i32, dy: i32, k: i32) -> LineCell {
    let cx = x as i32 + dx * k;
    let cy = y as i32 + dy * k;
    if !board.in_bounds(cx, cy) {
        return LineCell::Edge;
    }
    match board.get(cx as usize, cy as usize) {
        Some(p) if p == player => LineCell::Own,
        Some(_) => LineCell::Opp,
        None => LineCell::Empty,
    }
}

// =============================================================================
// Bracket capture
// =============================================================================

/// Cells captured by placing `player`'s stone at `(x, y)`.
///
/// Each of the 8 directions is checked independently for the pattern
/// `player, opponent, opponent, player` anchored at the placed stone; every
/// matching direction contributes its two interior stones, so one move can
/// capture several pairs at once.
pub fn detect_captures(board: &Board, x: usize, y: usize, player: Player) -> Vec<(usize, usize)> {
    let opponent = player.opponent();
    let mut captured = Vec::new();

    for &(dx, dy) in &DIRECTIONS {
        let x3 = x as i32 + dx * 3;
        let y3 = y as i32 + dy * 3;
        if !board.in_bounds(x3, y3) {
            continue;
        }
        let x1 = (x as i32 + dx) as usize;
        let y1 = (y as i32 + dy) as usize;
        let x2 = (x as i32 + dx * 2) as usize;
        let y2 = (y as i32 + dy * 2) as usize;

        if board.get(x1, y1) == Some(opponent)
            && board.get(x2, y2) == Some(opponent)
            && board.get(x3 as usize, y3 as usize) == Some(player)
        {
            captured.push((x1, y1));
            captured.push((x2, y2));
        }
    }

    captured
}

/// Whether placing at `(x, y)` captures at least one pair. Cheaper than
/// [`detect_captures`] when only the fact matters.
pub fn has_capture(board: &Board, x: usize, y: usize, player: Player) -> bool {
    let opponent = player.opponent();

    for &(dx, dy) in &DIRECTIONS {
        let x3 = x as i32 + dx * 3;
        let y3 = y as i32 + dy * 3;
        if !board.in_bounds(x3, y3) {
            continue;
        }
        let x1 = (x as i32 + dx) as usize;
        let y1 = (y as i32 + dy) as usize;
        let x2 = (x as i32 + dx * 2) as usize;
        let y2 = (y as i32 + dy * 2) as usize;

        if board.get(x1, y1) == Some(opponent)
            && board.get(x2, y2) == Some(opponent)
            && board.get(x3 as usize, y3 as usize) == Some(player)
        {
            return true;
        }
    }

    false
}

// =============================================================================
// Double-three restriction
// =============================================================================

/// Whether placing `player`'s stone at `(x, y)` would create two or more
/// open threes on distinct axes.
///
/// An open three is three stones (consecutive, or three with a single gap)
/// whose immediate extension cells are empty and which can still grow into
/// an open four. A three whose line is hemmed in so that no open four can
/// ever form does not count.
pub fn detect_double_three(board: &Board, x: usize, y: usize, player: Player) -> bool {
    let mut axes_with_three = 0;
    for &(dx, dy) in &AXES {
        if creates_open_three(board, x, y, player, dx, dy) {
            axes_with_three += 1;
            if axes_with_three >= 2 {
                return true;
            }
        }
    }
    false
}

/// Check the single axis `(dx, dy)` for an open three created by the trial
/// placement. The placed stone sits at window offset 0 and is treated as
/// `Own` without mutating the board.
fn creates_open_three(board: &Board, x: usize, y: usize, player: Player, dx: i32, dy: i32) -> bool {
    // Window of offsets -5..=5 around the placed stone along the axis.
    let at = |k: i32| -> LineCell {
        if k == 0 {
            LineCell::Own
        } else {
            line_cell(board, player, x, y, dx, dy, k)
        }
    };
    let own = |k: i32| at(k) == LineCell::Own;
    let empty = |k: i32| at(k) == LineCell::Empty;

    // Consecutive three at offsets [s, s+2], the placed stone included.
    // Both extension cells must be empty, and at least one side must leave
    // room for the run to grow into an open four.
    for s in -2..=0 {
        if own(s) && own(s + 1) && own(s + 2) && empty(s - 1) && empty(s + 3) {
            // Not a three if it is really the edge of a longer run.
            if own(s - 2) || own(s + 4) {
                continue;
            }
            if empty(s - 2) || empty(s + 4) {
                return true;
            }
        }
    }

    // Split three: stones at {s, s+1, s+3} or {s, s+2, s+3} with the gap
    // empty. Filling the gap is the only way to a four, and that four is
    // open only when both outer extension cells are empty.
    for s in -3..=0 {
        let shape_a = own(s) && own(s + 1) && empty(s + 2) && own(s + 3);
        let shape_b = own(s) && empty(s + 1) && own(s + 2) && own(s + 3);
        if (shape_a || shape_b) && empty(s - 1) && empty(s + 4) {
            // A fourth stone just beyond either end would make this a
            // broken four, not a three.
            if own(s - 1) || own(s + 4) {
                continue;
            }
            return true;
        }
    }

    false
}

// =============================================================================
// Winning runs
// =============================================================================

/// Whether the stone placed at `(x, y)` completes a run of at least `goal`
/// stones for `player` along any of the four axes.
pub fn winning_run(board: &Board, x: usize, y: usize, player: Player, goal: usize) -> bool {
    for &(dx, dy) in &AXES {
        let mut count = 1;
        let mut k = 1;
        while line_cell(board, player, x, y, dx, dy, k) == LineCell::Own {
            count += 1;
            k += 1;
        }
        k = 1;
        while line_cell(board, player, x, y, dx, dy, -k) == LineCell::Own {
            count += 1;
            k += 1;
        }
        if count >= goal {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_19() -> Board {
        Board::new(19, 19)
    }

    #[test]
    fn test_capture_horizontal() {
        let mut board = board_19();
        // X . O O X  — placing X in the hole captures both O stones.
        board.set(5, 9, Some(Player::X));
        board.set(7, 9, Some(Player::O));
        board.set(8, 9, Some(Player::O));
        board.set(9, 9, Some(Player::X));

        let captured = detect_captures(&board, 6, 9, Player::X);
        assert_eq!(captured.len(), 2);
        assert!(captured.contains(&(7, 9)));
        assert!(captured.contains(&(8, 9)));
    }

    #[test]
    fn test_capture_single_stone_never_triggers() {
        let mut board = board_19();
        // X . O X — only one opponent stone, no capture.
        board.set(5, 9, Some(Player::X));
        board.set(7, 9, Some(Player::O));
        board.set(8, 9, Some(Player::X));

        assert!(detect_captures(&board, 6, 9, Player::X).is_empty());
    }

    #[test]
    fn test_capture_three_stones_never_triggers() {
        let mut board = board_19();
        // X . O O O X — three opponent stones, the bracket does not match.
        board.set(5, 9, Some(Player::X));
        board.set(7, 9, Some(Player::O));
        board.set(8, 9, Some(Player::O));
        board.set(9, 9, Some(Player::O));
        board.set(10, 9, Some(Player::X));

        assert!(detect_captures(&board, 6, 9, Player::X).is_empty());
    }

    #[test]
    fn test_capture_both_directions_of_one_axis() {
        let mut board = board_19();
        // X O O . O O X — placing in the middle captures two pairs.
        board.set(3, 9, Some(Player::X));
        board.set(4, 9, Some(Player::O));
        board.set(5, 9, Some(Player::O));
        board.set(7, 9, Some(Player::O));
        board.set(8, 9, Some(Player::O));
        board.set(9, 9, Some(Player::X));

        let captured = detect_captures(&board, 6, 9, Player::X);
        assert_eq!(captured.len(), 4);
    }

    #[test]
    fn test_capture_diagonal() {
        let mut board = board_19();
        board.set(5, 5, Some(Player::X));
        board.set(7, 7, Some(Player::O));
        board.set(8, 8, Some(Player::O));
        board.set(9, 9, Some(Player::X));

        let captured = detect_captures(&board, 6, 6, Player::X);
        assert_eq!(captured, vec![(7, 7), (8, 8)]);
    }

    #[test]
    fn test_capture_at_edge_does_not_scan_off_board() {
        let mut board = board_19();
        board.set(0, 0, Some(Player::X));
        board.set(1, 0, Some(Player::O));
        assert!(detect_captures(&board, 2, 0, Player::X).is_empty());
    }

    #[test]
    fn test_capture_by_o() {
        let mut board = board_19();
        board.set(5, 5, Some(Player::O));
        board.set(7, 5, Some(Player::X));
        board.set(8, 5, Some(Player::X));
        board.set(9, 5, Some(Player::O));

        let captured = detect_captures(&board, 6, 5, Player::O);
        assert_eq!(captured.len(), 2);
        assert!(!has_capture(&board, 6, 5, Player::X));
    }

    #[test]
    fn test_double_three_cross() {
        let mut board = board_19();
        // Placing at (9, 9) completes an open three on the row and another
        // on the column.
        board.set(7, 9, Some(Player::X));
        board.set(8, 9, Some(Player::X));
        board.set(9, 7, Some(Player::X));
        board.set(9, 8, Some(Player::X));

        assert!(detect_double_three(&board, 9, 9, Player::X));
    }

    #[test]
    fn test_single_open_three_is_not_double() {
        let mut board = board_19();
        board.set(7, 9, Some(Player::X));
        board.set(8, 9, Some(Player::X));

        assert!(!detect_double_three(&board, 9, 9, Player::X));
    }

    #[test]
    fn test_blocked_three_does_not_count() {
        let mut board = board_19();
        // Row three is blocked by an O stone at one end; only the column
        // three remains open, so this is not a double-three.
        board.set(7, 9, Some(Player::X));
        board.set(8, 9, Some(Player::X));
        board.set(6, 9, Some(Player::O));
        board.set(9, 7, Some(Player::X));
        board.set(9, 8, Some(Player::X));

        assert!(!detect_double_three(&board, 9, 9, Player::X));
    }

    #[test]
    fn test_hemmed_three_cannot_become_open_four() {
        let mut board = board_19();
        // O . X X [X] . O — both extension cells are empty but the line can
        // never hold an open four, so the row contributes no open three.
        board.set(4, 9, Some(Player::O));
        board.set(6, 9, Some(Player::X));
        board.set(7, 9, Some(Player::X));
        board.set(10, 9, Some(Player::O));
        // The column three is genuinely open; if the hemmed row counted,
        // this placement would be a double-three.
        board.set(8, 7, Some(Player::X));
        board.set(8, 8, Some(Player::X));

        assert!(!detect_double_three(&board, 8, 9, Player::X));
    }

    #[test]
    fn test_split_three_counts() {
        let mut board = board_19();
        // Row: . X X . [X] .  plus column: . X . X [.] handled via gap shape.
        board.set(6, 9, Some(Player::X));
        board.set(7, 9, Some(Player::X));
        // gap at (8, 9), placement at (9, 9)
        board.set(9, 7, Some(Player::X));
        board.set(9, 8, Some(Player::X));

        assert!(detect_double_three(&board, 9, 9, Player::X));
    }

    #[test]
    fn test_double_three_near_edge() {
        let mut board = board_19();
        // Corner placement: the row three hits the left edge and the column
        // shape has no room above row 0, so neither axis yields an open three.
        board.set(0, 0, Some(Player::X));
        board.set(1, 0, Some(Player::X));
        board.set(2, 2, Some(Player::X));
        board.set(2, 3, Some(Player::X));

        assert!(!detect_double_three(&board, 2, 0, Player::X));
    }

    #[test]
    fn test_winning_run_row() {
        let mut board = board_19();
        for x in 4..8 {
            board.set(x, 9, Some(Player::X));
        }
        board.set(8, 9, Some(Player::X));
        assert!(winning_run(&board, 8, 9, Player::X, 5));
        assert!(!winning_run(&board, 8, 9, Player::X, 6));
    }

    #[test]
    fn test_winning_run_counts_both_ways() {
        let mut board = board_19();
        board.set(6, 6, Some(Player::O));
        board.set(7, 7, Some(Player::O));
        board.set(9, 9, Some(Player::O));
        board.set(10, 10, Some(Player::O));
        board.set(8, 8, Some(Player::O));
        assert!(winning_run(&board, 8, 8, Player::O, 5));
    }

    #[test]
    fn test_four_is_not_a_win_at_goal_five() {
        let mut board = board_19();
        for x in 4..7 {
            board.set(x, 3, Some(Player::X));
        }
        board.set(7, 3, Some(Player::X));
        assert!(!winning_run(&board, 7, 3, Player::X, 5));
    }
}
