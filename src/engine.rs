//! Move/evaluate orchestration on top of the search engine.
//!
//! Two request-level operations: pick the best move for a position (full
//! search), and score one hypothetical move (direct evaluator call, no
//! search). State transitions always go through the rule engine via
//! [`GameState::apply`]; the orchestrator holds no game state of its own,
//! so concurrent sessions can share one engine as long as each session
//! serializes its own requests.

use std::sync::Arc;
use std::time::Instant;

use crate::board::Action;
use crate::config::EngineConfig;
use crate::encode::encode;
use crate::error::{Error, Result};
use crate::eval::Evaluator;
use crate::mcts::{SearchLimits, SearchTree};
use crate::state::{CaptureEvent, GameState};

/// Convert a perspective value in `[-1, 1]` to a win percentage.
pub fn value_to_percentage(value: f32) -> f32 {
    ((value + 1.0) * 50.0).clamp(0.0, 100.0)
}

/// The decision engine: a search configuration plus a shared evaluator.
pub struct Engine {
    evaluator: Arc<dyn Evaluator>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(evaluator: Arc<dyn Evaluator>, config: EngineConfig) -> Self {
        Self { evaluator, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a search from `state` and return the selected action.
    ///
    /// `num_searches_override`, when present, takes precedence over the
    /// configured budget for this call only.
    pub fn get_best_move(
        &self,
        state: &GameState,
        num_searches_override: Option<usize>,
    ) -> Result<Action> {
        let budget = num_searches_override.unwrap_or(self.config.num_searches);
        let mut limits = SearchLimits::budget(budget);
        if let Some(cap) = self.config.time_limit {
            limits = limits.with_deadline(Instant::now() + cap);
        }

        let mut tree = SearchTree::new(state.clone(), self.config.c_puct);
        tree.run(self.evaluator.as_ref(), &limits, self.config.eval_batch)?;
        tree.best_action(self.config.selection)
    }

    /// Authoritative state transition, used after a move is chosen.
    pub fn apply_move(
        &self,
        state: &GameState,
        action: Action,
    ) -> Result<(GameState, CaptureEvent)> {
        state.apply(action)
    }

    /// Score a hypothetical move without searching.
    ///
    /// The candidate is applied via the rule engine (nothing is committed),
    /// the resulting position is evaluated, and the value is negated once:
    /// the evaluator speaks for the player to move in the resulting state,
    /// which is the opponent of the player who placed the candidate. A
    /// rule-decided resulting position short-circuits the evaluator, the
    /// same way terminal leaves do in search.
    pub fn evaluate_position(&self, state: &GameState, candidate: Action) -> Result<f32> {
        let (after, _captures) = state.apply(candidate)?;

        if let Some(outcome) = after.terminal_value() {
            return Ok(-outcome);
        }

        let outputs = self
            .evaluator
            .evaluate(&[encode(&after)])
            .map_err(|e| Error::EvaluatorUnavailable(e.to_string()))?;
        let value = outputs
            .first()
            .map(|o| o.value.clamp(-1.0, 1.0))
            .ok_or_else(|| Error::EvaluatorUnavailable("empty evaluation batch".to_string()))?;
        Ok(-value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Player};
    use crate::eval::HeuristicEvaluator;
    use crate::state::Rules;

    fn engine() -> Engine {
        Engine::new(
            Arc::new(HeuristicEvaluator),
            EngineConfig::new().with_num_searches(100),
        )
    }

    fn forced_win_state() -> (GameState, Action) {
        let mut board = Board::new(5, 5);
        for x in 0..4 {
            board.set(x, 0, Some(Player::X));
            board.set(x, 2, Some(Player::O));
        }
        let state = GameState::from_board(board, Player::X, Rules::default());
        let win = state.board.xy_to_action(4, 0);
        (state, win)
    }

    #[test]
    fn test_best_move_is_legal() {
        let engine = engine();
        let state = GameState::empty(9, 9, Player::X, Rules::default());
        let action = engine.get_best_move(&state, None).unwrap();
        assert!(state.legal_moves().contains(&action));
    }

    #[test]
    fn test_budget_override_is_honored() {
        let engine = engine();
        let state = GameState::empty(5, 5, Player::X, Rules::default());
        // A one-simulation search still returns a legal move.
        let action = engine.get_best_move(&state, Some(1)).unwrap();
        assert!(state.legal_moves().contains(&action));
    }

    #[test]
    fn test_evaluate_and_search_agree_on_forced_win() {
        let engine = engine();
        let (state, win) = forced_win_state();

        let win_value = engine.evaluate_position(&state, win).unwrap();
        assert!((win_value - 1.0).abs() < 1e-6);

        // Any quiet alternative scores strictly lower.
        let other = state.board.xy_to_action(4, 4);
        let other_value = engine.evaluate_position(&state, other).unwrap();
        assert!(win_value > other_value);

        let chosen = engine.get_best_move(&state, None).unwrap();
        assert_eq!(chosen, win);
    }

    #[test]
    fn test_evaluate_occupied_candidate_is_invalid_move() {
        let engine = engine();
        let state = GameState::empty(5, 5, Player::X, Rules::default());
        let (state, _) = state.apply(12).unwrap();
        assert!(matches!(
            engine.evaluate_position(&state, 12),
            Err(Error::InvalidMove { .. })
        ));
    }

    #[test]
    fn test_value_to_percentage_bounds() {
        assert_eq!(value_to_percentage(1.0), 100.0);
        assert_eq!(value_to_percentage(-1.0), 0.0);
        assert_eq!(value_to_percentage(0.0), 50.0);
        assert_eq!(value_to_percentage(3.0), 100.0);
        assert_eq!(value_to_percentage(-3.0), 0.0);
    }

    #[test]
    fn test_no_legal_moves_is_distinct() {
        let engine = engine();
        let mut board = Board::new(3, 3);
        for y in 0..3 {
            for x in 0..3 {
                board.set(x, y, Some(if (x + y) % 2 == 0 { Player::X } else { Player::O }));
            }
        }
        let state = GameState::from_board(board, Player::X, Rules::default());
        assert!(matches!(
            engine.get_best_move(&state, None),
            Err(Error::NoLegalMoves)
        ));
    }
}
