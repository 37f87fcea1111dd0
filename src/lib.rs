//! Gomoku-Zero: a five-in-a-row decision engine.
//!
//! This crate picks moves for gomoku played with two optional rule
//! extensions — bracket capture and the double-three restriction — using
//! Monte Carlo Tree Search guided by an external policy/value evaluator.
//!
//! ## Modules
//!
//! - [`board`] - Grid primitives (players, cells, actions)
//! - [`rules`] - Capture, double-three, and winning-run checks
//! - [`state`] - Immutable per-ply game state and move application
//! - [`encode`] - Tensor projection of a position for the evaluator
//! - [`eval`] - Evaluator boundary and the built-in heuristic adapter
//! - [`mcts`] - PUCT tree search with batched leaf evaluation
//! - [`engine`] - Move/evaluate orchestration
//! - [`protocol`] - JSON request/response shapes and the session loop
//! - [`config`] - Engine configuration
//! - [`error`] - Error taxonomy
//! - [`constants`] - Default parameters
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use gomoku_zero::board::Player;
//! use gomoku_zero::config::EngineConfig;
//! use gomoku_zero::engine::Engine;
//! use gomoku_zero::eval::HeuristicEvaluator;
//! use gomoku_zero::state::{GameState, Rules};
//!
//! // Set up an engine with the built-in evaluator.
//! let engine = Engine::new(
//!     Arc::new(HeuristicEvaluator),
//!     EngineConfig::new().with_num_searches(50),
//! );
//!
//! // Ask for a move on an empty 9x9 board.
//! let state = GameState::empty(9, 9, Player::X, Rules::default());
//! let action = engine.get_best_move(&state, None).unwrap();
//! assert!(state.legal_moves().contains(&action));
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod encode;
pub mod engine;
pub mod error;
pub mod eval;
pub mod mcts;
pub mod protocol;
pub mod rules;
pub mod state;
