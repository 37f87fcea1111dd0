//! Default parameters for the engine.
//!
//! Board geometry is dynamic here (it arrives with each request), so these
//! are runtime defaults rather than compile-time dimensions. The search
//! parameters seed [`EngineConfig`](crate::config::EngineConfig) and can be
//! overridden per session or per request.

// =============================================================================
// Board Geometry
// =============================================================================

/// Default board side length when none is supplied (standard gomoku board).
pub const DEFAULT_BOARD_SIZE: usize = 19;

/// Default winning run length ("goal" in requests).
pub const DEFAULT_GOAL: usize = 5;

// =============================================================================
// MCTS (Monte Carlo Tree Search) Parameters
// =============================================================================

/// Default number of simulations per move.
pub const DEFAULT_NUM_SEARCHES: usize = 400;

/// PUCT exploration constant.
pub const DEFAULT_C_PUCT: f32 = 2.0;

/// Number of leaf expansions evaluated per inference call.
pub const DEFAULT_EVAL_BATCH: usize = 8;

/// Default sampling temperature for exploratory root selection.
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

// =============================================================================
// State Encoding
// =============================================================================

/// Number of input planes produced by the encoder.
pub const ENCODING_PLANES: usize = 3;

/// Version tag of the plane layout. Bump when the layout changes so that
/// externally trained evaluators can detect a mismatch.
pub const ENCODING_VERSION: u32 = 1;

// =============================================================================
// Line Axes and Directions
// =============================================================================

/// The four line axes through a cell: horizontal, vertical, both diagonals.
pub const AXES: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// All eight directions from a cell (the four axes, both ways).
pub const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
];
