//! Engine configuration.

use std::time::Duration;

use crate::constants::{
    DEFAULT_C_PUCT, DEFAULT_EVAL_BATCH, DEFAULT_NUM_SEARCHES, DEFAULT_TEMPERATURE,
};

/// How the root action is picked once the search budget is spent.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ActionSelection {
    /// Deterministic competitive play: most-visited child, ties broken by
    /// higher mean value, then by lowest action index.
    BestVisit,
    /// Exploratory play: sample proportional to `visits^(1/temperature)`.
    Temperature(f32),
}

/// Search and orchestration knobs.
///
/// A value of this type is built once from deployment flags and then
/// threaded through the orchestrator; per-request overrides are explicit
/// call parameters, never shared mutable state.
///
/// # Examples
///
/// ```
/// use gomoku_zero::config::{ActionSelection, EngineConfig};
///
/// let config = EngineConfig::new()
///     .with_num_searches(800)
///     .with_selection(ActionSelection::Temperature(1.0));
/// ```
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Simulations per search request.
    pub num_searches: usize,
    /// PUCT exploration constant.
    pub c_puct: f32,
    /// Leaf expansions evaluated per inference call.
    pub eval_batch: usize,
    /// Root action selection mode.
    pub selection: ActionSelection,
    /// Optional wall-clock cap; whichever of budget and deadline triggers
    /// first ends the search.
    pub time_limit: Option<Duration>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            num_searches: DEFAULT_NUM_SEARCHES,
            c_puct: DEFAULT_C_PUCT,
            eval_batch: DEFAULT_EVAL_BATCH,
            selection: ActionSelection::BestVisit,
            time_limit: None,
        }
    }

    pub fn with_num_searches(mut self, num_searches: usize) -> Self {
        self.num_searches = num_searches;
        self
    }

    pub fn with_c_puct(mut self, c_puct: f32) -> Self {
        self.c_puct = c_puct;
        self
    }

    pub fn with_eval_batch(mut self, eval_batch: usize) -> Self {
        self.eval_batch = eval_batch.max(1);
        self
    }

    pub fn with_selection(mut self, selection: ActionSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Default exploratory temperature, for callers that enable sampling
    /// without choosing their own value.
    pub fn exploratory() -> Self {
        Self::new().with_selection(ActionSelection::Temperature(DEFAULT_TEMPERATURE))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
