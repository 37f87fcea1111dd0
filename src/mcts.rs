//! Monte Carlo Tree Search guided by an external policy/value evaluator.
//!
//! The search maintains a tree where each node represents a game position.
//! One simulation runs selection (PUCT descent to a leaf), expansion (one
//! evaluator call provides child priors and a leaf value), and
//! backpropagation (visit/value updates walking back to the root, flipping
//! the value sign every ply).
//!
//! Nodes live in an arena (`Vec`) and refer to each other by index: the
//! parent link is a plain index used only to walk upward during
//! backpropagation, so ownership flows strictly downward and no reference
//! cycles exist. Child states are materialized lazily on first descent.
//!
//! Leaf evaluations are gathered into batches: every leaf picked up in a
//! collection round carries a virtual loss from the moment it is selected,
//! steering subsequent descents of the same round onto different branches,
//! and the whole round is answered by a single [`Evaluator::evaluate`]
//! call.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::board::Action;
use crate::config::ActionSelection;
use crate::encode::{Encoding, encode};
use crate::error::{Error, Result};
use crate::eval::Evaluator;
use crate::state::GameState;

/// Index of a node in the search arena.
pub type NodeId = usize;

/// Sentinel for the root's (nonexistent) edge action.
const NO_ACTION: Action = usize::MAX;

/// Caps for one search invocation. Whichever triggers first ends the
/// search; the result reflects completed simulations only.
#[derive(Clone, Debug, Default)]
pub struct SearchLimits {
    pub simulations: usize,
    pub deadline: Option<Instant>,
    /// Raised by the caller when the request is abandoned (for example the
    /// client disconnected). In-flight work finishes its round; no further
    /// simulations are scheduled.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl SearchLimits {
    /// Pure simulation budget, no wall-clock cap.
    pub fn budget(simulations: usize) -> Self {
        Self {
            simulations,
            ..Self::default()
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn interrupted(&self) -> bool {
        if self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            return true;
        }
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// A node in the search tree.
struct Node {
    /// Position this node represents; `None` until first descent reaches it.
    state: Option<GameState>,
    /// Edge action leading here from the parent (`NO_ACTION` for the root).
    action: Action,
    /// Parent index; non-owning, used only for backpropagation.
    parent: Option<NodeId>,
    /// Child indices, in ascending action order.
    children: Vec<NodeId>,
    /// Prior probability assigned at the parent's expansion.
    prior: f32,
    /// Visit count.
    visits: u32,
    /// Accumulated value, from the perspective of the player who moved
    /// into this node.
    value_sum: f32,
    /// Simulations currently in flight through this node.
    virtual_loss: u32,
    /// Rule-derived outcome for the player to move here, when terminal.
    terminal: Option<f32>,
    /// Whether children have been populated.
    expanded: bool,
}

impl Node {
    fn new(action: Action, parent: Option<NodeId>, prior: f32) -> Self {
        Self {
            state: None,
            action,
            parent,
            children: Vec::new(),
            prior,
            visits: 0,
            value_sum: 0.0,
            virtual_loss: 0,
            terminal: None,
            expanded: false,
        }
    }

    /// Mean value with in-flight simulations counted as losses, from the
    /// perspective of the player choosing among this node's siblings.
    #[inline]
    fn q(&self) -> f32 {
        let n = self.visits + self.virtual_loss;
        if n == 0 {
            0.0
        } else {
            (self.value_sum - self.virtual_loss as f32) / n as f32
        }
    }

    #[inline]
    fn effective_visits(&self) -> u32 {
        self.visits + self.virtual_loss
    }
}

/// Statistics for one root child after a search.
#[derive(Clone, Debug, PartialEq)]
pub struct RootStat {
    pub action: Action,
    pub visits: u32,
    /// Mean backed-up value from the root player's perspective.
    pub q: f32,
    pub prior: f32,
}

/// An arena-allocated search tree rooted at one position.
pub struct SearchTree {
    nodes: Vec<Node>,
    root: NodeId,
    c_puct: f32,
}

impl SearchTree {
    /// Create a tree rooted at `state`.
    pub fn new(state: GameState, c_puct: f32) -> Self {
        let mut node = Node::new(NO_ACTION, None, 1.0);
        node.terminal = state.terminal_value();
        node.state = Some(state);
        Self {
            nodes: vec![node],
            root: 0,
            c_puct,
        }
    }

    /// The position at the root.
    pub fn root_state(&self) -> Result<&GameState> {
        self.state_of(self.root)
    }

    fn state_of(&self, id: NodeId) -> Result<&GameState> {
        self.nodes[id]
            .state
            .as_ref()
            .ok_or_else(|| Error::Internal(format!("node {id} has no materialized state")))
    }

    /// Ensure `id` carries its position and terminal classification.
    fn materialize(&mut self, id: NodeId) -> Result<()> {
        if self.nodes[id].state.is_some() {
            return Ok(());
        }
        let parent = self.nodes[id]
            .parent
            .ok_or_else(|| Error::Internal("unmaterialized node without parent".to_string()))?;
        let action = self.nodes[id].action;
        let (state, _captures) = self.state_of(parent)?.apply(action)?;
        self.nodes[id].terminal = state.terminal_value();
        self.nodes[id].state = Some(state);
        Ok(())
    }

    /// PUCT-select among the children of `id`. Ties resolve to the child
    /// created first, which is the lowest action index.
    fn select_child(&self, id: NodeId) -> NodeId {
        let parent_visits = self.nodes[id].effective_visits();
        let sqrt_parent = (parent_visits as f32).sqrt();

        let mut best = self.nodes[id].children[0];
        let mut best_score = f32::NEG_INFINITY;
        for &child_id in &self.nodes[id].children {
            let child = &self.nodes[child_id];
            let u = self.c_puct * child.prior * sqrt_parent
                / (1.0 + child.effective_visits() as f32);
            let score = child.q() + u;
            if score > best_score {
                best_score = score;
                best = child_id;
            }
        }
        best
    }

    /// Walk from the root to a leaf (unexpanded or terminal node),
    /// applying a virtual loss to every node on the path.
    fn descend(&mut self) -> Result<NodeId> {
        let mut id = self.root;
        self.nodes[id].virtual_loss += 1;
        loop {
            if self.nodes[id].terminal.is_some() || !self.nodes[id].expanded {
                return Ok(id);
            }
            id = self.select_child(id);
            self.materialize(id)?;
            self.nodes[id].virtual_loss += 1;
        }
    }

    /// Populate children of a non-terminal leaf from an evaluator policy:
    /// mask to legal actions, renormalize, one child per legal action. A
    /// position with no legal moves is reclassified as a terminal draw.
    fn expand(&mut self, id: NodeId, policy: &[f32]) -> Result<()> {
        let legal = self.state_of(id)?.legal_moves();
        if legal.is_empty() {
            self.nodes[id].terminal = Some(0.0);
            return Ok(());
        }

        let mass: f32 = legal
            .iter()
            .map(|&a| policy.get(a).copied().unwrap_or(0.0).max(0.0))
            .sum();
        let uniform = 1.0 / legal.len() as f32;

        let mut children = Vec::with_capacity(legal.len());
        for &action in &legal {
            let prior = if mass > 0.0 {
                policy.get(action).copied().unwrap_or(0.0).max(0.0) / mass
            } else {
                uniform
            };
            let child_id = self.nodes.len();
            self.nodes.push(Node::new(action, Some(id), prior));
            children.push(child_id);
        }
        self.nodes[id].children = children;
        self.nodes[id].expanded = true;
        Ok(())
    }

    /// Propagate a leaf value (perspective of the player to move at the
    /// leaf) back to the root, flipping the sign each step and releasing
    /// the virtual losses taken during descent.
    fn backpropagate(&mut self, leaf: NodeId, value: f32) {
        // Stored per node from the perspective of the player who moved in.
        let mut v = -value;
        let mut id = Some(leaf);
        while let Some(i) = id {
            let node = &mut self.nodes[i];
            node.visits += 1;
            node.value_sum += v;
            node.virtual_loss = node.virtual_loss.saturating_sub(1);
            v = -v;
            id = node.parent;
        }
    }

    /// Run simulations until the budget or the deadline is exhausted.
    /// Returns the number of completed simulations.
    pub fn run(
        &mut self,
        evaluator: &dyn Evaluator,
        limits: &SearchLimits,
        eval_batch: usize,
    ) -> Result<usize> {
        if self.nodes[self.root].terminal.is_some() {
            return Err(Error::NoLegalMoves);
        }

        // Expand the root up front so every counted simulation descends
        // into the tree; the root's own evaluation seeds child priors only.
        if !self.nodes[self.root].expanded {
            let encodings = [encode(self.root_state()?)];
            let outputs = evaluator
                .evaluate(&encodings)
                .map_err(|e| Error::EvaluatorUnavailable(e.to_string()))?;
            let output = outputs
                .first()
                .ok_or_else(|| Error::EvaluatorUnavailable("empty evaluation batch".to_string()))?;
            self.expand(self.root, &output.policy)?;
            if self.nodes[self.root].terminal.is_some() {
                // Every placement is forbidden: nothing to search.
                return Err(Error::NoLegalMoves);
            }
        }

        let budget = limits.simulations.max(1);
        let batch_size = eval_batch.max(1);
        let mut completed = 0usize;

        while completed < budget {
            if completed > 0 && limits.interrupted() {
                break;
            }

            let round = (budget - completed).min(batch_size);
            let mut pending: Vec<NodeId> = Vec::with_capacity(round);
            for _ in 0..round {
                let leaf = self.descend()?;
                if let Some(outcome) = self.nodes[leaf].terminal {
                    self.backpropagate(leaf, outcome);
                    completed += 1;
                } else {
                    pending.push(leaf);
                }
            }
            if pending.is_empty() {
                continue;
            }

            let mut encodings: Vec<Encoding> = Vec::with_capacity(pending.len());
            for &leaf in &pending {
                encodings.push(encode(self.state_of(leaf)?));
            }
            let outputs = evaluator
                .evaluate(&encodings)
                .map_err(|e| Error::EvaluatorUnavailable(e.to_string()))?;
            if outputs.len() != pending.len() {
                return Err(Error::EvaluatorUnavailable(format!(
                    "expected {} outputs, got {}",
                    pending.len(),
                    outputs.len()
                )));
            }

            for (&leaf, output) in pending.iter().zip(&outputs) {
                if !self.nodes[leaf].expanded && self.nodes[leaf].terminal.is_none() {
                    self.expand(leaf, &output.policy)?;
                }
                // Expansion can reclassify a dead position as terminal; the
                // rule outcome then overrides the network estimate.
                let value = self.nodes[leaf]
                    .terminal
                    .unwrap_or_else(|| output.value.clamp(-1.0, 1.0));
                self.backpropagate(leaf, value);
                completed += 1;
            }
        }

        Ok(completed)
    }

    /// Per-child statistics at the root, in ascending action order.
    pub fn root_stats(&self) -> Vec<RootStat> {
        self.nodes[self.root]
            .children
            .iter()
            .map(|&id| {
                let child = &self.nodes[id];
                RootStat {
                    action: child.action,
                    visits: child.visits,
                    q: if child.visits == 0 {
                        0.0
                    } else {
                        child.value_sum / child.visits as f32
                    },
                    prior: child.prior,
                }
            })
            .collect()
    }

    /// Total visits recorded at the root.
    pub fn root_visits(&self) -> u32 {
        self.nodes[self.root].visits
    }

    /// Pick the root action once the search is done.
    pub fn best_action(&self, selection: ActionSelection) -> Result<Action> {
        let stats = self.root_stats();
        if stats.is_empty() {
            return Err(Error::NoLegalMoves);
        }

        if let ActionSelection::Temperature(t) = selection {
            if t > 0.0 {
                let weights: Vec<f64> = stats
                    .iter()
                    .map(|s| (s.visits as f64).powf(1.0 / t as f64))
                    .collect();
                let total: f64 = weights.iter().sum();
                if total > 0.0 {
                    let mut target = fastrand::f64() * total;
                    for (stat, w) in stats.iter().zip(&weights) {
                        target -= w;
                        if target <= 0.0 {
                            return Ok(stat.action);
                        }
                    }
                    // Floating-point slack lands on the last candidate.
                    return Ok(stats[stats.len() - 1].action);
                }
                // No visits anywhere: fall through to the deterministic rule.
            }
        }

        // Most visits, ties by higher Q, then by lowest action index (the
        // stats are already in ascending action order, so strict "better"
        // comparisons keep the earliest).
        let mut best = &stats[0];
        for stat in &stats[1..] {
            let better = stat.visits > best.visits
                || (stat.visits == best.visits && stat.q > best.q);
            if better {
                best = stat;
            }
        }
        Ok(best.action)
    }

    /// Re-root the tree below `action`, keeping that subtree's statistics
    /// for the next search. Nodes outside the subtree stay allocated but
    /// unreachable; the arena's lifetime is bounded by the request.
    pub fn advance_root(&mut self, action: Action) -> Result<()> {
        let child = self.nodes[self.root]
            .children
            .iter()
            .copied()
            .find(|&id| self.nodes[id].action == action)
            .ok_or_else(|| Error::Internal(format!("action {action} is not a root child")))?;
        self.materialize(child)?;
        self.nodes[child].parent = None;
        self.root = child;
        Ok(())
    }
}
