//! Evaluator boundary: batched policy/value inference.
//!
//! The search engine only needs the [`Evaluator`] contract — encode a batch
//! of positions, get back a per-cell move distribution and a scalar value in
//! `[-1, 1]` from the perspective of the player to move. The network
//! runtime behind the contract (ONNX session, remote service, ...) lives
//! outside this crate and is swappable without touching search logic.
//!
//! [`HeuristicEvaluator`] is the built-in adapter: a prior over cells built
//! from stone proximity, bracket-capture opportunities, and opening
//! centrality, with a neutral value head. It keeps the demo and the test
//! suite free of any inference runtime while exercising the same code
//! paths a network evaluator would.

use thiserror::Error;

use crate::constants::DIRECTIONS;
use crate::encode::Encoding;

/// Failure inside an evaluator implementation. The engine maps this to its
/// `EvaluatorUnavailable` condition and never guesses a move instead.
#[derive(Error, Debug)]
pub enum EvaluatorError {
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("evaluator rejected input: {0}")]
    BadInput(String),
}

/// Network output for one position.
#[derive(Clone, Debug)]
pub struct Evaluation {
    /// Move probabilities over all `rows * cols` cells, illegal cells
    /// included. Non-negative; the search renormalizes over legal actions.
    pub policy: Vec<f32>,
    /// Estimated outcome in `[-1, 1]` for the player to move.
    pub value: f32,
}

/// Batched policy/value inference over encoded positions.
///
/// Implementations must accept any batch size >= 1 and must keep
/// concurrent calls isolated from each other; beyond the pure
/// input-to-output mapping no statelessness is assumed.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, batch: &[Encoding]) -> Result<Vec<Evaluation>, EvaluatorError>;
}

// Prior weights for the heuristic policy.
const PRIOR_BASE: f32 = 1.0;
const PRIOR_NEAR: f32 = 8.0;
const PRIOR_CAPTURE: f32 = 60.0;

/// Hand-rolled prior with a neutral value head.
///
/// Empty cells near existing stones are preferred, cells completing a
/// bracket capture strongly so, and on an empty board the prior decays
/// with distance from the center.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicEvaluator;

impl HeuristicEvaluator {
    fn policy_for(&self, enc: &Encoding) -> Vec<f32> {
        let (rows, cols) = (enc.rows, enc.cols);
        let area = rows * cols;
        let own = enc.plane(0);
        let opp = enc.plane(1);
        let plane_at = |plane: &[f32], x: i32, y: i32| -> bool {
            if x < 0 || y < 0 || x as usize >= cols || y as usize >= rows {
                return false;
            }
            plane[y as usize * cols + x as usize] > 0.0
        };
        let occupied = |x: i32, y: i32| plane_at(own, x, y) || plane_at(opp, x, y);
        let board_empty = own.iter().chain(opp.iter()).all(|&v| v == 0.0);

        let mut weights = vec![0.0f32; area];
        for y in 0..rows as i32 {
            for x in 0..cols as i32 {
                let i = y as usize * cols + x as usize;
                if occupied(x, y) {
                    continue;
                }

                if board_empty {
                    // Opening prior: prefer the middle of the board.
                    let dx = (x - cols as i32 / 2).abs();
                    let dy = (y - rows as i32 / 2).abs();
                    let d = 1.0 + dx.max(dy) as f32;
                    weights[i] = PRIOR_BASE / (d * d);
                    continue;
                }

                let mut weight = PRIOR_BASE;

                'scan: for dy in -2..=2 {
                    for dx in -2..=2 {
                        if (dx != 0 || dy != 0) && occupied(x + dx, y + dy) {
                            weight = PRIOR_NEAR;
                            break 'scan;
                        }
                    }
                }

                // Bracket capture: own, opp, opp completed by this stone.
                for &(dx, dy) in &DIRECTIONS {
                    if plane_at(opp, x + dx, y + dy)
                        && plane_at(opp, x + 2 * dx, y + 2 * dy)
                        && plane_at(own, x + 3 * dx, y + 3 * dy)
                    {
                        weight += PRIOR_CAPTURE;
                    }
                }

                weights[i] = weight;
            }
        }

        let total: f32 = weights.iter().sum();
        if total > 0.0 {
            for w in &mut weights {
                *w /= total;
            }
        }
        weights
    }
}

impl Evaluator for HeuristicEvaluator {
    fn evaluate(&self, batch: &[Encoding]) -> Result<Vec<Evaluation>, EvaluatorError> {
        if batch.is_empty() {
            return Err(EvaluatorError::BadInput("empty batch".to_string()));
        }
        Ok(batch
            .iter()
            .map(|enc| Evaluation {
                policy: self.policy_for(enc),
                value: 0.0,
            })
            .collect())
    }
}
