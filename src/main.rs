//! Gomoku-Zero: a five-in-a-row MCTS engine.
//!
//! ## Usage
//!
//! - `gomoku-zero serve` - Answer JSON move/evaluate requests over stdio
//! - `gomoku-zero demo` - Run a short self-play demonstration

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use gomoku_zero::board::Player;
use gomoku_zero::config::{ActionSelection, EngineConfig};
use gomoku_zero::constants::DEFAULT_NUM_SEARCHES;
use gomoku_zero::engine::Engine;
use gomoku_zero::eval::HeuristicEvaluator;
use gomoku_zero::mcts::{SearchLimits, SearchTree};
use gomoku_zero::protocol::Session;
use gomoku_zero::state::{GameState, Rules};

/// Gomoku-Zero: a five-in-a-row MCTS engine
#[derive(Parser)]
#[command(name = "gomoku-zero")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve JSON move/evaluate requests over stdin/stdout
    Serve {
        /// Simulations per move (requests may override per call)
        #[arg(long, default_value_t = DEFAULT_NUM_SEARCHES)]
        num_searches: usize,
        /// Wall-clock cap per search, in milliseconds
        #[arg(long)]
        time_limit_ms: Option<u64>,
        /// Sample the root move proportionally to visit counts instead of
        /// playing the most-visited one
        #[arg(long)]
        temperature: Option<f32>,
    },
    /// Run a short self-play demonstration
    Demo,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve {
            num_searches,
            time_limit_ms,
            temperature,
        }) => {
            let mut config = EngineConfig::new().with_num_searches(num_searches);
            if let Some(ms) = time_limit_ms {
                config = config.with_time_limit(Duration::from_millis(ms));
            }
            if let Some(t) = temperature {
                config = config.with_selection(ActionSelection::Temperature(t));
            }

            let engine = Engine::new(Arc::new(HeuristicEvaluator), config);
            let session = Session::new(engine);
            let stdin = io::stdin();
            session
                .run(stdin.lock(), io::stdout())
                .context("session loop failed")?;
        }
        Some(Commands::Demo) | None => run_demo()?,
    }

    Ok(())
}

fn run_demo() -> Result<()> {
    println!("Gomoku-Zero: five-in-a-row MCTS engine\n");

    let rules = Rules {
        goal: 5,
        capture: true,
        double_three: true,
    };
    let mut state = GameState::empty(15, 15, Player::X, rules);

    // One tree per game, re-rooted after every move so statistics carry
    // over between plies.
    let mut tree = SearchTree::new(state.clone(), EngineConfig::new().c_puct);
    let evaluator = HeuristicEvaluator;

    println!("Playing 8 self-play moves at 100 simulations each...\n");
    for ply in 0..8 {
        tree.run(&evaluator, &SearchLimits::budget(100), 8)
            .context("search failed")?;
        let action = tree.best_action(ActionSelection::BestVisit)?;
        let (x, y) = state.board.action_to_xy(action);
        println!("Move {}: {} plays ({x}, {y})", ply + 1, state.next_player);

        let (next, captures) = state.apply(action)?;
        if !captures.stones.is_empty() {
            println!("  captured {:?}", captures.stones);
        }
        tree.advance_root(action)?;
        state = next;

        if state.winner.is_some() {
            break;
        }
    }

    println!("\n{}", state.board);
    if let Some(winner) = state.winner {
        println!("Winner: {winner}");
    }
    Ok(())
}
