//! A knowledge-based minesweeper agent.
//!
//! The agent keeps a set of constraints of the form "exactly `count` of these
//! cells are hazards", fed by `(cell, count)` observations from a driver. Each
//! observation triggers one reduction pass using the subset rule: when one
//! constraint's cells are contained in another's, the cells unique to the
//! larger one hold the difference of the two counts. Cells proven safe queue
//! up as automatic moves; otherwise the agent guesses.
//!
//! [`Board`] and [`Session`] supply the ground truth and a one-step driver
//! around the agent.

pub mod agent;
pub mod board;
pub mod cell;
pub mod config;
pub mod constraint;
pub mod error;
pub mod game;

pub use crate::agent::{KnowledgeAgent, MAX_ADJACENT, Move};
pub use crate::board::Board;
pub use crate::cell::Cell;
pub use crate::config::{AgentConfig, BoardConfig, DEFAULT_RANDOM_MOVE_GUARD};
pub use crate::constraint::Constraint;
pub use crate::error::{AgentError, BoardError};
pub use crate::game::{GameState, Session, StepOutcome};
