use crate::cell::Cell;
use thiserror::Error;

/// Precondition violations reported by the knowledge agent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    #[error("cell {cell} is outside the {height}x{width} board")]
    OutOfBounds {
        cell: Cell,
        height: usize,
        width: usize,
    },

    #[error("cell {cell} cannot have {count} hazardous neighbors (at most {max})")]
    InvalidCount { cell: Cell, count: u8, max: usize },

    /// The cell was observed as probed but is already proven hazardous.
    #[error("cell {cell} is a known hazard")]
    Contradiction { cell: Cell },

    #[error("constraint count {count} exceeds its {cells} cells")]
    CountExceedsCells { count: usize, cells: usize },
}

/// Errors building a ground-truth board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board must have at least one row and one column")]
    EmptyBoard,

    #[error("a {height}x{width} board has too many cells")]
    TooLarge { height: usize, width: usize },

    #[error("cannot place {hazards} hazards on {cells} cells")]
    TooManyHazards { hazards: usize, cells: usize },

    #[error("hazard {cell} is outside the board")]
    OutOfBounds { cell: Cell },
}
