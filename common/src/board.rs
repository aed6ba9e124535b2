use crate::cell::Cell;
use crate::config::BoardConfig;
use crate::error::BoardError;
use rand::Rng;
use std::collections::HashSet;
use std::fmt;

/// Ground truth for one game: where the hazards are.
///
/// Only the driver reads this; the agent learns about it solely through
/// adjacency counts.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Board {
    height: usize,
    width: usize,
    hazards: HashSet<Cell>,
    /// Hazards the player has flagged so far.
    hazards_found: HashSet<Cell>,
}

impl Board {
    /// Places exactly `config.hazards` hazards uniformly at random.
    pub fn new<R: Rng>(config: BoardConfig, rng: &mut R) -> Result<Self, BoardError> {
        let BoardConfig {
            height,
            width,
            hazards: hazard_count,
        } = config;
        let cells = checked_cell_count(height, width)?;
        if hazard_count > cells {
            return Err(BoardError::TooManyHazards {
                hazards: hazard_count,
                cells,
            });
        }

        let mut hazards = HashSet::with_capacity(hazard_count);
        while hazards.len() != hazard_count {
            hazards.insert(Cell::new(
                rng.random_range(0..height),
                rng.random_range(0..width),
            ));
        }

        Ok(Board {
            height,
            width,
            hazards,
            hazards_found: HashSet::new(),
        })
    }

    /// Builds a board with hazards at fixed positions.
    pub fn from_hazards(
        height: usize,
        width: usize,
        hazards: impl IntoIterator<Item = Cell>,
    ) -> Result<Self, BoardError> {
        let board = Board {
            height,
            width,
            hazards: hazards.into_iter().collect(),
            hazards_found: HashSet::new(),
        };
        board.validate()?;
        Ok(board)
    }

    /// Checks the shape invariants a constructed board holds: a non-empty
    /// grid whose cell count fits in `usize`, with every hazard and flag in
    /// bounds. Needed for boards that arrive as bytes.
    pub fn validate(&self) -> Result<(), BoardError> {
        checked_cell_count(self.height, self.width)?;
        let out_of_bounds = self
            .hazards
            .iter()
            .chain(&self.hazards_found)
            .find(|cell| !cell.in_bounds(self.height, self.width));
        match out_of_bounds {
            Some(&cell) => Err(BoardError::OutOfBounds { cell }),
            None => Ok(()),
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn hazards(&self) -> &HashSet<Cell> {
        &self.hazards
    }

    pub fn hazards_found(&self) -> &HashSet<Cell> {
        &self.hazards_found
    }

    pub fn cell_count(&self) -> usize {
        // cannot overflow: `validate` holds for every board
        self.height * self.width
    }

    pub fn is_hazard(&self, cell: Cell) -> bool {
        self.hazards.contains(&cell)
    }

    /// Number of hazards among the in-bounds 8-neighbors of `cell`.
    pub fn nearby_hazards(&self, cell: Cell) -> u8 {
        let count = cell
            .adjacent(self.height, self.width)
            .filter(|neighbor| self.hazards.contains(neighbor))
            .count();
        // at most 8 neighbors
        count as u8
    }

    /// Records that the player has identified `cell` as a hazard.
    pub fn flag(&mut self, cell: Cell) {
        self.hazards_found.insert(cell);
    }

    /// Won once the flagged set is exactly the hazard set.
    pub fn won(&self) -> bool {
        self.hazards_found == self.hazards
    }
}

fn checked_cell_count(height: usize, width: usize) -> Result<usize, BoardError> {
    if height == 0 || width == 0 {
        return Err(BoardError::EmptyBoard);
    }
    height
        .checked_mul(width)
        .ok_or(BoardError::TooLarge { height, width })
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = format!("{}-", "--".repeat(self.width));
        for row in 0..self.height {
            writeln!(f, "{rule}")?;
            for col in 0..self.width {
                let mark = if self.is_hazard(Cell::new(row, col)) { 'X' } else { ' ' };
                write!(f, "|{mark}")?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "{rule}")
    }
}
