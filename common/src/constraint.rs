use crate::cell::Cell;
use crate::error::AgentError;
use itertools::Itertools;
use std::collections::HashSet;
use std::fmt;

/// A single piece of knowledge: exactly `count` of `cells` are hazards.
///
/// Every operation keeps `0 <= count <= cells.len()`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Constraint {
    cells: HashSet<Cell>,
    count: usize,
}

impl Constraint {
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: usize) -> Result<Self, AgentError> {
        let cells: HashSet<Cell> = cells.into_iter().collect();
        if count > cells.len() {
            return Err(AgentError::CountExceedsCells {
                count,
                cells: cells.len(),
            });
        }
        Ok(Constraint { cells, count })
    }

    pub fn cells(&self) -> &HashSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// An empty constraint carries no information.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every remaining cell is a hazard.
    pub fn known_hazards(&self) -> Option<&HashSet<Cell>> {
        (self.cells.len() == self.count).then_some(&self.cells)
    }

    /// No remaining cell is a hazard.
    pub fn known_safe(&self) -> Option<&HashSet<Cell>> {
        (self.count == 0).then_some(&self.cells)
    }

    /// Accounts for `cell` being a hazard. No-op if `cell` is not part of
    /// this constraint.
    pub fn mark_hazard(&mut self, cell: Cell) {
        if self.cells.remove(&cell) {
            // saturating: a hazard inside a zero-count constraint is contradictory input
            self.count = self.count.saturating_sub(1);
        }
    }

    /// Drops a safe `cell`; the count is unchanged. No-op if absent.
    pub fn mark_safe(&mut self, cell: Cell) {
        if self.cells.remove(&cell) {
            self.count = self.count.min(self.cells.len());
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}} = {}",
            self.cells.iter().sorted().join(", "),
            self.count
        )
    }
}
