use itertools::iproduct;
use std::fmt;

/// A coordinate on the board, addressed as `(row, col)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }

    /// Whether this cell lies on a `height` x `width` grid.
    pub fn in_bounds(self, height: usize, width: usize) -> bool {
        self.row < height && self.col < width
    }

    /// All in-bounds cells of the 8-neighborhood, excluding the cell itself.
    /// Corners yield 3 and edges 5.
    pub fn adjacent(self, height: usize, width: usize) -> impl Iterator<Item = Cell> {
        iproduct!(-1isize..=1, -1isize..=1).filter_map(move |(dr, dc)| {
            if dr == 0 && dc == 0 {
                return None;
            }
            let row = self.row.checked_add_signed(dr)?;
            let col = self.col.checked_add_signed(dc)?;
            let neighbor = Cell { row, col };
            neighbor.in_bounds(height, width).then_some(neighbor)
        })
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Cell { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
