use crate::cell::Cell;
use crate::config::AgentConfig;
use crate::constraint::Constraint;
use crate::error::AgentError;
use rand::Rng;
use rand::seq::IteratorRandom;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, trace, warn};

/// Largest number of hazards a cell can report.
pub const MAX_ADJACENT: u8 = 8;

/// A move chosen by the agent, tagged with how it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Proven safe by the knowledge base.
    Safe(Cell),
    /// A guess among cells not known to be hazards.
    Random(Cell),
}

impl Move {
    pub fn cell(self) -> Cell {
        match self {
            Move::Safe(cell) | Move::Random(cell) => cell,
        }
    }
}

/// The knowledge base and its inference driver.
///
/// Observations are folded in one at a time through [`record_observation`].
/// Each call makes a single reduction pass over the live constraints; it does
/// not iterate to a fixpoint, so some facts only surface on a later call.
///
/// [`record_observation`]: KnowledgeAgent::record_observation
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct KnowledgeAgent {
    config: AgentConfig,
    /// Cells already probed.
    moves_made: HashSet<Cell>,
    /// Cells proven hazard-free.
    safe: HashSet<Cell>,
    /// Cells proven to hold a hazard.
    hazard: HashSet<Cell>,
    /// Safe cells not yet probed. Ordered so seeded picks are reproducible.
    safe_pending: BTreeSet<Cell>,
    knowledge: Vec<Constraint>,
}

impl KnowledgeAgent {
    pub fn new(height: usize, width: usize) -> Self {
        Self::with_config(AgentConfig::default().with_size(height, width))
    }

    pub fn with_config(config: AgentConfig) -> Self {
        KnowledgeAgent {
            config,
            moves_made: HashSet::new(),
            safe: HashSet::new(),
            hazard: HashSet::new(),
            safe_pending: BTreeSet::new(),
            knowledge: Vec::new(),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn height(&self) -> usize {
        self.config.height
    }

    pub fn width(&self) -> usize {
        self.config.width
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.in_bounds(self.height(), self.width())
    }

    pub fn moves_made(&self) -> &HashSet<Cell> {
        &self.moves_made
    }

    pub fn safe_cells(&self) -> &HashSet<Cell> {
        &self.safe
    }

    pub fn hazard_cells(&self) -> &HashSet<Cell> {
        &self.hazard
    }

    pub fn safe_pending(&self) -> &BTreeSet<Cell> {
        &self.safe_pending
    }

    pub fn knowledge(&self) -> &[Constraint] {
        &self.knowledge
    }

    pub fn is_known_safe(&self, cell: Cell) -> bool {
        self.safe.contains(&cell)
    }

    pub fn is_known_hazard(&self, cell: Cell) -> bool {
        self.hazard.contains(&cell)
    }

    /// Records `cell` as a hazard and removes it from every live constraint.
    pub fn mark_hazard(&mut self, cell: Cell) {
        if self.safe.contains(&cell) {
            warn!(%cell, "ignoring hazard mark on a cell already proven safe");
            return;
        }
        if self.hazard.insert(cell) {
            debug!(%cell, "deduced hazard");
        }
        for constraint in &mut self.knowledge {
            constraint.mark_hazard(cell);
        }
    }

    /// Records `cell` as safe and removes it from every live constraint.
    pub fn mark_safe(&mut self, cell: Cell) {
        if self.hazard.contains(&cell) {
            warn!(%cell, "ignoring safe mark on a cell already proven hazardous");
            return;
        }
        if self.safe.insert(cell) {
            debug!(%cell, "deduced safe");
        }
        for constraint in &mut self.knowledge {
            constraint.mark_safe(cell);
        }
    }

    /// Marks `cell` safe and queues it for an automatic move unless it has
    /// already been probed.
    fn mark_safe_pending(&mut self, cell: Cell) {
        self.mark_safe(cell);
        if self.safe.contains(&cell) && !self.moves_made.contains(&cell) {
            self.safe_pending.insert(cell);
        }
    }

    /// In-bounds 8-neighbors of `cell` that have not been probed yet.
    pub fn neighbors(&self, cell: Cell) -> HashSet<Cell> {
        cell.adjacent(self.height(), self.width())
            .filter(|neighbor| !self.moves_made.contains(neighbor))
            .collect()
    }

    /// Folds the report "`cell` was probed safely and has `count` hazardous
    /// neighbors" into the knowledge base.
    ///
    /// Repeating an observation for an already probed cell is a no-op.
    pub fn record_observation(&mut self, cell: Cell, count: u8) -> Result<(), AgentError> {
        if !self.contains(cell) {
            return Err(AgentError::OutOfBounds {
                cell,
                height: self.height(),
                width: self.width(),
            });
        }
        if count > MAX_ADJACENT {
            return Err(AgentError::InvalidCount {
                cell,
                count,
                max: usize::from(MAX_ADJACENT),
            });
        }
        if self.hazard.contains(&cell) {
            return Err(AgentError::Contradiction { cell });
        }
        if self.moves_made.contains(&cell) {
            trace!(%cell, "repeat observation ignored");
            return Ok(());
        }

        let neighbors = self.neighbors(cell);
        if usize::from(count) > neighbors.len() {
            return Err(AgentError::InvalidCount {
                cell,
                count,
                max: neighbors.len(),
            });
        }

        debug!(%cell, count, unprobed = neighbors.len(), "recording observation");
        self.moves_made.insert(cell);
        self.mark_safe(cell);
        self.safe_pending.remove(&cell);

        if count == 0 {
            for neighbor in neighbors {
                self.mark_safe_pending(neighbor);
            }
            return Ok(());
        }
        let count = usize::from(count);

        let before = self.knowledge.len();
        self.knowledge.retain(|constraint| !constraint.is_empty());
        trace!(dropped = before - self.knowledge.len(), "collected empty constraints");

        let mut subsumed = false;
        let mut staged = Vec::new();

        // Marks below rewrite constraints further along, so each one is read at its turn.
        for index in 0..self.knowledge.len() {
            let cells = self.knowledge[index].cells().clone();
            let known = self.knowledge[index].count();

            let reduction = if cells.is_subset(&neighbors) {
                Some((&neighbors, count, &cells, known))
            } else if neighbors.is_subset(&cells) {
                Some((&cells, known, &neighbors, count))
            } else {
                None
            };

            if let Some((big, big_count, small, small_count)) = reduction {
                subsumed = true;
                let diff: Vec<Cell> = big.difference(small).copied().collect();
                let diff_count = big_count.abs_diff(small_count);

                if diff_count == 0 {
                    for member in diff {
                        self.mark_safe_pending(member);
                    }
                } else if diff.len() == diff_count {
                    for member in diff {
                        self.mark_hazard(member);
                    }
                } else {
                    match Constraint::new(diff, diff_count) {
                        Ok(derived) => staged.push(derived),
                        Err(err) => warn!(%cell, %err, "inconsistent subset reduction"),
                    }
                }
            } else if cells.len() == known {
                for &member in &cells {
                    self.mark_hazard(member);
                }
            } else if known == 0 {
                for &member in &cells {
                    self.mark_safe_pending(member);
                }
            }
        }

        if !subsumed {
            self.learn(Constraint::new(neighbors, count)?);
        }
        for derived in staged {
            self.learn(derived);
        }

        Ok(())
    }

    /// Adds a constraint to the knowledge base.
    ///
    /// The constraint is first reduced against the proven safe and hazard
    /// sets. If what remains is conclusive on its own its cells are marked
    /// directly; otherwise it is appended unless an equal constraint is
    /// already live. Existing constraints are not rescanned.
    ///
    /// This is the only place a new constraint is not appended verbatim: the
    /// raw observation and staged reductions both pass through here, so stale
    /// known cells never enter the knowledge base.
    pub fn learn(&mut self, mut constraint: Constraint) {
        let resolved: Vec<Cell> = constraint
            .cells()
            .iter()
            .copied()
            .filter(|cell| self.safe.contains(cell) || self.hazard.contains(cell))
            .collect();
        for cell in resolved {
            if self.hazard.contains(&cell) {
                constraint.mark_hazard(cell);
            } else {
                constraint.mark_safe(cell);
            }
        }

        if constraint.is_empty() {
            trace!("constraint fully resolved by known cells");
            return;
        }
        if let Some(hazards) = constraint.known_hazards() {
            let hazards: Vec<Cell> = hazards.iter().copied().collect();
            for cell in hazards {
                self.mark_hazard(cell);
            }
            return;
        }
        if let Some(safe) = constraint.known_safe() {
            let safe: Vec<Cell> = safe.iter().copied().collect();
            for cell in safe {
                self.mark_safe_pending(cell);
            }
            return;
        }
        if self.knowledge.contains(&constraint) {
            trace!(%constraint, "duplicate constraint");
            return;
        }

        debug!(%constraint, "learned constraint");
        self.knowledge.push(constraint);
    }

    /// Any proven-safe cell that has not been probed, or `None`.
    pub fn pick_known_safe_move<R: Rng>(&self, rng: &mut R) -> Option<Cell> {
        self.safe_pending.iter().copied().choose(rng)
    }

    /// A uniformly sampled cell that is neither probed nor a known hazard.
    ///
    /// Gives up after `random_move_guard + 1` samples, so a saturated board
    /// yields `None` rather than spinning.
    pub fn pick_random_move<R: Rng>(&self, rng: &mut R) -> Option<Cell> {
        let (height, width) = (self.height(), self.width());
        if height == 0 || width == 0 {
            return None;
        }
        (0..=self.config.random_move_guard).find_map(|_| {
            let cell = Cell::new(rng.random_range(0..height), rng.random_range(0..width));
            (!self.moves_made.contains(&cell) && !self.hazard.contains(&cell)).then_some(cell)
        })
    }

    /// A proven-safe move when one exists, otherwise a random guess.
    pub fn pick_move<R: Rng>(&self, rng: &mut R) -> Option<Move> {
        self.pick_known_safe_move(rng)
            .map(Move::Safe)
            .or_else(|| self.pick_random_move(rng).map(Move::Random))
    }
}
