//! Board and agent configuration.

use serde::{Deserialize, Serialize};

/// Number of resamples `pick_random_move` makes beyond the first before
/// giving up.
pub const DEFAULT_RANDOM_MOVE_GUARD: usize = 10;

/// Shape of the ground-truth board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub height: usize,
    pub width: usize,
    /// Exact number of hazards placed on the board.
    pub hazards: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            height: 8,
            width: 8,
            hazards: 8,
        }
    }
}

impl BoardConfig {
    pub fn with_size(mut self, height: usize, width: usize) -> Self {
        self.height = height;
        self.width = width;
        self
    }

    pub fn with_hazards(mut self, hazards: usize) -> Self {
        self.hazards = hazards;
        self
    }

    /// An agent config sized to this board.
    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig::default().with_size(self.height, self.width)
    }
}

/// Knobs for the knowledge agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub height: usize,
    pub width: usize,
    /// Bound on resampling in `pick_random_move`.
    pub random_move_guard: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            height: 8,
            width: 8,
            random_move_guard: DEFAULT_RANDOM_MOVE_GUARD,
        }
    }
}

impl AgentConfig {
    pub fn with_size(mut self, height: usize, width: usize) -> Self {
        self.height = height;
        self.width = width;
        self
    }

    pub fn with_random_move_guard(mut self, guard: usize) -> Self {
        self.random_move_guard = guard;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let board = BoardConfig::default();
        assert_eq!((board.height, board.width, board.hazards), (8, 8, 8));

        let agent = AgentConfig::default();
        assert_eq!(agent.random_move_guard, DEFAULT_RANDOM_MOVE_GUARD);
    }

    #[test]
    fn test_agent_config_follows_board_size() {
        let agent = BoardConfig::default().with_size(4, 9).agent_config();
        assert_eq!((agent.height, agent.width), (4, 9));
    }
}
