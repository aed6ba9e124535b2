use crate::agent::{KnowledgeAgent, Move};
use crate::board::Board;
use crate::cell::Cell;
use crate::config::{AgentConfig, BoardConfig};
use rand::Rng;
use tracing::{debug, info};

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// What a single call to [`Session::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The agent probed a cell and survived.
    Revealed { mv: Move, count: u8 },
    /// The agent probed a hazard.
    Exploded(Move),
    /// The agent had no move to offer.
    Stuck,
}

/// A board paired with the agent playing it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Session {
    pub board: Board,
    pub agent: KnowledgeAgent,
    /// Adjacency counts the agent has been shown, indexed `[row][col]`.
    pub revealed: Vec<Vec<Option<u8>>>,
    pub game_state: GameState,
}

impl Session {
    /// Creates a fresh game. `agent_config` is resized to the board.
    pub fn new<R: Rng>(
        board_config: BoardConfig,
        agent_config: AgentConfig,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        let board = Board::new(board_config, rng)?;
        Ok(Self::with_board(board, agent_config))
    }

    /// Wraps an existing board, e.g. one with fixed hazards.
    pub fn with_board(board: Board, agent_config: AgentConfig) -> Self {
        let agent_config = agent_config.with_size(board.height(), board.width());
        Session {
            revealed: vec![vec![None; board.width()]; board.height()],
            agent: KnowledgeAgent::with_config(agent_config),
            board,
            game_state: GameState::Playing,
        }
    }

    /// Deserializes a session from bytes, rejecting blobs whose parts
    /// disagree on the board shape.
    pub fn deserialize(bts: &[u8]) -> anyhow::Result<Self> {
        let session: Self = bcs::from_bytes(bts)?;
        session.validate()?;
        Ok(session)
    }

    /// Checks that the board, the agent and the revealed grid describe the
    /// same `height` x `width` game.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.board.validate()?;
        let (height, width) = (self.board.height(), self.board.width());

        if (self.agent.height(), self.agent.width()) != (height, width) {
            anyhow::bail!(
                "agent is sized {}x{} but the board is {height}x{width}",
                self.agent.height(),
                self.agent.width()
            );
        }
        if self.revealed.len() != height || self.revealed.iter().any(|row| row.len() != width) {
            anyhow::bail!("revealed grid does not match the {height}x{width} board");
        }
        Ok(())
    }

    /// Serializes the session to bytes.
    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    /// Plays one move:
    /// 1. Flags every hazard the agent has proven so far.
    /// 2. Asks the agent for a move, safe first.
    /// 3. Probes it against the board and reports the count back.
    /// 4. Checks for a win.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> anyhow::Result<StepOutcome> {
        if self.game_state != GameState::Playing {
            anyhow::bail!("game_ended");
        }

        self.flag_known_hazards();

        let Some(mv) = self.agent.pick_move(rng) else {
            debug!("agent has no move");
            return Ok(StepOutcome::Stuck);
        };
        let cell = mv.cell();

        if self.board.is_hazard(cell) {
            info!(%cell, "probed a hazard");
            self.game_state = GameState::Lost;
            return Ok(StepOutcome::Exploded(mv));
        }

        let count = self.board.nearby_hazards(cell);
        self.agent.record_observation(cell, count)?;
        self.revealed[cell.row][cell.col] = Some(count);
        self.flag_known_hazards();

        if self.check_win_condition() {
            info!(moves = self.agent.moves_made().len(), "cleared the board");
            self.game_state = GameState::Won;
        }

        Ok(StepOutcome::Revealed { mv, count })
    }

    /// Steps until the game ends or the agent runs out of moves.
    pub fn play<R: Rng>(&mut self, rng: &mut R) -> anyhow::Result<GameState> {
        while self.game_state == GameState::Playing {
            if self.step(rng)? == StepOutcome::Stuck {
                break;
            }
        }
        Ok(self.game_state)
    }

    /// Won once every cell that is not a hazard has been probed.
    pub fn check_win_condition(&self) -> bool {
        let safe_cells = self.board.cell_count() - self.board.hazards().len();
        self.agent.moves_made().len() == safe_cells
    }

    fn flag_known_hazards(&mut self) {
        for &cell in self.agent.hazard_cells() {
            self.board.flag(cell);
        }
    }

    /// Text view of the board as the agent sees it: `#` hidden, `F` proven
    /// hazard, digits for probed cells.
    pub fn render(&self) -> String {
        let mut out = String::from("   ");
        for col in 0..self.board.width() {
            out.push_str(&format!("{:^3}", col));
        }
        out.push_str(&format!("\n  +{}\n", "---".repeat(self.board.width())));

        for (row, cells) in self.revealed.iter().enumerate() {
            out.push_str(&format!("{:^2}|", row));
            for (col, count) in cells.iter().enumerate() {
                let display = match count {
                    Some(n) => format!(" {} ", n),
                    None if self.agent.is_known_hazard(Cell::new(row, col)) => " F ".to_string(),
                    None => " # ".to_string(),
                };
                out.push_str(&display);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_session_initialization() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = BoardConfig::default().with_size(5, 6).with_hazards(3);
        let session = Session::new(config, AgentConfig::default(), &mut rng).unwrap();

        assert_eq!(session.game_state, GameState::Playing);
        assert_eq!(session.agent.height(), 5);
        assert_eq!(session.agent.width(), 6);
        assert!(session.revealed.iter().flatten().all(Option::is_none));
    }

    #[test]
    fn test_all_safe_board_is_won() {
        let mut rng = StdRng::seed_from_u64(9);
        let board = Board::from_hazards(4, 4, []).unwrap();
        let mut session = Session::with_board(board, AgentConfig::default());

        assert_eq!(session.play(&mut rng).unwrap(), GameState::Won);
        assert_eq!(session.agent.moves_made().len(), 16);
        assert!(session.revealed.iter().flatten().all(|c| *c == Some(0)));
    }

    #[test]
    fn test_step_after_game_end_fails() {
        let mut rng = StdRng::seed_from_u64(2);
        let board = Board::from_hazards(1, 1, []).unwrap();
        let mut session = Session::with_board(board, AgentConfig::default());

        session.step(&mut rng).unwrap();
        assert_eq!(session.game_state, GameState::Won);

        let err = session.step(&mut rng).unwrap_err();
        assert_eq!(err.to_string(), "game_ended");
    }

    #[test]
    fn test_single_hazard_cell_is_lost() {
        let mut rng = StdRng::seed_from_u64(2);
        let board = Board::from_hazards(1, 1, [Cell::new(0, 0)]).unwrap();
        let mut session = Session::with_board(board, AgentConfig::default());

        let outcome = session.step(&mut rng).unwrap();
        assert_eq!(outcome, StepOutcome::Exploded(Move::Random(Cell::new(0, 0))));
        assert_eq!(session.game_state, GameState::Lost);
    }

    #[test]
    fn test_known_hazards_are_flagged() {
        let mut rng = StdRng::seed_from_u64(4);
        let board = Board::from_hazards(1, 3, [Cell::new(0, 2)]).unwrap();
        let mut session = Session::with_board(board, AgentConfig::default());

        session.agent.record_observation(Cell::new(0, 0), 0).unwrap();
        session.revealed[0][0] = Some(0);

        // Only (0, 1) is pending, so this step is forced
        let outcome = session.step(&mut rng).unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Revealed {
                mv: Move::Safe(Cell::new(0, 1)),
                count: 1
            }
        );
        assert_eq!(session.game_state, GameState::Won);
        assert!(session.board.won());
        assert!(session.render().contains(" F "));
    }

    fn three_by_three() -> Session {
        let board = Board::from_hazards(3, 3, [Cell::new(2, 2)]).unwrap();
        Session::with_board(board, AgentConfig::default())
    }

    #[test]
    fn test_deserialize_rejects_truncated_revealed_grid() {
        let mut session = three_by_three();
        session.revealed = vec![vec![None]];
        let bts = session.serialize().unwrap();

        let err = Session::deserialize(&bts).unwrap_err();
        assert_eq!(err.to_string(), "revealed grid does not match the 3x3 board");
    }

    #[test]
    fn test_deserialize_rejects_mismatched_agent() {
        let mut session = three_by_three();
        session.agent = KnowledgeAgent::new(2, 5);
        let bts = session.serialize().unwrap();

        let err = Session::deserialize(&bts).unwrap_err();
        assert_eq!(err.to_string(), "agent is sized 2x5 but the board is 3x3");
    }

    #[test]
    fn test_deserialize_rejects_out_of_bounds_flag() {
        let mut session = three_by_three();
        session.board.flag(Cell::new(7, 0));
        let bts = session.serialize().unwrap();

        assert!(Session::deserialize(&bts).is_err());
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut rng = StdRng::seed_from_u64(21);
        let config = BoardConfig::default().with_size(6, 6).with_hazards(4);
        let mut session = Session::new(config, AgentConfig::default(), &mut rng).unwrap();
        for _ in 0..3 {
            if session.game_state != GameState::Playing {
                break;
            }
            session.step(&mut rng).unwrap();
        }

        let bts = session.serialize().unwrap();
        let restored = Session::deserialize(&bts).unwrap();

        assert_eq!(restored.game_state, session.game_state);
        assert_eq!(restored.revealed, session.revealed);
        assert_eq!(restored.board.hazards(), session.board.hazards());
        assert_eq!(restored.agent.moves_made(), session.agent.moves_made());
        assert_eq!(restored.agent.safe_pending(), session.agent.safe_pending());
        assert_eq!(restored.agent.knowledge(), session.agent.knowledge());
    }
}
