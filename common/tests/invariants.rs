use minesweeper_ai::*;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;

fn board_config() -> impl Strategy<Value = BoardConfig> {
    (1usize..7, 1usize..7).prop_flat_map(|(height, width)| {
        (0..=height * width / 3).prop_map(move |hazards| {
            BoardConfig::default()
                .with_size(height, width)
                .with_hazards(hazards)
        })
    })
}

fn assert_agent_invariants(agent: &KnowledgeAgent) {
    for constraint in agent.knowledge() {
        assert!(constraint.count() <= constraint.cells().len(), "{constraint}");
    }
    assert!(agent.safe_cells().is_disjoint(agent.hazard_cells()));
    for cell in agent.safe_pending() {
        assert!(agent.is_known_safe(*cell));
        assert!(!agent.moves_made().contains(cell));
    }
}

proptest! {
    #[test]
    fn prop_invariants_hold_through_a_game(config in board_config(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = Session::new(config, config.agent_config(), &mut rng).unwrap();

        let mut safe: HashSet<Cell> = HashSet::new();
        let mut hazard: HashSet<Cell> = HashSet::new();
        let mut moves: HashSet<Cell> = HashSet::new();

        while session.game_state == GameState::Playing {
            if session.step(&mut rng).unwrap() == StepOutcome::Stuck {
                break;
            }
            let agent = &session.agent;
            assert_agent_invariants(agent);

            // Knowledge only grows
            prop_assert!(safe.is_subset(agent.safe_cells()));
            prop_assert!(hazard.is_subset(agent.hazard_cells()));
            prop_assert!(moves.is_subset(agent.moves_made()));
            safe = agent.safe_cells().clone();
            hazard = agent.hazard_cells().clone();
            moves = agent.moves_made().clone();

            prop_assert!(hazard.is_subset(session.board.hazards()));
            prop_assert!(safe.is_disjoint(session.board.hazards()));
        }
    }

    #[test]
    fn prop_random_move_is_bounded(
        height in 1usize..5,
        width in 1usize..5,
        guard in 0usize..50,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let config = AgentConfig::default()
            .with_size(height, width)
            .with_random_move_guard(guard);
        let mut agent = KnowledgeAgent::with_config(config);

        // Saturate: hazards on a checkerboard, every other cell probed
        let board = Board::from_hazards(
            height,
            width,
            (0..height)
                .flat_map(|row| (0..width).map(move |col| Cell::new(row, col)))
                .filter(|cell| (cell.row + cell.col) % 2 == 0),
        )
        .unwrap();
        for &cell in board.hazards() {
            agent.mark_hazard(cell);
        }
        for row in 0..height {
            for col in 0..width {
                let cell = Cell::new(row, col);
                if !board.is_hazard(cell) {
                    agent.record_observation(cell, board.nearby_hazards(cell)).unwrap();
                }
            }
        }
        assert_agent_invariants(&agent);
        prop_assert_eq!(agent.pick_random_move(&mut rng), None);
    }

    #[test]
    fn prop_mark_is_idempotent(
        cells in proptest::collection::hash_set((0usize..4, 0usize..4), 1..8),
        target in (0usize..4, 0usize..4),
        hazard in any::<bool>(),
    ) {
        let cells: Vec<Cell> = cells.into_iter().map(Cell::from).collect();
        let count = cells.len() / 2;
        let mut once = KnowledgeAgent::new(4, 4);
        once.learn(Constraint::new(cells, count).unwrap());

        let target = Cell::from(target);
        let mark = |agent: &mut KnowledgeAgent| {
            if hazard { agent.mark_hazard(target) } else { agent.mark_safe(target) }
        };
        mark(&mut once);
        let mut twice = once.clone();
        mark(&mut twice);

        prop_assert_eq!(once.knowledge(), twice.knowledge());
        prop_assert_eq!(once.safe_cells(), twice.safe_cells());
        prop_assert_eq!(once.hazard_cells(), twice.hazard_cells());
        assert_agent_invariants(&twice);
    }
}
