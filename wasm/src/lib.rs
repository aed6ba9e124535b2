use minesweeper_ai as ms;
use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn create_game(height: u8, width: u8, hazards: u8, seed: u64) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut rng = StdRng::seed_from_u64(seed);
    let config = ms::BoardConfig::default()
        .with_size(height as usize, width as usize)
        .with_hazards(hazards as usize);
    let session =
        ms::Session::new(config, config.agent_config(), &mut rng).map_err(|e| e.to_string())?;
    session.serialize().map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn is_won(bts: Vec<u8>) -> Result<bool, String> {
    console_error_panic_hook::set_once();

    let session = ms::Session::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(session.game_state == ms::GameState::Won)
}

/// Lets the agent play one move. The returned session bytes carry a trailing
/// status byte: 0 revealed, 1 hit a hazard, 2 no move available.
#[wasm_bindgen]
pub fn step(bts: Vec<u8>, seed: u64) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut session = ms::Session::deserialize(&bts).map_err(|e| e.to_string())?;
    let mut rng = StdRng::seed_from_u64(seed);
    let outcome = session.step(&mut rng).map_err(|e| e.to_string())?;
    let mut xs = session.serialize().map_err(|e| e.to_string())?;
    xs.push(match outcome {
        ms::StepOutcome::Revealed { .. } => 0,
        ms::StepOutcome::Exploded(_) => 1,
        ms::StepOutcome::Stuck => 2,
    });
    Ok(xs)
}

/// Row-major cell view: -1 hidden, -2 proven hazard, otherwise the count.
#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    let session = ms::Session::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(session
        .revealed
        .iter()
        .enumerate()
        .flat_map(|(row, cells)| {
            let agent = &session.agent;
            cells.iter().enumerate().map(move |(col, cell)| match cell {
                Some(n) => *n as i8,
                None if agent.is_known_hazard(ms::Cell::new(row, col)) => -2,
                None => -1,
            })
        })
        .collect())
}
