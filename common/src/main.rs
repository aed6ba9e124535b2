use clap::Parser;
use minesweeper_ai::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::thread;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Autonomous minesweeper bot driven by a knowledge-based agent
#[derive(Parser, Debug)]
#[command(name = "minesweeper-ai")]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value_t = 8)]
    height: usize,

    #[arg(long, default_value_t = 8)]
    width: usize,

    /// Number of hazards on the board
    #[arg(long, default_value_t = 8)]
    hazards: usize,

    /// Seed for hazard placement and move choice (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between moves, to make the game watchable
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    // --- 1. Initialization ---
    let board_config = BoardConfig::default()
        .with_size(cli.height, cli.width)
        .with_hazards(cli.hazards);
    let mut session = Session::new(board_config, board_config.agent_config(), &mut rng)?;

    println!("--- Autonomous Minesweeper Bot ---");
    println!("Strategy: play cells the knowledge base proves safe, guess randomly otherwise.");
    println!("Hazards:");
    print!("{}", session.board);

    // --- 2. Game Loop ---
    let mut move_count = 0;
    while session.game_state == GameState::Playing {
        move_count += 1;
        println!("\n--- Move #{} ---", move_count);

        match session.step(&mut rng)? {
            StepOutcome::Revealed { mv, count } => {
                match mv {
                    Move::Safe(cell) => println!("Knowledge proves {cell} safe."),
                    Move::Random(cell) => println!("No proven safe cell. Guessing {cell}..."),
                }
                println!("Revealed {count}.");
            }
            StepOutcome::Exploded(mv) => println!("Bot probed {} and hit a hazard.", mv.cell()),
            StepOutcome::Stuck => {
                println!("No valid moves left for the bot to make.");
                break;
            }
        }
        print!("{}", session.render());

        thread::sleep(Duration::from_millis(cli.delay_ms));
    }

    // --- 3. Final Result ---
    println!("\n--- Game Over ---");
    println!(
        "Proven hazards: {} of {} (all flagged: {})",
        session.agent.hazard_cells().len(),
        session.board.hazards().len(),
        session.board.won()
    );

    match session.game_state {
        GameState::Won => println!("Result: The bot won!"),
        GameState::Lost => println!("Result: The bot hit a hazard and lost."),
        GameState::Playing => println!("Result: The game ended unexpectedly."),
    }

    Ok(())
}
