#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Critter Defence session.

mod autoplay;
mod logging;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context as _, Result as AnyResult};
use clap::Parser;
use critter_defence_core::{Campaign, WELCOME_BANNER};
use critter_defence_rendering::{AsciiBackend, AsciiGrid, RenderingBackend, SceneRecorder};
use critter_defence_states::{builtin_campaign, Game, SessionConfig};
use critter_defence_world::query;
use log::{info, warn, LevelFilter};

use crate::autoplay::{advance_screens, Autoplayer};

/// Runs a Critter Defence session without a window.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Campaign TOML file. The built-in campaign is played when omitted.
    #[arg(long)]
    campaign: Option<PathBuf>,
    /// Maximum number of frames to simulate.
    #[arg(long, default_value_t = 36_000)]
    frames: u64,
    /// Seconds simulated per frame.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
    /// Seed of the autoplayer and of powerup drops.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Let the autoplayer build towers during gameplay.
    #[arg(long)]
    autoplay: bool,
    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
    /// Print the board as text every N frames. Zero disables it.
    #[arg(long, default_value_t = 0)]
    ascii_every: u64,
}

/// Entry point for the Critter Defence command-line interface.
fn main() -> AnyResult<()> {
    let args = Args::parse();
    logging::init(args.log_level);
    ensure!(args.dt > 0.0, "--dt must be positive (received {})", args.dt);

    let campaign = load_campaign(args.campaign.as_deref())?;
    let config = SessionConfig {
        frame_step: args.dt,
        seed: args.seed,
        ..SessionConfig::default()
    };

    println!("{WELCOME_BANNER}");
    let mut game = Game::new(config, campaign);
    let mut autoplayer = args.autoplay.then(|| Autoplayer::new(args.seed));
    let mut recorder = SceneRecorder::new();
    let mut backend = AsciiBackend::new(AsciiGrid::new(1, 1, 1.0)?, io::stdout());

    for frame in 0..args.frames {
        let commands = match autoplayer.as_mut() {
            Some(player) => player.commands(config.frame_step, &game),
            None => advance_screens(&game),
        };
        game.frame(config.frame_step, &commands);

        if args.ascii_every > 0 && frame % args.ascii_every == 0 {
            backend.set_grid(board_grid(&game)?);
            game.render(&mut recorder);
            backend.present(frame, &recorder.finish())?;
        }

        if game.is_finished() {
            break;
        }
    }

    if !game.is_finished() {
        warn!(
            "frame budget of {} exhausted in {:?}",
            args.frames,
            game.state_kind()
        );
        game.request_exit();
    }

    let context = game.shutdown();
    if let Some(error) = context.last_error() {
        warn!("a part failed to load: {error}");
    }
    let totals = context.totals();
    println!(
        "parts completed: {}, critters killed: {}, critters leaked: {}, frames: {}",
        totals.parts_completed,
        totals.killed,
        totals.leaked,
        context.frame()
    );
    Ok(())
}

fn load_campaign(path: Option<&Path>) -> AnyResult<Campaign> {
    let Some(path) = path else {
        info!("playing the built-in campaign");
        return Ok(builtin_campaign());
    };

    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read campaign {}", path.display()))?;
    let campaign = Campaign::from_toml_str(&source)
        .with_context(|| format!("failed to parse campaign {}", path.display()))?;
    ensure!(
        campaign.parts.len() >= 3,
        "campaign {} defines {} parts, three are required",
        path.display(),
        campaign.parts.len()
    );
    info!("loaded campaign from {}", path.display());
    Ok(campaign)
}

fn board_grid(game: &Game) -> AnyResult<AsciiGrid> {
    let grid = match game.world() {
        Some(world) => {
            let map = query::map(world);
            AsciiGrid::new(map.columns(), map.rows(), map.cell_size())?
        }
        None => AsciiGrid::new(1, 1, 1.0)?,
    };
    Ok(grid)
}
