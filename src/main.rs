//! Candy Racers entry point
//!
//! Runs one full race with the headless collaborators: scripted driving, a
//! manual clock and logging instead of a window. Pass a JSON config path to
//! override the defaults and a seed as the second argument.

use std::process::ExitCode;

use candy_racers::platform::headless::{HeadlessAudio, HeadlessRenderer, ManualClock, ScriptedInput};
use candy_racers::platform::{InputEvent, Key};
use candy_racers::{Game, GameConfig, GameError};

const DEFAULT_SEED: u64 = 0x5EED;

fn load_config(path: Option<&str>) -> Result<GameConfig, GameError> {
    match path {
        Some(path) => GameConfig::load(path),
        None => Ok(GameConfig::default()),
    }
}

/// A lap of arbitrary driving: both players steer while pushing forward
fn script_race(input: &ScriptedInput, frames: usize) {
    for frame in 0..frames {
        let events = match frame % 8 {
            0 => vec![InputEvent::KeyDown(Key::Up), InputEvent::KeyDown(Key::W)],
            3 => vec![InputEvent::KeyDown(Key::Left), InputEvent::KeyDown(Key::D)],
            5 => vec![InputEvent::AxisMotion {
                device: 0,
                axis: 1,
                value: if frame % 16 < 8 { 12_000 } else { -12_000 },
            }],
            _ => Vec::new(),
        };
        input.push(events);
    }
    input.push(vec![InputEvent::Quit]);
}

fn run() -> Result<(), GameError> {
    let args: Vec<String> = std::env::args().collect();
    let config = load_config(args.get(1).map(String::as_str))?;
    let seed = match args.get(2) {
        Some(s) => s
            .parse()
            .map_err(|_| GameError::Config(format!("seed must be an integer, got '{}'", s)))?,
        None => DEFAULT_SEED,
    };

    // Whole race plus a moment on the podium
    let seconds = config.countdown_length + config.game_length + 2.0;
    let frames = (seconds * config.tick_rate_hz).ceil() as usize;

    let input = ScriptedInput::new();
    script_race(&input, frames);

    let mut game = Game::load(
        config,
        seed,
        HeadlessRenderer::new(),
        HeadlessAudio::new(),
        input,
        ManualClock::new(),
    )?;
    game.run();

    for line in game.hud_lines() {
        log::info!("{}", line);
    }
    log::info!(
        "{} frames presented, {} audio calls",
        game.renderer().frames_presented(),
        game.audio().calls().len()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Candy Racers (headless) starting...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
