//! Whole-session runs through `Game` with headless collaborators

use candy_racers::config::SoundPaths;
use candy_racers::platform::headless::{
    AudioCall, HeadlessAudio, HeadlessRenderer, ManualClock, ScriptedInput,
};
use candy_racers::platform::{Clock, InputEvent, Key};
use candy_racers::sim::RacePhase;
use candy_racers::{Game, GameConfig, GameError};

type TestGame = Game<HeadlessRenderer, HeadlessAudio, ScriptedInput, ManualClock>;

const DT: f64 = 0.05;

fn new_game(seed: u64) -> (TestGame, ScriptedInput, ManualClock) {
    let input = ScriptedInput::new();
    let clock = ManualClock::new();
    let renderer = HeadlessRenderer::new()
        .with_size("models/arnaud.png", glam::Vec2::new(80.0, 40.0))
        .with_size("models/unai.png", glam::Vec2::new(80.0, 40.0));
    let game = Game::load(
        GameConfig::default(),
        seed,
        renderer,
        HeadlessAudio::new(),
        input.clone(),
        clock.clone(),
    )
    .unwrap();
    (game, input, clock)
}

fn advance(game: &mut TestGame, clock: &ManualClock, seconds: f64) {
    let frames = (seconds / DT).round() as usize;
    for _ in 0..frames {
        clock.advance(DT);
        assert!(game.step());
    }
}

fn plays(calls: &[AudioCall], path: &str) -> Vec<usize> {
    calls
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == AudioCall::Play(path.to_string()))
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn test_full_race_cue_sequence() {
    let (mut game, _, clock) = new_game(11);
    let sounds = SoundPaths::default();

    advance(&mut game, &clock, 5.2);
    assert_eq!(game.state().phase(), RacePhase::Race);
    advance(&mut game, &clock, 15.2);
    assert_eq!(game.state().phase(), RacePhase::RaceOver);

    let calls = game.audio().calls();
    assert_eq!(calls.first(), Some(&AudioCall::MusicStop));
    assert_eq!(plays(calls, &sounds.countdown_beep).len(), 3);
    assert_eq!(plays(calls, &sounds.race_start).len(), 1);
    assert_eq!(plays(calls, &sounds.last_lap).len(), 1);
    assert_eq!(plays(calls, &sounds.final_countdown).len(), 5);
    assert_eq!(plays(calls, &sounds.finish).len(), 1);

    let music = calls
        .iter()
        .position(|c| *c == AudioCall::MusicStart(sounds.music.clone()))
        .unwrap();
    let last_lap = plays(calls, &sounds.last_lap)[0];
    let finish = plays(calls, &sounds.finish)[0];
    assert!(plays(calls, &sounds.race_start)[0] < music);
    assert!(music < last_lap && last_lap < finish);
    assert!(!game.audio().music_playing());

    let texts = game.renderer().last_texts();
    assert!(texts.iter().any(|t| t.starts_with("1st: ")));
    assert!(texts.contains(&"Press R to restart"));
}

#[test]
fn test_forced_pickup_wins_the_race() {
    let (mut game, _, clock) = new_game(12);
    advance(&mut game, &clock, 5.2);

    let target = game.state().cars[1].body.position;
    game.state_mut().candy.body.position = target;
    advance(&mut game, &clock, 0.05);
    let pickups = plays(game.audio().calls(), &SoundPaths::default().pickup).len();
    assert!(pickups >= 1);
    assert!(game.state().race.scores[1] >= 1);

    advance(&mut game, &clock, 15.0);
    assert_eq!(game.state().phase(), RacePhase::RaceOver);
    let race = &game.state().race;
    let best = race.scores.iter().copied().max().unwrap();
    for (car, score) in race.scores.iter().enumerate() {
        if *score == best {
            assert_eq!(race.ranks[car], Some(0));
        }
    }
}

#[test]
fn test_restart_key_after_race_over() {
    let (mut game, input, clock) = new_game(13);
    advance(&mut game, &clock, 21.0);
    assert_eq!(game.state().phase(), RacePhase::RaceOver);

    input.push(vec![InputEvent::KeyDown(Key::R)]);
    advance(&mut game, &clock, 0.05);
    assert_eq!(game.state().phase(), RacePhase::Countdown);
    assert!(game.state().race.scores.iter().all(|s| *s == 0));
    assert!(game.state().race.ranks.iter().all(Option::is_none));
    assert!(game.state().candy.is_off_stage());
    assert!(
        game.renderer()
            .last_texts()
            .iter()
            .any(|t| t.starts_with("Get ready"))
    );
}

#[test]
fn test_cars_drive_after_race_over() {
    let (mut game, input, clock) = new_game(14);
    advance(&mut game, &clock, 21.0);
    assert_eq!(game.state().phase(), RacePhase::RaceOver);

    let before = game.state().cars[0].body.position;
    input.push(vec![InputEvent::KeyDown(Key::Up)]);
    advance(&mut game, &clock, 0.05);
    let after = game.state().cars[0].body.position;
    assert!((after - before).length() > 9.0);
}

#[test]
fn test_quit_event_ends_run() {
    let (mut game, input, clock) = new_game(15);
    for _ in 0..10 {
        input.push(Vec::new());
    }
    input.push(vec![InputEvent::KeyDown(Key::Escape)]);
    game.run();
    assert!(game.is_quit());
    assert_eq!(game.state().time_ticks, 10);
    assert!((clock.now() - 0.5).abs() < 1e-9);
    assert_eq!(game.renderer().frames_presented(), 10);
}

#[test]
fn test_same_seed_same_session() {
    let (mut a, input_a, clock_a) = new_game(77);
    let (mut b, input_b, clock_b) = new_game(77);
    for frame in 0..200 {
        let events = match frame % 5 {
            0 => vec![InputEvent::KeyDown(Key::Up)],
            2 => vec![InputEvent::AxisMotion {
                device: 1,
                axis: 0,
                value: 20_000,
            }],
            _ => Vec::new(),
        };
        input_a.push(events.clone());
        input_b.push(events);
    }
    advance(&mut a, &clock_a, 10.0);
    advance(&mut b, &clock_b, 10.0);

    assert_eq!(a.audio().calls(), b.audio().calls());
    assert_eq!(a.state().car_positions(), b.state().car_positions());
    assert_eq!(a.state().candy.body.position, b.state().candy.body.position);
    assert_eq!(a.state().bubbles.len(), b.state().bubbles.len());
}

#[test]
fn test_missing_font_is_fatal() {
    let config = GameConfig::default();
    let renderer = HeadlessRenderer::new().with_missing(&config.font);
    let err = Game::load(
        config,
        1,
        renderer,
        HeadlessAudio::new(),
        ScriptedInput::new(),
        ManualClock::new(),
    )
    .err()
    .unwrap();
    assert!(matches!(err, GameError::AssetLoad { .. }));
    assert!(err.to_string().contains("font"));
}
