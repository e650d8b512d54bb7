//! Race flow: WAITING -> COUNTDOWN -> RACE -> RACE_OVER
//!
//! The machine owns the scores and the final podium. Effects on the rest of
//! the world (parking the candy, music, sound cues) are pushed as
//! [`GameEvent`]s for the session to apply or forward.

use serde::{Deserialize, Serialize};

use super::state::GameEvent;
use crate::config::GameConfig;

/// Number of ranked podium slots
pub const PODIUM_SIZE: usize = 3;

/// Current phase of the race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacePhase {
    /// Runs its entry actions, then hands over to the countdown on the next tick
    Waiting,
    /// Pre-start countdown; candy is parked
    Countdown,
    /// Candy is live and scoring
    Race,
    /// Podium is shown until a restart
    RaceOver,
}

/// Phase durations and cue thresholds (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceTiming {
    pub countdown_length: f32,
    pub game_length: f32,
    pub prestart_cue_secs: f32,
    pub last_lap_secs: f32,
    pub final_countdown_secs: f32,
}

impl RaceTiming {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            countdown_length: config.countdown_length,
            game_length: config.game_length,
            prestart_cue_secs: config.prestart_cue_secs,
            last_lap_secs: config.last_lap_secs,
            final_countdown_secs: config.final_countdown_secs,
        }
    }
}

/// Compute podium ranks from final scores.
///
/// Slot `k` goes to every car whose score equals the `k`-th highest distinct
/// score, so tied cars share a rank. Cars below the third distinct score are
/// unranked.
pub fn podium(scores: &[u32]) -> Vec<Option<usize>> {
    let mut distinct = scores.to_vec();
    distinct.sort_unstable_by(|a, b| b.cmp(a));
    distinct.dedup();
    distinct.truncate(PODIUM_SIZE);
    scores
        .iter()
        .map(|score| distinct.iter().position(|d| d == score))
        .collect()
}

/// Race state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceState {
    pub phase: RacePhase,
    /// Seconds since the last transition
    pub phase_time: f32,
    /// Candies collected, by car index
    pub scores: Vec<u32>,
    /// Podium slot by car index, set on entering `RaceOver`
    pub ranks: Vec<Option<usize>>,
    pub timing: RaceTiming,
    /// Last whole second announced in the current phase
    last_beep: Option<u32>,
}

impl RaceState {
    /// Create the machine in `Waiting`; entry effects go to `events`
    pub fn new(num_cars: usize, timing: RaceTiming, events: &mut Vec<GameEvent>) -> Self {
        let mut race = Self {
            phase: RacePhase::Waiting,
            phase_time: 0.0,
            scores: vec![0; num_cars],
            ranks: vec![None; num_cars],
            timing,
            last_beep: None,
        };
        race.enter(RacePhase::Waiting, events);
        race
    }

    /// Explicit restart request, valid from any phase
    pub fn restart(&mut self, events: &mut Vec<GameEvent>) {
        self.enter(RacePhase::Waiting, events);
    }

    /// Seconds left in the current timed phase
    pub fn time_left(&self) -> Option<f32> {
        match self.phase {
            RacePhase::Countdown => Some(self.timing.countdown_length - self.phase_time),
            RacePhase::Race => Some(self.timing.game_length - self.phase_time),
            RacePhase::Waiting | RacePhase::RaceOver => None,
        }
    }

    /// Count a candy for `car`. Only the race phase scores.
    pub fn record_pickup(&mut self, car: usize) -> bool {
        if self.phase != RacePhase::Race {
            return false;
        }
        match self.scores.get_mut(car) {
            Some(score) => {
                *score += 1;
                true
            }
            None => false,
        }
    }

    fn enter(&mut self, phase: RacePhase, events: &mut Vec<GameEvent>) {
        self.phase = phase;
        self.phase_time = 0.0;
        self.last_beep = None;

        match phase {
            RacePhase::Waiting => {
                self.scores.iter_mut().for_each(|s| *s = 0);
                self.ranks.iter_mut().for_each(|r| *r = None);
                events.push(GameEvent::CandyOffStage);
                events.push(GameEvent::MusicStop);
            }
            RacePhase::Countdown => {}
            RacePhase::Race => {
                events.push(GameEvent::RaceStarted);
                events.push(GameEvent::MusicStart);
            }
            RacePhase::RaceOver => {
                self.ranks = podium(&self.scores);
                events.push(GameEvent::CandyOffStage);
                events.push(GameEvent::MusicStop);
                events.push(GameEvent::RaceFinished {
                    scores: self.scores.clone(),
                    ranks: self.ranks.clone(),
                });
                log::info!("Race over: scores {:?}, ranks {:?}", self.scores, self.ranks);
            }
        }

        log::info!("Race phase -> {:?}", phase);
        events.push(GameEvent::PhaseChanged(phase));
    }

    /// Announce each whole second once as `time_left` drops below `threshold`
    fn beep(&mut self, time_left: f32, threshold: f32) -> Option<u32> {
        if time_left > threshold {
            return None;
        }
        let second = time_left.ceil().max(0.0) as u32;
        if second == 0 || self.last_beep == Some(second) {
            return None;
        }
        self.last_beep = Some(second);
        Some(second)
    }

    /// Advance the clock and take any due transition
    pub fn update(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        if self.phase == RacePhase::Waiting {
            self.enter(RacePhase::Countdown, events);
        }

        let left_before = self.time_left();
        self.phase_time += dt.max(0.0);
        let timing = self.timing;

        match self.phase {
            RacePhase::Countdown => {
                if self.phase_time >= timing.countdown_length {
                    self.enter(RacePhase::Race, events);
                } else if let Some(second) =
                    self.beep(timing.countdown_length - self.phase_time, timing.prestart_cue_secs)
                {
                    events.push(GameEvent::CountdownTick(second));
                }
            }
            RacePhase::Race => {
                if self.phase_time >= timing.game_length {
                    self.enter(RacePhase::RaceOver, events);
                    return;
                }
                let left = timing.game_length - self.phase_time;
                if left_before.is_some_and(|before| before > timing.last_lap_secs)
                    && left <= timing.last_lap_secs
                {
                    events.push(GameEvent::LastLap);
                }
                if let Some(second) = self.beep(left, timing.final_countdown_secs) {
                    events.push(GameEvent::FinalCountdownTick(second));
                }
            }
            RacePhase::Waiting | RacePhase::RaceOver => {}
        }
    }
}
