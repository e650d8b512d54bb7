//! Sound cues and their dispatch
//!
//! The race only emits [`GameEvent`]s; this module decides which of them are
//! audible and forwards them to an [`AudioSink`].

use std::collections::HashMap;

use crate::config::SoundPaths;
use crate::error::GameError;
use crate::platform::{AudioSink, SoundId};
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Pre-start countdown second
    CountdownBeep,
    /// Race begins
    RaceStart,
    /// Candy collected
    Pickup,
    LastLap,
    /// Final seconds of the race
    FinalCountdown,
    Finish,
}

impl SoundCue {
    pub const ALL: [SoundCue; 6] = [
        SoundCue::CountdownBeep,
        SoundCue::RaceStart,
        SoundCue::Pickup,
        SoundCue::LastLap,
        SoundCue::FinalCountdown,
        SoundCue::Finish,
    ];

    /// The cue an event makes heard, if any
    pub fn for_event(event: &GameEvent) -> Option<SoundCue> {
        match event {
            GameEvent::CountdownTick(_) => Some(SoundCue::CountdownBeep),
            GameEvent::RaceStarted => Some(SoundCue::RaceStart),
            GameEvent::CandyCollected { .. } => Some(SoundCue::Pickup),
            GameEvent::LastLap => Some(SoundCue::LastLap),
            GameEvent::FinalCountdownTick(_) => Some(SoundCue::FinalCountdown),
            GameEvent::RaceFinished { .. } => Some(SoundCue::Finish),
            GameEvent::PhaseChanged(_)
            | GameEvent::CandyOffStage
            | GameEvent::MusicStart
            | GameEvent::MusicStop => None,
        }
    }

    fn path(self, paths: &SoundPaths) -> &str {
        match self {
            SoundCue::CountdownBeep => &paths.countdown_beep,
            SoundCue::RaceStart => &paths.race_start,
            SoundCue::Pickup => &paths.pickup,
            SoundCue::LastLap => &paths.last_lap,
            SoundCue::FinalCountdown => &paths.final_countdown,
            SoundCue::Finish => &paths.finish,
        }
    }
}

/// Loaded sounds, keyed by cue
#[derive(Debug, Clone)]
pub struct SoundBank {
    cues: HashMap<SoundCue, SoundId>,
    music: SoundId,
    muted: bool,
}

impl SoundBank {
    /// Load every cue and the music track. Any missing file is fatal.
    pub fn load(sink: &mut impl AudioSink, paths: &SoundPaths) -> Result<Self, GameError> {
        let mut cues = HashMap::new();
        for cue in SoundCue::ALL {
            cues.insert(cue, sink.load_sound(cue.path(paths))?);
        }
        let music = sink.load_sound(&paths.music)?;
        log::debug!("Loaded {} sound cues and music", cues.len());
        Ok(Self {
            cues,
            music,
            muted: false,
        })
    }

    /// Mute/unmute effects; music control still goes through
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Forward one event to the sink
    pub fn dispatch(&self, sink: &mut impl AudioSink, event: &GameEvent) {
        match event {
            GameEvent::MusicStart if !self.muted => sink.play_music(self.music),
            GameEvent::MusicStop => sink.stop_music(),
            _ => {
                if self.muted {
                    return;
                }
                if let Some(sound) = SoundCue::for_event(event).and_then(|c| self.cues.get(&c)) {
                    sink.play_sound(*sound);
                }
            }
        }
    }
}
