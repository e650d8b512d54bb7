//! Error types surfaced at load time.
//!
//! Nothing in the per-tick simulation returns an error: respawn exhaustion,
//! degenerate geometry and unknown input are all handled in place. What can
//! fail is startup (assets, configuration), and those failures abort session
//! construction before any game state exists.

use std::fmt;

/// Which kind of asset failed to load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Texture,
    Sound,
    Font,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Texture => "texture",
            AssetKind::Sound => "sound",
            AssetKind::Font => "font",
        };
        f.write_str(name)
    }
}

/// Top-level error for session construction
#[derive(Debug)]
pub enum GameError {
    /// A collaborator could not load an asset (missing or corrupt file).
    AssetLoad {
        kind: AssetKind,
        path: String,
        reason: String,
    },

    /// Configuration failed to parse or holds out-of-range values.
    Config(String),

    /// Reading a configuration file failed.
    Io(std::io::Error),
}

impl GameError {
    pub fn asset(kind: AssetKind, path: &str, reason: impl Into<String>) -> Self {
        GameError::AssetLoad {
            kind,
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::AssetLoad { kind, path, reason } => {
                write!(f, "could not load {} '{}': {}", kind, path, reason)
            }
            GameError::Config(msg) => write!(f, "invalid configuration: {}", msg),
            GameError::Io(err) => write!(f, "i/o error: {}", err),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GameError {
    fn from(err: std::io::Error) -> Self {
        GameError::Io(err)
    }
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::Config(err.to_string())
    }
}
