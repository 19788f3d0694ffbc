//! Game-specific error types.
//!
//! Nothing in the per-frame simulation path can fail; these errors only
//! surface while loading and validating [`crate::config::GameConfig`], where a
//! bad value is reported and the compiled defaults are kept.

use std::fmt;

/// Top-level error enum for the catapult game.
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// A tunable is outside the range in which the game behaves sensibly.
    UnsafeConstant {
        /// Field name in `assets/game.toml`.
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },

    /// `assets/game.toml` exists but is not valid TOML for `GameConfig`.
    ConfigParse {
        /// Path of the offending file.
        path: String,
        /// Parser message.
        message: String,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "config value '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
            GameError::ConfigParse { path, message } => {
                write!(f, "failed to parse {}: {}", path, message)
            }
        }
    }
}

impl std::error::Error for GameError {}

/// Convenience alias: a `Result` using `GameError` as the error type.
pub type GameResult<T> = Result<T, GameError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is strictly positive.
pub fn require_positive(name: &'static str, value: f32) -> GameResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error unless `value` lies in the open interval `(0, 1)`.
pub fn require_unit_open(name: &'static str, value: f32) -> GameResult<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, 1.0)",
        })
    }
}

/// Returns an error unless `value` lies in the closed interval `[0, 1]`.
pub fn require_fraction(name: &'static str, value: f32) -> GameResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, 1.0]",
        })
    }
}
