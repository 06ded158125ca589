use serde::{Deserialize, Serialize};

use super::session::Phase;
use crate::error::ValidationError;

/// Workout shape: how long each phase lasts and how many of them there are.
///
/// Immutable for the lifetime of a session once it has started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutConfig {
    #[serde(default = "default_exercise_secs")]
    pub exercise_secs: u32,
    #[serde(default = "default_rest_secs")]
    pub rest_secs: u32,
    #[serde(default = "default_exercises_per_interval")]
    pub exercises_per_interval: u32,
    #[serde(default = "default_intervals")]
    pub intervals: u32,
}

fn default_exercise_secs() -> u32 {
    30
}
fn default_rest_secs() -> u32 {
    15
}
fn default_exercises_per_interval() -> u32 {
    6
}
fn default_intervals() -> u32 {
    3
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            exercise_secs: default_exercise_secs(),
            rest_secs: default_rest_secs(),
            exercises_per_interval: default_exercises_per_interval(),
            intervals: default_intervals(),
        }
    }
}

impl WorkoutConfig {
    pub fn new(exercise_secs: u32, rest_secs: u32, exercises_per_interval: u32, intervals: u32) -> Self {
        Self {
            exercise_secs,
            rest_secs,
            exercises_per_interval,
            intervals,
        }
    }

    /// A workout with no exercise time or no exercises lasts zero seconds.
    pub fn is_degenerate(&self) -> bool {
        self.exercise_secs == 0 || self.exercises_per_interval == 0 || self.intervals == 0
    }

    /// Seconds in one interval. No rest follows the interval's last exercise.
    ///
    /// Saturates at `u64::MAX` for configurations too long to represent.
    pub fn per_interval_secs(&self) -> u64 {
        let per = u64::from(self.exercises_per_interval);
        per.saturating_mul(u64::from(self.exercise_secs))
            .saturating_add(per.saturating_sub(1).saturating_mul(u64::from(self.rest_secs)))
    }

    /// Total workout duration in seconds. Saturates like [`per_interval_secs`](Self::per_interval_secs).
    pub fn total_secs(&self) -> u64 {
        if self.is_degenerate() {
            return 0;
        }
        u64::from(self.intervals).saturating_mul(self.per_interval_secs())
    }

    /// Nominal duration of one phase in seconds.
    pub fn phase_secs(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Exercise => u64::from(self.exercise_secs),
            Phase::Rest => u64::from(self.rest_secs),
        }
    }

    pub fn phase_ms(&self, phase: Phase) -> u64 {
        self.phase_secs(phase).saturating_mul(1000)
    }
}

/// Untrusted numeric workout input (CLI flags, JSON from a UI).
///
/// Convert with `WorkoutConfig::try_from` before starting a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawWorkoutConfig {
    pub exercise_secs: f64,
    pub rest_secs: f64,
    pub exercises_per_interval: f64,
    pub intervals: f64,
}

impl From<WorkoutConfig> for RawWorkoutConfig {
    fn from(config: WorkoutConfig) -> Self {
        Self {
            exercise_secs: f64::from(config.exercise_secs),
            rest_secs: f64::from(config.rest_secs),
            exercises_per_interval: f64::from(config.exercises_per_interval),
            intervals: f64::from(config.intervals),
        }
    }
}

impl TryFrom<RawWorkoutConfig> for WorkoutConfig {
    type Error = ValidationError;

    fn try_from(raw: RawWorkoutConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            exercise_secs: whole("exercise_secs", raw.exercise_secs)?,
            rest_secs: whole("rest_secs", raw.rest_secs)?,
            exercises_per_interval: whole("exercises_per_interval", raw.exercises_per_interval)?,
            intervals: whole("intervals", raw.intervals)?,
        })
    }
}

fn whole(field: &'static str, value: f64) -> Result<u32, ValidationError> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(ValidationError::NotIntegral { field, value });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    if value > f64::from(u32::MAX) {
        return Err(ValidationError::TooLarge {
            field,
            value,
            max: u32::MAX,
        });
    }
    Ok(value as u32)
}
