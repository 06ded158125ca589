pub mod config;
pub mod preset;
pub mod render;
pub mod timer;

use clap::Args;
use interval_timer_core::{RawWorkoutConfig, WorkoutConfig};

/// Workout shape overrides. Unset flags keep the base configuration.
///
/// Values are taken as raw numbers so that negative or fractional input
/// reaches the engine's validation instead of a clap parse error.
#[derive(Args, Debug, Default, Clone)]
pub struct WorkoutArgs {
    /// Exercise duration in seconds
    #[arg(long, short = 'e', allow_negative_numbers = true)]
    pub exercise: Option<f64>,
    /// Rest duration in seconds
    #[arg(long, short = 'r', allow_negative_numbers = true)]
    pub rest: Option<f64>,
    /// Exercises per interval
    #[arg(long = "per-interval", short = 'n', allow_negative_numbers = true)]
    pub per_interval: Option<f64>,
    /// Number of intervals
    #[arg(long, short = 'i', allow_negative_numbers = true)]
    pub intervals: Option<f64>,
}

impl WorkoutArgs {
    pub fn overlay(&self, base: WorkoutConfig) -> RawWorkoutConfig {
        let base = RawWorkoutConfig::from(base);
        RawWorkoutConfig {
            exercise_secs: self.exercise.unwrap_or(base.exercise_secs),
            rest_secs: self.rest.unwrap_or(base.rest_secs),
            exercises_per_interval: self.per_interval.unwrap_or(base.exercises_per_interval),
            intervals: self.intervals.unwrap_or(base.intervals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_keeps_unset_fields() {
        let args = WorkoutArgs {
            rest: Some(-5.0),
            intervals: Some(2.0),
            ..WorkoutArgs::default()
        };
        let raw = args.overlay(WorkoutConfig::new(30, 15, 6, 3));
        assert_eq!(raw.exercise_secs, 30.0);
        assert_eq!(raw.rest_secs, -5.0);
        assert_eq!(raw.exercises_per_interval, 6.0);
        assert_eq!(raw.intervals, 2.0);
    }
}
