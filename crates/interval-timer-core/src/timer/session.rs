use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity type of the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Exercise,
    Rest,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Exercise => "Exercise",
            Phase::Rest => "Rest",
        }
    }
}

/// A live workout.
///
/// Owned by the `SessionEngine`; created at start, dropped at end or reset.
/// All instants are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub phase: Phase,
    /// 1-indexed.
    pub current_interval: u32,
    /// 1-indexed within the current interval.
    pub current_exercise: u32,
    pub phase_deadline_ms: u64,
    /// Pause start, set exactly while paused.
    pub paused_at_ms: Option<u64>,
    pub started_at_ms: u64,
    /// Nominal exercise seconds credited so far.
    pub elapsed_active_secs: u64,
    /// Nominal rest seconds credited so far.
    pub elapsed_rest_secs: u64,
}

impl Session {
    pub(crate) fn new(now_ms: u64, exercise_ms: u64) -> Self {
        Self {
            phase: Phase::Exercise,
            current_interval: 1,
            current_exercise: 1,
            phase_deadline_ms: now_ms.saturating_add(exercise_ms),
            paused_at_ms: None,
            started_at_ms: now_ms,
            elapsed_active_secs: 0,
            elapsed_rest_secs: 0,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at_ms.is_some()
    }

    /// The instant the phase countdown is measured against. Frozen at the
    /// pause start while paused.
    pub fn effective_now(&self, now_ms: u64) -> u64 {
        self.paused_at_ms.unwrap_or(now_ms)
    }

    /// Milliseconds left in the current phase, floored at zero.
    pub fn phase_remaining_ms(&self, now_ms: u64) -> u64 {
        self.phase_deadline_ms
            .saturating_sub(self.effective_now(now_ms))
    }
}

/// End-of-session report. A snapshot; the engine keeps nothing after emitting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Wall-clock seconds from start to end, pauses included.
    pub total_elapsed_secs: u64,
    pub active_secs: u64,
    pub rest_secs: u64,
    pub intervals: u32,
    pub exercises_per_interval: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

pub(crate) fn datetime_from_ms(ms: u64) -> DateTime<Utc> {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_on_first_exercise() {
        let session = Session::new(5_000, 30_000);
        assert_eq!(session.phase, Phase::Exercise);
        assert_eq!(session.current_interval, 1);
        assert_eq!(session.current_exercise, 1);
        assert_eq!(session.phase_deadline_ms, 35_000);
        assert!(!session.is_paused());
    }

    #[test]
    fn remaining_is_frozen_while_paused() {
        let mut session = Session::new(0, 30_000);
        session.paused_at_ms = Some(10_000);
        assert_eq!(session.phase_remaining_ms(25_000), 20_000);
        session.paused_at_ms = None;
        assert_eq!(session.phase_remaining_ms(25_000), 5_000);
        assert_eq!(session.phase_remaining_ms(99_000), 0);
    }

    #[test]
    fn datetime_conversion() {
        assert_eq!(datetime_from_ms(0).timestamp(), 0);
        assert_eq!(datetime_from_ms(1_500).timestamp_millis(), 1_500);
    }
}
