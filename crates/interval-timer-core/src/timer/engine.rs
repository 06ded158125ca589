//! Session engine implementation.
//!
//! The session engine is a wall-clock-deadline state machine. It does not use
//! internal threads - the [`Scheduler`](super::Scheduler) (or a test) decides
//! when to look at the clock and calls `advance_phase()` once the current
//! phase's deadline has passed.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |           |
//!           +-> Idle <--+   (session end or reset)
//! ```
//!
//! ## Phase Order
//!
//! Within an interval exercises and rests alternate. No rest follows the last
//! exercise of an interval: the next interval starts straight away, or the
//! session ends after the last interval.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new();
//! engine.start(WorkoutConfig::default())?;
//! // In a loop:
//! Scheduler::poll(&mut engine); // Returns Some(Event) for ticks and transitions
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::session::{datetime_from_ms, Phase, Session, Summary};
use super::workout::{RawWorkoutConfig, WorkoutConfig};
use crate::error::{Operation, SessionError};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    /// No live session.
    Idle,
    Running,
    Paused,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EngineState::Idle => "idle",
            EngineState::Running => "running",
            EngineState::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// Core session engine.
///
/// Holds at most one live [`Session`] together with the configuration it
/// was started with.
#[derive(Debug, Clone)]
pub struct SessionEngine<C: Clock = SystemClock> {
    clock: C,
    config: WorkoutConfig,
    session: Option<Session>,
}

impl SessionEngine<SystemClock> {
    /// Create an idle engine on the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for SessionEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SessionEngine<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            config: WorkoutConfig::default(),
            session: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> EngineState {
        match &self.session {
            None => EngineState::Idle,
            Some(s) if s.is_paused() => EngineState::Paused,
            Some(_) => EngineState::Running,
        }
    }

    pub fn is_live(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Configuration of the live session, or of the last one started.
    pub fn config(&self) -> &WorkoutConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Milliseconds left in the current phase; zero with no session.
    pub fn phase_remaining_ms(&self) -> u64 {
        self.session
            .as_ref()
            .map(|s| s.phase_remaining_ms(self.clock.now_ms()))
            .unwrap_or(0)
    }

    /// True when the live, running session has reached its phase deadline.
    pub fn deadline_elapsed(&self) -> bool {
        match &self.session {
            Some(s) if !s.is_paused() => self.clock.now_ms() >= s.phase_deadline_ms,
            _ => false,
        }
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn phase_progress(&self) -> f64 {
        let Some(session) = &self.session else {
            return 0.0;
        };
        let total = self.config.phase_ms(session.phase);
        if total == 0 {
            return 1.0;
        }
        let remaining = session.phase_remaining_ms(self.clock.now_ms());
        (1.0 - remaining as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// Projected seconds left in the whole workout.
    ///
    /// Recomputed from the session fields on every call, so repeated polling
    /// never accumulates error. Frozen while paused.
    pub fn remaining_total_secs(&self) -> u64 {
        let Some(session) = &self.session else {
            return 0;
        };
        let config = &self.config;
        if config.is_degenerate() {
            return 0;
        }

        let mut remaining = session
            .phase_remaining_ms(self.clock.now_ms())
            .div_ceil(1000);

        let exercise = u64::from(config.exercise_secs);
        let rest = u64::from(config.rest_secs);
        // Exercises after the current one in this interval.
        let left = u64::from(
            config
                .exercises_per_interval
                .saturating_sub(session.current_exercise),
        );
        let pairs = left.saturating_mul(exercise.saturating_add(rest));
        remaining = remaining.saturating_add(match session.phase {
            // Each later exercise is preceded by one rest.
            Phase::Exercise => pairs,
            // The upcoming exercise, then rest/exercise pairs. No rest after the last.
            Phase::Rest => pairs.saturating_sub(rest),
        });

        let intervals_left = u64::from(config.intervals.saturating_sub(session.current_interval));
        remaining.saturating_add(intervals_left.saturating_mul(config.per_interval_secs()))
    }

    /// Progress sample for the live session, if any.
    pub fn tick_event(&self) -> Option<Event> {
        let session = self.session.as_ref()?;
        Some(Event::Tick {
            remaining_ms: session.phase_remaining_ms(self.clock.now_ms()),
            progress_fraction: self.phase_progress(),
            phase: session.phase,
            total_remaining_secs: self.remaining_total_secs(),
            current_interval: session.current_interval,
            current_exercise: session.current_exercise,
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a new session.
    ///
    /// # Errors
    /// Returns `DoubleStart` if a session is already live; the live session
    /// is left untouched.
    pub fn start(&mut self, config: WorkoutConfig) -> Result<Event, SessionError> {
        if self.session.is_some() {
            warn!("start rejected: a session is already live");
            return Err(SessionError::DoubleStart);
        }
        let now = self.clock.now_ms();
        self.config = config;
        self.session = Some(Session::new(now, config.phase_ms(Phase::Exercise)));
        info!(
            exercise_secs = config.exercise_secs,
            rest_secs = config.rest_secs,
            exercises_per_interval = config.exercises_per_interval,
            intervals = config.intervals,
            total_secs = config.total_secs(),
            "session started"
        );
        Ok(Event::CountdownStarting {
            total_secs: config.total_secs(),
            at: datetime_from_ms(now),
        })
    }

    /// Validate untrusted input, then start.
    ///
    /// # Errors
    /// Returns `InvalidConfiguration` for negative or non-integral fields and
    /// `DoubleStart` if a session is already live.
    pub fn start_raw(&mut self, raw: RawWorkoutConfig) -> Result<Event, SessionError> {
        if self.session.is_some() {
            warn!("start rejected: a session is already live");
            return Err(SessionError::DoubleStart);
        }
        let config = WorkoutConfig::try_from(raw).inspect_err(|e| warn!("start rejected: {e}"))?;
        self.start(config)
    }

    /// Move to the next phase. Called once the phase deadline has elapsed, or
    /// by `skip()`.
    ///
    /// Accumulators are credited with the nominal duration of the phase just
    /// left, whether or not it ran to its deadline.
    ///
    /// # Errors
    /// Returns `InvalidTransition` when no session is live.
    pub fn advance_phase(&mut self) -> Result<Event, SessionError> {
        self.advance(Operation::Advance)
    }

    pub fn pause(&mut self) -> Result<Event, SessionError> {
        let now = self.clock.now_ms();
        match self.session.as_mut() {
            Some(session) if !session.is_paused() => {
                session.paused_at_ms = Some(now);
                let remaining_ms = session.phase_remaining_ms(now);
                debug!(remaining_ms, "session paused");
                Ok(Event::Paused {
                    remaining_ms,
                    at: datetime_from_ms(now),
                })
            }
            _ => Err(self.rejected(Operation::Pause)),
        }
    }

    pub fn resume(&mut self) -> Result<Event, SessionError> {
        let now = self.clock.now_ms();
        match self.session.as_mut() {
            Some(session) => match session.paused_at_ms.take() {
                Some(paused_at) => {
                    let paused_for = now.saturating_sub(paused_at);
                    session.phase_deadline_ms = session.phase_deadline_ms.saturating_add(paused_for);
                    let remaining_ms = session.phase_remaining_ms(now);
                    debug!(paused_for, remaining_ms, "session resumed");
                    Ok(Event::Resumed {
                        remaining_ms,
                        at: datetime_from_ms(now),
                    })
                }
                None => Err(self.rejected(Operation::Resume)),
            },
            None => Err(self.rejected(Operation::Resume)),
        }
    }

    /// Single pause/resume control.
    pub fn toggle_pause(&mut self) -> Result<Event, SessionError> {
        match self.state() {
            EngineState::Paused => self.resume(),
            _ => self.pause(),
        }
    }

    /// Advance immediately regardless of the time left. Allowed while paused.
    pub fn skip(&mut self) -> Result<Event, SessionError> {
        self.advance(Operation::Skip)
    }

    /// Drop the live session without a summary. Safe to call at any time.
    pub fn reset(&mut self) -> Option<Event> {
        let session = self.session.take()?;
        let now = self.clock.now_ms();
        info!(
            interval = session.current_interval,
            exercise = session.current_exercise,
            "session reset"
        );
        Some(Event::SessionReset {
            at: datetime_from_ms(now),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn rejected(&self, operation: Operation) -> SessionError {
        let state = self.state();
        warn!(%operation, %state, "control rejected");
        SessionError::InvalidTransition { operation, state }
    }

    fn advance(&mut self, operation: Operation) -> Result<Event, SessionError> {
        let now = self.clock.now_ms();
        let config = self.config;
        let Some(session) = self.session.as_mut() else {
            return Err(self.rejected(operation));
        };

        // Zero-length workout: finish on the first evaluation.
        if config.is_degenerate() {
            return Ok(self.end(now));
        }

        let next_phase = match session.phase {
            Phase::Exercise => {
                session.elapsed_active_secs = session
                    .elapsed_active_secs
                    .saturating_add(config.phase_secs(Phase::Exercise));
                if session.current_exercise >= config.exercises_per_interval {
                    if session.current_interval >= config.intervals {
                        return Ok(self.end(now));
                    }
                    session.current_interval += 1;
                    session.current_exercise = 1;
                    Phase::Exercise
                } else {
                    Phase::Rest
                }
            }
            Phase::Rest => {
                session.elapsed_rest_secs = session
                    .elapsed_rest_secs
                    .saturating_add(config.phase_secs(Phase::Rest));
                session.current_exercise += 1;
                Phase::Exercise
            }
        };

        let interval_changed = session.phase == Phase::Exercise && next_phase == Phase::Exercise;
        session.phase = next_phase;
        session.phase_deadline_ms = now.saturating_add(config.phase_ms(next_phase));
        // A skip during a pause starts the new phase's countdown from now.
        if session.is_paused() {
            session.paused_at_ms = Some(now);
        }

        debug!(
            %operation,
            phase = next_phase.label(),
            interval = session.current_interval,
            exercise = session.current_exercise,
            "phase advanced"
        );

        let at = datetime_from_ms(now);
        Ok(match next_phase {
            Phase::Rest => Event::RestBegins { at },
            Phase::Exercise if interval_changed => Event::IntervalBegins {
                interval_number: session.current_interval,
                at,
            },
            Phase::Exercise => Event::ExerciseBegins {
                exercise_number: session.current_exercise,
                at,
            },
        })
    }

    /// Build the summary and destroy the session.
    fn end(&mut self, now: u64) -> Event {
        let Some(session) = self.session.take() else {
            return Event::SessionReset {
                at: datetime_from_ms(now),
            };
        };
        let summary = Summary {
            total_elapsed_secs: now.saturating_sub(session.started_at_ms) / 1000,
            active_secs: session.elapsed_active_secs,
            rest_secs: session.elapsed_rest_secs,
            intervals: self.config.intervals,
            exercises_per_interval: self.config.exercises_per_interval,
            started_at: datetime_from_ms(session.started_at_ms),
            ended_at: datetime_from_ms(now),
        };
        info!(
            total_elapsed_secs = summary.total_elapsed_secs,
            active_secs = summary.active_secs,
            rest_secs = summary.rest_secs,
            "session ended"
        );
        Event::SessionEnded { summary }
    }
}
