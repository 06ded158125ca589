//! Clock-driven polling loop.
//!
//! [`Scheduler::poll`] is the synchronous step: compare the clock with the
//! phase deadline, advance if it has passed, otherwise sample a tick.
//! [`Scheduler::run`] drives that step from a tokio interval and applies user
//! controls between polls. Everything runs on one task; deadlines are
//! absolute, so a late or missed poll simply catches up on the next one.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::clock::Clock;
use super::engine::{EngineState, SessionEngine};
use crate::error::SessionError;
use crate::events::{Event, EventSink};

/// Wall-clock polling period while a session is running.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// User controls accepted while a session is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    TogglePause,
    Pause,
    Resume,
    Skip,
    Reset,
}

pub struct Scheduler;

impl Scheduler {
    /// One polling step. Returns `None` while idle or paused.
    pub fn poll<C: Clock>(engine: &mut SessionEngine<C>) -> Option<Event> {
        if engine.state() != EngineState::Running {
            return None;
        }
        if engine.deadline_elapsed() || engine.config().is_degenerate() {
            return engine.advance_phase().ok();
        }
        engine.tick_event()
    }

    /// Apply one user control. Rejected controls come back as errors and
    /// leave the engine untouched.
    pub fn apply<C: Clock>(
        engine: &mut SessionEngine<C>,
        control: Control,
    ) -> Result<Option<Event>, SessionError> {
        match control {
            Control::TogglePause => engine.toggle_pause().map(Some),
            Control::Pause => engine.pause().map(Some),
            Control::Resume => engine.resume().map(Some),
            Control::Skip => engine.skip().map(Some),
            Control::Reset => Ok(engine.reset()),
        }
    }

    /// Drive a live session until it ends or is reset.
    ///
    /// Polls every [`POLL_INTERVAL`] while running; the interval is not
    /// polled at all while paused. Closing the control channel resets the
    /// session. Returns the final event, or `None` if no session was live.
    pub async fn run<C, S>(
        engine: &mut SessionEngine<C>,
        controls: &mut mpsc::Receiver<Control>,
        sink: &mut S,
    ) -> Option<Event>
    where
        C: Clock,
        S: EventSink,
    {
        let mut interval = tokio::time::interval(POLL_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut controls_open = true;

        while engine.is_live() {
            let running = engine.state() == EngineState::Running;
            let event = tokio::select! {
                _ = interval.tick(), if running => Scheduler::poll(engine),
                control = controls.recv(), if controls_open => match control {
                    Some(control) => {
                        debug!(?control, "control received");
                        let resuming = engine.state() == EngineState::Paused
                            && matches!(control, Control::Resume | Control::TogglePause);
                        match Scheduler::apply(engine, control) {
                            Ok(event) => {
                                if resuming {
                                    interval.reset_immediately();
                                }
                                event
                            }
                            Err(e) => {
                                warn!("control ignored: {e}");
                                None
                            }
                        }
                    }
                    None => {
                        controls_open = false;
                        engine.reset()
                    }
                },
                else => engine.reset(),
            };

            if let Some(event) = event {
                sink.emit(&event);
                if event.is_terminal() {
                    return Some(event);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{ManualClock, Phase, WorkoutConfig};

    fn running(config: WorkoutConfig) -> (SessionEngine<ManualClock>, ManualClock) {
        let clock = ManualClock::new(0);
        let mut engine = SessionEngine::with_clock(clock.clone());
        engine.start(config).unwrap();
        (engine, clock)
    }

    #[test]
    fn poll_ticks_before_deadline() {
        let (mut engine, clock) = running(WorkoutConfig::new(10, 5, 2, 1));
        clock.advance_ms(2_500);
        match Scheduler::poll(&mut engine) {
            Some(Event::Tick {
                remaining_ms,
                progress_fraction,
                ..
            }) => {
                assert_eq!(remaining_ms, 7_500);
                assert!((progress_fraction - 0.25).abs() < 1e-9);
            }
            other => panic!("Expected Tick, got {other:?}"),
        }
    }

    #[test]
    fn poll_advances_once_deadline_passes() {
        let (mut engine, clock) = running(WorkoutConfig::new(10, 5, 2, 1));
        clock.advance_ms(10_000);
        assert!(matches!(
            Scheduler::poll(&mut engine),
            Some(Event::RestBegins { .. })
        ));
        assert_eq!(engine.session().unwrap().phase, Phase::Rest);
    }

    #[test]
    fn late_poll_resynchronizes_without_drift() {
        let (mut engine, clock) = running(WorkoutConfig::new(10, 5, 2, 1));
        // Backgrounded for 12s: one advance on the next poll, the new phase
        // counts from the moment the advance happened.
        clock.advance_secs(12);
        assert!(matches!(
            Scheduler::poll(&mut engine),
            Some(Event::RestBegins { .. })
        ));
        assert_eq!(engine.session().unwrap().phase_deadline_ms, 17_000);
    }

    #[test]
    fn poll_is_silent_while_paused_or_idle() {
        let (mut engine, clock) = running(WorkoutConfig::new(10, 5, 2, 1));
        engine.pause().unwrap();
        clock.advance_secs(60);
        assert!(Scheduler::poll(&mut engine).is_none());
        assert_eq!(engine.session().unwrap().phase, Phase::Exercise);

        engine.reset();
        assert!(Scheduler::poll(&mut engine).is_none());
    }

    #[test]
    fn degenerate_session_ends_on_first_poll() {
        let (mut engine, _clock) = running(WorkoutConfig::new(30, 15, 0, 3));
        assert!(matches!(
            Scheduler::poll(&mut engine),
            Some(Event::SessionEnded { .. })
        ));
        assert!(!engine.is_live());
    }

    #[test]
    fn apply_maps_controls() {
        let (mut engine, _clock) = running(WorkoutConfig::new(10, 5, 2, 1));
        assert!(matches!(
            Scheduler::apply(&mut engine, Control::Pause),
            Ok(Some(Event::Paused { .. }))
        ));
        assert!(Scheduler::apply(&mut engine, Control::Pause).is_err());
        assert!(matches!(
            Scheduler::apply(&mut engine, Control::Skip),
            Ok(Some(Event::RestBegins { .. }))
        ));
        assert!(matches!(
            Scheduler::apply(&mut engine, Control::Reset),
            Ok(Some(Event::SessionReset { .. }))
        ));
        assert!(matches!(Scheduler::apply(&mut engine, Control::Reset), Ok(None)));
    }

    #[tokio::test]
    async fn run_returns_immediately_without_session() {
        let mut engine = SessionEngine::with_clock(ManualClock::new(0));
        let (_tx, mut rx) = mpsc::channel(4);
        let mut sink = Vec::new();
        assert!(Scheduler::run(&mut engine, &mut rx, &mut sink).await.is_none());
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn run_finishes_degenerate_session() {
        let (mut engine, _clock) = running(WorkoutConfig::new(0, 15, 6, 3));
        let (_tx, mut rx) = mpsc::channel(4);
        let mut sink = Vec::new();
        let last = Scheduler::run(&mut engine, &mut rx, &mut sink).await;
        assert!(matches!(last, Some(Event::SessionEnded { .. })));
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn run_applies_controls_until_reset() {
        let (mut engine, _clock) = running(WorkoutConfig::new(30, 15, 3, 1));
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(Control::TogglePause).await.unwrap();
        tx.send(Control::Skip).await.unwrap();
        tx.send(Control::Resume).await.unwrap();
        tx.send(Control::Resume).await.unwrap();
        tx.send(Control::Reset).await.unwrap();

        let mut sink = Vec::new();
        let last = Scheduler::run(&mut engine, &mut rx, &mut sink).await;
        assert!(matches!(last, Some(Event::SessionReset { .. })));
        assert!(!engine.is_live());

        assert!(sink.iter().any(|e| matches!(e, Event::Paused { .. })));
        assert!(sink.iter().any(|e| matches!(e, Event::RestBegins { .. })));
        // The second resume is rejected and produces nothing.
        assert_eq!(
            sink.iter()
                .filter(|e| matches!(e, Event::Resumed { .. }))
                .count(),
            1
        );
        assert!(!sink.iter().any(|e| matches!(e, Event::SessionEnded { .. })));
    }

    #[tokio::test]
    async fn closing_controls_resets_session() {
        let (mut engine, _clock) = running(WorkoutConfig::new(30, 15, 3, 1));
        engine.pause().unwrap();
        let (tx, mut rx) = mpsc::channel::<Control>(1);
        drop(tx);
        let mut sink = Vec::new();
        let last = Scheduler::run(&mut engine, &mut rx, &mut sink).await;
        assert!(matches!(last, Some(Event::SessionReset { .. })));
    }
}
