use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, Summary};

/// Every state change of a session produces an Event.
/// The renderer draws them; feedback cues subscribe to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A session was created; the count-in plays before the first exercise.
    CountdownStarting {
        total_secs: u64,
        at: DateTime<Utc>,
    },
    ExerciseBegins {
        exercise_number: u32,
        at: DateTime<Utc>,
    },
    RestBegins {
        at: DateTime<Utc>,
    },
    /// A new interval starts with its first exercise.
    IntervalBegins {
        interval_number: u32,
        at: DateTime<Utc>,
    },
    /// Periodic progress sample. Never causes a transition.
    Tick {
        remaining_ms: u64,
        progress_fraction: f64,
        phase: Phase,
        total_remaining_secs: u64,
        current_interval: u32,
        current_exercise: u32,
    },
    Paused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    Resumed {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    SessionEnded {
        summary: Summary,
    },
    /// The user abandoned the session. No summary is produced.
    SessionReset {
        at: DateTime<Utc>,
    },
}

impl Event {
    /// True for the events that end a session's lifetime.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::SessionEnded { .. } | Event::SessionReset { .. })
    }
}

/// Consumer of engine events.
///
/// Implementations must not call back into the engine from `emit`.
pub trait EventSink {
    fn emit(&mut self, event: &Event);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: &Event) {
        (**self).emit(event);
    }
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: &Event) {
        self.push(event.clone());
    }
}

impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &Event) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_snake_case_tag() {
        let event = Event::IntervalBegins {
            interval_number: 2,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "interval_begins");
        assert_eq!(json["interval_number"], 2);

        let tick = Event::Tick {
            remaining_ms: 1_200,
            progress_fraction: 0.5,
            phase: Phase::Rest,
            total_remaining_secs: 90,
            current_interval: 1,
            current_exercise: 2,
        };
        let json = serde_json::to_value(&tick).unwrap();
        assert_eq!(json["type"], "tick");
        assert_eq!(json["phase"], "rest");
    }

    #[test]
    fn tuple_sink_fans_out() {
        let mut sink = (Vec::new(), Vec::new());
        sink.emit(&Event::RestBegins { at: Utc::now() });
        assert_eq!(sink.0.len(), 1);
        assert_eq!(sink.1.len(), 1);
    }
}
