//! # Interval Timer Core Library
//!
//! This library provides the core logic for a workout interval timer: a
//! configurable sequence of exercise and rest phases grouped into intervals.
//! Front ends (the CLI binary today) are thin layers over the same engine.
//!
//! ## Architecture
//!
//! - **Session Engine**: A wall-clock-deadline state machine. Pure given the
//!   injected clock; the caller decides when to look at the time.
//! - **Scheduler**: A 100 ms polling loop that advances phases at their
//!   deadlines and samples progress ticks in between.
//! - **Feedback**: Beep, speech and vibration cues derived from events and
//!   played off the engine's path.
//! - **Storage**: TOML configuration and SQLite-backed presets.
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: Core session state machine
//! - [`Scheduler`]: Polling driver
//! - [`Event`]: Everything the engine reports
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod feedback;
pub mod format;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, Operation, SessionError, ValidationError};
pub use events::{Event, EventSink};
pub use feedback::{Cue, CuePlayer, FeedbackConfig, FeedbackDispatcher};
pub use storage::{Config, Database, Preset, PresetStore};
pub use timer::{
    Clock, Control, EngineState, ManualClock, Phase, RawWorkoutConfig, Scheduler, Session,
    SessionEngine, Summary, SystemClock, WorkoutConfig,
};
