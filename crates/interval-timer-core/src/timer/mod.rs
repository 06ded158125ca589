mod clock;
mod engine;
mod scheduler;
mod session;
mod workout;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{EngineState, SessionEngine};
pub use scheduler::{Control, Scheduler, POLL_INTERVAL};
pub use session::{Phase, Session, Summary};
pub use workout::{RawWorkoutConfig, WorkoutConfig};
