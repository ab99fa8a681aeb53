#![forbid(unsafe_code)]

pub mod model;
pub mod session;
pub mod time;

pub use session::{QuizSession, SessionState, TickOutcome};
pub use time::Clock;
