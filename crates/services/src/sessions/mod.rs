mod controller;
mod progress;
mod timer;
mod view;

// Public API of the session subsystem.
pub use controller::{SessionCommand, SessionController};
pub use progress::SessionProgress;
pub use view::{
    ResultView, ReviewItem, SessionSnapshot, TimePressure, format_clock, time_pressure,
};
