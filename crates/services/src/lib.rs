#![forbid(unsafe_code)]

pub mod sessions;

pub use exam_core::time::Clock;

pub use sessions::{
    ResultView, ReviewItem, SessionCommand, SessionController, SessionProgress, SessionSnapshot,
    TimePressure, format_clock, time_pressure,
};
