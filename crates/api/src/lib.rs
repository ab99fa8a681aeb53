#![forbid(unsafe_code)]

pub mod gateway;
pub mod remote;
pub mod sample;

pub use gateway::{ApiError, AttemptGateway, AttemptRecord, InMemoryApi, QuizProvider};
pub use remote::{ApiConfig, RemoteApi};
