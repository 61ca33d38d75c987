//! Homework review API client modules
//!
//! HTTP access to the review endpoint and the poll loop that drives it.

pub mod api;
pub mod config;
pub mod error;
pub mod poller;

pub use api::{HomeworkSource, PracticumApi};
pub use config::ClientConfig;
pub use error::ClientError;
pub use poller::HomeworkPoller;
