//! # tasknudge-core
//!
//! Core types, traits, configuration, and error handling for tasknudge:
//! the task model, the time-of-day filtering engine, message rendering,
//! and the capability contracts implemented by the Todoist and Telegram crates.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod filter;
pub mod message;
pub mod render;
pub mod task;
pub mod traits;
