//! # tasknudge-channels
//!
//! Messaging platform integrations for tasknudge.

pub mod telegram;
mod utils;
