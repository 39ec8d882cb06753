//! # tasknudge-todoist
//!
//! Todoist REST API v2 task source.
//! Docs: <https://developer.todoist.com/rest/v2/>

mod client;

pub use client::TodoistClient;
