//! Core logic for gomeet.
//!
//! This crate holds everything the gomeet CLI needs short of terminal output:
//! - `draft` and `proposal` for composing a meeting before it exists
//! - `availability` for server-suggested times
//! - `location` for candidate places, kept locally or on the backend
//! - `voting` and `submission` for the shared part of the workflow
//! - `client` and `protocol` for talking to the backend

pub mod availability;
pub mod client;
pub mod config;
pub mod constants;
pub mod datetime;
pub mod draft;
pub mod error;
pub mod location;
pub mod meeting;
pub mod protocol;
pub mod proposal;
pub mod submission;
pub mod voting;

#[cfg(test)]
mod testing;

pub use error::{GoMeetError, GoMeetResult};
