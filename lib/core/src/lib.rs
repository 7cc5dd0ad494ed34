//! Core domain types and utilities for the deal-desk investigation client.
//!
//! This crate provides the identifier, timestamp, and error handling
//! foundations shared by the workflow engine, the backend gateway, and the
//! console front end.

pub mod error;
pub mod id;
pub mod time;

pub use error::Result;
pub use id::{ParseIdError, RunId};
pub use time::{ParseTimestampError, Timestamp};
