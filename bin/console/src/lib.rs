//! Interactive console for deal-desk investigations.
//!
//! A line-oriented front end over the workflow session: list and create
//! investigations, edit step fields locally, save steps, and trigger step
//! automation against the configured backend.

pub mod command;
pub mod config;
pub mod console;
pub mod error;
pub mod render;

pub use command::{Command, ParseCommandError};
pub use config::ConsoleConfig;
pub use console::{Console, Reply};
pub use error::ConsoleError;
