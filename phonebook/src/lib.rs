//! Command-line driver for a contact list stored with `record-store`.
//!
//! Configuration comes from the environment (see
//! [`record_store::StoreConfig::from_env`]); the first argument picks a mode.
//!
//! # Modes
//!
//! - `demo`: add two sample contacts and search for `John` (default)
//! - `add <phone> <name> [key=value ...]`: add a contact
//! - `remove <id>`: remove contacts by id
//! - `find <query>`: search phone numbers and names
//! - `list`: print every contact

mod command;
mod error;

pub use command::{Command, USAGE, parse_info, run};
pub use error::Error;
