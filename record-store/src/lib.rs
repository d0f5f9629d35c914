//! An ordered contact list persisted as a JSON document in a repository.
//!
//! `record-store` keeps a small list of contact records in memory and commits
//! the whole list as one pretty-printed JSON file through a repository
//! contents API. Writes use the file's current revision as a precondition, so
//! a concurrent writer is detected instead of silently overwritten.
//!
//! # Features
//!
//! - Background load on construction with an explicit readiness signal
//! - Substring search over phone numbers and (case-insensitively) names
//! - Serialized saves, one write in flight per store
//! - Save outcomes returned to the caller instead of only logged
//! - GitHub contents client plus an in-memory store for tests and offline use
//!
//! # Example
//!
//! ```no_run
//! use record_store::{RecordStore, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig::from_env()?;
//!     let store = RecordStore::connect(&config).await?;
//!
//!     let added = store.add("+622187654321", "Jane Smith", None).await?;
//!     if !added.is_saved() {
//!         eprintln!("not persisted yet");
//!     }
//!
//!     for record in store.find("jane") {
//!         println!("{} {}", record.phone_number, record.name);
//!     }
//!     Ok(())
//! }
//! ```

mod config;
pub mod document;
mod error;
mod record;
mod records;
pub mod remote;
mod store;

pub use config::{DEFAULT_COMMIT_MESSAGE, DEFAULT_DB_FILE, StoreConfig};
pub use error::Error;
pub use record::{AdditionalInfo, RESERVED_FIELDS, Record};
pub use remote::{ContentStore, FileLocation, GitHubContents, MemoryContents, RemoteFile};
pub use store::{Persisted, RecordStore, SaveOutcome, StoreOptions};
