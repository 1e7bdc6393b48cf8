//! `fleetdesk` - Local fleet records with consistent assignments
//!
//! This library keeps vehicles, drivers and their operational records in a
//! key-value record store, and maintains the one-to-one relation between
//! drivers and the vehicles they hold.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod assignment;
pub mod cli;
pub mod config;
pub mod error;
pub mod fleet;
pub mod logging;
pub mod model;
pub mod storage;

pub use assignment::{AssignmentOutcome, Assignments, Inconsistency};
pub use config::Config;
pub use error::{Error, Result};
pub use fleet::Fleet;
pub use logging::init_logging;
pub use storage::{Collection, MemoryStore, RecordStore, SqliteStore, StoreStats};
