//! Message database and DBC parser
//!
//! This module contains the DBC loader and the ordered message database the
//! converter walks when it assembles a document.

pub mod dbc;
pub mod database;

// Re-export key types for convenience
pub use database::{
    DatabaseStats, MessageDefinition, MultiplexRole, SignalDatabase, SignalDefinition,
};
