//! XaleDB
//!
//! A small embedded SQL database. Tables live in memory and are persisted
//! after every change to one flat little-endian binary file.
//!
//! ## Layers
//! - `sql`: tokenizer, recursive-descent parser and executor
//! - `types`, `index`: values, rows, tables and the primary-key index
//! - `catalog`, `storage`: table registry over a positional byte store
//! - `engine`: run a statement and render its result as text
//! - `server`, `client`: TCP line protocol and interactive shell

pub mod catalog;
pub mod client;
pub mod config;
pub mod engine;
pub mod index;
pub mod logging;
pub mod server;
pub mod sql;
pub mod storage;
pub mod types;

mod error;

pub use catalog::TableRegistry;
pub use config::DbConfig;
pub use engine::QueryEngine;
pub use error::{DbError, ExecutionError, Result};
