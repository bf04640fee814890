//! Index structures

pub mod primary_key;

pub use primary_key::{IndexKey, PrimaryKeyIndex};
