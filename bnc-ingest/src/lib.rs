//! bnc-ingest library interface
//!
//! Normalizes BNC XML spoken documents into relational tables. Exposed as a
//! library for the binary and for integration testing.

pub mod corpus;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{FormatError, IngestError, Result};
