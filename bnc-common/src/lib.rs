//! # BNC Common Library
//!
//! Shared code for the corpus ingest tool:
//! - Declarative schema for the five normalized corpus tables
//! - SQLite initialization and schema verification
//! - Parameterized row insertion
//! - Configuration loading (CLI / ENV / TOML / compiled default)

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
