//! Batch-level services: file discovery and transactional import

pub mod batch_importer;
pub mod file_scanner;

pub use batch_importer::{BatchImporter, BatchSummary};
pub use file_scanner::{FileScanner, ScanError};
