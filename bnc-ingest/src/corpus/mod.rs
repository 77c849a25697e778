//! Corpus normalization engine
//!
//! Leaves first: [`xml`] builds the element tree, [`record`] and
//! [`entity_table`] hold header declarations, [`event_counter`] summarizes
//! sentences, [`resolver`] attributes turns to settings and speakers,
//! [`normalizer`] produces rows and diagnostics, and [`document`] ties the
//! steps together for one file.

pub mod document;
pub mod entity_table;
pub mod event_counter;
pub mod normalizer;
pub mod record;
pub mod resolver;
pub mod xml;

pub use document::{process_document, DocumentOutcome, SkipReason};
pub use entity_table::{EntityTable, HeaderTables};
pub use normalizer::{Diagnostic, NormalizeOptions, NormalizedDocument, RowCounts};
pub use xml::{parse_file, parse_str, Element, ParseError};
