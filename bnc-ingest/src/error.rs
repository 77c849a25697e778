//! Error types for bnc-ingest
//!
//! Two tiers:
//! - [`FormatError`]: the input violates the corpus format this tool assumes.
//!   Always fatal; the batch transaction is rolled back.
//! - Recoverable conditions (a document that fails to parse, dangling
//!   references) are not errors at this level. Parse failures surface as
//!   [`crate::corpus::xml::ParseError`] and are logged and skipped by the
//!   batch importer; dangling references become
//!   [`crate::corpus::normalizer::Diagnostic`]s.

use crate::corpus::record::EntityKind;
use crate::services::file_scanner::ScanError;
use thiserror::Error;

/// Fatal corpus-format violation
#[derive(Debug, Error)]
pub enum FormatError {
    /// Root element is not `<bncDoc>`
    #[error("{file_stem}: root element is <{found}>, expected <bncDoc>")]
    UnexpectedRoot { file_stem: String, found: String },

    /// Root `xml:id` differs from the file name
    #[error("{file_stem}: document declares id '{declared}'")]
    DocumentIdMismatch { file_stem: String, declared: String },

    /// A required header section is absent
    #[error("{doc_id}: missing header section <{section}>")]
    MissingSection { doc_id: String, section: &'static str },

    /// A declaration has no `xml:id`
    #[error("{doc_id}: <{kind}> declaration without an identifier")]
    EmptyIdentifier { doc_id: String, kind: EntityKind },

    /// A primary id or alias is already a key of the same table
    #[error("{doc_id}: duplicate {kind} key '{key}'")]
    DuplicateKey {
        doc_id: String,
        kind: EntityKind,
        key: String,
    },

    /// A declaration names the same attribute twice
    #[error("{doc_id}: {kind} '{id}' repeats attribute '{attribute}'")]
    DuplicateAttribute {
        doc_id: String,
        kind: EntityKind,
        id: String,
        attribute: String,
    },

    /// A declaration carries an attribute with no column in its table
    #[error("{doc_id}: {kind} '{id}' has attribute '{attribute}' with no table column")]
    UnexpectedAttribute {
        doc_id: String,
        kind: EntityKind,
        id: String,
        attribute: String,
    },

    /// `decls` is not a recording/setting pair
    #[error("{doc_id}: malformed decls '{decls}', expected '<recording> <setting>'")]
    MalformedDeclaration { doc_id: String, decls: String },

    /// `decls` names an identifier the header does not declare
    #[error("{doc_id}: decls refers to undeclared {kind} '{id}'")]
    UndeclaredReference {
        doc_id: String,
        kind: EntityKind,
        id: String,
    },

    /// An element lacks a required, non-empty attribute
    #[error("{doc_id}: <{element}> without required '{attribute}' attribute")]
    MissingAttribute {
        doc_id: String,
        element: &'static str,
        attribute: &'static str,
    },

    /// Body structure deviates from stext > div > u
    #[error("{doc_id}: unexpected <{found}> inside <{parent}>")]
    UnexpectedElement {
        doc_id: String,
        parent: &'static str,
        found: String,
    },

    /// `stext` type other than CONVRSN / OTHERSP
    #[error("{doc_id}: unsupported spoken text type '{text_type}'")]
    UnsupportedTextType { doc_id: String, text_type: String },

    /// A turn names more than one speaker
    #[error("{doc_id}: turn has several speakers '{who}'")]
    MultipleSpeakers { doc_id: String, who: String },
}

/// Top-level error for an ingest run; every variant aborts the batch
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Storage layer error from bnc-common
    #[error(transparent)]
    Storage(#[from] bnc_common::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
}

/// Result type for ingest operations
pub type Result<T> = std::result::Result<T, IngestError>;
