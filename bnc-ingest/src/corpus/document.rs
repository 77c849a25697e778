//! Per-document pipeline
//!
//! Validates the document envelope, filters out texts this tool does not
//! ingest, then runs header tables → resolver → normalizer. All state
//! built here is owned by the call and dropped with it.

use crate::corpus::entity_table::HeaderTables;
use crate::corpus::normalizer::{NormalizeOptions, NormalizedDocument, Normalizer};
use crate::corpus::record::ID_ATTRIBUTE;
use crate::corpus::resolver::ReferenceResolver;
use crate::corpus::xml::Element;
use crate::error::FormatError;
use std::fmt;

/// Root element of every corpus document
pub const ROOT_ELEMENT: &str = "bncDoc";
/// Conversational spoken text
pub const CONVERSATION_TYPE: &str = "CONVRSN";
/// Task-oriented / context-governed spoken text
pub const OTHER_SPOKEN_TYPE: &str = "OTHERSP";

/// Why a well-formed document was not normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No `stext` body
    WrittenText,
    /// `stext type="OTHERSP"`
    OtherSpoken,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::WrittenText => f.write_str("not a spoken text"),
            SkipReason::OtherSpoken => f.write_str("context-governed spoken text"),
        }
    }
}

#[derive(Debug)]
pub enum DocumentOutcome {
    Normalized(NormalizedDocument),
    Skipped(SkipReason),
}

/// Normalize one parsed document whose file stem is `file_stem`
pub fn process_document(
    file_stem: &str,
    root: &Element,
    options: &NormalizeOptions,
) -> Result<DocumentOutcome, FormatError> {
    if root.name() != ROOT_ELEMENT {
        return Err(FormatError::UnexpectedRoot {
            file_stem: file_stem.to_string(),
            found: root.name().to_string(),
        });
    }

    let declared = root.attribute(ID_ATTRIBUTE).map(str::trim).unwrap_or_default();
    if declared != file_stem {
        return Err(FormatError::DocumentIdMismatch {
            file_stem: file_stem.to_string(),
            declared: declared.to_string(),
        });
    }
    let doc_id = file_stem;

    let Some(stext) = root.child("stext") else {
        return Ok(DocumentOutcome::Skipped(SkipReason::WrittenText));
    };
    match stext.attribute("type").map(str::trim).unwrap_or_default() {
        CONVERSATION_TYPE => {}
        OTHER_SPOKEN_TYPE => return Ok(DocumentOutcome::Skipped(SkipReason::OtherSpoken)),
        other => {
            return Err(FormatError::UnsupportedTextType {
                doc_id: doc_id.to_string(),
                text_type: other.to_string(),
            })
        }
    }

    let tei_header = root.child("teiHeader").ok_or_else(|| FormatError::MissingSection {
        doc_id: doc_id.to_string(),
        section: "teiHeader",
    })?;

    let tables = HeaderTables::from_header(doc_id, tei_header)?;
    let body = ReferenceResolver::new(doc_id, &tables).resolve(stext)?;
    let normalized = Normalizer::new(doc_id, &tables, options).normalize(body)?;

    Ok(DocumentOutcome::Normalized(normalized))
}
