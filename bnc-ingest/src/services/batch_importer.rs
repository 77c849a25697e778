//! Batch import of corpus documents
//!
//! All documents of a run share one transaction. A document that fails to
//! parse is logged and skipped; any format violation or storage error
//! returns early, dropping the transaction uncommitted.

use crate::corpus::document::{process_document, DocumentOutcome};
use crate::corpus::normalizer::{NormalizeOptions, RowCounts};
use crate::corpus::xml::parse_file;
use crate::db::emit_document;
use crate::error::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Outcome of one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Files handed to the importer
    pub documents_seen: usize,
    pub documents_normalized: usize,
    /// Written and context-governed texts
    pub documents_skipped: usize,
    /// Files that were not well-formed XML
    pub parse_failures: Vec<PathBuf>,
    pub empty_sentences: usize,
    pub rows: RowCounts,
    /// Rendered diagnostics in emission order
    pub diagnostics: Vec<String>,
    /// True when the transaction was committed
    pub committed: bool,
}

impl BatchSummary {
    pub fn display_string(&self) -> String {
        format!(
            "{} document(s): {} normalized, {} skipped, {} unparsable; rows: {} settings, {} people, {} links, {} sentences, {} words; {} diagnostic(s)",
            self.documents_seen,
            self.documents_normalized,
            self.documents_skipped,
            self.parse_failures.len(),
            self.rows.settings,
            self.rows.people,
            self.rows.links,
            self.rows.sentences,
            self.rows.words,
            self.diagnostics.len(),
        )
    }
}

/// Runs a list of documents through normalization and storage
pub struct BatchImporter {
    pool: SqlitePool,
    options: NormalizeOptions,
    dry_run: bool,
}

impl BatchImporter {
    pub fn new(pool: SqlitePool, options: NormalizeOptions) -> Self {
        Self {
            pool,
            options,
            dry_run: false,
        }
    }

    /// Run everything but roll back instead of committing
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Import `files` in the given order inside a single transaction
    pub async fn import(&self, files: &[PathBuf]) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        let mut tx = self.pool.begin().await?;

        for path in files {
            summary.documents_seen += 1;
            let file_stem = document_stem(path);

            let root = match parse_file(path) {
                Ok(root) => root,
                Err(e) => {
                    error!("{}: failed to parse: {}", path.display(), e);
                    summary.parse_failures.push(path.clone());
                    continue;
                }
            };

            match process_document(&file_stem, &root, &self.options)? {
                DocumentOutcome::Skipped(reason) => {
                    info!("{}: skipped ({})", file_stem, reason);
                    summary.documents_skipped += 1;
                }
                DocumentOutcome::Normalized(doc) => {
                    let counts = emit_document(&mut *tx, &doc).await?;
                    info!(
                        "{}: {} sentence(s), {} word(s), {} diagnostic(s)",
                        doc.doc_id,
                        counts.sentences,
                        counts.words,
                        doc.diagnostics.len()
                    );
                    summary.documents_normalized += 1;
                    summary.empty_sentences += doc.empty_sentences;
                    summary.rows += counts;
                    summary
                        .diagnostics
                        .extend(doc.diagnostics.iter().map(ToString::to_string));
                }
            }
        }

        if self.dry_run {
            tx.rollback().await?;
            info!("Dry run: transaction rolled back");
        } else {
            tx.commit().await?;
            summary.committed = true;
            debug!("Batch transaction committed");
        }

        Ok(summary)
    }
}

fn document_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_stem() {
        assert_eq!(document_stem(Path::new("/corpus/K/KB/KB0.xml")), "KB0");
        assert_eq!(document_stem(Path::new("KB0")), "KB0");
    }

    #[test]
    fn test_summary_display() {
        let summary = BatchSummary {
            documents_seen: 3,
            documents_normalized: 1,
            documents_skipped: 1,
            parse_failures: vec![PathBuf::from("bad.xml")],
            ..BatchSummary::default()
        };
        let line = summary.display_string();
        assert!(line.starts_with("3 document(s): 1 normalized, 1 skipped, 1 unparsable"));
    }
}
