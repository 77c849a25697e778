//! Row emission for normalized documents
//!
//! Inserts go through the caller's connection, normally the batch
//! transaction, so nothing becomes visible before the batch commits.

use crate::corpus::normalizer::{NormalizedDocument, RowCounts};
use crate::error::Result;
use bnc_common::db::insert_row;
use sqlx::SqliteConnection;

/// Insert every row of `doc`, parents first
pub async fn emit_document(
    conn: &mut SqliteConnection,
    doc: &NormalizedDocument,
) -> Result<RowCounts> {
    for row in doc.rows() {
        insert_row(conn, row).await?;
    }

    let counts = doc.row_counts();
    tracing::debug!("{}: {} row(s) inserted", doc.doc_id, counts.total());
    Ok(counts)
}
