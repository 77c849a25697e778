//! Per-document lookup tables of declared entities
//!
//! Each table owns its records once, keyed by primary id, with a separate
//! alias index pointing back at primary ids. A key may appear only once
//! across both maps.

use crate::corpus::record::{EntityKind, Record, RecordError};
use crate::corpus::xml::Element;
use crate::error::FormatError;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// A key is already present in the table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("key '{0}' already present")]
pub struct DuplicateKey(pub String);

/// Identifier-or-alias lookup for one entity kind
#[derive(Debug, Clone)]
pub struct EntityTable {
    kind: EntityKind,
    records: BTreeMap<String, Record>,
    aliases: BTreeMap<String, String>,
}

impl EntityTable {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            records: BTreeMap::new(),
            aliases: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Add a record under its primary id and, if present, its alias
    ///
    /// Nothing is inserted when either key is taken.
    pub fn insert(&mut self, record: Record) -> Result<(), DuplicateKey> {
        let id = record.primary_id().to_string();
        if self.contains(&id) {
            return Err(DuplicateKey(id));
        }
        if let Some(alias) = record.alias() {
            if alias == id || self.contains(alias) {
                return Err(DuplicateKey(alias.to_string()));
            }
            self.aliases.insert(alias.to_string(), id.clone());
        }
        self.records.insert(id, record);
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key) || self.aliases.contains_key(key)
    }

    /// Record for a primary id or alias
    pub fn get(&self, key: &str) -> Option<&Record> {
        match self.records.get(key) {
            Some(record) => Some(record),
            None => self
                .aliases
                .get(key)
                .and_then(|id| self.records.get(id)),
        }
    }

    /// Primary id behind `key`, or `None` when undeclared
    pub fn canonical_id(&self, key: &str) -> Option<&str> {
        self.get(key).map(Record::primary_id)
    }

    /// Number of declared records (aliases not counted)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in primary id order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }
}

/// Build the table for `kind` from the declarations under `tei_header`
pub fn build_entity_table(
    doc_id: &str,
    tei_header: &Element,
    kind: EntityKind,
) -> Result<EntityTable, FormatError> {
    let section = tei_header
        .descend(kind.header_path())
        .ok_or_else(|| FormatError::MissingSection {
            doc_id: doc_id.to_string(),
            section: kind.section(),
        })?;

    let mut table = EntityTable::new(kind);
    for declaration in section.children_named(kind.label()) {
        let record = Record::from_element(declaration).map_err(|e| match e {
            RecordError::EmptyIdentifier => FormatError::EmptyIdentifier {
                doc_id: doc_id.to_string(),
                kind,
            },
            RecordError::DuplicateAttribute(attribute) => FormatError::DuplicateAttribute {
                doc_id: doc_id.to_string(),
                kind,
                id: declaration.attribute("xml:id").unwrap_or_default().trim().to_string(),
                attribute,
            },
        })?;

        table
            .insert(record)
            .map_err(|DuplicateKey(key)| FormatError::DuplicateKey {
                doc_id: doc_id.to_string(),
                kind,
                key,
            })?;
    }

    debug!("{}: {} {} declaration(s)", doc_id, table.len(), kind);
    Ok(table)
}

/// The three header tables of one document
#[derive(Debug, Clone)]
pub struct HeaderTables {
    pub recordings: EntityTable,
    pub people: EntityTable,
    pub settings: EntityTable,
}

impl HeaderTables {
    pub fn from_header(doc_id: &str, tei_header: &Element) -> Result<Self, FormatError> {
        Ok(Self {
            recordings: build_entity_table(doc_id, tei_header, EntityKind::Recording)?,
            people: build_entity_table(doc_id, tei_header, EntityKind::Person)?,
            settings: build_entity_table(doc_id, tei_header, EntityKind::Setting)?,
        })
    }
}
