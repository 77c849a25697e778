//! Declared header entities
//!
//! A [`Record`] is built from one `<recording>`, `<person>` or `<setting>`
//! element. Every XML attribute and every child element's trimmed text goes
//! through [`Record::tell`], which routes the two reserved names to named
//! fields and rejects repeated attribute names.

use crate::corpus::xml::Element;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Attribute carrying the primary identifier
pub const ID_ATTRIBUTE: &str = "xml:id";
/// Attribute carrying the alias
pub const ALIAS_ATTRIBUTE: &str = "n";

/// Kind of declared entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Recording,
    Person,
    Setting,
}

impl EntityKind {
    /// Element name of a declaration of this kind
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Recording => "recording",
            EntityKind::Person => "person",
            EntityKind::Setting => "setting",
        }
    }

    /// Path from `teiHeader` to the section holding the declarations
    pub fn header_path(self) -> &'static [&'static str] {
        match self {
            EntityKind::Recording => &["fileDesc", "sourceDesc", "recordingStmt"],
            EntityKind::Person => &["profileDesc", "particDesc"],
            EntityKind::Setting => &["profileDesc", "settingDesc"],
        }
    }

    /// Name of the declaring section element
    pub fn section(self) -> &'static str {
        let path = self.header_path();
        path[path.len() - 1]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a declaration could not become a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("declaration has no identifier")]
    EmptyIdentifier,

    #[error("attribute '{0}' given twice")]
    DuplicateAttribute(String),
}

/// One declared entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    primary_id: String,
    alias: Option<String>,
    attributes: BTreeMap<String, String>,
}

impl Record {
    /// Build a record from a header declaration element
    ///
    /// Child `<dialect>` is stored as `dialectDetail`: persons also carry a
    /// `dialect` attribute holding the dialect code.
    pub fn from_element(element: &Element) -> Result<Self, RecordError> {
        let mut record = Record::default();

        for (name, value) in element.attributes() {
            record.tell(name, value)?;
        }

        for child in element.children() {
            let name = match child.name() {
                "dialect" => "dialectDetail",
                other => other,
            };
            record.tell(name, &child.text())?;
        }

        if record.primary_id.is_empty() {
            return Err(RecordError::EmptyIdentifier);
        }
        Ok(record)
    }

    /// Single intake for attributes and child texts
    pub fn tell(&mut self, name: &str, value: &str) -> Result<(), RecordError> {
        let value = value.trim();
        match name {
            ID_ATTRIBUTE => {
                if !self.primary_id.is_empty() {
                    return Err(RecordError::DuplicateAttribute(name.to_string()));
                }
                self.primary_id = value.to_string();
            }
            ALIAS_ATTRIBUTE => {
                if self.alias.is_some() {
                    return Err(RecordError::DuplicateAttribute(name.to_string()));
                }
                if !value.is_empty() {
                    self.alias = Some(value.to_string());
                }
            }
            _ => {
                if self.attributes.contains_key(name) {
                    return Err(RecordError::DuplicateAttribute(name.to_string()));
                }
                self.attributes.insert(name.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    pub fn primary_id(&self) -> &str {
        &self.primary_id
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Non-reserved attributes, sorted by name
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}
