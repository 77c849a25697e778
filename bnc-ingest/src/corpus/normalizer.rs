//! End-of-document normalization
//!
//! Cross-checks every referenced setting and speaker against the header
//! tables and turns the resolved body into rows for the five corpus
//! tables. Undeclared references produce a [`Diagnostic`] and a row with
//! empty attributes, so the identifier still exists as a foreign key
//! target.

use crate::corpus::entity_table::{EntityTable, HeaderTables};
use crate::corpus::record::{EntityKind, Record};
use crate::corpus::resolver::{ResolvedBody, ResolvedSentence};
use crate::error::FormatError;
use bnc_common::config::DEFAULT_PLACEHOLDER_SPEAKERS;
use bnc_common::db::{
    PeopleTable, SentencesTable, SettingPeopleTable, SettingsTable, SqlValue, TableRow,
    TableSchema, WordsTable, PERSON_ATTRIBUTES, SETTING_ATTRIBUTES,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::AddAssign;
use tracing::warn;

/// Non-fatal data-quality finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    UnknownSetting { doc_id: String, setting_id: String },
    UnknownPerson { doc_id: String, person_id: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownSetting { doc_id, setting_id } => {
                write!(f, "{}: {}: unknown setting", doc_id, setting_id)
            }
            Diagnostic::UnknownPerson { doc_id, person_id } => {
                write!(f, "{}: {}: unknown person", doc_id, person_id)
            }
        }
    }
}

/// Rows per corpus table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    pub settings: usize,
    pub people: usize,
    pub links: usize,
    pub sentences: usize,
    pub words: usize,
}

impl RowCounts {
    pub fn total(&self) -> usize {
        self.settings + self.people + self.links + self.sentences + self.words
    }
}

impl AddAssign for RowCounts {
    fn add_assign(&mut self, other: Self) {
        self.settings += other.settings;
        self.people += other.people;
        self.links += other.links;
        self.sentences += other.sentences;
        self.words += other.words;
    }
}

/// Tunables for normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Speaker codes exempt from "unknown person" diagnostics
    pub placeholder_speakers: BTreeSet<String>,
}

impl NormalizeOptions {
    pub fn with_placeholders<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            placeholder_speakers: codes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_placeholder(&self, person_id: &str) -> bool {
        self.placeholder_speakers.contains(person_id)
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::with_placeholders(DEFAULT_PLACEHOLDER_SPEAKERS.iter().copied())
    }
}

/// Rows and diagnostics for one document, ready for emission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedDocument {
    pub doc_id: String,
    pub settings: Vec<TableRow>,
    pub people: Vec<TableRow>,
    pub links: Vec<TableRow>,
    pub sentences: Vec<TableRow>,
    pub words: Vec<TableRow>,
    pub diagnostics: Vec<Diagnostic>,
    /// Sentences dropped for having no content
    pub empty_sentences: usize,
}

impl NormalizedDocument {
    /// All rows, parents before children
    pub fn rows(&self) -> impl Iterator<Item = &TableRow> {
        self.settings
            .iter()
            .chain(&self.people)
            .chain(&self.links)
            .chain(&self.sentences)
            .chain(&self.words)
    }

    pub fn row_counts(&self) -> RowCounts {
        RowCounts {
            settings: self.settings.len(),
            people: self.people.len(),
            links: self.links.len(),
            sentences: self.sentences.len(),
            words: self.words.len(),
        }
    }
}

/// Turns one resolved body into rows
pub struct Normalizer<'a> {
    doc_id: &'a str,
    tables: &'a HeaderTables,
    options: &'a NormalizeOptions,
}

impl<'a> Normalizer<'a> {
    pub fn new(doc_id: &'a str, tables: &'a HeaderTables, options: &'a NormalizeOptions) -> Self {
        Self {
            doc_id,
            tables,
            options,
        }
    }

    pub fn normalize(&self, body: ResolvedBody) -> Result<NormalizedDocument, FormatError> {
        let ResolvedBody {
            seen_settings,
            mut seen_people,
            sentences,
            empty_sentences,
        } = body;

        let mut doc = NormalizedDocument {
            doc_id: self.doc_id.to_string(),
            empty_sentences,
            ..NormalizedDocument::default()
        };

        let mut links: BTreeSet<(String, String)> = BTreeSet::new();
        for setting_id in &seen_settings {
            let record = self.tables.settings.get(setting_id);
            if record.is_none() {
                self.report(
                    &mut doc,
                    Diagnostic::UnknownSetting {
                        doc_id: self.doc_id.to_string(),
                        setting_id: setting_id.clone(),
                    },
                );
            }
            doc.settings.push(self.entity_row::<SettingsTable>(
                "setting_id",
                EntityKind::Setting,
                setting_id,
                record,
                SETTING_ATTRIBUTES,
            )?);

            // An empty or missing who list links nobody
            let who = record.and_then(|r| r.attribute("who")).unwrap_or_default();
            for person in who.split_whitespace() {
                let person_id = canonical(&self.tables.people, person);
                seen_people.insert(person_id.clone());
                links.insert((setting_id.clone(), person_id));
            }
        }

        for person_id in &seen_people {
            let record = self.tables.people.get(person_id);
            if record.is_none() && !self.options.is_placeholder(person_id) {
                self.report(
                    &mut doc,
                    Diagnostic::UnknownPerson {
                        doc_id: self.doc_id.to_string(),
                        person_id: person_id.clone(),
                    },
                );
            }
            doc.people.push(self.entity_row::<PeopleTable>(
                "person_id",
                EntityKind::Person,
                person_id,
                record,
                PERSON_ATTRIBUTES,
            )?);
        }

        for (setting_id, person_id) in links {
            doc.links.push(
                TableRow::new(SettingPeopleTable::table_name())
                    .with("doc_id", self.doc_id)
                    .with("setting_id", setting_id)
                    .with("person_id", person_id),
            );
        }

        for sentence in &sentences {
            self.push_sentence(&mut doc, sentence);
        }

        Ok(doc)
    }

    fn report(&self, doc: &mut NormalizedDocument, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        doc.diagnostics.push(diagnostic);
    }

    /// Row for a setting or person; `None` records yield empty attribute columns
    fn entity_row<T: TableSchema>(
        &self,
        key_column: &str,
        kind: EntityKind,
        id: &str,
        record: Option<&Record>,
        columns: &[&str],
    ) -> Result<TableRow, FormatError> {
        if let Some(record) = record {
            if let Some((attribute, _)) = record
                .attributes()
                .find(|(name, _)| !columns.contains(name))
            {
                return Err(FormatError::UnexpectedAttribute {
                    doc_id: self.doc_id.to_string(),
                    kind,
                    id: id.to_string(),
                    attribute: attribute.to_string(),
                });
            }
        }

        let text = |value: Option<&str>| SqlValue::from(value.map(str::to_string));
        let mut row = TableRow::new(T::table_name())
            .with("doc_id", self.doc_id)
            .with(key_column, id)
            .with("alias", text(record.and_then(Record::alias)));
        for column in columns {
            row = row.with(*column, text(record.and_then(|r| r.attribute(column))));
        }
        Ok(row)
    }

    fn push_sentence(&self, doc: &mut NormalizedDocument, sentence: &ResolvedSentence) {
        let counts = &sentence.events.counts;
        doc.sentences.push(
            TableRow::new(SentencesTable::table_name())
                .with("doc_id", self.doc_id)
                .with("sentence_n", sentence.sentence_n.as_str())
                .with("person_id", sentence.speaker.as_str())
                .with("setting_id", sentence.setting.as_str())
                .with("n_w", counts.words)
                .with("n_c", counts.punctuation)
                .with("n_unclear", counts.unclear)
                .with("n_vocal", counts.vocal)
                .with("n_gap", counts.gap),
        );

        for word in &sentence.events.words {
            doc.words.push(
                TableRow::new(WordsTable::table_name())
                    .with("doc_id", self.doc_id)
                    .with("sentence_n", sentence.sentence_n.as_str())
                    .with("person_id", sentence.speaker.as_str())
                    .with("position", word.position)
                    .with("form", word.form.as_str())
                    .with("hw", word.headword.clone())
                    .with("c5", word.tag.clone())
                    .with("pos", word.pos.clone()),
            );
        }
    }
}

fn canonical(table: &EntityTable, key: &str) -> String {
    table.canonical_id(key).unwrap_or(key).to_string()
}
