//! Table Schema Definitions
//!
//! Single source of truth for the five normalized corpus tables.
//! Every table is keyed by the document id plus the entity id (and, for
//! words, the position inside the sentence).
//!
//! Settings and people additionally carry one nullable TEXT column per
//! header attribute a declaration of that kind may have. The attribute
//! names are the element/attribute names used in the corpus header, so
//! they keep their camelCase spelling.

use crate::db::schema::{ensure_table, ColumnDefinition, ForeignKey, TableSchema};
use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Header attributes a `<setting>` declaration may carry
pub const SETTING_ATTRIBUTES: &[&str] = &["who", "placeName", "locale", "activity", "note"];

/// Header attributes a `<person>` declaration may carry
pub const PERSON_ATTRIBUTES: &[&str] = &[
    "ageGroup",
    "age",
    "dialect",
    "dialectDetail",
    "educ",
    "firstLang",
    "occupation",
    "persName",
    "residence",
    "role",
    "sex",
    "soc",
    "note",
];

fn attribute_columns(names: &[&str]) -> Vec<ColumnDefinition> {
    names
        .iter()
        .map(|name| ColumnDefinition::new(*name, "TEXT"))
        .collect()
}

/// Declared settings that at least one conversational block refers to
pub struct SettingsTable;

impl TableSchema for SettingsTable {
    fn table_name() -> &'static str {
        "settings"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        let mut columns = vec![
            ColumnDefinition::new("doc_id", "TEXT").primary_key(),
            ColumnDefinition::new("setting_id", "TEXT").primary_key(),
            ColumnDefinition::new("alias", "TEXT"),
        ];
        columns.extend(attribute_columns(SETTING_ATTRIBUTES));
        columns
    }
}

/// Speakers referenced by turns or by a setting's `who` list
pub struct PeopleTable;

impl TableSchema for PeopleTable {
    fn table_name() -> &'static str {
        "people"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        let mut columns = vec![
            ColumnDefinition::new("doc_id", "TEXT").primary_key(),
            ColumnDefinition::new("person_id", "TEXT").primary_key(),
            ColumnDefinition::new("alias", "TEXT"),
        ];
        columns.extend(attribute_columns(PERSON_ATTRIBUTES));
        columns
    }
}

/// Setting to person links taken from each setting's `who` list
pub struct SettingPeopleTable;

impl TableSchema for SettingPeopleTable {
    fn table_name() -> &'static str {
        "setting_people"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("doc_id", "TEXT").primary_key(),
            ColumnDefinition::new("setting_id", "TEXT").primary_key(),
            ColumnDefinition::new("person_id", "TEXT").primary_key(),
        ]
    }

    fn foreign_keys() -> Vec<ForeignKey> {
        vec![
            ForeignKey::new(
                &["doc_id", "setting_id"],
                "settings",
                &["doc_id", "setting_id"],
            ),
            ForeignKey::new(&["doc_id", "person_id"], "people", &["doc_id", "person_id"]),
        ]
    }
}

/// Per-sentence structural event counts
pub struct SentencesTable;

impl TableSchema for SentencesTable {
    fn table_name() -> &'static str {
        "sentences"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("doc_id", "TEXT").primary_key(),
            ColumnDefinition::new("sentence_n", "TEXT").primary_key(),
            ColumnDefinition::new("person_id", "TEXT").primary_key(),
            ColumnDefinition::new("setting_id", "TEXT").not_null(),
            ColumnDefinition::new("n_w", "INTEGER").not_null().default("0"),
            ColumnDefinition::new("n_c", "INTEGER").not_null().default("0"),
            ColumnDefinition::new("n_unclear", "INTEGER").not_null().default("0"),
            ColumnDefinition::new("n_vocal", "INTEGER").not_null().default("0"),
            ColumnDefinition::new("n_gap", "INTEGER").not_null().default("0"),
        ]
    }

    fn foreign_keys() -> Vec<ForeignKey> {
        vec![
            ForeignKey::new(
                &["doc_id", "setting_id"],
                "settings",
                &["doc_id", "setting_id"],
            ),
            ForeignKey::new(&["doc_id", "person_id"], "people", &["doc_id", "person_id"]),
        ]
    }
}

/// Word tags of kept sentences, in document order
pub struct WordsTable;

impl TableSchema for WordsTable {
    fn table_name() -> &'static str {
        "words"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("doc_id", "TEXT").primary_key(),
            ColumnDefinition::new("sentence_n", "TEXT").primary_key(),
            ColumnDefinition::new("person_id", "TEXT").primary_key(),
            ColumnDefinition::new("position", "INTEGER").primary_key(),
            ColumnDefinition::new("form", "TEXT"),
            ColumnDefinition::new("hw", "TEXT"),
            ColumnDefinition::new("c5", "TEXT"),
            ColumnDefinition::new("pos", "TEXT"),
        ]
    }

    fn foreign_keys() -> Vec<ForeignKey> {
        vec![ForeignKey::new(
            &["doc_id", "sentence_n", "person_id"],
            "sentences",
            &["doc_id", "sentence_n", "person_id"],
        )]
    }
}

/// Table names in foreign-key dependency order (parents first)
pub const CORPUS_TABLES: &[&str] = &["settings", "people", "setting_people", "sentences", "words"];

/// Declared columns of a corpus table, looked up by name
pub fn columns_for(table_name: &str) -> Option<Vec<ColumnDefinition>> {
    match table_name {
        "settings" => Some(SettingsTable::expected_columns()),
        "people" => Some(PeopleTable::expected_columns()),
        "setting_people" => Some(SettingPeopleTable::expected_columns()),
        "sentences" => Some(SentencesTable::expected_columns()),
        "words" => Some(WordsTable::expected_columns()),
        _ => None,
    }
}

/// Create missing corpus tables and verify existing ones, parents before children
pub async fn ensure_all_tables(pool: &SqlitePool) -> Result<()> {
    info!("Checking corpus table schemas");

    ensure_table::<SettingsTable>(pool).await?;
    ensure_table::<PeopleTable>(pool).await?;
    ensure_table::<SettingPeopleTable>(pool).await?;
    ensure_table::<SentencesTable>(pool).await?;
    ensure_table::<WordsTable>(pool).await?;

    Ok(())
}
