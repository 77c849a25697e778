//! Shared fixtures for bnc-ingest integration tests
//!
//! `DocumentFixture` renders a minimal `bncDoc` with the three header
//! sections and whatever body blocks a test adds.

#![allow(dead_code)]

use bnc_common::db::init_database;
use sqlx::SqlitePool;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builder for one corpus document
#[derive(Debug, Clone)]
pub struct DocumentFixture {
    id: String,
    text_type: Option<String>,
    recordings: Vec<String>,
    people: Vec<String>,
    settings: Vec<String>,
    blocks: Vec<String>,
}

impl DocumentFixture {
    /// Conversational spoken document
    pub fn conversation(id: &str) -> Self {
        Self {
            id: id.to_string(),
            text_type: Some("CONVRSN".to_string()),
            recordings: Vec::new(),
            people: Vec::new(),
            settings: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Document without a spoken body
    pub fn written(id: &str) -> Self {
        Self {
            text_type: None,
            ..Self::conversation(id)
        }
    }

    pub fn text_type(mut self, text_type: &str) -> Self {
        self.text_type = Some(text_type.to_string());
        self
    }

    pub fn recording(mut self, id: &str) -> Self {
        self.recordings.push(format!(r#"<recording xml:id="{}"/>"#, id));
        self
    }

    /// `extra` is inserted verbatim inside the element
    pub fn person(mut self, id: &str, alias: Option<&str>, extra: &str) -> Self {
        let alias = alias.map(|a| format!(r#" n="{}""#, a)).unwrap_or_default();
        self.people
            .push(format!(r#"<person xml:id="{}"{}>{}</person>"#, id, alias, extra));
        self
    }

    pub fn setting(mut self, id: &str, who: &str, extra: &str) -> Self {
        self.settings
            .push(format!(r#"<setting xml:id="{}" who="{}">{}</setting>"#, id, who, extra));
        self
    }

    /// Raw `<div>` block
    pub fn block(mut self, xml: &str) -> Self {
        self.blocks.push(xml.to_string());
        self
    }

    pub fn to_xml(&self) -> String {
        let body = match &self.text_type {
            Some(text_type) => format!(
                r#"<stext type="{}">{}</stext>"#,
                text_type,
                self.blocks.concat()
            ),
            None => r#"<wtext type="FICTION"><div><p>Once upon a time.</p></div></wtext>"#
                .to_string(),
        };

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<bncDoc xml:id="{id}">
  <teiHeader>
    <fileDesc><sourceDesc><recordingStmt>{recordings}</recordingStmt></sourceDesc></fileDesc>
    <profileDesc>
      <particDesc>{people}</particDesc>
      <settingDesc>{settings}</settingDesc>
    </profileDesc>
  </teiHeader>
  {body}
</bncDoc>
"#,
            id = self.id,
            recordings = self.recordings.concat(),
            people = self.people.concat(),
            settings = self.settings.concat(),
            body = body,
        )
    }

    /// Write `<dir>/<id>.xml`
    pub fn write_to(&self, dir: &Path) -> PathBuf {
        let path = dir.join(format!("{}.xml", self.id));
        fs::write(&path, self.to_xml()).unwrap();
        path
    }
}

/// One `<u>` with a single sentence of plain words
pub fn turn(who: &str, sentence_n: &str, words: &[&str]) -> String {
    let words: String = words
        .iter()
        .map(|w| format!(r#"<w c5="UNC" hw="{}" pos="UNC">{} </w>"#, w.to_lowercase(), w))
        .collect();
    format!(r#"<u who="{}"><s n="{}">{}</s></u>"#, who, sentence_n, words)
}

/// Scratch area with separate corpus and database locations
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("corpus")).unwrap();
        Self { dir }
    }

    pub fn corpus(&self) -> PathBuf {
        self.dir.path().join("corpus")
    }

    pub fn db_path(&self, name: &str) -> PathBuf {
        self.dir.path().join("db").join(name)
    }

    pub fn write(&self, fixture: &DocumentFixture) -> PathBuf {
        fixture.write_to(&self.corpus())
    }

    pub fn write_raw(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.corpus().join(file_name);
        fs::write(&path, content).unwrap();
        path
    }

    pub async fn open_db(&self, name: &str) -> SqlitePool {
        init_database(&self.db_path(name)).await.unwrap()
    }
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM \"{}\"", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Row counts of the five tables, parents first
pub async fn table_counts(pool: &SqlitePool) -> [i64; 5] {
    [
        count_rows(pool, "settings").await,
        count_rows(pool, "people").await,
        count_rows(pool, "setting_people").await,
        count_rows(pool, "sentences").await,
        count_rows(pool, "words").await,
    ]
}
