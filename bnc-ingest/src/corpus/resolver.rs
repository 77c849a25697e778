//! Setting and speaker resolution for the document body
//!
//! The body (`stext`) is a sequence of conversational blocks (`div`), each
//! a sequence of turns (`u`) holding sentences (`s`). A block's effective
//! setting comes from its `decls` pair when present, otherwise from its
//! own `n`. Only the `decls` path is checked against the header here;
//! fallback settings and speakers are collected and cross-checked at the
//! end of the document by the normalizer.

use crate::corpus::entity_table::{EntityTable, HeaderTables};
use crate::corpus::event_counter::{count_events, SentenceEvents};
use crate::corpus::xml::Element;
use crate::error::FormatError;
use std::collections::BTreeSet;
use tracing::trace;

/// A non-empty sentence with its resolved references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSentence {
    pub sentence_n: String,
    pub speaker: String,
    pub setting: String,
    pub events: SentenceEvents,
}

/// Everything the body refers to, plus the kept sentences
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedBody {
    pub seen_settings: BTreeSet<String>,
    pub seen_people: BTreeSet<String>,
    pub sentences: Vec<ResolvedSentence>,
    /// Sentences dropped for having no structural events
    pub empty_sentences: usize,
}

/// Walks one document body against that document's header tables
pub struct ReferenceResolver<'a> {
    doc_id: &'a str,
    tables: &'a HeaderTables,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(doc_id: &'a str, tables: &'a HeaderTables) -> Self {
        Self { doc_id, tables }
    }

    pub fn resolve(&self, stext: &Element) -> Result<ResolvedBody, FormatError> {
        let mut body = ResolvedBody::default();

        for block in stext.children() {
            if block.name() != "div" {
                return Err(self.unexpected("stext", block));
            }
            self.resolve_block(block, &mut body)?;
        }

        Ok(body)
    }

    fn resolve_block(&self, block: &Element, body: &mut ResolvedBody) -> Result<(), FormatError> {
        let setting = self.effective_setting(block)?;
        body.seen_settings.insert(setting.clone());

        for turn in block.children() {
            if turn.name() != "u" {
                return Err(self.unexpected("div", turn));
            }
            self.resolve_turn(&setting, turn, body)?;
        }
        Ok(())
    }

    /// Declaration-pair path if `decls` is present, fallback path otherwise
    pub fn effective_setting(&self, block: &Element) -> Result<String, FormatError> {
        if let Some(decls) = block.attribute("decls") {
            let parts: Vec<&str> = decls.split_whitespace().collect();
            let &[recording, setting] = parts.as_slice() else {
                return Err(FormatError::MalformedDeclaration {
                    doc_id: self.doc_id.to_string(),
                    decls: decls.to_string(),
                });
            };
            self.require(&self.tables.recordings, recording)?;
            let setting = self.require(&self.tables.settings, setting)?;
            return Ok(setting.to_string());
        }

        let n = block.attribute("n").map(str::trim).unwrap_or_default();
        if n.is_empty() {
            return Err(self.missing("div", "n"));
        }
        Ok(canonical(&self.tables.settings, n))
    }

    fn resolve_turn(
        &self,
        setting: &str,
        turn: &Element,
        body: &mut ResolvedBody,
    ) -> Result<(), FormatError> {
        let who = turn.attribute("who").map(str::trim).unwrap_or_default();
        if who.is_empty() {
            return Err(self.missing("u", "who"));
        }
        if who.split_whitespace().nth(1).is_some() {
            return Err(FormatError::MultipleSpeakers {
                doc_id: self.doc_id.to_string(),
                who: who.to_string(),
            });
        }

        let speaker = canonical(&self.tables.people, who);
        body.seen_people.insert(speaker.clone());

        for sentence in turn.children_named("s") {
            let sentence_n = sentence.attribute("n").map(str::trim).unwrap_or_default();
            if sentence_n.is_empty() {
                return Err(self.missing("s", "n"));
            }

            let events = count_events(sentence);
            if events.is_empty() {
                trace!("{}: sentence {} has no content", self.doc_id, sentence_n);
                body.empty_sentences += 1;
                continue;
            }

            body.sentences.push(ResolvedSentence {
                sentence_n: sentence_n.to_string(),
                speaker: speaker.clone(),
                setting: setting.to_string(),
                events,
            });
        }
        Ok(())
    }

    fn require<'t>(&self, table: &'t EntityTable, key: &str) -> Result<&'t str, FormatError> {
        table
            .canonical_id(key)
            .ok_or_else(|| FormatError::UndeclaredReference {
                doc_id: self.doc_id.to_string(),
                kind: table.kind(),
                id: key.to_string(),
            })
    }

    fn missing(&self, element: &'static str, attribute: &'static str) -> FormatError {
        FormatError::MissingAttribute {
            doc_id: self.doc_id.to_string(),
            element,
            attribute,
        }
    }

    fn unexpected(&self, parent: &'static str, found: &Element) -> FormatError {
        FormatError::UnexpectedElement {
            doc_id: self.doc_id.to_string(),
            parent,
            found: found.name().to_string(),
        }
    }
}

/// Primary id when declared (possibly through an alias), the key itself otherwise
fn canonical(table: &EntityTable, key: &str) -> String {
    table.canonical_id(key).unwrap_or(key).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::record::EntityKind;
    use crate::corpus::xml::parse_str;

    fn tables() -> HeaderTables {
        let header = parse_str(
            r#"<teiHeader>
                 <fileDesc><sourceDesc><recordingStmt>
                   <recording xml:id="R1" n="097701"/>
                 </recordingStmt></sourceDesc></fileDesc>
                 <profileDesc>
                   <particDesc>
                     <person xml:id="PS001" n="JOHN"/>
                   </particDesc>
                   <settingDesc>
                     <setting xml:id="S1" n="HOME" who="PS001"/>
                   </settingDesc>
                 </profileDesc>
               </teiHeader>"#,
        )
        .unwrap();
        HeaderTables::from_header("KB0", &header).unwrap()
    }

    #[test]
    fn test_declaration_pair_path() {
        let tables = tables();
        let resolver = ReferenceResolver::new("KB0", &tables);

        let block = parse_str(r#"<div decls="R1 HOME" n="ignored"/>"#).unwrap();
        assert_eq!(resolver.effective_setting(&block).unwrap(), "S1");
    }

    #[test]
    fn test_declaration_pair_must_resolve() {
        let tables = tables();
        let resolver = ReferenceResolver::new("KB0", &tables);

        let block = parse_str(r#"<div decls="R9 S1"/>"#).unwrap();
        assert!(matches!(
            resolver.effective_setting(&block),
            Err(FormatError::UndeclaredReference { kind: EntityKind::Recording, .. })
        ));

        let block = parse_str(r#"<div decls="R1 S9"/>"#).unwrap();
        assert!(matches!(
            resolver.effective_setting(&block),
            Err(FormatError::UndeclaredReference { kind: EntityKind::Setting, .. })
        ));
    }

    #[test]
    fn test_declaration_pair_needs_two_tokens() {
        let tables = tables();
        let resolver = ReferenceResolver::new("KB0", &tables);

        // A present but blank decls does not fall back to n
        for decls in ["R1", "R1 S1 S1", "", "   "] {
            let block = parse_str(&format!(r#"<div decls="{}" n="S1"/>"#, decls)).unwrap();
            assert!(matches!(
                resolver.effective_setting(&block),
                Err(FormatError::MalformedDeclaration { .. })
            ));
        }
    }

    #[test]
    fn test_fallback_path_does_not_require_declaration() {
        let tables = tables();
        let resolver = ReferenceResolver::new("KB0", &tables);

        let block = parse_str(r#"<div n="S9"/>"#).unwrap();
        assert_eq!(resolver.effective_setting(&block).unwrap(), "S9");

        let block = parse_str(r#"<div n="HOME"/>"#).unwrap();
        assert_eq!(resolver.effective_setting(&block).unwrap(), "S1");

        let block = parse_str(r#"<div/>"#).unwrap();
        assert!(matches!(
            resolver.effective_setting(&block),
            Err(FormatError::MissingAttribute { element: "div", attribute: "n", .. })
        ));
    }

    #[test]
    fn test_resolve_collects_references_and_drops_empty_sentences() {
        let tables = tables();
        let resolver = ReferenceResolver::new("KB0", &tables);

        let stext = parse_str(
            r#"<stext type="CONVRSN">
                 <div n="S1">
                   <u who="JOHN">
                     <s n="1"><w hw="hello">hello</w></s>
                     <s n="2"><pause/></s>
                   </u>
                   <u who="PS000"><s n="3"><vocal desc="cough"/></s></u>
                 </div>
                 <div n="S9"><u who="PS001"><s n="4"><c>.</c></s></u></div>
               </stext>"#,
        )
        .unwrap();

        let body = resolver.resolve(&stext).unwrap();
        assert_eq!(
            body.seen_settings.iter().collect::<Vec<_>>(),
            vec!["S1", "S9"]
        );
        assert_eq!(
            body.seen_people.iter().collect::<Vec<_>>(),
            vec!["PS000", "PS001"]
        );
        assert_eq!(body.empty_sentences, 1);

        let kept: Vec<(&str, &str, &str)> = body
            .sentences
            .iter()
            .map(|s| (s.sentence_n.as_str(), s.speaker.as_str(), s.setting.as_str()))
            .collect();
        assert_eq!(
            kept,
            vec![("1", "PS001", "S1"), ("3", "PS000", "S1"), ("4", "PS001", "S9")]
        );
    }

    #[test]
    fn test_turn_requires_single_speaker() {
        let tables = tables();
        let resolver = ReferenceResolver::new("KB0", &tables);

        let stext = parse_str(r#"<stext><div n="S1"><u who=""/></div></stext>"#).unwrap();
        assert!(matches!(
            resolver.resolve(&stext),
            Err(FormatError::MissingAttribute { element: "u", .. })
        ));

        let stext =
            parse_str(r#"<stext><div n="S1"><u who="PS001 PS002"/></div></stext>"#).unwrap();
        assert!(matches!(
            resolver.resolve(&stext),
            Err(FormatError::MultipleSpeakers { .. })
        ));
    }

    #[test]
    fn test_body_structure_is_enforced() {
        let tables = tables();
        let resolver = ReferenceResolver::new("KB0", &tables);

        let stext = parse_str(r#"<stext><p/></stext>"#).unwrap();
        assert!(matches!(
            resolver.resolve(&stext),
            Err(FormatError::UnexpectedElement { parent: "stext", .. })
        ));

        let stext = parse_str(r#"<stext><div n="S1"><s n="1"/></div></stext>"#).unwrap();
        assert!(matches!(
            resolver.resolve(&stext),
            Err(FormatError::UnexpectedElement { parent: "div", .. })
        ));
    }
}
