//! Structural event counts for one sentence
//!
//! A sentence (`<s>`) is summarized by folding over its descendants in
//! document order. Words additionally contribute a [`WordTag`]; the order
//! of the fold fixes word positions, which are part of the word row key.

use crate::corpus::xml::Element;

/// Element kinds that count as structural events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralEvent {
    Word,
    Punctuation,
    Unclear,
    Vocal,
    Gap,
}

impl StructuralEvent {
    /// Event kind for an element name; `None` for elements that are only traversed
    pub fn classify(element_name: &str) -> Option<Self> {
        match element_name {
            "w" => Some(StructuralEvent::Word),
            "c" => Some(StructuralEvent::Punctuation),
            "unclear" => Some(StructuralEvent::Unclear),
            "vocal" => Some(StructuralEvent::Vocal),
            "gap" => Some(StructuralEvent::Gap),
            _ => None,
        }
    }
}

/// Per-sentence event tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCounts {
    pub words: usize,
    pub punctuation: usize,
    pub unclear: usize,
    pub vocal: usize,
    pub gap: usize,
}

impl EventCounts {
    pub fn record(&mut self, event: StructuralEvent) {
        match event {
            StructuralEvent::Word => self.words += 1,
            StructuralEvent::Punctuation => self.punctuation += 1,
            StructuralEvent::Unclear => self.unclear += 1,
            StructuralEvent::Vocal => self.vocal += 1,
            StructuralEvent::Gap => self.gap += 1,
        }
    }

    /// True when no event of any kind was seen
    pub fn is_empty(&self) -> bool {
        self.words == 0
            && self.punctuation == 0
            && self.unclear == 0
            && self.vocal == 0
            && self.gap == 0
    }
}

/// Linguistic tags of one word token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordTag {
    /// 0-based index among the sentence's words
    pub position: usize,
    /// Token text, trimmed
    pub form: String,
    /// Headword (`hw`)
    pub headword: Option<String>,
    /// CLAWS C5 tag (`c5`)
    pub tag: Option<String>,
    /// Simplified part of speech (`pos`)
    pub pos: Option<String>,
}

impl WordTag {
    fn from_element(position: usize, element: &Element) -> Self {
        let tag = |name: &str| element.attribute(name).map(|v| v.trim().to_string());
        Self {
            position,
            form: element.text().trim().to_string(),
            headword: tag("hw"),
            tag: tag("c5"),
            pos: tag("pos"),
        }
    }
}

/// Fold accumulator: counts plus the word list in traversal order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceEvents {
    pub counts: EventCounts,
    pub words: Vec<WordTag>,
}

impl SentenceEvents {
    /// Sentences without any structural event carry no transcribed content
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    fn step(mut self, element: &Element) -> Self {
        if let Some(event) = StructuralEvent::classify(element.name()) {
            self.counts.record(event);
            if event == StructuralEvent::Word {
                let position = self.words.len();
                self.words.push(WordTag::from_element(position, element));
            }
        }
        self
    }
}

/// Count the structural events below `sentence`
pub fn count_events(sentence: &Element) -> SentenceEvents {
    sentence
        .descendants()
        .fold(SentenceEvents::default(), SentenceEvents::step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::xml::parse_str;

    #[test]
    fn test_counts_each_category() {
        let s = parse_str(
            r#"<s n="12">
                 <w c5="PNP" hw="i" pos="PRON">I </w>
                 <w c5="VVD" hw="say" pos="VERB">said</w>
                 <c c5="PUN">,</c>
                 <unclear/>
                 <vocal desc="laugh"/>
                 <gap desc="name" reason="anonymization"/>
                 <pause dur="3"/>
                 <c c5="PUN">.</c>
               </s>"#,
        )
        .unwrap();

        let events = count_events(&s);
        assert_eq!(
            events.counts,
            EventCounts {
                words: 2,
                punctuation: 2,
                unclear: 1,
                vocal: 1,
                gap: 1,
            }
        );
        assert_eq!(events.words.len(), events.counts.words);
        assert_eq!(events.words[0].form, "I");
        assert_eq!(events.words[0].headword.as_deref(), Some("i"));
        assert_eq!(events.words[1].tag.as_deref(), Some("VVD"));
        assert_eq!(events.words[1].pos.as_deref(), Some("VERB"));
    }

    #[test]
    fn test_nested_words_positions_follow_document_order() {
        let s = parse_str(
            r#"<s n="3">
                 <w hw="well">Well</w>
                 <mw c5="AV0"><w hw="of">of </w><w hw="course">course</w></mw>
                 <unclear><w hw="maybe">maybe</w></unclear>
               </s>"#,
        )
        .unwrap();

        let events = count_events(&s);
        let positions: Vec<usize> = events.words.iter().map(|w| w.position).collect();
        let headwords: Vec<&str> = events
            .words
            .iter()
            .filter_map(|w| w.headword.as_deref())
            .collect();

        assert_eq!(positions, vec![0, 1, 2, 3]);
        assert_eq!(headwords, vec!["well", "of", "course", "maybe"]);
        assert_eq!(events.counts.unclear, 1);
    }

    #[test]
    fn test_pause_only_sentence_is_empty() {
        let s = parse_str(r#"<s n="7"><pause/><shift new="loud"/></s>"#).unwrap();
        let events = count_events(&s);
        assert!(events.is_empty());
        assert!(events.words.is_empty());
    }

    #[test]
    fn test_missing_word_tags_are_none() {
        let s = parse_str(r#"<s n="1"><w>erm</w></s>"#).unwrap();
        let events = count_events(&s);
        assert!(!events.is_empty());
        assert_eq!(events.words[0].headword, None);
        assert_eq!(events.words[0].form, "erm");
    }
}
