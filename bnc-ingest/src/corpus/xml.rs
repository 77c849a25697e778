//! Owned XML element tree
//!
//! Builds a navigable tree from quick-xml events. Qualified names are kept
//! as written (`xml:id` stays `xml:id`). Comments, processing instructions
//! and the DOCTYPE are dropped.

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;
use std::slice;
use thiserror::Error;

/// Reasons a document cannot be turned into a tree
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("attribute error: {0}")]
    Attribute(#[from] AttrError),

    #[error("name is not valid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("closing tag without matching start tag")]
    UnbalancedEnd,

    #[error("element <{0}> is never closed")]
    Unclosed(String),

    #[error("more than one root element")]
    MultipleRoots,

    #[error("document has no root element")]
    NoRoot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Element(Element),
    Text(String),
}

/// An element with its attributes and mixed content, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    nodes: Vec<Node>,
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes as written, in document order
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Value of the attribute with this qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements in document order (text nodes skipped)
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Child elements with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children().filter(move |child| child.name == name)
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children().find(|child| child.name == name)
    }

    /// Follow a chain of first-matching child names
    pub fn descend(&self, path: &[&str]) -> Option<&Element> {
        path.iter()
            .try_fold(self, |element, name| element.child(name))
    }

    /// Concatenated text of all descendant text nodes
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// All descendant elements, depth-first in document order (self excluded)
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.nodes.iter()],
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, ParseError> {
        let name = std::str::from_utf8(start.name().as_ref())?.to_string();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            nodes: Vec::new(),
        })
    }
}

/// Lazy pre-order walk over an element's descendants
pub struct Descendants<'a> {
    stack: Vec<slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(Node::Element(element)) => {
                    self.stack.push(element.nodes.iter());
                    return Some(element);
                }
                Some(Node::Text(_)) => continue,
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.nodes.push(Node::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(ParseError::MultipleRoots),
    }
}

/// Parse a complete document held in memory
pub fn parse_str(xml: &str) -> Result<Element, ParseError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or(ParseError::UnbalancedEnd)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                // Whitespace outside the root element is not content
                if let Some(parent) = stack.last_mut() {
                    parent.nodes.push(Node::Text(text.unescape()?.into_owned()));
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    parent.nodes.push(Node::Text(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::Unclosed(open.name));
    }
    root.ok_or(ParseError::NoRoot)
}

/// Read and parse a document from disk
pub fn parse_file(path: &Path) -> Result<Element, ParseError> {
    let xml = std::fs::read_to_string(path)?;
    parse_str(&xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attributes_and_children() {
        let root = parse_str(
            r#"<?xml version="1.0"?>
<bncDoc xml:id="KB0"><teiHeader><profileDesc/></teiHeader><stext type="CONVRSN"/></bncDoc>"#,
        )
        .unwrap();

        assert_eq!(root.name(), "bncDoc");
        assert_eq!(root.attribute("xml:id"), Some("KB0"));
        assert_eq!(root.attribute("id"), None);
        let names: Vec<&str> = root.children().map(|c| c.name()).collect();
        assert_eq!(names, vec!["teiHeader", "stext"]);
        assert!(root.descend(&["teiHeader", "profileDesc"]).is_some());
        assert!(root.descend(&["teiHeader", "fileDesc"]).is_none());
    }

    #[test]
    fn test_text_concatenates_descendants_and_unescapes() {
        let root = parse_str("<p>fish &amp; <hi>chips</hi> <![CDATA[<ok>]]></p>").unwrap();
        assert_eq!(root.text(), "fish & chips <ok>");
    }

    #[test]
    fn test_descendants_are_depth_first_in_document_order() {
        let root = parse_str("<s><a><b/><c/></a><d><e/></d></s>").unwrap();
        let names: Vec<&str> = root.descendants().map(|e| e.name()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_children_named_filters() {
        let root = parse_str("<u><s n='1'/><pause/><s n='2'/></u>").unwrap();
        let ns: Vec<&str> = root
            .children_named("s")
            .filter_map(|s| s.attribute("n"))
            .collect();
        assert_eq!(ns, vec!["1", "2"]);
    }

    #[test]
    fn test_mismatched_tags_fail() {
        assert!(parse_str("<a><b></a></b>").is_err());
    }

    #[test]
    fn test_unclosed_and_empty_documents_fail() {
        assert!(parse_str("<a><b/>").is_err());
        assert!(matches!(parse_str("   "), Err(ParseError::NoRoot)));
    }
}
