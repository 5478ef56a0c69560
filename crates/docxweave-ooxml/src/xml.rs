//! Generic XML tree
//!
//! Parts are read once into a small owned tree of [`XmlElement`]s. Namespace
//! prefixes are stripped from element and attribute names (`w:p` becomes
//! `p`, `r:id` becomes `id`) and `xmlns` declarations are dropped, so the
//! typed model can match on local names only.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};

/// A child of an element
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// Nested element
    Element(XmlElement),
    /// Character data, unescaped
    Text(String),
}

/// An element with its attributes and ordered children
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    /// Local tag name
    pub tag: String,
    /// Attributes keyed by local name
    pub attributes: HashMap<String, String>,
    /// Ordered children
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Parse a complete XML part and return its root element
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => stack.push(Self::from_start(e)?),
                Event::Empty(ref e) => {
                    let element = Self::from_start(e)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element);
                    }
                }
                Event::Text(ref e) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = e.unescape()?;
                        if !text.is_empty() {
                            parent.children.push(XmlNode::Text(text.into_owned()));
                        }
                    }
                }
                Event::CData(e) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                        parent.children.push(XmlNode::Text(text));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(OoxmlError::InvalidStructure(format!(
                "unclosed element <{}>",
                open.tag
            )));
        }
        root.ok_or_else(|| OoxmlError::InvalidStructure("empty XML part".to_string()))
    }

    fn from_start(e: &BytesStart) -> Result<Self> {
        let tag = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
        let mut attributes = HashMap::new();

        for attr in e.attributes() {
            let attr = attr?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.entry(key).or_insert(value);
        }

        Ok(Self {
            tag,
            attributes,
            children: Vec::new(),
        })
    }

    /// Attribute value by local name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Shorthand for the ubiquitous `w:val` attribute
    pub fn val(&self) -> Option<&str> {
        self.attr("val")
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with the given tag
    pub fn child(&self, tag: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.tag == tag)
    }

    /// All child elements with the given tag
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.tag == tag)
    }

    /// Follow a path of child tags
    pub fn find(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter().try_fold(self, |element, tag| element.child(tag))
    }

    /// First descendant (depth-first, excluding self) with the given tag
    pub fn descendant(&self, tag: &str) -> Option<&XmlElement> {
        let mut pending: Vec<&XmlElement> = self.elements().collect();
        pending.reverse();
        while let Some(element) = pending.pop() {
            if element.tag == tag {
                return Some(element);
            }
            let before = pending.len();
            pending.extend(element.elements());
            pending[before..].reverse();
        }
        None
    }

    /// Concatenated direct text content
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_prefixes_and_namespace_declarations() {
        let xml = br#"<w:document xmlns:w="urn:w" xmlns:r="urn:r"><w:body><w:hyperlink r:id="rId1" w:history="1"/></w:body></w:document>"#;
        let root = XmlElement::parse(xml).unwrap();

        assert_eq!(root.tag, "document");
        assert!(root.attributes.is_empty());
        let link = root.find(&["body", "hyperlink"]).unwrap();
        assert_eq!(link.attr("id"), Some("rId1"));
        assert_eq!(link.attr("history"), Some("1"));
    }

    #[test]
    fn test_preserves_whitespace_and_unescapes() {
        let xml = br#"<w:t xml:space="preserve">  a &amp; b </w:t>"#;
        let root = XmlElement::parse(xml).unwrap();
        assert_eq!(root.text(), "  a & b ");
        assert_eq!(root.attr("space"), Some("preserve"));
    }

    #[test]
    fn test_children_keep_document_order() {
        let xml = br#"<r><t>a</t><tab/><t>b</t></r>"#;
        let root = XmlElement::parse(xml).unwrap();
        let tags: Vec<&str> = root.elements().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["t", "tab", "t"]);
        assert_eq!(root.children_named("t").count(), 2);
    }

    #[test]
    fn test_descendant_is_depth_first() {
        let xml = br#"<a><b><c id="1"/></b><c id="2"/></a>"#;
        let root = XmlElement::parse(xml).unwrap();
        assert_eq!(root.descendant("c").unwrap().attr("id"), Some("1"));
        assert!(root.descendant("missing").is_none());
    }

    #[test]
    fn test_unclosed_element_is_an_error() {
        let err = XmlElement::parse(b"<a><b>").unwrap_err();
        assert!(matches!(
            err,
            OoxmlError::InvalidStructure(_) | OoxmlError::Xml(_)
        ));
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(XmlElement::parse(b"").is_err());
    }
}
