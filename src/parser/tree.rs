//! Generic XML → mapping tree.
//!
//! Every element becomes an [`XmlNode`] holding its attributes, its text and
//! its children keyed by qualified name. A name that occurs once maps to
//! [`Children::One`]; repeats map to [`Children::Many`] in document order.

use std::collections::BTreeMap;

use html_escape::decode_html_entities;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::app::{FeedcastError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub children: BTreeMap<String, Children>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Children {
    One(Box<XmlNode>),
    Many(Vec<XmlNode>),
}

impl Children {
    pub fn as_slice(&self) -> &[XmlNode] {
        match self {
            Children::One(node) => std::slice::from_ref(node.as_ref()),
            Children::Many(nodes) => nodes,
        }
    }

    fn push(self, node: XmlNode) -> Self {
        match self {
            Children::One(first) => Children::Many(vec![*first, node]),
            Children::Many(mut nodes) => {
                nodes.push(node);
                Children::Many(nodes)
            }
        }
    }
}

impl XmlNode {
    /// First child named `name`.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children_named(name).first()
    }

    /// All children named `name`; a single child is a one-element slice.
    pub fn children_named(&self, name: &str) -> &[XmlNode] {
        self.children
            .get(name)
            .map(Children::as_slice)
            .unwrap_or(&[])
    }

    /// Follows a path of child names, taking the first match at each step.
    pub fn path(&self, names: &[&str]) -> Option<&XmlNode> {
        names
            .iter()
            .try_fold(self, |node, name| node.child(name))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Trimmed text, or `None` when empty.
    pub fn text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }

    /// Text of the first child named `name`.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(XmlNode::text)
    }

    fn add_child(&mut self, name: String, node: XmlNode) {
        let entry = match self.children.remove(&name) {
            Some(existing) => existing.push(node),
            None => Children::One(Box::new(node)),
        };
        self.children.insert(name, entry);
    }
}

/// A parsed document: the root element's name and node.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub root_name: String,
    pub root: XmlNode,
}

pub fn parse_document(xml: &str) -> Result<XmlDocument> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();

    let mut stack: Vec<(String, XmlNode)> = Vec::new();
    let mut root: Option<(String, XmlNode)> = None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            FeedcastError::parse(format!(
                "malformed XML at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(ref e) => {
                let name = qualified_name(e);
                let node = XmlNode {
                    attributes: attributes(e),
                    ..XmlNode::default()
                };
                stack.push((name, node));
            }
            Event::Empty(ref e) => {
                let name = qualified_name(e);
                let node = XmlNode {
                    attributes: attributes(e),
                    ..XmlNode::default()
                };
                attach(&mut stack, &mut root, name, node)?;
            }
            Event::Text(ref e) => {
                if let Some((_, node)) = stack.last_mut() {
                    let text = e.decode().map_err(FeedcastError::parse)?;
                    node.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some((_, node)) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::GeneralRef(ref e) => {
                if let Some((_, node)) = stack.last_mut() {
                    let reference = format!("&{};", String::from_utf8_lossy(e));
                    node.text.push_str(&decode_html_entities(&reference));
                }
            }
            Event::End(_) => {
                let (name, mut node) = stack
                    .pop()
                    .ok_or_else(|| FeedcastError::parse("unexpected closing tag"))?;
                let trimmed = node.text.trim();
                if trimmed.len() != node.text.len() {
                    node.text = trimmed.to_string();
                }
                attach(&mut stack, &mut root, name, node)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some((name, _)) = stack.last() {
        return Err(FeedcastError::parse(format!(
            "unexpected end of document inside <{}>",
            name
        )));
    }

    root.map(|(root_name, root)| XmlDocument { root_name, root })
        .ok_or_else(|| FeedcastError::parse("document has no root element"))
}

fn attach(
    stack: &mut [(String, XmlNode)],
    root: &mut Option<(String, XmlNode)>,
    name: String,
    node: XmlNode,
) -> Result<()> {
    match stack.last_mut() {
        Some((_, parent)) => parent.add_child(name, node),
        None => {
            if root.is_some() {
                return Err(FeedcastError::parse("multiple root elements"));
            }
            *root = Some((name, node));
        }
    }
    Ok(())
}

fn qualified_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

fn attributes(e: &BytesStart) -> BTreeMap<String, String> {
    e.attributes()
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = decode_html_entities(&String::from_utf8_lossy(&attr.value)).to_string();
            (key, value)
        })
        .collect()
}
