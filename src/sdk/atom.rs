//! Atom feed parsing.
//!
//! Splunk answers collection requests with an Atom feed whose entries carry
//! their properties in an `s:dict` tree inside `<content>`. This module turns
//! that document into an [`AtomFeed`]. It also reads the two non-Atom
//! documents the client cares about: the login response and error messages.

use chrono::{DateTime, FixedOffset};
use roxmltree::{Document, Node};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::sdk::namespace::ResourceName;

/// A property value from an entry's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    List(Vec<Value>),
    Dict(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Dict(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key when this value is a dict.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_dict().and_then(|map| map.get(key))
    }
}

/// One `<entry>` of a feed.
#[derive(Debug, Clone, Serialize)]
pub struct AtomEntry {
    pub title: String,
    pub id: String,
    pub updated: Option<DateTime<FixedOffset>>,
    pub published: Option<DateTime<FixedOffset>>,
    pub author: Option<String>,
    /// `rel` -> `href`
    pub links: BTreeMap<String, String>,
    pub content: Option<Value>,
}

/// A parsed Atom feed.
#[derive(Debug, Clone, Serialize)]
pub struct AtomFeed {
    /// The collection the feed was fetched from.
    pub resource: ResourceName,
    pub title: String,
    pub id: String,
    pub updated: Option<DateTime<FixedOffset>>,
    pub author: Option<String>,
    pub generator_version: Option<String>,
    pub total_results: Option<u64>,
    pub items_per_page: Option<u64>,
    pub start_index: Option<u64>,
    pub links: BTreeMap<String, String>,
    pub entries: Vec<AtomEntry>,
}

impl AtomFeed {
    /// Parse a feed document fetched from `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Xml`] for malformed XML and [`Error::Feed`] when the
    /// document is not an Atom feed or carries unreadable values.
    pub fn parse(resource: &ResourceName, document: &str) -> Result<Self> {
        let doc = Document::parse(document)?;
        let root = doc.root_element();

        if root.tag_name().name() != "feed" {
            return Err(Error::Feed(format!(
                "expected <feed> root element, found <{}>",
                root.tag_name().name()
            )));
        }

        let mut feed = AtomFeed {
            resource: resource.clone(),
            title: String::new(),
            id: String::new(),
            updated: None,
            author: None,
            generator_version: None,
            total_results: None,
            items_per_page: None,
            start_index: None,
            links: BTreeMap::new(),
            entries: Vec::new(),
        };

        for child in root.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "title" => feed.title = text_of(child),
                "id" => feed.id = text_of(child),
                "updated" => feed.updated = parse_timestamp(child)?,
                "author" => feed.author = author_name(child),
                "generator" => {
                    feed.generator_version = child.attribute("version").map(String::from)
                }
                "totalResults" => feed.total_results = parse_count(child)?,
                "itemsPerPage" => feed.items_per_page = parse_count(child)?,
                "startIndex" => feed.start_index = parse_count(child)?,
                "link" => insert_link(&mut feed.links, child),
                "entry" => feed.entries.push(parse_entry(child)?),
                _ => {}
            }
        }

        Ok(feed)
    }
}

fn parse_entry(node: Node) -> Result<AtomEntry> {
    let mut entry = AtomEntry {
        title: String::new(),
        id: String::new(),
        updated: None,
        published: None,
        author: None,
        links: BTreeMap::new(),
        content: None,
    };

    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "title" => entry.title = text_of(child),
            "id" => entry.id = text_of(child),
            "updated" => entry.updated = parse_timestamp(child)?,
            "published" => entry.published = parse_timestamp(child)?,
            "author" => entry.author = author_name(child),
            "link" => insert_link(&mut entry.links, child),
            "content" => entry.content = Some(parse_value(child)),
            _ => {}
        }
    }

    Ok(entry)
}

/// Parse the value held by `node`: a nested dict or list, or its text.
fn parse_value(node: Node) -> Value {
    match node.children().find(Node::is_element) {
        Some(inner) => match inner.tag_name().name() {
            "dict" => Value::Dict(
                inner
                    .children()
                    .filter(|n| n.is_element() && n.tag_name().name() == "key")
                    .filter_map(|key| {
                        key.attribute("name")
                            .map(|name| (name.to_string(), parse_value(key)))
                    })
                    .collect(),
            ),
            "list" => Value::List(
                inner
                    .children()
                    .filter(|n| n.is_element() && n.tag_name().name() == "item")
                    .map(parse_value)
                    .collect(),
            ),
            _ => Value::String(text_of(inner)),
        },
        None => Value::String(text_of(node)),
    }
}

fn text_of(node: Node) -> String {
    node.text().map(str::trim).unwrap_or_default().to_string()
}

fn author_name(node: Node) -> Option<String> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == "name")
        .map(text_of)
}

fn insert_link(links: &mut BTreeMap<String, String>, node: Node) {
    if let Some(href) = node.attribute("href") {
        let rel = node.attribute("rel").unwrap_or("alternate");
        links.insert(rel.to_string(), href.to_string());
    }
}

fn parse_timestamp(node: Node) -> Result<Option<DateTime<FixedOffset>>> {
    let text = text_of(node);
    if text.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(&text)
        .map(Some)
        .map_err(|e| Error::Feed(format!("invalid timestamp '{}': {}", text, e)))
}

fn parse_count(node: Node) -> Result<Option<u64>> {
    let text = text_of(node);
    if text.is_empty() {
        return Ok(None);
    }
    text.parse()
        .map(Some)
        .map_err(|_| Error::Feed(format!("invalid count '{}'", text)))
}

/// Extract the session key from a login response.
pub fn parse_session_key(document: &str) -> Result<String> {
    let doc = Document::parse(document)?;
    doc.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "sessionKey")
        .map(text_of)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| Error::Auth("login response did not contain a session key".to_string()))
}

/// Collect the `<msg>` texts of a Splunk error response, if any.
pub fn parse_error_message(document: &str) -> Option<String> {
    let doc = Document::parse(document).ok()?;
    let messages: Vec<String> = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "msg")
        .map(text_of)
        .filter(|m| !m.is_empty())
        .collect();

    if messages.is_empty() {
        None
    } else {
        Some(messages.join("; "))
    }
}
