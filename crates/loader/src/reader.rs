//! XML text → element tree.
//!
//! Only well-formedness is checked here: one root element, properly nested
//! tags, valid attributes and entities. What the elements mean is the
//! parser's concern.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::LoadError;

/// An XML element with its attributes, child elements and text content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// Concatenated text and CDATA content, trimmed.
    pub text: String,
}

impl Element {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn malformed(message: impl Into<String>) -> LoadError {
    LoadError::Malformed {
        message: message.into(),
    }
}

fn utf8(bytes: &[u8]) -> Result<String, LoadError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| malformed(e.to_string()))
}

fn open_element(e: &BytesStart<'_>) -> Result<Element, LoadError> {
    let mut element = Element {
        name: utf8(e.name().as_ref())?,
        ..Element::default()
    };
    for attr in e.attributes() {
        let attr = attr.map_err(|e| malformed(e.to_string()))?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// Attach a finished element to its parent, or make it the root.
fn attach(
    element: Element,
    open: &mut [Element],
    root: &mut Option<Element>,
) -> Result<(), LoadError> {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(malformed("more than one root element")),
    }
    Ok(())
}

/// Parse `text` into its root element.
pub(crate) fn read_document(text: &str) -> Result<Element, LoadError> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if open.is_empty() && root.is_some() {
                    return Err(malformed("more than one root element"));
                }
                open.push(open_element(&e)?);
            }
            Event::Empty(e) => {
                let element = open_element(&e)?;
                attach(element, &mut open, &mut root)?;
            }
            Event::End(_) => {
                // Tag names are matched by the reader itself.
                let element = open
                    .pop()
                    .ok_or_else(|| malformed("unexpected closing tag"))?;
                attach(element, &mut open, &mut root)?;
            }
            Event::Text(t) => {
                let content = t.unescape()?;
                match open.last_mut() {
                    Some(element) => element.text.push_str(&content),
                    None if content.trim().is_empty() => {}
                    None => return Err(malformed("text outside the root element")),
                }
            }
            Event::CData(c) => {
                let content = utf8(&c.into_inner())?;
                match open.last_mut() {
                    Some(element) => element.text.push_str(&content),
                    None => return Err(malformed("CDATA outside the root element")),
                }
            }
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(element) = open.last() {
        return Err(malformed(format!("unclosed element '{}'", element.name)));
    }
    root.ok_or_else(|| malformed("no root element"))
}
