//! Android resource XML parsing
//!
//! Resource files are flattened into a list of elements in document order.
//! Every attribute keeps the exact span of its `name="value"` text so fixes can
//! be scoped to it.

use crate::error::{LintError, Result};
use crate::tree::{LineIndex, Location};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::{Path, PathBuf};

/// Resource folder kinds, from the directory name under `res/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceFolderType {
    Drawable,
    Layout,
    Color,
    Values,
    Other,
}

impl ResourceFolderType {
    /// Classify `res/<folder>/file.xml`; qualifiers such as `-night` are ignored
    pub fn from_path(path: &Path) -> Self {
        let folder = path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let base = folder.split('-').next().unwrap_or_default();
        match base {
            "drawable" | "mipmap" => ResourceFolderType::Drawable,
            "layout" => ResourceFolderType::Layout,
            "color" => ResourceFolderType::Color,
            "values" => ResourceFolderType::Values,
            _ => ResourceFolderType::Other,
        }
    }
}

/// An attribute with its source span
#[derive(Debug, Clone, PartialEq)]
pub struct XmlAttribute {
    /// Qualified name, e.g. `android:color`
    pub name: String,
    /// Name without namespace prefix, e.g. `color`
    pub local_name: String,
    pub value: String,
    /// Span of `name="value"`
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<XmlAttribute>,
    /// Concatenated text content, `None` if the element has none
    pub text: Option<String>,
    /// Nesting depth, the root element is 0
    pub depth: usize,
    pub location: Location,
}

impl XmlElement {
    /// Attribute by qualified name
    pub fn attribute(&self, name: &str) -> Option<&XmlAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// A parsed resource file
#[derive(Debug, Clone)]
pub struct ResourceDocument {
    pub path: PathBuf,
    pub folder_type: ResourceFolderType,
    /// Elements in document order
    pub elements: Vec<XmlElement>,
}

impl ResourceDocument {
    pub fn root(&self) -> Option<&XmlElement> {
        self.elements.first()
    }

    pub fn root_name(&self) -> Option<&str> {
        self.root().map(|e| e.name.as_str())
    }

    /// Direct children of the root element
    pub fn top_level_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.elements.iter().filter(|e| e.depth == 1)
    }

    /// Every attribute of every element, in document order
    pub fn attributes(&self) -> impl Iterator<Item = &XmlAttribute> {
        self.elements.iter().flat_map(|e| e.attributes.iter())
    }
}

/// Read and parse a resource file from disk
pub fn parse_resource_file(path: &Path) -> Result<ResourceDocument> {
    let text = std::fs::read_to_string(path).map_err(|e| LintError::io(path, e))?;
    parse_resource(path, &text)
}

pub fn parse_resource(path: &Path, text: &str) -> Result<ResourceDocument> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);

    let index = LineIndex::new(text);
    let mut elements: Vec<XmlElement> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| LintError::Xml {
            path: path.to_path_buf(),
            message: format!("at byte {}: {}", reader.buffer_position(), e),
        })?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                let element = read_element(path, text, &index, &e, end, stack.len());
                elements.push(element);
                stack.push(elements.len() - 1);
            }
            Event::Empty(e) => {
                let element = read_element(path, text, &index, &e, end, stack.len());
                elements.push(element);
            }
            Event::End(_) => {
                if let Some(closed) = stack.pop() {
                    finish_text(&mut elements[closed]);
                }
            }
            Event::Text(t) => {
                if let Some(&current) = stack.last() {
                    append_text(&mut elements[current], &String::from_utf8_lossy(&t));
                }
            }
            Event::CData(t) => {
                if let Some(&current) = stack.last() {
                    append_text(&mut elements[current], &String::from_utf8_lossy(&t));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(ResourceDocument {
        path: path.to_path_buf(),
        folder_type: ResourceFolderType::from_path(path),
        elements,
    })
}

fn append_text(element: &mut XmlElement, content: &str) {
    element.text.get_or_insert_with(String::new).push_str(content);
}

/// Trim collected text; whitespace between child elements is not content
fn finish_text(element: &mut XmlElement) {
    element.text = element
        .text
        .take()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
}

fn read_element(
    path: &Path,
    text: &str,
    index: &LineIndex,
    start: &BytesStart<'_>,
    tag_end: usize,
    depth: usize,
) -> XmlElement {
    // '<' cannot appear unescaped inside a tag, so the last one before the end opens it
    let tag_start = text[..tag_end].rfind('<').unwrap_or(0);
    let tag = &text[tag_start..tag_end];
    let name = String::from_utf8_lossy(start.name().as_ref()).to_string();

    let mut cursor = 1 + name.len();
    let mut attributes = Vec::new();
    for attr in start.attributes().flatten() {
        let qualified = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let local_name = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
        let value = String::from_utf8_lossy(&attr.value).to_string();
        let (span_start, span_end) = match find_attribute_span(tag, &qualified, cursor) {
            Some(span) => span,
            None => (cursor, cursor),
        };
        cursor = span_end;
        attributes.push(XmlAttribute {
            name: qualified,
            local_name,
            value,
            location: index.location(path, tag_start + span_start, tag_start + span_end),
        });
    }

    XmlElement {
        name,
        attributes,
        text: None,
        depth,
        location: index.location(path, tag_start, tag_end),
    }
}

/// Span of `key = "value"` inside a tag, searching from `from`
fn find_attribute_span(tag: &str, key: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = tag.as_bytes();
    let mut search = from.min(tag.len());
    while let Some(found) = tag[search..].find(key) {
        let start = search + found;
        search = start + key.len();

        let preceded_by_space = start > 0 && bytes[start - 1].is_ascii_whitespace();
        if !preceded_by_space {
            continue;
        }
        let mut pos = start + key.len();
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if bytes.get(pos) != Some(&b'=') {
            continue;
        }
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let quote = match bytes.get(pos) {
            Some(q @ (b'"' | b'\'')) => *q,
            _ => continue,
        };
        let close = tag[pos + 1..].find(quote as char)?;
        return Some((start, pos + 1 + close + 1));
    }
    None
}
