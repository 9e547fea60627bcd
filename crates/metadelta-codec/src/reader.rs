//! Document parsing.
//!
//! Whitespace-only text is dropped and surrounding whitespace of text values
//! is trimmed. Comments, processing instructions and the declaration are
//! ignored. Root-level children with the same element name are grouped into
//! one section positioned at the first occurrence. Attributes of elements
//! below the root become `@`-prefixed leading fields of their element.

use metadelta_types::{Document, DocumentRoot, Field, Node, TEXT_FIELD};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{CodecError, CodecResult};

/// An element whose end tag has not been seen yet.
struct Frame {
    name: String,
    attributes: Vec<Field>,
    fields: Vec<Field>,
    text: String,
}

impl Frame {
    fn new(name: String, attributes: Vec<Field>) -> Self {
        Self {
            name,
            attributes,
            fields: Vec::new(),
            text: String::new(),
        }
    }

    /// Elements with children or attributes become element nodes; all
    /// others are scalars.
    fn finish(self) -> (String, Node) {
        let Frame {
            name,
            mut attributes,
            fields,
            text,
        } = self;
        let node = match (attributes.is_empty(), fields.is_empty()) {
            (true, true) => Node::Text(text),
            (true, false) => Node::Element(fields),
            (false, true) => {
                if !text.is_empty() {
                    attributes.push(Field::text(TEXT_FIELD, text));
                }
                Node::Element(attributes)
            }
            (false, false) => {
                attributes.extend(fields);
                Node::Element(attributes)
            }
        };
        (name, node)
    }
}

/// Parse raw bytes, which must be UTF-8.
pub fn parse_bytes(raw: &[u8]) -> CodecResult<Document> {
    parse_document(std::str::from_utf8(raw)?)
}

/// Parse a composite document.
pub fn parse_document(text: &str) -> CodecResult<Document> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut root: Option<DocumentRoot> = None;
    let mut root_fields: Option<Vec<Field>> = None;
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        let position = reader.buffer_position();
        let event = reader.read_event().map_err(|e| parse_error(position, e))?;

        match event {
            Event::Start(start) => {
                let name = element_name(&start)?;
                let attributes = if stack.is_empty() {
                    root = Some(open_root(root.is_some(), &start, &name, position)?);
                    Vec::new()
                } else {
                    attribute_fields(&start, position)?
                };
                stack.push(Frame::new(name, attributes));
            }
            Event::Empty(start) => {
                let name = element_name(&start)?;
                match stack.last_mut() {
                    Some(parent) => {
                        let attributes = attribute_fields(&start, position)?;
                        let (name, node) = Frame::new(name, attributes).finish();
                        parent.fields.push(Field::new(name, node));
                    }
                    None => {
                        root = Some(open_root(root.is_some(), &start, &name, position)?);
                        root_fields = Some(Vec::new());
                    }
                }
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(|e| parse_error(position, e))?;
                push_text(&mut stack, &value, position)?;
            }
            Event::CData(data) => {
                let bytes = data.into_inner();
                let value = std::str::from_utf8(&bytes)?;
                push_text(&mut stack, value, position)?;
            }
            Event::End(_) => {
                let frame = stack.pop().ok_or_else(|| CodecError::Parse {
                    position,
                    message: "unexpected closing tag".into(),
                })?;
                let (name, node) = frame.finish();
                match stack.last_mut() {
                    Some(parent) => parent.fields.push(Field::new(name, node)),
                    None => {
                        root_fields = Some(match node {
                            Node::Element(children) => children,
                            Node::Text(_) => Vec::new(),
                        });
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(CodecError::Parse {
            position: text.len(),
            message: format!("unexpected end of document inside <{}>", open.name),
        });
    }

    let root = root.ok_or(CodecError::MissingRoot)?;
    let mut document = Document::new(root);
    for field in root_fields.unwrap_or_default() {
        document.push_entry(&field.name, field.value);
    }
    Ok(document)
}

fn open_root(
    seen: bool,
    start: &BytesStart<'_>,
    name: &str,
    position: usize,
) -> CodecResult<DocumentRoot> {
    if seen {
        return Err(CodecError::Parse {
            position,
            message: format!("second root element <{name}>"),
        });
    }
    let mut root = DocumentRoot::new(name);
    root.attributes = read_attributes(start, position)?;
    Ok(root)
}

fn attribute_fields(start: &BytesStart<'_>, position: usize) -> CodecResult<Vec<Field>> {
    Ok(read_attributes(start, position)?
        .into_iter()
        .map(|(key, value)| Field::attribute(&key, value))
        .collect())
}

fn read_attributes(start: &BytesStart<'_>, position: usize) -> CodecResult<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| parse_error(position, e))?;
        let key = std::str::from_utf8(attribute.key.as_ref())?.to_string();
        let value = attribute
            .unescape_value()
            .map_err(|e| parse_error(position, e))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(attributes)
}

fn push_text(stack: &mut [Frame], value: &str, position: usize) -> CodecResult<()> {
    match stack.last_mut() {
        Some(frame) => {
            frame.text.push_str(value);
            Ok(())
        }
        None if value.trim().is_empty() => Ok(()),
        None => Err(CodecError::Parse {
            position,
            message: "text outside of the root element".into(),
        }),
    }
}

fn element_name(start: &BytesStart<'_>) -> CodecResult<String> {
    Ok(std::str::from_utf8(start.name().as_ref())?.to_string())
}

fn parse_error(position: usize, error: impl std::fmt::Display) -> CodecError {
    CodecError::Parse {
        position,
        message: error.to_string(),
    }
}
