//! Canonical serialization.

use std::fmt::Write;

use metadelta_types::{Document, Field, Node, TEXT_FIELD};
use quick_xml::escape::escape;

/// The declaration line every serialized document starts with.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

const INDENT: &str = "    ";

/// Serialize a document: declaration line, root element with its attributes,
/// then every entry of every section in document order.
pub fn serialize_document(document: &Document) -> String {
    let mut out = String::with_capacity(256);
    out.push_str(XML_DECLARATION);
    out.push('\n');

    out.push('<');
    out.push_str(&document.root.tag);
    for (name, value) in &document.root.attributes {
        let _ = write!(out, " {name}=\"{}\"", escape(value.as_str()));
    }
    out.push_str(">\n");

    for section in &document.sections {
        for entry in &section.entries {
            write_node(&mut out, &section.name, entry, 1);
        }
    }

    let _ = writeln!(out, "</{}>", document.root.tag);
    out
}

/// Serialize a single entry as an unindented fragment.
pub fn serialize_entry(section: &str, entry: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, section, entry, 0);
    out
}

fn write_node(out: &mut String, name: &str, node: &Node, depth: usize) {
    indent(out, depth);
    match node {
        Node::Text(value) => {
            let _ = writeln!(out, "<{name}>{}</{name}>", escape(value.as_str()));
        }
        Node::Element(fields) if fields.is_empty() => {
            let _ = writeln!(out, "<{name}></{name}>");
        }
        Node::Element(fields) => {
            let split = fields
                .iter()
                .position(|f| f.attribute_name().is_none())
                .unwrap_or(fields.len());
            let (attributes, children) = fields.split_at(split);

            out.push('<');
            out.push_str(name);
            write_attributes(out, attributes);
            match children {
                [] if !attributes.is_empty() => out.push_str("/>\n"),
                [text] if !attributes.is_empty() && text.name == TEXT_FIELD => {
                    let content = text.value.as_text().unwrap_or_default();
                    let _ = writeln!(out, ">{}</{name}>", escape(content));
                }
                _ => {
                    out.push_str(">\n");
                    for field in children {
                        write_node(out, &field.name, &field.value, depth + 1);
                    }
                    indent(out, depth);
                    let _ = writeln!(out, "</{name}>");
                }
            }
        }
    }
}

fn write_attributes(out: &mut String, attributes: &[Field]) {
    for field in attributes {
        if let (Some(name), Some(value)) = (field.attribute_name(), field.value.as_text()) {
            let _ = write!(out, " {name}=\"{}\"", escape(value));
        }
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
