//! Entry bodies.
//!
//! A [`Node`] is either a scalar text value or an element holding an ordered
//! list of named child fields. Field order is kept exactly as parsed so that
//! canonical serialization is stable across runs.
//!
//! XML attributes of an element are stored as leading fields whose names
//! start with [`ATTRIBUTE_PREFIX`]. Text content of an element that also has
//! attributes is stored in a [`TEXT_FIELD`] field. Both take part in the
//! canonical body like any other field.

use serde::{Deserialize, Serialize};

use crate::error::{TypesError, TypesResult};

/// Name prefix of fields holding XML attributes.
pub const ATTRIBUTE_PREFIX: &str = "@";

/// Name of the field holding the text of an attributed element.
pub const TEXT_FIELD: &str = "$text";

/// The value of an entry or of one of its fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Node {
    /// A scalar value, e.g. `<label>Hello</label>`.
    Text(String),
    /// A nested element with ordered child fields.
    Element(Vec<Field>),
}

/// A named child of an element node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: Node,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, value: Node) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Create a field holding a scalar text value.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, Node::Text(value.into()))
    }

    /// Create a field holding the XML attribute `name`.
    pub fn attribute(name: &str, value: impl Into<String>) -> Self {
        Self::text(format!("{ATTRIBUTE_PREFIX}{name}"), value)
    }

    /// The attribute name, if this field holds an XML attribute.
    pub fn attribute_name(&self) -> Option<&str> {
        self.name.strip_prefix(ATTRIBUTE_PREFIX)
    }
}

impl Node {
    /// Create a scalar node.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    /// Create an element node from `(name, text)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Node::Element(
            pairs
                .into_iter()
                .map(|(name, value)| Field::text(name, value))
                .collect(),
        )
    }

    /// The scalar value, if this node is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(value) => Some(value),
            Node::Element(_) => None,
        }
    }

    /// Child fields, empty for scalar nodes.
    pub fn fields(&self) -> &[Field] {
        match self {
            Node::Text(_) => &[],
            Node::Element(fields) => fields,
        }
    }

    /// The first child field with the given name.
    pub fn field(&self, name: &str) -> Option<&Node> {
        self.fields()
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }

    /// The text of the first child field with the given name.
    ///
    /// Returns `None` when the field is missing or is not a scalar.
    pub fn field_text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Node::as_text)
    }

    /// Canonical string form used for equality comparison.
    ///
    /// Two nodes are considered unchanged iff their canonical bodies are
    /// byte-equal.
    pub fn canonical_body(&self) -> TypesResult<String> {
        serde_json::to_string(self).map_err(|e| TypesError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_lookup_returns_first_match() {
        let node = Node::Element(vec![
            Field::text("name", "first"),
            Field::text("name", "second"),
            Field::text("enabled", "true"),
        ]);
        assert_eq!(node.field_text("name"), Some("first"));
        assert_eq!(node.field_text("enabled"), Some("true"));
        assert_eq!(node.field_text("missing"), None);
    }

    #[test]
    fn nested_field_is_not_text() {
        let node = Node::Element(vec![Field::new(
            "nameField",
            Node::from_pairs([("label", "Name"), ("type", "Text")]),
        )]);
        assert!(node.field("nameField").is_some());
        assert_eq!(node.field_text("nameField"), None);
    }

    #[test]
    fn scalar_has_no_fields() {
        let node = Node::text("Salesforce");
        assert_eq!(node.as_text(), Some("Salesforce"));
        assert!(node.fields().is_empty());
    }

    #[test]
    fn attribute_fields_change_the_body() {
        let plain = Node::Element(vec![Field::text("value", "")]);
        let nil = Node::Element(vec![Field::new(
            "value",
            Node::Element(vec![Field::attribute("xsi:nil", "true")]),
        )]);
        assert_ne!(plain.canonical_body().unwrap(), nil.canonical_body().unwrap());

        let field = &nil.fields()[0].value.fields()[0];
        assert_eq!(field.name, "@xsi:nil");
        assert_eq!(field.attribute_name(), Some("xsi:nil"));
        assert_eq!(Field::text("value", "x").attribute_name(), None);
    }

    #[test]
    fn canonical_body_depends_on_field_order() {
        let a = Node::from_pairs([("fullName", "x"), ("value", "1")]);
        let b = Node::from_pairs([("value", "1"), ("fullName", "x")]);
        assert_ne!(a.canonical_body().unwrap(), b.canonical_body().unwrap());
        assert_eq!(a.canonical_body().unwrap(), a.clone().canonical_body().unwrap());
    }
}
