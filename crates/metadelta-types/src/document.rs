//! Composite documents.

use serde::{Deserialize, Serialize};

use crate::node::Node;

/// The root element of a composite document: its tag and attributes.
///
/// The tag is fixed per metadata kind (e.g. `Profile`, `CustomLabels`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRoot {
    pub tag: String,
    /// Attributes in document order, e.g. the `xmlns` namespace.
    pub attributes: Vec<(String, String)>,
}

impl DocumentRoot {
    /// Create a root with no attributes.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
        }
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }
}

/// A named group of entries directly below the document root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub entries: Vec<Node>,
}

impl Section {
    /// Create an empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }
}

/// A parsed composite document.
///
/// Sections are kept in first-seen order. A section that held a single
/// non-repeated element in the source is simply a one-element section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub root: DocumentRoot,
    pub sections: Vec<Section>,
}

impl Document {
    /// Create an empty document with the given root.
    pub fn new(root: DocumentRoot) -> Self {
        Self {
            root,
            sections: Vec::new(),
        }
    }

    /// The root tag.
    pub fn root_tag(&self) -> &str {
        &self.root.tag
    }

    /// Append an entry, creating its section at the end if needed.
    pub fn push_entry(&mut self, section: &str, entry: Node) {
        match self.sections.iter_mut().find(|s| s.name == section) {
            Some(existing) => existing.entries.push(entry),
            None => {
                let mut created = Section::new(section);
                created.entries.push(entry);
                self.sections.push(created);
            }
        }
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Total number of entries across all sections.
    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }

    /// Returns `true` if the document has no entries.
    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_entry_groups_by_section_in_first_seen_order() {
        let mut doc = Document::new(DocumentRoot::new("Profile"));
        doc.push_entry("userLicense", Node::text("Salesforce"));
        doc.push_entry("classAccesses", Node::from_pairs([("apexClass", "A")]));
        doc.push_entry("userLicense", Node::text("Other"));

        let names: Vec<&str> = doc.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["userLicense", "classAccesses"]);
        assert_eq!(doc.section("userLicense").unwrap().entries.len(), 2);
        assert_eq!(doc.entry_count(), 3);
    }

    #[test]
    fn empty_document() {
        let doc = Document::new(
            DocumentRoot::new("CustomLabels")
                .with_attribute("xmlns", "http://soap.sforce.com/2006/04/metadata"),
        );
        assert!(doc.is_empty());
        assert_eq!(doc.root_tag(), "CustomLabels");
        assert_eq!(doc.root.attributes.len(), 1);
    }
}
