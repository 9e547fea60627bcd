//! Foundation types for metadelta.
//!
//! A composite metadata document is a root element holding typed sections,
//! each section a list of entries. Every other metadelta crate works in terms
//! of the types defined here.
//!
//! # Key Types
//!
//! - [`Document`] / [`DocumentRoot`] / [`Section`] -- Parsed composite document
//! - [`Node`] / [`Field`] -- An entry body: scalar text or ordered child fields
//! - [`IdentityKey`] -- Typed natural key of an entry within its section
//! - [`FlatRecord`] -- `(section, key, canonical body)` triple used for diffing

pub mod document;
pub mod error;
pub mod key;
pub mod node;
pub mod record;

pub use document::{Document, DocumentRoot, Section};
pub use error::{TypesError, TypesResult};
pub use key::IdentityKey;
pub use node::{Field, Node, ATTRIBUTE_PREFIX, TEXT_FIELD};
pub use record::FlatRecord;
