//! XML document codec for metadelta.
//!
//! Parses composite metadata documents into [`Document`] trees and serializes
//! them back with a fixed declaration line and four-space indentation. The
//! serializer output is the canonical form every package file is written in.
//!
//! [`Document`]: metadelta_types::Document

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{CodecError, CodecResult};
pub use reader::{parse_bytes, parse_document};
pub use writer::{serialize_document, serialize_entry, XML_DECLARATION};
