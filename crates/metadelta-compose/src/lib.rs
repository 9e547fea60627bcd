//! Canonical composition for metadelta.
//!
//! - [`compose`] rebuilds a document from any subset of flattened records,
//!   grouping sections and ordering entries deterministically. Pure.
//! - [`decompose`] splits a document into one single-entry file per entry.
//! - [`compose_dir`] reads such a directory back into one canonical document.
//!
//! `compose_dir(decompose(d))` serializes byte-identically to
//! `compose(flatten(d))`.

pub mod assemble;
pub mod composer;
pub mod decompose;
pub mod error;

pub use assemble::{compose_dir, compose_dir_to_string};
pub use composer::{compose, compose_to_string};
pub use decompose::{decompose, entry_file_stem, DecomposedFile};
pub use error::{ComposeError, ComposeResult};
