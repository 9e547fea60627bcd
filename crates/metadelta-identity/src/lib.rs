//! Identity resolution for metadelta.
//!
//! Every metadata kind has a closed table mapping section names to a
//! [`SectionPolicy`]. A policy knows how to extract an [`IdentityKey`] from an
//! entry and how to order two keys of its section. The table is resolved once
//! per document kind into an [`IdentityResolver`].
//!
//! [`IdentityKey`]: metadelta_types::IdentityKey

pub mod error;
pub mod kind;
pub mod ordering;
pub mod policy;
pub mod resolver;

pub use error::{IdentityError, IdentityResult};
pub use kind::{MetadataKind, SectionSpec};
pub use ordering::compare_hierarchical;
pub use policy::SectionPolicy;
pub use resolver::IdentityResolver;
