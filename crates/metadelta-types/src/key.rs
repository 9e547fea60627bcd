//! Typed identity keys.
//!
//! Keys stay structured (one variant per extraction policy) for hashing and
//! equality, and are only flattened to a string where a string is actually
//! needed: ordering comparisons and file names. Two keys whose flattened forms
//! coincide (e.g. a composite `"a.b" + None` and `"a" + "b"`) remain distinct.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator used when flattening composite keys.
pub const COMPOSITE_SEPARATOR: char = '.';

/// The natural key of an entry within its section.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityKey {
    /// A single field value (e.g. `fullName`).
    Single(String),
    /// A primary field plus an optional discriminator (e.g. layout + record type).
    Composite {
        primary: String,
        secondary: Option<String>,
    },
    /// A numeric range whose bounds are already zero-padded.
    Range { start: String, end: String },
    /// The key of a singleton section; at most one entry can exist.
    Constant,
    /// Fallback: the canonical body of the entry itself.
    Body(String),
}

impl IdentityKey {
    /// Flatten to the string used for ordering and file naming.
    pub fn flatten(&self) -> String {
        match self {
            IdentityKey::Single(value) => value.clone(),
            IdentityKey::Composite { primary, secondary } => match secondary {
                Some(secondary) => format!("{primary}{COMPOSITE_SEPARATOR}{secondary}"),
                None => primary.clone(),
            },
            IdentityKey::Range { start, end } => format!("{start}{end}"),
            IdentityKey::Constant => String::new(),
            IdentityKey::Body(body) => body.clone(),
        }
    }

    /// The individual components of the key, in significance order.
    ///
    /// Used as a tie-break when two distinct keys flatten identically.
    pub fn parts(&self) -> Vec<&str> {
        match self {
            IdentityKey::Single(value) => vec![value],
            IdentityKey::Composite { primary, secondary } => match secondary {
                Some(secondary) => vec![primary, secondary],
                None => vec![primary],
            },
            IdentityKey::Range { start, end } => vec![start, end],
            IdentityKey::Constant => Vec::new(),
            IdentityKey::Body(body) => vec![body],
        }
    }

    /// BLAKE3 hex digest of the flattened key.
    pub fn digest(&self) -> String {
        hex::encode(blake3::hash(self.flatten().as_bytes()).as_bytes())
    }

    /// Returns `true` for the singleton key.
    pub fn is_constant(&self) -> bool {
        matches!(self, IdentityKey::Constant)
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::Constant => write!(f, "<singleton>"),
            IdentityKey::Body(_) => write!(f, "<body:{}>", &self.digest()[..12]),
            other => write!(f, "{}", other.flatten()),
        }
    }
}
