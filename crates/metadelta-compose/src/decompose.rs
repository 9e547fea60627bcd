//! Decomposition: one document into one file per entry.
//!
//! Layout is `<out>/<section>/<stem>.xml`, where each file is a complete
//! document holding the original root element and a single entry.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use metadelta_codec::serialize_document;
use metadelta_diff::flatten;
use metadelta_identity::IdentityResolver;
use metadelta_types::{Document, IdentityKey, Section};
use tracing::debug;

use crate::error::{ComposeError, ComposeResult};

/// Stems longer than this fall back to the key digest.
const MAX_STEM_LEN: usize = 120;

/// A file written by [`decompose`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecomposedFile {
    pub section: String,
    pub key: IdentityKey,
    pub path: PathBuf,
}

/// Split `document` into single-entry files under `out_dir`.
///
/// Returns the written files in document order. Names are checked for
/// clashes ignoring ASCII case, so that no file overwrites another on a
/// case-insensitive file system; a clashing entry is named by its key digest.
pub fn decompose(document: &Document, out_dir: &Path) -> ComposeResult<Vec<DecomposedFile>> {
    let resolver = IdentityResolver::for_root_tag(document.root_tag());
    let records = flatten(document, &resolver)?;

    let mut used: HashSet<String> = HashSet::with_capacity(records.len());
    let mut written = Vec::with_capacity(records.len());

    for record in records {
        let directory = encode_component(&record.section);
        let mut stem = entry_file_stem(&record.section, &record.key);
        if !used.insert(folded_name(&directory, &stem)) {
            stem = record.key.digest();
            debug!(section = %record.section, key = %record.key, "file name clash, using key digest");
            if !used.insert(folded_name(&directory, &stem)) {
                return Err(ComposeError::IdentityCollision {
                    section: record.section,
                    key: record.key.to_string(),
                });
            }
        }
        let path = out_dir.join(directory).join(format!("{stem}.xml"));

        let single = Document {
            root: document.root.clone(),
            sections: vec![Section {
                name: record.section.clone(),
                entries: vec![record.entry],
            }],
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serialize_document(&single))?;
        debug!(path = %path.display(), "wrote entry");

        written.push(DecomposedFile {
            section: record.section,
            key: record.key,
            path,
        });
    }

    Ok(written)
}

/// File stem for one entry.
///
/// Singletons are named after their section. Body-keyed entries and keys
/// that would make an overlong name use the key digest. Other keys are
/// percent-encoded so that distinct keys always give distinct stems.
pub fn entry_file_stem(section: &str, key: &IdentityKey) -> String {
    match key {
        IdentityKey::Constant => encode_component(section),
        IdentityKey::Body(_) => key.digest(),
        _ => {
            let flat = key.flatten();
            let encoded = encode_component(&flat);
            if flat.is_empty() || encoded.len() > MAX_STEM_LEN {
                key.digest()
            } else {
                encoded
            }
        }
    }
}

fn folded_name(directory: &str, stem: &str) -> String {
    format!("{directory}/{stem}").to_ascii_lowercase()
}

fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for (index, byte) in raw.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric()
            || matches!(byte, b'-' | b'_' | b' ')
            || (byte == b'.' && index > 0);
        if keep {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
