//! Directory composition: single-entry files back into one document.

use std::fs;
use std::path::{Path, PathBuf};

use metadelta_codec::{parse_bytes, serialize_document};
use metadelta_diff::flatten;
use metadelta_identity::IdentityResolver;
use metadelta_types::{Document, DocumentRoot};
use tracing::debug;
use walkdir::WalkDir;

use crate::composer::compose;
use crate::error::{ComposeError, ComposeResult};

/// Read every `*.xml` file under `input` and compose them into one document.
///
/// All files must share a root tag. Root attributes are taken from the first
/// file in path order. Duplicate identities across files are rejected.
pub fn compose_dir(input: &Path) -> ComposeResult<Document> {
    let paths = document_paths(input)?;

    let mut root: Option<(DocumentRoot, IdentityResolver)> = None;
    let mut records = Vec::new();

    for path in paths {
        let raw = fs::read(&path)?;
        let document = parse_bytes(&raw).map_err(|source| ComposeError::Codec {
            path: path.clone(),
            source,
        })?;

        let (expected, resolver) = root.get_or_insert_with(|| {
            (
                document.root.clone(),
                IdentityResolver::for_root_tag(document.root_tag()),
            )
        });
        if expected.tag != document.root.tag {
            return Err(ComposeError::RootMismatch {
                path,
                expected: expected.tag.clone(),
                actual: document.root.tag,
            });
        }

        let flat = flatten(&document, resolver)?;
        debug!(path = %path.display(), entries = flat.len(), "read entry file");
        records.extend(flat);
    }

    let (root, resolver) = root.ok_or_else(|| ComposeError::EmptyInput(input.to_path_buf()))?;
    compose(&records, &root, &resolver)
}

/// [`compose_dir`] and serialize.
pub fn compose_dir_to_string(input: &Path) -> ComposeResult<String> {
    Ok(serialize_document(&compose_dir(input)?))
}

fn document_paths(input: &Path) -> ComposeResult<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry?;
        let is_xml = entry.path().extension().is_some_and(|ext| ext == "xml");
        if entry.file_type().is_file() && is_xml {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}
