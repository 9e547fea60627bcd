use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{PackageError, PackageResult};

/// Writes files into a package directory that mirrors the repository layout.
#[derive(Clone, Debug)]
pub struct PackageWriter {
    root: PathBuf,
}

impl PackageWriter {
    /// Create a writer targeting `root`. Nothing is created until the first write.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// The package directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the package directory.
    pub fn ensure_root(&self) -> PackageResult<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Write `content` at repository-relative `path`, creating parent directories.
    pub fn write(&self, path: &str, content: &[u8]) -> PackageResult<PathBuf> {
        let target = self.target(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, content)?;
        debug!(path = %target.display(), bytes = content.len(), "wrote package file");
        Ok(target)
    }

    /// Resolve `path` inside the package, rejecting anything that escapes it.
    pub fn target(&self, path: &str) -> PackageResult<PathBuf> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe {
            return Err(PackageError::UnsafePath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = PackageWriter::new(&dir.path().join("out"));
        let written = writer.write("src/classes/A.cls", b"class A {}").unwrap();
        assert_eq!(written, dir.path().join("out/src/classes/A.cls"));
        assert_eq!(fs::read(written).unwrap(), b"class A {}");
    }

    #[test]
    fn rejects_escaping_paths() {
        let writer = PackageWriter::new(Path::new("/tmp/pkg"));
        assert!(matches!(writer.target("../x"), Err(PackageError::UnsafePath(_))));
        assert!(matches!(writer.target("/etc/passwd"), Err(PackageError::UnsafePath(_))));
        assert!(matches!(writer.target("src/../../x"), Err(PackageError::UnsafePath(_))));
        assert!(writer.target("").is_err());
        assert!(writer.target("src/a b/c.xml").is_ok());
    }
}
