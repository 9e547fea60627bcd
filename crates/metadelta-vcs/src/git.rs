//! Snapshot provider backed by the `git` command-line tool.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{VcsError, VcsResult};
use crate::status::{parse_name_status, StatusEntry};
use crate::traits::{Revision, SnapshotProvider};

/// A [`SnapshotProvider`] that runs `git` inside a repository.
///
/// [`Revision::WorkingTree`] reads straight from the checkout on disk.
#[derive(Clone, Debug)]
pub struct GitCli {
    repo_root: PathBuf,
}

impl GitCli {
    /// Use the repository whose top-level directory is `repo_root`.
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    /// The repository's top-level directory.
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    fn git(&self, args: &[&str]) -> VcsResult<Vec<u8>> {
        let output = self.run(args)?;
        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(VcsError::Command {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    fn run(&self, args: &[&str]) -> VcsResult<std::process::Output> {
        debug!(args = ?args, "running git");
        Command::new("git")
            .arg("-C")
            .arg(&self.repo_root)
            .args(["-c", "core.quotepath=off"])
            .args(args)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => VcsError::GitUnavailable,
                _ => VcsError::Io(e),
            })
    }

    fn blob_exists(&self, spec: &str) -> VcsResult<bool> {
        Ok(self.run(&["cat-file", "-e", spec])?.status.success())
    }
}

impl SnapshotProvider for GitCli {
    fn status_list(&self, from: &Revision, to: &Revision) -> VcsResult<Vec<StatusEntry>> {
        let Revision::Commit(from) = from else {
            return Err(VcsError::Command {
                command: "diff".into(),
                stderr: "the working tree cannot be the base revision".into(),
            });
        };
        let mut args = vec!["diff", "--name-status", "-M", from.as_str()];
        if let Revision::Commit(to) = to {
            args.push(to.as_str());
        }
        args.push("--");
        let stdout = self.git(&args)?;
        parse_name_status(&String::from_utf8_lossy(&stdout))
    }

    fn file_at(&self, revision: &Revision, path: &str) -> VcsResult<Option<Vec<u8>>> {
        match revision {
            Revision::WorkingTree => match fs::read(self.repo_root.join(path)) {
                Ok(content) => Ok(Some(content)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            },
            Revision::Commit(rev) => {
                let spec = format!("{rev}:{path}");
                if !self.blob_exists(&spec)? {
                    return Ok(None);
                }
                self.git(&["cat-file", "blob", spec.as_str()]).map(Some)
            }
        }
    }

    fn list_files(&self, revision: &Revision, dir: &str) -> VcsResult<Vec<String>> {
        let dir = dir.trim_end_matches('/');
        let mut files = match revision {
            Revision::Commit(rev) => {
                let stdout = self.git(&["ls-tree", "-r", "--name-only", rev.as_str(), "--", dir])?;
                String::from_utf8_lossy(&stdout)
                    .lines()
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            Revision::WorkingTree => {
                let base = self.repo_root.join(dir);
                if !base.is_dir() {
                    return Ok(Vec::new());
                }
                let mut files = Vec::new();
                for entry in WalkDir::new(&base) {
                    let entry = entry?;
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    if let Ok(relative) = entry.path().strip_prefix(&self.repo_root) {
                        let parts: Vec<_> = relative
                            .components()
                            .map(|c| c.as_os_str().to_string_lossy().into_owned())
                            .collect();
                        files.push(parts.join("/"));
                    }
                }
                files
            }
        };
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::FileStatus;

    fn git_available() -> bool {
        Command::new("git").arg("--version").output().is_ok()
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args([
                "-c",
                "user.name=Test",
                "-c",
                "user.email=test@example.com",
                "-c",
                "commit.gpgsign=false",
            ])
            .args(args)
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    }

    fn write(dir: &Path, path: &str, content: &str) {
        let full = dir.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    #[test]
    fn reads_history_and_status() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        git(root, &["init", "-q"]);
        write(root, "src/classes/A.cls", "class A {}\n");
        write(root, "src/classes/Keep.cls", "class Keep { /* a reasonably long body */ }\n");
        git(root, &["add", "-A"]);
        git(root, &["commit", "-q", "-m", "first"]);

        git(root, &["mv", "src/classes/Keep.cls", "src/classes/Moved.cls"]);
        write(root, "src/classes/A.cls", "class A { void m() {} }\n");
        git(root, &["add", "-A"]);
        git(root, &["commit", "-q", "-m", "second"]);
        write(root, "src/classes/A.cls", "uncommitted\n");

        let vcs = GitCli::new(root);
        let from = Revision::commit("HEAD~1");
        let head = Revision::commit("HEAD");

        let status = vcs.status_list(&from, &head).unwrap();
        assert!(status.contains(&StatusEntry::new("src/classes/A.cls", FileStatus::Modified)));
        assert!(status.contains(&StatusEntry::new(
            "src/classes/Moved.cls",
            FileStatus::Renamed {
                from: "src/classes/Keep.cls".into(),
                similarity: 100
            }
        )));

        assert_eq!(
            vcs.file_at(&from, "src/classes/A.cls").unwrap(),
            Some(b"class A {}\n".to_vec())
        );
        assert_eq!(vcs.file_at(&head, "src/classes/Keep.cls").unwrap(), None);
        assert_eq!(
            vcs.file_at(&Revision::WorkingTree, "src/classes/A.cls").unwrap(),
            Some(b"uncommitted\n".to_vec())
        );

        assert_eq!(
            vcs.list_files(&head, "src/classes").unwrap(),
            vec!["src/classes/A.cls".to_string(), "src/classes/Moved.cls".to_string()]
        );
        assert_eq!(
            vcs.list_files(&Revision::WorkingTree, "src/classes/").unwrap(),
            vec!["src/classes/A.cls".to_string(), "src/classes/Moved.cls".to_string()]
        );
    }

    #[test]
    fn working_tree_cannot_be_base() {
        let vcs = GitCli::new(".");
        assert!(vcs
            .status_list(&Revision::WorkingTree, &Revision::commit("HEAD"))
            .is_err());
    }

    #[test]
    fn missing_working_tree_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let vcs = GitCli::new(dir.path());
        assert_eq!(vcs.file_at(&Revision::WorkingTree, "nope.xml").unwrap(), None);
        assert!(vcs.list_files(&Revision::WorkingTree, "nope").unwrap().is_empty());
    }
}
