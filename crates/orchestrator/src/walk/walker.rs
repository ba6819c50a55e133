#![forbid(unsafe_code)]

use crate::domain::EntryDescriptor;
use crate::error::Error;
use crate::walk::read_entry;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

struct Level {
    dir: PathBuf,
    names: std::vec::IntoIter<OsString>,
}

/// Depth-first, pre-order traversal of a directory tree.
///
/// The walker is lazy: a directory's children are listed only when the
/// iterator is advanced past the directory itself, so the consumer can act on
/// every entry (or call [`Walker::skip_current_dir`]) before its subtree is
/// visited. The root itself is not yielded.
pub struct Walker {
    root: PathBuf,
    sort: bool,
    stack: Vec<Level>,
    pending: Option<PathBuf>,
    skipped: usize,
}

impl Walker {
    /// Open `root` for traversal. Failing to list the root is fatal; failures
    /// deeper in the tree only skip the affected entry or subtree.
    pub fn new(root: impl AsRef<Path>, sort: bool) -> Result<Self, Error> {
        let root = root.as_ref();
        let root = match std::fs::canonicalize(root) {
            Ok(path) => path,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(Error::PathNotFound {
                    path: root.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(Error::OpenRoot {
                    path: root.to_path_buf(),
                    source,
                });
            }
        };

        let names = list_dir(&root, sort).map_err(|source| Error::OpenRoot {
            path: root.clone(),
            source,
        })?;

        Ok(Self {
            stack: vec![Level {
                dir: root.clone(),
                names: names.into_iter(),
            }],
            root,
            sort,
            pending: None,
            skipped: 0,
        })
    }

    /// Absolute, symlink-free form of the root passed to [`Walker::new`].
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entries whose metadata could not be read plus subdirectories that
    /// could not be listed so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Do not descend into the directory most recently yielded.
    pub fn skip_current_dir(&mut self) {
        self.pending = None;
    }

    fn descend(&mut self, dir: PathBuf) {
        match list_dir(&dir, self.sort) {
            Ok(names) => self.stack.push(Level {
                dir,
                names: names.into_iter(),
            }),
            Err(source) => {
                let err = Error::OpenDir { path: dir, source };
                warn!(%err, "skipping subtree");
                self.skipped += 1;
            }
        }
    }
}

impl Iterator for Walker {
    type Item = EntryDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(dir) = self.pending.take() {
            self.descend(dir);
        }

        loop {
            let level = self.stack.last_mut()?;
            let Some(name) = level.names.next() else {
                self.stack.pop();
                continue;
            };
            let path = level.dir.join(&name);

            match read_entry(&path) {
                Ok(entry) => {
                    trace!(path = %entry.path.display(), "entry captured");
                    if entry.is_directory {
                        self.pending = Some(path);
                    }
                    return Some(entry);
                }
                Err(err) => {
                    warn!(%err, "skipping entry");
                    self.skipped += 1;
                }
            }
        }
    }
}

fn list_dir(dir: &Path, sort: bool) -> std::io::Result<Vec<OsString>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let name = entry?.file_name();
        if name == "." || name == ".." {
            continue;
        }
        names.push(name);
    }
    if sort {
        names.sort_unstable();
    }
    Ok(names)
}
