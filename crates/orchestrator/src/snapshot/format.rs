#![forbid(unsafe_code)]

//! Text layout of snapshot artifacts.
//!
//! One record per entry, in traversal order, each followed by a blank line:
//!
//! ```text
//! Path: /srv/data/report.pdf
//! Size: 48213 bytes
//! Permissions: -rw-r--r--
//! Links: 1
//! ```

use crate::domain::{EntryDescriptor, Permissions};
use crate::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};

const LINES_PER_RECORD: usize = 4;

pub fn write_entries<W: Write>(out: &mut W, entries: &[EntryDescriptor]) -> std::io::Result<()> {
    for entry in entries {
        writeln!(out, "Path: {}", entry.path.display())?;
        writeln!(out, "Size: {} bytes", entry.size_bytes)?;
        writeln!(out, "Permissions: {}", entry.permissions.render(entry.is_directory))?;
        writeln!(out, "Links: {}", entry.hard_links)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Read back the records of an artifact. `source` only labels errors.
pub fn parse(source: &Path, text: &str) -> Result<Vec<EntryDescriptor>, Error> {
    let lines: Vec<&str> = text.lines().collect();
    let mut entries = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        if lines[index].is_empty() {
            index += 1;
            continue;
        }
        let entry = lines
            .get(index..index + LINES_PER_RECORD)
            .and_then(parse_record)
            .ok_or_else(|| Error::SnapshotFormat {
                path: source.to_path_buf(),
                line: index + 1,
            })?;
        entries.push(entry);
        index += LINES_PER_RECORD;
    }

    Ok(entries)
}

fn parse_record(lines: &[&str]) -> Option<EntryDescriptor> {
    let path = lines[0].strip_prefix("Path: ")?;
    let size_bytes = lines[1]
        .strip_prefix("Size: ")?
        .strip_suffix(" bytes")?
        .parse()
        .ok()?;
    let (permissions, is_directory) = Permissions::parse(lines[2].strip_prefix("Permissions: ")?)?;
    let hard_links = lines[3].strip_prefix("Links: ")?.parse().ok()?;

    Some(EntryDescriptor {
        path: PathBuf::from(path),
        size_bytes,
        permissions,
        hard_links,
        is_directory,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, size: u64, mode: u32, is_directory: bool) -> EntryDescriptor {
        EntryDescriptor {
            path: PathBuf::from(path),
            size_bytes: size,
            permissions: Permissions::from_mode(mode),
            hard_links: if is_directory { 2 } else { 1 },
            is_directory,
        }
    }

    #[test]
    fn writes_one_block_per_entry() {
        let entries = vec![
            entry("/srv/data/a", 12, 0o644, false),
            entry("/srv/data/sub", 4096, 0o755, true),
        ];
        let mut out = Vec::new();
        write_entries(&mut out, &entries).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Path: /srv/data/a\nSize: 12 bytes\nPermissions: -rw-r--r--\nLinks: 1\n\n\
             Path: /srv/data/sub\nSize: 4096 bytes\nPermissions: drwxr-xr-x\nLinks: 2\n\n"
        );
        assert_eq!(parse(Path::new("t"), &text).unwrap(), entries);
    }

    #[test]
    fn empty_artifact_has_no_entries() {
        assert!(parse(Path::new("t"), "").unwrap().is_empty());
    }

    #[test]
    fn truncated_record_reports_its_line() {
        let text = "Path: /a\nSize: 1 bytes\nPermissions: -rw-------\nLinks: 1\n\n\
                    Path: /b\nSize: 2 bytes\n";
        let err = parse(Path::new("snap.txt"), text).unwrap_err();
        assert!(matches!(err, Error::SnapshotFormat { line: 6, .. }));
    }

    #[test]
    fn garbage_field_is_rejected() {
        let text = "Path: /a\nSize: many bytes\nPermissions: -rw-------\nLinks: 1\n";
        assert!(parse(Path::new("t"), text).is_err());
    }
}
