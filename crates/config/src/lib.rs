#![forbid(unsafe_code)]

mod analysis;
mod error;
mod scan;
mod snapshot;

pub use analysis::Analysis;
pub use error::Error;
pub use scan::Scan;
pub use snapshot::Snapshot;

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub scan: Scan,
    pub analysis: Analysis,
    pub snapshot: Snapshot,
}

impl Config {
    /// Load configuration from a TOML file. Missing fields are filled with defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        let mut config: Config = toml_edit::de::from_str(&text)?;
        config.apply_defaults();
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let toml = toml_edit::ser::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Load configuration from multiple TOML files. Later files override earlier ones.
    pub fn load_multiple<T, U>(paths: U) -> Result<Self, Error>
    where
        T: AsRef<Path>,
        U: IntoIterator<Item = T>,
    {
        let mut merged = toml_edit::DocumentMut::new();
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                continue;
            }
            let text = std::fs::read_to_string(path)?;
            let doc: toml_edit::DocumentMut = text.parse()?;
            merge_document(&mut merged, doc);
        }
        let mut config: Config = toml_edit::de::from_str(&merged.to_string())?;
        config.apply_defaults();
        Ok(config)
    }

    fn apply_defaults(&mut self) {
        self.snapshot = self.snapshot.clamp();
        // A zero deadline would fail every analysis.
        self.analysis = std::mem::take(&mut self.analysis).clamp();
        // Roots given twice would race on the same snapshot names.
        let mut seen = std::collections::HashSet::new();
        self.scan.monitored.retain(|root| seen.insert(root.clone()));
    }
}

fn merge_document(target: &mut toml_edit::DocumentMut, source: toml_edit::DocumentMut) {
    for (key, item) in source.iter() {
        merge_item(
            target.entry(key).or_insert(toml_edit::Item::None),
            item.clone(),
        );
    }
}

fn merge_item(target: &mut toml_edit::Item, source: toml_edit::Item) {
    use toml_edit::Item;
    match (target, source) {
        (Item::Table(target_table), Item::Table(source_table)) => {
            for (key, item) in source_table.iter() {
                merge_item(target_table.entry(key).or_insert(Item::None), item.clone());
            }
        }
        (Item::ArrayOfTables(target_array), Item::ArrayOfTables(source_array)) => {
            for table in source_array.iter() {
                target_array.push(table.clone());
            }
        }
        (target_item, source_item) => {
            *target_item = source_item;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.scan.monitored = vec![PathBuf::from("/srv/data")];
        config.apply_defaults();
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(config, loaded);
    }

    #[test]
    fn load_multiple_merges() {
        let dir = tempdir().unwrap();
        let path1 = dir.path().join("a.toml");
        let path2 = dir.path().join("b.toml");
        let missing = dir.path().join("missing.toml");

        std::fs::write(
            &path1,
            "[scan]\noutput_dir = \"/var/lib/dirsentry\"\nsort_entries = false\n\
             [analysis]\ntimeout = 5\n",
        )
        .unwrap();
        std::fs::write(&path2, "[analysis]\ntimeout = 120\nargs = [\"--strict\"]\n").unwrap();

        let cfg = Config::load_multiple([path1, missing, path2]).unwrap();
        assert_eq!(cfg.scan.output_dir, PathBuf::from("/var/lib/dirsentry"));
        assert!(!cfg.scan.sort_entries);
        assert_eq!(cfg.analysis.timeout, Duration::from_secs(120));
        assert_eq!(cfg.analysis.args, vec!["--strict".to_string()]);
        assert_eq!(cfg.analysis.program, Analysis::default().program);
    }

    #[test]
    fn duplicate_roots_are_collapsed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scan]\nmonitored = [\"/a\", \"/b\", \"/a\"]\n").unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(
            cfg.scan.monitored,
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }

    #[test]
    fn analysis_timeout_is_clamped() {
        let dir = tempdir().unwrap();
        let zero = dir.path().join("zero.toml");
        let huge = dir.path().join("huge.toml");
        std::fs::write(&zero, "[analysis]\ntimeout = 0\n").unwrap();
        std::fs::write(&huge, "[analysis]\ntimeout = 86400\n").unwrap();

        assert_eq!(Config::load(&zero).unwrap().analysis.timeout, Duration::from_secs(1));
        assert_eq!(
            Config::load_multiple([&huge]).unwrap().analysis.timeout,
            Duration::from_secs(3600)
        );
    }

    #[test]
    fn invalid_toml_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[scan\noutput_dir = 1").unwrap();

        assert!(Config::load(&path).is_err());
        assert!(Config::load_multiple([&path]).is_err());
    }
}
