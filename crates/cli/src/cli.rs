use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use config::Config;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// dirsentry: directory integrity snapshots and quarantine
///
/// dirsentry walks each monitored directory, records the metadata of every
/// entry in a snapshot, and compares it with the snapshot of the previous
/// run. Entries without any permission bits are handed to an external
/// analyzer; entries it flags are moved to an isolation directory.
#[derive(Debug, Parser, Clone)]
#[command(about, long_about, version)]
pub struct Cli {
    /// Path to configuration file.
    ///
    /// If not provided, the default locations are checked. They are
    /// `/etc/dirsentry/config.toml` and `/etc/dirsentry/config.d/*.toml`,
    /// where the latter being a glob pattern. If they don't exist, the default
    /// configuration is used.
    #[arg(short, long, value_parser = validate_file)]
    pub conffile: Option<PathBuf>,

    /// Directory the snapshot artifacts are written to.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory flagged entries are moved to.
    #[arg(short = 's', long)]
    pub isolation: Option<PathBuf>,

    /// Program deciding whether an entry is malicious. Exit status 0 means
    /// safe.
    #[arg(long)]
    pub analyzer: Option<PathBuf>,

    /// Seconds a single analyzer run may take.
    #[arg(long, value_parser = validate_timeout)]
    pub timeout: Option<u64>,

    /// Directories to scan, in addition to the configured ones.
    pub directories: Vec<PathBuf>,

    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,
}

impl Cli {
    /// Layer the command line over the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(output) = &self.output {
            config.scan.output_dir = output.clone();
        }
        if let Some(isolation) = &self.isolation {
            config.scan.isolation_dir = isolation.clone();
        }
        if let Some(analyzer) = &self.analyzer {
            config.analysis.program = analyzer.clone();
        }
        if let Some(timeout) = self.timeout {
            config.analysis.timeout = Duration::from_secs(timeout);
        }
        for dir in &self.directories {
            if !config.scan.monitored.contains(dir) {
                config.scan.monitored.push(dir.clone());
            }
        }
    }
}

/// Check if the file exists.
#[inline(always)]
fn validate_file(file: &str) -> Result<PathBuf, String> {
    let path = Path::new(file);
    if path.exists() {
        Ok(path.to_owned())
    } else {
        Err(format!("File not found: {:?}", path))
    }
}

/// Validate analyzer timeout
#[inline(always)]
fn validate_timeout(timeout: &str) -> Result<u64, String> {
    let timeout: u64 = timeout
        .parse()
        .map_err(|_| format!("`{timeout}` is not a valid number of seconds"))?;
    if (1..=3600).contains(&timeout) {
        Ok(timeout)
    } else {
        Err("Timeout must be between 1 and 3600 seconds".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn timeout_candidates() -> impl Strategy<Value = String> {
        prop_oneof![
            2 => (0..4000).prop_map(|i| format!("{}", i)),
            1 => (-1000..=100_000).prop_map(|i| format!("{}", i)),
            1 => ".*",
        ]
    }

    proptest! {
        #[test]
        fn test_validate_timeout(timeout in timeout_candidates()) {
            let result = validate_timeout(&timeout);
            match result {
                Ok(t) => prop_assert!((1..=3600).contains(&t)),
                Err(err) => {
                    let error_msg = format!("`{}` is not a valid number of seconds", timeout);
                    prop_assert!(
                        err == error_msg || err == "Timeout must be between 1 and 3600 seconds"
                    );
                },
            }
        }
    }

    #[test]
    fn command_line_overrides_config() {
        let cli = Cli::parse_from([
            "dirsentry",
            "-o",
            "/var/lib/dirsentry",
            "-s",
            "/var/quarantine",
            "--analyzer",
            "/usr/bin/scan",
            "--timeout",
            "5",
            "/srv/a",
            "/srv/b",
        ]);
        let mut config = Config::default();
        config.scan.monitored.push(PathBuf::from("/srv/a"));

        cli.apply(&mut config);

        assert_eq!(config.scan.output_dir, PathBuf::from("/var/lib/dirsentry"));
        assert_eq!(config.scan.isolation_dir, PathBuf::from("/var/quarantine"));
        assert_eq!(config.analysis.program, PathBuf::from("/usr/bin/scan"));
        assert_eq!(config.analysis.timeout, Duration::from_secs(5));
        assert_eq!(
            config.scan.monitored,
            vec![PathBuf::from("/srv/a"), PathBuf::from("/srv/b")]
        );
    }

    #[test]
    fn config_is_untouched_without_flags() {
        let cli = Cli::parse_from(["dirsentry"]);
        let mut config = Config::default();

        cli.apply(&mut config);

        assert_eq!(config, Config::default());
    }
}
