use crate::core::{IngestError, Result, WriteMode};
use std::path::{Path, PathBuf};

/// Name of the clean dataset inside the data directory.
pub const TARGET_FILE_NAME: &str = "aavail_clean_data.csv";

/// Run configuration. The data directory is an explicit value handed to
/// the pipeline, not process-wide state.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub data_dir: PathBuf,
    pub db_file: PathBuf,
    pub streams_file: PathBuf,
    pub overwrite: bool,
}

impl IngestConfig {
    /// Resolves the input file names against the data directory.
    pub fn new<P, Q, R>(data_dir: P, db_file: Q, streams_file: R, overwrite: bool) -> Self
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        R: AsRef<Path>,
    {
        let data_dir = data_dir.as_ref().to_path_buf();
        Self {
            db_file: data_dir.join(db_file),
            streams_file: data_dir.join(streams_file),
            data_dir,
            overwrite,
        }
    }

    pub fn target_file(&self) -> PathBuf {
        self.data_dir.join(TARGET_FILE_NAME)
    }

    pub fn write_mode(&self) -> WriteMode {
        if self.overwrite {
            WriteMode::Overwrite
        } else {
            WriteMode::Append
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.db_file.is_file() {
            return Err(IngestError::Config(format!(
                "database file not found: {}",
                self.db_file.display()
            )));
        }
        if !self.streams_file.is_file() {
            return Err(IngestError::Config(format!(
                "streams file not found: {}",
                self.streams_file.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_resolve_inside_the_data_dir() {
        let config = IngestConfig::new("data", "customers.db", "streams.csv", false);
        assert_eq!(config.db_file, Path::new("data/customers.db"));
        assert_eq!(config.streams_file, Path::new("data/streams.csv"));
        assert_eq!(config.target_file(), Path::new("data/aavail_clean_data.csv"));
    }

    #[test]
    fn overwrite_flag_selects_the_write_mode() {
        let append = IngestConfig::new("data", "a.db", "s.csv", false);
        let overwrite = IngestConfig::new("data", "a.db", "s.csv", true);
        assert_eq!(append.write_mode(), WriteMode::Append);
        assert_eq!(overwrite.write_mode(), WriteMode::Overwrite);
    }

    #[test]
    fn missing_inputs_fail_validation() {
        let config = IngestConfig::new("/nonexistent", "a.db", "s.csv", false);
        assert!(matches!(
            config.validate().unwrap_err(),
            IngestError::Config(_)
        ));
    }
}
