use crate::core::{CleanRecord, Result, Schema, Sink, WriteMode};
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CSV sink for the clean dataset. A fresh target gets a header row;
/// appending to an existing target does not. Appended runs are never
/// deduplicated against earlier ones.
pub struct CsvSink {
    file_path: PathBuf,
    mode: WriteMode,
    writer: Option<csv::Writer<std::fs::File>>,
}

impl CsvSink {
    pub fn new<P: AsRef<Path>>(file_path: P, mode: WriteMode) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
            mode,
            writer: None,
        }
    }

    fn ensure_writer(&mut self) -> Result<()> {
        if self.writer.is_some() {
            return Ok(());
        }

        // Append mode still starts a fresh file when the target is absent.
        let fresh = self.mode == WriteMode::Overwrite || !self.file_path.exists();
        let file = if fresh {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.file_path)?
        } else {
            OpenOptions::new().append(true).open(&self.file_path)?
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if fresh {
            writer.write_record(Schema::clean_output().field_names())?;
        }
        debug!(path = %self.file_path.display(), fresh, "opened target dataset");
        self.writer = Some(writer);
        Ok(())
    }
}

#[async_trait]
impl Sink for CsvSink {
    type Record = CleanRecord;

    async fn write(&mut self, record: CleanRecord) -> Result<()> {
        self.ensure_writer()?;
        if let Some(writer) = self.writer.as_mut() {
            writer.serialize(record)?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.flush().await?;
        self.writer = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(customer_id: i64) -> CleanRecord {
        CleanRecord {
            customer_id,
            country_name: "united states".to_string(),
            age: Some(30),
            customer_name: "Ada Lovelace".to_string(),
            is_subscriber: false,
            subscription_type: "aavail_basic".to_string(),
            num_streams: 4,
        }
    }

    async fn write_run(path: &Path, mode: WriteMode, ids: &[i64]) {
        let mut sink = CsvSink::new(path, mode);
        for id in ids {
            sink.write(record(*id)).await.unwrap();
        }
        sink.close().await.unwrap();
    }

    #[tokio::test]
    async fn fresh_target_gets_a_header_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        write_run(&path, WriteMode::Append, &[1]).await;

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "customer_id,country_name,age,customer_name,is_subscriber,subscription_type,num_streams"
        );
        assert_eq!(lines.count(), 1);
    }

    #[tokio::test]
    async fn appending_keeps_rows_from_both_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        write_run(&path, WriteMode::Append, &[1, 2]).await;
        write_run(&path, WriteMode::Append, &[1, 2]).await;

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        // one header plus every row from both runs, duplicates included
        assert_eq!(lines.len(), 5);
        assert_eq!(lines.iter().filter(|l| l.starts_with("1,")).count(), 2);
    }

    #[tokio::test]
    async fn overwrite_replaces_earlier_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        write_run(&path, WriteMode::Append, &[1, 2]).await;
        write_run(&path, WriteMode::Overwrite, &[3]).await;

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("3,"));
    }
}
