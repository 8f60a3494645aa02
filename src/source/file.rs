use crate::core::{IngestError, RecordStream, Result, Schema, Source, StreamEvent};
use async_trait::async_trait;
use futures::stream;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source over the delimited subscription stream file.
pub struct StreamEventSource {
    file_path: PathBuf,
    delimiter: u8,
}

impl StreamEventSource {
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

#[async_trait]
impl Source for StreamEventSource {
    type Record = StreamEvent;

    async fn read(&self) -> Result<RecordStream<StreamEvent>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_path(&self.file_path)?;

        let header = reader.headers()?.clone();
        let columns: Vec<&str> = header.iter().collect();
        Schema::stream_events().validate_header(&columns)?;

        let events: Vec<Result<StreamEvent>> = reader
            .deserialize()
            .map(|row| row.map_err(IngestError::from))
            .collect();
        debug!(
            rows = events.len(),
            path = %self.file_path.display(),
            "loaded stream events"
        );
        Ok(Box::pin(stream::iter(events)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::io::Write;

    async fn read_all(source: &StreamEventSource) -> Result<Vec<StreamEvent>> {
        let mut stream = source.read().await?;
        let mut events = Vec::new();
        while let Some(event) = stream.next().await {
            events.push(event?);
        }
        Ok(events)
    }

    #[tokio::test]
    async fn parses_rows_and_keeps_empty_stream_ids_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("streams.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "stream_id,customer_id,subscription_stopped,invoice_item_id"
        )
        .unwrap();
        writeln!(file, "s-1,10,0,2").unwrap();
        writeln!(file, ",10,1,2").unwrap();
        drop(file);

        let events = read_all(&StreamEventSource::new(&path)).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].has_stream_id());
        assert!(!events[1].has_stream_id());
        assert_eq!(events[1].customer_id, 10);
        assert!(events[1].stopped());
    }

    #[tokio::test]
    async fn rejects_a_file_missing_required_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("streams.csv");
        std::fs::write(&path, "stream_id,customer_id\ns-1,10\n").unwrap();

        let err = StreamEventSource::new(&path).read().await.err().unwrap();
        assert!(matches!(err, IngestError::Schema(_)));
    }
}
