use crate::config::IngestConfig;
use crate::core::{Result, Sink, Source, StreamEvent, Transform};
use crate::sink::file::CsvSink;
use crate::source::db::{CustomerSource, Database};
use crate::source::file::StreamEventSource;
use crate::transform::{self, CleanTransform};
use chrono::Local;
use futures::StreamExt;
use std::collections::HashSet;
use tracing::{info, warn};

/// Row counts observed over one ingest run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub customers: usize,
    pub duplicate_customers: usize,
    pub stream_events: usize,
    pub events_missing_stream_id: usize,
    pub rows_written: usize,
}

pub struct Pipeline {
    config: IngestConfig,
}

impl Pipeline {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Runs the full ingest: database and stream file in, clean dataset
    /// out. The database handle is released on every exit path.
    pub async fn run(self) -> Result<RunSummary> {
        self.config.validate()?;
        let db = Database::open(&self.config.db_file)?;
        let result = self.execute(&db).await;
        if let Err(err) = db.close() {
            warn!(error = %err, "database did not close cleanly");
        }
        result
    }

    async fn execute(&self, db: &Database) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        // extract: customer join rows, first occurrence wins
        let mut customers = collect(CustomerSource::new(db)).await?;
        let extracted = customers.len();
        let mut seen = HashSet::new();
        customers.retain(|c| seen.insert(c.customer_id));
        summary.duplicate_customers = extracted - customers.len();
        summary.customers = customers.len();
        info!(
            removed = summary.duplicate_customers,
            "removed duplicate rows in db data"
        );

        // extract: stream events, rows without a stream id dropped
        let mut events = collect(StreamEventSource::new(&self.config.streams_file)).await?;
        let loaded = events.len();
        events.retain(StreamEvent::has_stream_id);
        summary.events_missing_stream_id = loaded - events.len();
        summary.stream_events = events.len();
        info!(
            removed = summary.events_missing_stream_id,
            "removed no stream id rows in streams data"
        );

        // transform: derive the per-customer analytical row
        let churned = transform::churn_map(&events);
        let stats = transform::stream_stats(&events);
        let invoice_items = db.invoice_items()?;
        let today = Local::now().date_naive();
        let clean = CleanTransform::new(churned, stats, invoice_items, today);

        // load: append or overwrite the target dataset
        let mut sink = CsvSink::new(self.config.target_file(), self.config.write_mode());
        for customer in customers {
            let rows = clean.transform(customer).await?;
            summary.rows_written += rows.len();
            sink.write_batch(rows).await?;
        }
        sink.close().await?;
        info!(rows = summary.rows_written, "wrote clean dataset");

        Ok(summary)
    }
}

async fn collect<S: Source>(source: S) -> Result<Vec<S::Record>> {
    let mut stream = source.read().await?;
    let mut records = Vec::new();
    while let Some(record) = stream.next().await {
        records.push(record?);
    }
    source.close().await?;
    Ok(records)
}
