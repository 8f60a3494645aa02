use crate::core::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

pub type RecordStream<T> = Pin<Box<dyn Stream<Item = Result<T>> + Send>>;

#[async_trait]
pub trait Source: Send + Sync {
    type Record: Send + 'static;

    async fn read(&self) -> Result<RecordStream<Self::Record>>;

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
pub trait Sink: Send + Sync {
    type Record: Send + 'static;

    async fn write(&mut self, record: Self::Record) -> Result<()>;

    async fn write_batch(&mut self, records: Vec<Self::Record>) -> Result<()> {
        for record in records {
            self.write(record).await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.flush().await
    }
}

#[async_trait]
pub trait Transform: Send + Sync {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Zero or one output per input; filtered inputs return an empty vec.
    async fn transform(&self, record: Self::Input) -> Result<Vec<Self::Output>>;
}

/// How a sink treats an existing target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Append,
    Overwrite,
}
