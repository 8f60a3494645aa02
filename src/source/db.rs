use crate::core::{Customer, IngestError, RecordStream, Result, Source};
use async_trait::async_trait;
use futures::stream;
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const CUSTOMER_QUERY: &str = r#"
    SELECT
        cust.customer_id,
        cust.last_name,
        cust.first_name,
        cust.DOB,
        cust.city,
        cust.state,
        con.country_name,
        cust.gender
    FROM CUSTOMER AS cust
    JOIN COUNTRY AS con
        ON cust.country_id = con.country_id
"#;

const INVOICE_ITEM_QUERY: &str = "SELECT i.invoice_item_id, i.invoice_item FROM INVOICE_ITEM i";

/// Scoped handle on the ingest database. Opened once per run and closed
/// explicitly when the pipeline finishes, on success or failure.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        info!(path = %path.as_ref().display(), "connected to ingest database");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Identifier-to-name lookup for subscription invoice items.
    pub fn invoice_items(&self) -> Result<HashMap<i64, String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(INVOICE_ITEM_QUERY)?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut items = HashMap::new();
        for row in rows {
            let (id, name) = row?;
            items.insert(id, name);
        }
        debug!(items = items.len(), "loaded invoice item lookup");
        Ok(items)
    }

    fn customers(&self) -> Result<Vec<Customer>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(CUSTOMER_QUERY)?;
        let rows = stmt.query_map([], |row| {
            Ok(Customer {
                customer_id: row.get(0)?,
                last_name: row.get(1)?,
                first_name: row.get(2)?,
                dob: row.get(3)?,
                city: row.get(4)?,
                state: row.get(5)?,
                country_name: row.get(6)?,
                gender: row.get(7)?,
            })
        })?;
        rows.map(|row| row.map_err(IngestError::from)).collect()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| IngestError::Source(anyhow::anyhow!("database lock poisoned")))
    }

    pub fn close(self) -> Result<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| IngestError::Source(anyhow::anyhow!("database lock poisoned")))?;
        conn.close().map_err(|(_, err)| IngestError::Database(err))
    }
}

/// Source over the denormalized customer table.
pub struct CustomerSource<'a> {
    db: &'a Database,
}

impl<'a> CustomerSource<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Source for CustomerSource<'_> {
    type Record = Customer;

    async fn read(&self) -> Result<RecordStream<Customer>> {
        let customers = self.db.customers()?;
        debug!(rows = customers.len(), "extracted customer join rows");
        let rows: Vec<Result<Customer>> = customers.into_iter().map(Ok).collect();
        Ok(Box::pin(stream::iter(rows)))
    }
}
