use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use csv_async::{AsyncReader, AsyncReaderBuilder, StringRecord};
use serde_json::{Value, json};
use tokio::fs::File;
use tokio::io::BufReader;
use tokio_stream::StreamExt;
use tracing::{debug, info};

use crate::helpers::profiling::rss_kb;
use crate::services::database::{create_mongo_client, get_collection, insert_batch};

const BATCH_SIZE: usize = 500;

/// One CSV row as a flat string-to-string document, fields in header order.
/// Short rows omit the missing trailing fields; extra fields are dropped.
fn record_to_document(headers: &StringRecord, record: &StringRecord) -> Value {
    let mut doc = serde_json::Map::new();
    for (i, field) in headers.iter().enumerate() {
        if let Some(value) = record.get(i) {
            doc.insert(field.to_string(), json!(value));
        }
    }
    Value::Object(doc)
}

/// The target collection is the file's base name without its extension.
fn collection_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_owned)
        .ok_or_else(|| anyhow!("cannot derive a collection name from {}", path.display()))
}

async fn open_reader(path: &Path) -> Result<AsyncReader<BufReader<File>>> {
    let file = File::open(path)
        .await
        .with_context(|| format!("failed to open {}", path.display()))?;
    Ok(AsyncReaderBuilder::new()
        .flexible(true)
        .create_reader(BufReader::new(file)))
}

/// Reads the whole file and bulk-inserts every row into the collection named
/// after it. The file is opened before the client is built, so a missing file
/// fails without touching the network. Returns the number of documents inserted.
pub async fn import_csv(path: &Path, dbname: &str, user: &str, password: &str) -> Result<u64> {
    let start = Instant::now();
    let initial_memory = rss_kb();

    let target = collection_name(path)?;
    let mut reader = open_reader(path).await?;
    let headers = reader.headers().await?.clone();

    let client = create_mongo_client(user, password).await?;
    let collection = get_collection(&client, dbname, &target);

    let mut inserted: u64 = 0;
    let mut batch = Vec::with_capacity(BATCH_SIZE);
    let mut records = reader.into_records();

    while let Some(record) = records.next().await {
        let record = record?;
        batch.push(record_to_document(&headers, &record));

        if batch.len() >= BATCH_SIZE {
            inserted += batch.len() as u64;
            insert_batch(&collection, batch.drain(..).collect()).await?;
            debug!(inserted, collection = %target, "flushed batch");
        }
    }

    inserted += batch.len() as u64;
    insert_batch(&collection, batch).await?;

    info!(
        inserted,
        collection = %target,
        elapsed = ?start.elapsed(),
        rss_delta_kb = rss_kb().saturating_sub(initial_memory),
        "import complete"
    );
    Ok(inserted)
}
