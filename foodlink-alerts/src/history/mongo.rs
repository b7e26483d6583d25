//! MongoDB history sink

use async_trait::async_trait;
use bson::doc;
use foodlink_common::{Error, Result};
use futures::StreamExt;
use mongodb::{options::IndexOptions, Client, Collection, IndexModel};
use tracing::{error, info};

use super::{HistoryDocument, HistorySink};

const COLLECTION_NAME: &str = "history_alerts";

/// History sink backed by a MongoDB collection.
///
/// Constructed only after a successful startup ping; an unreachable
/// store yields `DisabledHistory` instead.
#[derive(Clone)]
pub struct MongoHistory {
    collection: Collection<HistoryDocument>,
}

impl MongoHistory {
    /// Connect, verify with a ping, and ensure indexes.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self> {
        info!("Connecting to MongoDB at {}", uri);

        // Short server-selection timeout so an unreachable MongoDB
        // degrades startup instead of hanging it
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| Error::History(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| Error::History(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        let collection = client
            .database(db_name)
            .collection::<HistoryDocument>(COLLECTION_NAME);

        let history = MongoHistory { collection };
        history.apply_indexes().await?;

        Ok(history)
    }

    /// Non-unique correlation index on alert_id plus a descending
    /// recorded_at index for recency queries.
    async fn apply_indexes(&self) -> Result<()> {
        let indices = vec![
            IndexModel::builder()
                .keys(doc! { "alert_id": 1 })
                .options(IndexOptions::builder().unique(false).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "recorded_at": -1 })
                .build(),
        ];

        self.collection
            .create_indexes(indices)
            .await
            .map_err(|e| Error::History(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl HistorySink for MongoHistory {
    fn is_available(&self) -> bool {
        true
    }

    async fn append(&self, doc: HistoryDocument) -> Result<()> {
        self.collection
            .insert_one(doc)
            .await
            .map_err(|e| Error::History(format!("Insert failed: {}", e)))?;

        Ok(())
    }

    async fn acknowledge_all(&self, alert_id: i64) -> Result<u64> {
        let result = self
            .collection
            .update_many(
                doc! { "alert_id": alert_id },
                doc! { "$set": { "acknowledged": true } },
            )
            .await
            .map_err(|e| Error::History(format!("Update failed: {}", e)))?;

        Ok(result.modified_count)
    }

    async fn recent(&self, skip: u64, limit: i64) -> Result<Vec<HistoryDocument>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "recorded_at": -1 })
            .skip(skip)
            .limit(limit)
            .await
            .map_err(|e| Error::History(format!("Find failed: {}", e)))?;

        let docs: Vec<HistoryDocument> = cursor
            .filter_map(|doc| async {
                match doc {
                    Ok(d) => Some(d),
                    Err(e) => {
                        error!("Error reading history document: {}", e);
                        None
                    }
                }
            })
            .collect()
            .await;

        Ok(docs)
    }

    async fn count(&self) -> Result<u64> {
        self.collection
            .count_documents(doc! {})
            .await
            .map_err(|e| Error::History(format!("Count failed: {}", e)))
    }
}
