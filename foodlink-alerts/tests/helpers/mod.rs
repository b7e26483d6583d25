//! Shared test fixtures: tempfile databases, inventory seeding, and
//! in-memory history sinks.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use foodlink_alerts::history::{HistoryDocument, HistorySink};
use foodlink_common::{Error, Result};
use sqlx::SqlitePool;
use std::sync::Mutex;
use tempfile::TempDir;

/// Fresh SQLite database in a temp directory. Keep the TempDir alive
/// for the duration of the test.
pub async fn test_pool() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let pool = foodlink_common::db::init_database(&dir.path().join("test.db"))
        .await
        .expect("init database");
    (pool, dir)
}

pub async fn insert_donor(pool: &SqlitePool, name: &str) -> i64 {
    sqlx::query("INSERT INTO donors (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await
        .expect("insert donor")
        .last_insert_rowid()
}

pub async fn insert_category(pool: &SqlitePool, name: &str) -> i64 {
    sqlx::query("INSERT INTO categories (category_name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await
        .expect("insert category")
        .last_insert_rowid()
}

pub async fn insert_item(pool: &SqlitePool, name: &str, quantity: i64, expiry: NaiveDate) -> i64 {
    sqlx::query("INSERT INTO items (name, quantity, expiry_date) VALUES (?, ?, ?)")
        .bind(name)
        .bind(quantity)
        .bind(expiry)
        .execute(pool)
        .await
        .expect("insert item")
        .last_insert_rowid()
}

pub async fn insert_item_full(
    pool: &SqlitePool,
    name: &str,
    quantity: i64,
    expiry: NaiveDate,
    category_id: i64,
    donor_id: i64,
) -> i64 {
    sqlx::query(
        "INSERT INTO items (name, quantity, expiry_date, category_id, donor_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(name)
    .bind(quantity)
    .bind(expiry)
    .bind(category_id)
    .bind(donor_id)
    .execute(pool)
    .await
    .expect("insert item")
    .last_insert_rowid()
}

/// In-memory history sink recording appended documents.
#[derive(Default)]
pub struct MemoryHistory {
    docs: Mutex<Vec<HistoryDocument>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn docs(&self) -> Vec<HistoryDocument> {
        self.docs.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistorySink for MemoryHistory {
    fn is_available(&self) -> bool {
        true
    }

    async fn append(&self, doc: HistoryDocument) -> Result<()> {
        self.docs.lock().unwrap().push(doc);
        Ok(())
    }

    async fn acknowledge_all(&self, alert_id: i64) -> Result<u64> {
        let mut docs = self.docs.lock().unwrap();
        let mut modified = 0;
        for doc in docs.iter_mut().filter(|d| d.alert_id == alert_id) {
            if !doc.acknowledged {
                doc.acknowledged = true;
                modified += 1;
            }
        }
        Ok(modified)
    }

    async fn recent(&self, skip: u64, limit: i64) -> Result<Vec<HistoryDocument>> {
        let mut docs = self.docs.lock().unwrap().clone();
        docs.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(docs
            .into_iter()
            .skip(skip as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.docs.lock().unwrap().len() as u64)
    }
}

/// Sink that claims availability but fails every append, for
/// exercising the mirror_failed counter.
pub struct FailingHistory;

#[async_trait]
impl HistorySink for FailingHistory {
    fn is_available(&self) -> bool {
        true
    }

    async fn append(&self, _doc: HistoryDocument) -> Result<()> {
        Err(Error::History("simulated append failure".to_string()))
    }

    async fn acknowledge_all(&self, _alert_id: i64) -> Result<u64> {
        Err(Error::History("simulated update failure".to_string()))
    }

    async fn recent(&self, _skip: u64, _limit: i64) -> Result<Vec<HistoryDocument>> {
        Err(Error::History("simulated find failure".to_string()))
    }

    async fn count(&self) -> Result<u64> {
        Err(Error::History("simulated count failure".to_string()))
    }
}
