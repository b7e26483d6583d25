//! # FoodLink Alert Engine
//!
//! Expiry alert generation and dual-store synchronization service.
//!
//! Scans perishable inventory for items approaching expiry, classifies
//! urgency, writes canonical alerts to SQLite (at most one per item per
//! calendar day) and mirrors denormalized snapshots to a best-effort
//! MongoDB history log. Acknowledgement state is kept consistent across
//! both stores, with the primary store as the source of truth.

pub mod api;
pub mod db;
pub mod engine;
pub mod history;

pub use engine::{AlertEngine, BatchResult};
