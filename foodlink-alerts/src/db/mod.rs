//! Primary store (SQLite) access for the alert engine

pub mod alerts;
pub mod items;
pub mod settings;
