//! # FoodLink Common Library
//!
//! Shared code for FoodLink services including:
//! - Database models and schema initialization
//! - Error types
//! - Configuration and data folder resolution

pub mod config;
pub mod db;
pub mod error;

pub use db::models::Severity;
pub use error::{Error, Result};
