//! HTTP API

pub mod handlers;
pub mod server;

pub use server::AppContext;
