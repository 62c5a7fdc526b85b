//! pg-gateway - A minimal HTTP gateway to a PostgreSQL database.
//!
//! This library exposes the core modules for use in integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod server;
