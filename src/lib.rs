//! Sweet Shop Backend Library
//!
//! Exposes core modules for use by the server binary and tests.

pub mod auth;
pub mod config;
pub mod inventory;
pub mod server;
