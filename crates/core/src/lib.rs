//! Core types and shared functionality for the WeChat article MCP server.
//!
//! This crate provides:
//! - Unified error taxonomy with stable string codes
//! - Configuration structures with layered loading

pub mod config;
pub mod error;

pub use config::AppConfig;
pub use error::Error;
