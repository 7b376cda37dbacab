//! Data models: the extracted card record, classification tables and configuration.

pub mod config;
pub mod record;
pub mod vocabulary;
