//! Output formatting and persistence for analysis results.
//!
//! Supports pretty-printing, JSON logging, and writing JSON files for the
//! export collaborators.

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Logs a result using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a result as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes a result as pretty-printed JSON, creating parent directories if
/// needed.
pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, serde_json::to_vec_pretty(value)?)?;
    debug!(path, "JSON result written");

    Ok(())
}
