//! Output of CLI results.
//!
//! Writes JSON to a file, or pretty-prints it to stdout.

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Writes `value` as JSON to `path`, creating parent directories as needed.
pub fn write_json(path: &str, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_vec_pretty(value)?;
    fs::write(path, &body)?;
    info!(path, bytes = body.len(), "JSON written");
    Ok(())
}

/// Pretty-prints `value` as JSON to `out`.
pub fn print_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    debug!("JSON printed");
    Ok(())
}

/// Sends `value` to `path` when given, otherwise to stdout.
pub fn emit(output: Option<&str>, value: &impl Serialize) -> Result<()> {
    match output {
        Some(path) => write_json(path, value),
        None => print_json(&mut std::io::stdout().lock(), value),
    }
}
