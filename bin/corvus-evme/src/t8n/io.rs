//! Input loading and output writing for the t8n tool.

use serde::{de::DeserializeOwned, Serialize};

use crate::t8n::{Result, T8nError};

/// Loads a JSON document from a file.
pub fn load_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| T8nError::InputLoad { file: path.to_string(), source: e })?;

    serde_json::from_str(&content)
        .map_err(|e| T8nError::JsonParse { file: path.to_string(), source: e })
}

/// Writes a JSON document to a file, or to stdout when the destination is `stdout`.
pub fn write_json<T: Serialize>(value: &T, destination: &str) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    if destination == "stdout" {
        println!("{rendered}");
        return Ok(());
    }
    std::fs::write(destination, rendered)
        .map_err(|e| T8nError::OutputWrite { file: destination.to_string(), source: e })
}
