//! JSON configuration for the command-line tools.
//!
//! Every tool reads one JSON file; missing parameter sections fall back to
//! their `Default` through `#[serde(default)]`.
pub mod dewarp_demo;

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Read and parse a JSON config file.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    parse_config(&contents).map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

/// Parse a JSON config held in memory.
pub fn parse_config<T: DeserializeOwned>(json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| e.to_string())
}
