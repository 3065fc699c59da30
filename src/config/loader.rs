//! Configuration file loading

use crate::constants::CONFIG_FORMATS;
use crate::error::{Error, Result};
use log::debug;
use serde_json::Value;
use std::path::Path;

/// Reads a raw configuration file.
///
/// The format is chosen from the file extension: `.json`, `.yaml` or `.yml`.
/// The content is returned untyped; shape validation happens in
/// [`crate::config::merge_config`].
///
/// # Errors
/// * `Error::UnsupportedConfigFormat` for any other extension
/// * `Error::IoError`, `Error::JSONParseError` or `Error::YAMLParseError`
///   when the file cannot be read or parsed
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path = path.as_ref();
    let format = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();

    let parse: fn(&str) -> Result<Value> = match format {
        "json" => |content| Ok(serde_json::from_str(content)?),
        "yaml" | "yml" => |content| Ok(serde_yaml::from_str(content)?),
        _ => {
            return Err(Error::UnsupportedConfigFormat {
                path: path.display().to_string(),
                formats: CONFIG_FORMATS.join(", "),
            })
        }
    };

    debug!("Loading configuration from '{}'", path.display());
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}
