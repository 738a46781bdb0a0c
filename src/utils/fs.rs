use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{PlannerError, PlannerResult};

/// Load a JSON object from `path`
///
/// A missing file yields an empty map rather than an error.
pub fn load_state(path: impl AsRef<Path>) -> PlannerResult<Map<String, Value>> {
    let path = path.as_ref();
    if !path.exists() {
        debug!("State file {} does not exist, starting empty", path.display());
        return Ok(Map::new());
    }

    debug!("Reading state file: {}", path.display());
    let content =
        fs::read_to_string(path).map_err(|e| PlannerError::io_error(e, Some(path)))?;

    match serde_json::from_str(&content)? {
        Value::Object(map) => Ok(map),
        other => Err(PlannerError::Serialization(format!(
            "{} must contain a JSON object, found {}",
            path.display(),
            json_type_name(&other)
        ))),
    }
}

/// Atomically replace `path` with `state` serialized as JSON
///
/// The content is written to a temporary file in the same directory and
/// renamed over the target, so readers never observe a partial file.
pub fn save_state(state: &Map<String, Value>, path: impl AsRef<Path>) -> PlannerResult<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| PlannerError::io_error(e, Some(parent)))?;

    let mut temp_file =
        NamedTempFile::new_in(parent).map_err(|e| PlannerError::io_error(e, Some(parent)))?;
    serde_json::to_writer_pretty(&mut temp_file, state)?;
    temp_file
        .write_all(b"\n")
        .and_then(|_| temp_file.as_file().sync_all())
        .map_err(|e| PlannerError::io_error(e, Some(path)))?;

    temp_file
        .persist(path)
        .map_err(|e| PlannerError::io_error(e.error, Some(path)))?;

    debug!("Saved state file: {}", path.display());
    Ok(())
}

/// Human-readable JSON type name for error messages
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
