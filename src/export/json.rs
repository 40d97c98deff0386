use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::error::{ImportExportError, Result};

/// Export any serializable data structure as pretty JSON
pub fn export_json<T, P>(data: &T, output_path: P) -> Result<()>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let output_path = output_path.as_ref();
    let json_data = serde_json::to_string_pretty(data).map_err(|e| ImportExportError::ExportFailed {
        path: output_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut file = std::fs::File::create(output_path)?;
    file.write_all(json_data.as_bytes())?;
    file.write_all(b"\n")?;

    Ok(())
}
