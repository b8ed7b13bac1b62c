use serde::Serialize;
use std::path::Path;

use crate::error::AppError;

pub(crate) fn to_pretty_json<T: Serialize>(
    value: &T,
    what: &'static str,
) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|source| AppError::Serialize { what, source })
}

/// Write `value` as pretty JSON to `path`, creating parent directories.
/// In dry-run mode the document goes to stdout and nothing is written.
pub(crate) fn write_json<T: Serialize>(
    value: &T,
    what: &'static str,
    path: &Path,
    dry_run: bool,
) -> Result<(), AppError> {
    let json = to_pretty_json(value, what)?;
    if dry_run {
        println!("{json}");
        return Ok(());
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| AppError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, &json).map_err(|source| AppError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    eprintln!(
        "Written {what} to {} ({:.1} KB)",
        path.display(),
        json.len() as f64 / 1024.0
    );
    Ok(())
}
