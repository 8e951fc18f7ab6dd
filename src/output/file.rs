use atomic_write_file::AtomicWriteFile;
use chrono::NaiveDate;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{PulseError, Result};

/// `<prefix>-<DD-MM-YYYY>.<extension>`
pub fn output_filename(prefix: &str, extension: &str, today: NaiveDate) -> String {
    format!("{}-{}.{}", prefix, today.format("%d-%m-%Y"), extension)
}

/// Write `contents` to a dated file in `dir`, replacing any file of the same name.
///
/// The file is written to a temporary sibling and renamed into place, so a reader never
/// sees a half-written report.
pub fn write_output(
    dir: &Path,
    prefix: &str,
    extension: &str,
    contents: &str,
    today: NaiveDate,
) -> Result<PathBuf> {
    let path = dir.join(output_filename(prefix, extension, today));
    let io_err = |source| PulseError::FileIo {
        path: path.clone(),
        source,
    };

    let mut file = AtomicWriteFile::open(&path).map_err(io_err)?;
    file.write_all(contents.as_bytes()).map_err(io_err)?;
    file.commit().map_err(io_err)?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote output file");
    Ok(path)
}
