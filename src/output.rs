use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::error::{Result, ScanError};

pub const DEFAULT_OUTPUT: &str = "target/entry-points.txt";

/// Ensures the listing can be written to `path` before any scanning starts.
///
/// Creates missing parent directories and an empty file if none exists.
/// Existing content is left untouched, so calling this repeatedly is
/// harmless.
pub fn prepare_output(path: &Path) -> Result<()> {
    let prepare_err = |source| ScanError::PrepareOutput {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(prepare_err)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(prepare_err)?;
    debug!("Prepared output file {}", path.display());
    Ok(())
}

/// One name per line, each terminated by `\n`.
pub fn render_listing(names: &[String]) -> String {
    let mut out = String::with_capacity(names.iter().map(|n| n.len() + 1).sum());
    for name in names {
        out.push_str(name);
        out.push('\n');
    }
    out
}

/// Replaces the content of `path` with the listing.
pub fn write_listing(path: &Path, names: &[String]) -> Result<()> {
    let write_err = |source| ScanError::WriteOutput {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(render_listing(names).as_bytes())
        .and_then(|()| writer.flush())
        .map_err(write_err)?;
    debug!("Wrote {} names to {}", names.len(), path.display());
    Ok(())
}
