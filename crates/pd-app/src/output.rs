use std::path::{Path, PathBuf};

use pd_core::config::{Mode, OutputConfig};

/// Derive the output path: `<stem><suffix>.png` in the configured directory,
/// or the current directory when none is set.
#[must_use]
pub fn output_path(input: &Path, mode: Mode, config: &OutputConfig) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("halftone");
    let name = format!("{stem}{}.png", config.suffix(mode));
    match config.directory {
        Some(ref dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}
