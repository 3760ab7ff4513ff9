//! File helpers for the exporter.
//!
//! All failures are reported as values. A missing destination directory
//! is the one expected-and-retried condition: the parent chain is
//! created one level at a time and the write is retried once. Anything
//! else (permissions, unreadable source) is a plain failure.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Read a file as UTF-8 text, swallowing I/O errors.
pub fn read_text(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}

/// Copy a text file, creating missing parent directories of `to` on
/// demand. Returns `false` when the source cannot be read or the write
/// still fails after the retry.
pub fn copy_text_file(from: &Path, to: &Path) -> bool {
    let Some(content) = read_text(from) else {
        return false;
    };
    match fs::write(to, &content) {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            make_parent_dir(to);
            fs::write(to, &content).is_ok()
        }
        Err(_) => false,
    }
}

/// Create the parent directory of `path`, walking up one level at a
/// time while ancestors are missing.
pub(crate) fn make_parent_dir(path: &Path) -> bool {
    let Some(parent) = path.parent() else {
        return false;
    };
    match fs::create_dir(parent) {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            make_parent_dir(parent);
            fs::create_dir(parent).is_ok()
        }
        Err(_) => false,
    }
}
