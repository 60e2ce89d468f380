//! Filesystem utilities

use std::path::Path;

use log::debug;

/// Check if a path points at a regular file
///
/// Used before opening the observation database so a typo in the path is
/// reported as such rather than as a SQLite open error.
pub fn is_file(path: &str) -> bool {
    let is_file = Path::new(path).is_file();
    if !is_file {
        debug!("Not a regular file: {}", path);
    }
    is_file
}
