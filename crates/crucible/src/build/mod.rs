pub mod autodetect;

use std::path::PathBuf;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::session::Session;

/// Locate the folder inside the configured aports tree that holds the
/// APKBUILD for `pkgname`.
pub fn find_aport(session: &Session, pkgname: &str) -> Result<PathBuf> {
    let aports = &session.config.aports;
    for entry in WalkDir::new(aports).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_dir() {
            continue;
        }
        if entry.file_name().to_str() != Some(pkgname) {
            continue;
        }
        if entry.path().join("APKBUILD").is_file() {
            debug!(pkgname, path = %entry.path().display(), "found aport");
            return Ok(entry.path().to_path_buf());
        }
    }
    Err(Error::msg(format!(
        "could not find aport '{}' in {}",
        pkgname,
        aports.display()
    )))
}
