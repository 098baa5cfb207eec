//! Output module for writing crawl results
//!
//! This module handles:
//! - Writing the finished sitemap to disk in one atomic step
//! - Recording and displaying crawl statistics

pub mod stats;

pub use stats::{log_statistics, print_statistics, CrawlStatistics};

use crate::SitemaperError;
use std::fs::Permissions;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes the sitemap document to `path` atomically
///
/// The document goes to a temporary file in the destination directory which
/// then replaces `path`, so readers never observe a partial sitemap and a
/// failure leaves any previous file untouched.
///
/// # Arguments
///
/// * `path` - Destination file
/// * `xml` - The serialized sitemap
///
/// # Returns
///
/// * `Ok(())` - The file is in place
/// * `Err(SitemaperError)` - Creating, writing, or renaming the file failed
pub fn write_sitemap(path: &Path, xml: &str) -> Result<(), SitemaperError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(xml.as_bytes())?;
    file.flush()?;
    if let Some(permissions) = target_permissions(path)? {
        file.as_file().set_permissions(permissions)?;
    }

    file.persist(path).map_err(|e| SitemaperError::Persist {
        path: path.display().to_string(),
        source: e,
    })?;

    tracing::info!("Sitemap written to {}", path.display());
    Ok(())
}

/// Permissions the sitemap should end up with
///
/// An existing target keeps its mode. A new file gets the usual `0644`
/// instead of the owner-only mode temporary files are created with.
#[cfg(unix)]
fn target_permissions(path: &Path) -> std::io::Result<Option<Permissions>> {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata.permissions())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Ok(Some(Permissions::from_mode(0o644)))
        }
        Err(e) => Err(e),
    }
}

#[cfg(not(unix))]
fn target_permissions(path: &Path) -> std::io::Result<Option<Permissions>> {
    Ok(std::fs::metadata(path).ok().map(|metadata| metadata.permissions()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_sitemap_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sitemap.xml");

        write_sitemap(&path, "<urlset/>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<urlset/>");
    }

    #[test]
    fn test_write_sitemap_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sitemap.xml");
        std::fs::write(&path, "old").unwrap();

        write_sitemap(&path, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        // No temporary files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_sitemap_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("sitemap.xml");

        assert!(write_sitemap(&path, "x").is_err());
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_sitemap_new_file_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sitemap.xml");

        write_sitemap(&path, "<urlset/>").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_sitemap_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sitemap.xml");
        std::fs::write(&path, "old").unwrap();
        std::fs::set_permissions(&path, Permissions::from_mode(0o664)).unwrap();

        write_sitemap(&path, "new").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o664);
    }
}
