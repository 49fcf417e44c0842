use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_EXPORT_FILENAME: &str = "microsoft-365-bookmarks.html";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No bookmarks to export")]
    EmptyCollection,
    #[error("Failed to write bookmark file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// What the export command hands back to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReceipt {
    pub path: String,
    pub bytes: usize,
}

/// Derive an export filename from a template name: lower-cased,
/// non-alphanumeric characters stripped (whitespace and hyphens kept),
/// whitespace runs collapsed to a single hyphen, `.html` appended.
/// Falls back to the default name when nothing printable survives.
pub fn derive_filename(template_name: &str) -> String {
    let lowered = template_name.trim().to_lowercase();

    let mut stem = String::with_capacity(lowered.len());
    let mut in_whitespace = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_whitespace && !stem.is_empty() {
                stem.push('-');
            }
            in_whitespace = true;
        } else if c.is_ascii_alphanumeric() || c == '-' {
            stem.push(c);
            in_whitespace = false;
        }
        // Everything else is stripped without breaking a whitespace run.
    }

    if stem.is_empty() {
        return DEFAULT_EXPORT_FILENAME.to_string();
    }
    format!("{}.html", stem)
}

/// Write the document to `path`, going through a sibling temp file so a
/// failed write never leaves a partial export behind.
pub fn write_bookmark_file(path: &Path, contents: &str) -> Result<(), ExportError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, contents).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if let Err(source) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(ExportError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_filename_strips_and_hyphenates() {
        assert_eq!(derive_filename("IT & Security Tools!"), "it-security-tools.html");
        assert_eq!(derive_filename("Microsoft 365 Essentials"), "microsoft-365-essentials.html");
        assert_eq!(derive_filename("already-slugged"), "already-slugged.html");
    }

    #[test]
    fn test_derive_filename_collapses_whitespace_runs() {
        assert_eq!(derive_filename("a \t b"), "a-b.html");
        assert_eq!(derive_filename("  padded  name  "), "padded-name.html");
    }

    #[test]
    fn test_derive_filename_falls_back_when_empty() {
        assert_eq!(derive_filename("!!!"), DEFAULT_EXPORT_FILENAME);
        assert_eq!(derive_filename(""), DEFAULT_EXPORT_FILENAME);
    }

    #[test]
    fn test_write_bookmark_file_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookmarks.html");
        write_bookmark_file(&path, "<!DOCTYPE NETSCAPE-Bookmark-file-1>").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "<!DOCTYPE NETSCAPE-Bookmark-file-1>"
        );
        // No temp file left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_bookmark_file_missing_directory_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("bookmarks.html");
        let err = write_bookmark_file(&path, "content").unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
        assert!(!path.exists());
    }
}
