use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// --- Model types ---

// One navigable entry in the working collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, rename = "iconId", skip_serializing_if = "Option::is_none")]
    pub icon_id: Option<String>,
}

// A named group of bookmarks, as shown in the preview and written to the export.
#[derive(Debug, Clone, Serialize)]
pub struct BookmarkFolder {
    pub name: String,
    pub bookmarks: Vec<Bookmark>,
}

// Unvalidated field values coming from the edit form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkDraft {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub icon_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// --- Validation ---

/// A URL is accepted when it parses as an absolute URL carrying an
/// authority. Relative paths and bare hostnames are rejected.
pub fn validate_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(parsed) => parsed.has_authority(),
        Err(_) => false,
    }
}

/// Folder labels are trimmed; an empty label means "ungrouped" and is
/// stored as absent, never as an empty string.
pub fn normalize_folder(folder: Option<&str>) -> Option<String> {
    folder
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}

fn validated_fields(draft: &BookmarkDraft) -> Result<(String, String, Option<String>), ValidationError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(ValidationError::new("name", "Name is required"));
    }

    let url = draft.url.trim();
    if url.is_empty() {
        return Err(ValidationError::new("url", "URL is required"));
    }
    if !validate_url(url) {
        return Err(ValidationError::new(
            "url",
            format!("'{}' is not a valid URL", url),
        ));
    }

    Ok((
        name.to_string(),
        url.to_string(),
        normalize_folder(draft.folder.as_deref()),
    ))
}

impl Bookmark {
    /// Validate a draft into a new bookmark with a fresh session id.
    pub fn from_draft(draft: &BookmarkDraft) -> Result<Self, ValidationError> {
        let (name, url, folder) = validated_fields(draft)?;
        Ok(Self {
            id: generate_bookmark_id(),
            name,
            url,
            folder,
            icon_id: draft.icon_id.clone(),
        })
    }

    /// Validate a draft and apply it over this bookmark. The id stays
    /// stable for the record's lifetime.
    pub fn apply_draft(&mut self, draft: &BookmarkDraft) -> Result<(), ValidationError> {
        let (name, url, folder) = validated_fields(draft)?;
        self.name = name;
        self.url = url;
        self.folder = folder;
        self.icon_id = draft.icon_id.clone();
        Ok(())
    }
}

// --- Id generation ---

/// Session-unique bookmark id: millisecond timestamp plus a random
/// suffix. No cross-process guarantee.
pub fn generate_bookmark_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}", millis, &random[..12])
}

// --- Folder grouping ---

/// Partition bookmarks into named-folder groups plus the reserved
/// ungrouped bucket. Folder order is first appearance in the input, so
/// grouping is deterministic for identical input.
pub fn group_by_folder(bookmarks: &[Bookmark]) -> (Vec<BookmarkFolder>, Vec<Bookmark>) {
    let mut folders: Vec<BookmarkFolder> = Vec::new();
    let mut ungrouped: Vec<Bookmark> = Vec::new();

    for bookmark in bookmarks {
        match normalize_folder(bookmark.folder.as_deref()) {
            Some(name) => {
                if let Some(group) = folders.iter_mut().find(|g| g.name == name) {
                    group.bookmarks.push(bookmark.clone());
                } else {
                    folders.push(BookmarkFolder {
                        name,
                        bookmarks: vec![bookmark.clone()],
                    });
                }
            }
            None => ungrouped.push(bookmark.clone()),
        }
    }

    (folders, ungrouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, url: &str, folder: Option<&str>) -> BookmarkDraft {
        BookmarkDraft {
            name: name.to_string(),
            url: url.to_string(),
            folder: folder.map(str::to_string),
            icon_id: None,
        }
    }

    #[test]
    fn test_from_draft_trims_fields() {
        let bookmark =
            Bookmark::from_draft(&draft("  Teams  ", " https://teams.microsoft.com ", None))
                .unwrap();
        assert_eq!(bookmark.name, "Teams");
        assert_eq!(bookmark.url, "https://teams.microsoft.com");
        assert_eq!(bookmark.folder, None);
    }

    #[test]
    fn test_from_draft_rejects_empty_name() {
        let err = Bookmark::from_draft(&draft("   ", "https://example.com", None)).unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn test_from_draft_rejects_invalid_url() {
        let err = Bookmark::from_draft(&draft("Broken", "not a url", None)).unwrap_err();
        assert_eq!(err.field, "url");
        let err = Bookmark::from_draft(&draft("Relative", "/docs/page", None)).unwrap_err();
        assert_eq!(err.field, "url");
    }

    #[test]
    fn test_empty_folder_normalizes_to_absent() {
        let bookmark =
            Bookmark::from_draft(&draft("Teams", "https://teams.microsoft.com", Some("  ")))
                .unwrap();
        assert_eq!(bookmark.folder, None);
    }

    #[test]
    fn test_apply_draft_keeps_id() {
        let mut bookmark =
            Bookmark::from_draft(&draft("Teams", "https://teams.microsoft.com", None)).unwrap();
        let id = bookmark.id.clone();
        bookmark
            .apply_draft(&draft("Outlook", "https://outlook.office.com", Some("Mail")))
            .unwrap();
        assert_eq!(bookmark.id, id);
        assert_eq!(bookmark.name, "Outlook");
        assert_eq!(bookmark.folder.as_deref(), Some("Mail"));
    }

    #[test]
    fn test_apply_draft_rejects_without_mutating() {
        let mut bookmark =
            Bookmark::from_draft(&draft("Teams", "https://teams.microsoft.com", None)).unwrap();
        let before = bookmark.clone();
        assert!(bookmark.apply_draft(&draft("", "https://example.com", None)).is_err());
        assert_eq!(bookmark, before);
    }

    #[test]
    fn test_group_by_folder_keeps_first_appearance_order() {
        let bookmarks = vec![
            Bookmark::from_draft(&draft("A", "https://a.example.com", Some("Beta"))).unwrap(),
            Bookmark::from_draft(&draft("B", "https://b.example.com", None)).unwrap(),
            Bookmark::from_draft(&draft("C", "https://c.example.com", Some("Alpha"))).unwrap(),
            Bookmark::from_draft(&draft("D", "https://d.example.com", Some("Beta"))).unwrap(),
        ];

        let (folders, ungrouped) = group_by_folder(&bookmarks);
        let names: Vec<&str> = folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
        assert_eq!(folders[0].bookmarks.len(), 2);
        assert_eq!(ungrouped.len(), 1);
        assert_eq!(ungrouped[0].name, "B");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate_bookmark_id()));
        }
    }
}
