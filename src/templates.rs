use serde::{Deserialize, Serialize};

use crate::bookmarks::{normalize_folder, Bookmark};

// A named, described, immutable bundle of bookmarks. The catalog is
// static and read-only for the lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub bookmarks: Vec<Bookmark>,
}

// Listing shape for the template picker: everything but the bookmark
// payload, plus a count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub bookmark_count: usize,
}

impl From<&BookmarkTemplate> for TemplateSummary {
    fn from(template: &BookmarkTemplate) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            description: template.description.clone(),
            bookmark_count: template.bookmarks.len(),
        }
    }
}

/// Parse the static template catalog, normalizing folder labels so the
/// "empty string means ungrouped" invariant holds from the start.
pub fn parse_template_catalog(json: &str) -> anyhow::Result<Vec<BookmarkTemplate>> {
    let mut templates: Vec<BookmarkTemplate> = serde_json::from_str(json)?;
    for template in &mut templates {
        for bookmark in &mut template.bookmarks {
            bookmark.folder = normalize_folder(bookmark.folder.as_deref());
        }
    }
    Ok(templates)
}

pub fn get_template_by_id<'a>(
    template_id: &str,
    templates: &'a [BookmarkTemplate],
) -> Option<&'a BookmarkTemplate> {
    templates.iter().find(|t| t.id == template_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"[
        {
            "id": "essentials",
            "name": "Essentials",
            "description": "The basics",
            "bookmarks": [
                { "id": "b1", "name": "Outlook", "url": "https://outlook.office.com", "folder": "Mail" },
                { "id": "b2", "name": "Portal", "url": "https://portal.office.com", "folder": "  " }
            ]
        }
    ]"#;

    #[test]
    fn test_parse_catalog_normalizes_folders() {
        let templates = parse_template_catalog(CATALOG).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].bookmarks[0].folder.as_deref(), Some("Mail"));
        assert_eq!(templates[0].bookmarks[1].folder, None);
    }

    #[test]
    fn test_get_template_by_id() {
        let templates = parse_template_catalog(CATALOG).unwrap();
        assert!(get_template_by_id("essentials", &templates).is_some());
        assert!(get_template_by_id("missing", &templates).is_none());
    }

    #[test]
    fn test_summary_counts_bookmarks() {
        let templates = parse_template_catalog(CATALOG).unwrap();
        let summary = TemplateSummary::from(&templates[0]);
        assert_eq!(summary.bookmark_count, 2);
        assert_eq!(summary.name, "Essentials");
    }

    #[test]
    fn test_parse_catalog_rejects_malformed_json() {
        assert!(parse_template_catalog("{ not json").is_err());
    }
}
