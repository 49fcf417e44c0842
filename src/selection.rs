use crate::bookmarks::{generate_bookmark_id, normalize_folder, Bookmark};
use crate::templates::BookmarkTemplate;

/// Ordered template selection and the replace-on-change merge policy.
///
/// The working collection is always exactly the concatenation of the
/// selected templates' bookmarks in selection order. Every selection
/// change rebuilds it wholesale; manual edits made before the change are
/// discarded by design. Keeping the policy behind this type means a
/// reconciling strategy could replace it without touching the codec.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    selected: Vec<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, template_id: &str) -> bool {
        self.selected.iter().any(|id| id == template_id)
    }

    /// Append on select (insertion order is selection order), remove on
    /// deselect. Selecting an already-selected template is a no-op.
    pub fn set_selected(&mut self, template_id: &str, included: bool) {
        if included {
            if !self.is_selected(template_id) {
                self.selected.push(template_id.to_string());
            }
        } else {
            self.selected.retain(|id| id != template_id);
        }
    }

    /// Project the selection into a fresh working collection.
    ///
    /// Templates are immutable, so this is a pure concatenation: no URL
    /// dedup across templates, each selected template contributes its own
    /// copies. Copies get fresh session ids, which keeps ids unique even
    /// when two templates bundle the same bookmark record.
    pub fn rebuild_working_collection(&self, templates: &[BookmarkTemplate]) -> Vec<Bookmark> {
        let mut working = Vec::new();
        for template_id in &self.selected {
            let Some(template) = templates.iter().find(|t| &t.id == template_id) else {
                continue;
            };
            for bookmark in &template.bookmarks {
                working.push(Bookmark {
                    id: generate_bookmark_id(),
                    name: bookmark.name.clone(),
                    url: bookmark.url.clone(),
                    folder: normalize_folder(bookmark.folder.as_deref()),
                    icon_id: bookmark.icon_id.clone(),
                });
            }
        }
        working
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(id: &str, names: &[&str]) -> BookmarkTemplate {
        BookmarkTemplate {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            bookmarks: names
                .iter()
                .map(|name| Bookmark {
                    id: format!("{}-{}", id, name),
                    name: name.to_string(),
                    url: format!("https://{}.example.com", name),
                    folder: None,
                    icon_id: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_selection_concatenates_in_order() {
        let templates = vec![template("a", &["a1", "a2"]), template("b", &["b1"])];
        let mut selection = SelectionState::new();
        selection.set_selected("a", true);
        selection.set_selected("b", true);

        let working = selection.rebuild_working_collection(&templates);
        let names: Vec<&str> = working.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["a1", "a2", "b1"]);
    }

    #[test]
    fn test_deselect_leaves_remaining_templates_exactly() {
        let templates = vec![template("a", &["a1", "a2"]), template("b", &["b1"])];
        let mut selection = SelectionState::new();
        selection.set_selected("a", true);
        selection.set_selected("b", true);
        selection.set_selected("a", false);

        let working = selection.rebuild_working_collection(&templates);
        let names: Vec<&str> = working.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["b1"]);
    }

    #[test]
    fn test_reselect_is_a_noop() {
        let mut selection = SelectionState::new();
        selection.set_selected("a", true);
        selection.set_selected("a", true);
        assert_eq!(selection.selected_ids(), &["a".to_string()]);
    }

    #[test]
    fn test_shared_records_get_fresh_unique_ids() {
        // Two templates bundling the identical record must not collide.
        let templates = vec![template("a", &["shared"]), template("b", &["shared"])];
        let mut selection = SelectionState::new();
        selection.set_selected("a", true);
        selection.set_selected("b", true);

        let working = selection.rebuild_working_collection(&templates);
        assert_eq!(working.len(), 2);
        assert_ne!(working[0].id, working[1].id);
        assert_eq!(working[0].url, working[1].url);
    }

    #[test]
    fn test_unknown_template_id_is_skipped() {
        let templates = vec![template("a", &["a1"])];
        let mut selection = SelectionState::new();
        selection.set_selected("gone", true);
        selection.set_selected("a", true);

        let working = selection.rebuild_working_collection(&templates);
        assert_eq!(working.len(), 1);
    }
}
