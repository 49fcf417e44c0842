use serde::Serialize;
use std::path::PathBuf;
use std::sync::RwLock;
use tauri::{AppHandle, Manager, State};
use tauri_plugin_clipboard_manager::ClipboardExt;
use tauri_plugin_opener::OpenerExt;

pub mod bookmarks;
pub mod export;
pub mod icons;
pub mod netscape;
pub mod selection;
pub mod templates;

use bookmarks::{group_by_folder, Bookmark, BookmarkDraft, BookmarkFolder};
use export::{derive_filename, write_bookmark_file, ExportReceipt, DEFAULT_EXPORT_FILENAME};
use icons::Icon;
use selection::SelectionState;
use templates::{get_template_by_id, BookmarkTemplate, TemplateSummary};

// Bundled catalog fallbacks, used when the resource files are absent.
const TEMPLATES_JSON: &str = include_str!("../data/templates.json");
const ICONS_JSON: &str = include_str!("../data/icons.json");

// --- Catalog state ---

// The static template/icon catalogs, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub templates: Vec<BookmarkTemplate>,
    pub icons: Vec<Icon>,
}

// "Still loading" is an explicit state, distinct from "loaded empty".
#[derive(Debug, Clone)]
pub enum CatalogState {
    Loading,
    Ready(Catalog),
    Failed(String),
}

// Status shape reported to the frontend.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CatalogStatus {
    Loading,
    Ready { templates: usize, icons: usize },
    Failed { error: String },
}

// --- App state ---

pub struct AppState {
    pub catalog: RwLock<CatalogState>,
    pub selection: RwLock<SelectionState>,
    pub working: RwLock<Vec<Bookmark>>,
    // Icons synthesized by imports live with the session, never in the
    // read-only catalog.
    pub session_icons: RwLock<Vec<Icon>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            catalog: RwLock::new(CatalogState::Loading),
            selection: RwLock::new(SelectionState::new()),
            working: RwLock::new(Vec::new()),
            session_icons: RwLock::new(Vec::new()),
        }
    }
}

// --- Catalog loading ---

// Prefer the catalog files shipped as resources; fall back to the copies
// compiled into the binary.
async fn read_catalog_file(app: &AppHandle, name: &str) -> Option<String> {
    let resource_dir = app.path().resource_dir().ok()?;
    tokio::fs::read_to_string(resource_dir.join("data").join(name))
        .await
        .ok()
}

async fn load_catalog(app: &AppHandle) -> anyhow::Result<Catalog> {
    let templates_json = read_catalog_file(app, "templates.json")
        .await
        .unwrap_or_else(|| TEMPLATES_JSON.to_string());
    let icons_json = read_catalog_file(app, "icons.json")
        .await
        .unwrap_or_else(|| ICONS_JSON.to_string());

    let templates = templates::parse_template_catalog(&templates_json)?;
    let icons = icons::parse_icon_catalog(&icons_json)?.icons;

    Ok(Catalog { templates, icons })
}

fn ready_catalog(state: &State<AppState>) -> Result<Catalog, String> {
    match &*state.catalog.read().expect("catalog read lock") {
        CatalogState::Loading => Err("Template catalog is still loading".to_string()),
        CatalogState::Failed(error) => Err(format!("Template catalog failed to load: {}", error)),
        CatalogState::Ready(catalog) => Ok(catalog.clone()),
    }
}

// Catalog icons plus any icons synthesized by imports this session.
fn all_icons(catalog: &Catalog, state: &State<AppState>) -> Vec<Icon> {
    let mut icons = catalog.icons.clone();
    let session_icons = state.session_icons.read().expect("session icons read lock");
    icons.extend(session_icons.iter().cloned());
    icons
}

// --- Preview / import shapes ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionPreview {
    pub folders: Vec<BookmarkFolder>,
    pub ungrouped: Vec<Bookmark>,
    pub total: usize,
    pub folder_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: Vec<String>,
}

// TAURI COMMANDS

#[tauri::command]
fn catalog_status(state: State<AppState>) -> CatalogStatus {
    match &*state.catalog.read().expect("catalog read lock") {
        CatalogState::Loading => CatalogStatus::Loading,
        CatalogState::Ready(catalog) => CatalogStatus::Ready {
            templates: catalog.templates.len(),
            icons: catalog.icons.len(),
        },
        CatalogState::Failed(error) => CatalogStatus::Failed {
            error: error.clone(),
        },
    }
}

#[tauri::command]
fn list_templates(state: State<AppState>) -> Result<Vec<TemplateSummary>, String> {
    let catalog = ready_catalog(&state)?;
    Ok(catalog.templates.iter().map(TemplateSummary::from).collect())
}

#[tauri::command]
fn get_template(template_id: String, state: State<AppState>) -> Result<BookmarkTemplate, String> {
    let catalog = ready_catalog(&state)?;
    get_template_by_id(&template_id, &catalog.templates)
        .cloned()
        .ok_or_else(|| format!("Unknown template '{}'", template_id))
}

#[tauri::command]
fn selected_template_ids(state: State<AppState>) -> Vec<String> {
    state
        .selection
        .read()
        .expect("selection read lock")
        .selected_ids()
        .to_vec()
}

// Toggling a template rebuilds the working collection wholesale from the
// current selection; manual edits made before the change are discarded.
#[tauri::command]
fn set_template_selected(
    template_id: String,
    included: bool,
    state: State<AppState>,
) -> Result<Vec<Bookmark>, String> {
    let catalog = ready_catalog(&state)?;
    if included && get_template_by_id(&template_id, &catalog.templates).is_none() {
        return Err(format!("Unknown template '{}'", template_id));
    }

    let rebuilt = {
        let mut selection = state.selection.write().expect("selection write lock");
        selection.set_selected(&template_id, included);
        selection.rebuild_working_collection(&catalog.templates)
    };

    let mut working = state.working.write().expect("working write lock");
    *working = rebuilt;
    Ok(working.clone())
}

#[tauri::command]
fn working_collection(state: State<AppState>) -> Vec<Bookmark> {
    state.working.read().expect("working read lock").clone()
}

#[tauri::command]
fn add_bookmark(draft: BookmarkDraft, state: State<AppState>) -> Result<Vec<Bookmark>, String> {
    let bookmark = Bookmark::from_draft(&draft).map_err(|e| e.to_string())?;
    let mut working = state.working.write().expect("working write lock");
    working.push(bookmark);
    Ok(working.clone())
}

#[tauri::command]
fn update_bookmark(
    bookmark_id: String,
    draft: BookmarkDraft,
    state: State<AppState>,
) -> Result<Vec<Bookmark>, String> {
    let mut working = state.working.write().expect("working write lock");
    let bookmark = working
        .iter_mut()
        .find(|b| b.id == bookmark_id)
        .ok_or_else(|| format!("Bookmark '{}' not found", bookmark_id))?;
    bookmark.apply_draft(&draft).map_err(|e| e.to_string())?;
    Ok(working.clone())
}

#[tauri::command]
fn remove_bookmark(bookmark_id: String, state: State<AppState>) -> Result<Vec<Bookmark>, String> {
    let mut working = state.working.write().expect("working write lock");
    let before = working.len();
    working.retain(|b| b.id != bookmark_id);
    if working.len() == before {
        return Err(format!("Bookmark '{}' not found", bookmark_id));
    }
    Ok(working.clone())
}

// Attach a custom icon to a bookmark. Accepts a complete image data URL
// or bare base64 PNG bytes; the icon joins the session icon set under a
// fresh id.
#[tauri::command]
fn set_bookmark_icon(
    bookmark_id: String,
    icon_data: String,
    state: State<AppState>,
) -> Result<Vec<Bookmark>, String> {
    let data_url = icons::create_icon_data_url(&icon_data).map_err(|e| e.to_string())?;
    if !icons::validate_icon(&data_url) {
        return Err("Icon must be a base64 image data URL".to_string());
    }

    let icon_id = {
        let mut session_icons = state.session_icons.write().expect("session icons write lock");
        match session_icons.iter().find(|i| i.base64_data == data_url) {
            Some(existing) => existing.id.clone(),
            None => {
                let id = format!("custom-icon-{}", session_icons.len() + 1);
                session_icons.push(Icon {
                    id: id.clone(),
                    base64_data: data_url,
                });
                id
            }
        }
    };

    let mut working = state.working.write().expect("working write lock");
    let bookmark = working
        .iter_mut()
        .find(|b| b.id == bookmark_id)
        .ok_or_else(|| format!("Bookmark '{}' not found", bookmark_id))?;
    bookmark.icon_id = Some(icon_id);
    Ok(working.clone())
}

#[tauri::command]
fn preview_collection(state: State<AppState>) -> CollectionPreview {
    let working = state.working.read().expect("working read lock");
    let (folders, ungrouped) = group_by_folder(&working);
    CollectionPreview {
        total: working.len(),
        folder_count: folders.len(),
        folders,
        ungrouped,
    }
}

// The rendered document, exactly as it would be written to disk.
#[tauri::command]
fn export_preview(state: State<AppState>) -> Result<String, String> {
    let catalog = ready_catalog(&state)?;
    let icons = all_icons(&catalog, &state);
    let working = state.working.read().expect("working read lock");
    Ok(netscape::generate_bookmark_file(&working, &icons))
}

// Default download name, or one derived from the first selected template.
#[tauri::command]
fn suggested_filename(state: State<AppState>) -> String {
    let first_selected = state
        .selection
        .read()
        .expect("selection read lock")
        .selected_ids()
        .first()
        .cloned();

    let Some(template_id) = first_selected else {
        return DEFAULT_EXPORT_FILENAME.to_string();
    };
    match &*state.catalog.read().expect("catalog read lock") {
        CatalogState::Ready(catalog) => get_template_by_id(&template_id, &catalog.templates)
            .map(|t| derive_filename(&t.name))
            .unwrap_or_else(|| DEFAULT_EXPORT_FILENAME.to_string()),
        _ => DEFAULT_EXPORT_FILENAME.to_string(),
    }
}

#[tauri::command]
fn export_bookmarks(path: String, state: State<AppState>) -> Result<ExportReceipt, String> {
    let catalog = ready_catalog(&state)?;
    let icons = all_icons(&catalog, &state);
    let working = state.working.read().expect("working read lock").clone();
    if working.is_empty() {
        return Err(export::ExportError::EmptyCollection.to_string());
    }

    let content = netscape::generate_bookmark_file(&working, &icons);
    let path = PathBuf::from(path);
    write_bookmark_file(&path, &content).map_err(|e| e.to_string())?;

    Ok(ExportReceipt {
        path: path.to_string_lossy().into_owned(),
        bytes: content.len(),
    })
}

#[tauri::command]
fn copy_export_to_clipboard(app: AppHandle, state: State<AppState>) -> Result<(), String> {
    let catalog = ready_catalog(&state)?;
    let icons = all_icons(&catalog, &state);
    let working = state.working.read().expect("working read lock");
    if working.is_empty() {
        return Err(export::ExportError::EmptyCollection.to_string());
    }
    let content = netscape::generate_bookmark_file(&working, &icons);
    drop(working);
    app.clipboard().write_text(content).map_err(|e| e.to_string())
}

// Parse an existing bookmark file and append its records to the working
// collection. Synthesized icons join the session icon set so a later
// export embeds the same bytes.
#[tauri::command]
fn import_bookmark_file(content: String, state: State<AppState>) -> Result<ImportReport, String> {
    let decoded = netscape::parse_bookmark_file(&content).map_err(|e| e.to_string())?;

    for reason in &decoded.skipped {
        eprintln!("Warning: import skipped entry: {}", reason);
    }

    let imported = decoded.bookmarks.len();
    {
        let mut session_icons = state.session_icons.write().expect("session icons write lock");
        for icon in decoded.icons {
            if !session_icons.iter().any(|i| i.base64_data == icon.base64_data) {
                session_icons.push(icon);
            }
        }
    }
    {
        let mut working = state.working.write().expect("working write lock");
        working.extend(decoded.bookmarks);
    }

    Ok(ImportReport {
        imported,
        skipped: decoded.skipped,
    })
}

#[tauri::command]
fn reveal_exported_file(app: AppHandle, path: String) -> Result<(), String> {
    app.opener()
        .reveal_item_in_dir(PathBuf::from(path))
        .map_err(|e| e.to_string())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_clipboard_manager::init())
        .setup(|app| {
            app.manage(AppState::default());

            // One-shot catalog load; commands observe Loading until it
            // resolves.
            let handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                let loaded = load_catalog(&handle).await;
                let state = handle.state::<AppState>();
                let mut catalog = state.catalog.write().expect("catalog write lock");
                *catalog = match loaded {
                    Ok(c) => CatalogState::Ready(c),
                    Err(e) => {
                        eprintln!("Warning: failed to load bookmark catalogs: {}", e);
                        CatalogState::Failed(e.to_string())
                    }
                };
            });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            catalog_status,
            list_templates,
            get_template,
            selected_template_ids,
            set_template_selected,
            working_collection,
            add_bookmark,
            update_bookmark,
            remove_bookmark,
            set_bookmark_icon,
            preview_collection,
            export_preview,
            suggested_filename,
            export_bookmarks,
            copy_export_to_clipboard,
            import_bookmark_file,
            reveal_exported_file,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
