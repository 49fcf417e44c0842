//! Netscape Bookmark File Format codec.
//!
//! The legacy HTML-based export/import format understood by every major
//! browser: a `<DL>` list of `<DT>` entries, folders as `<H3>` headings
//! with a nested list, bookmarks as `<A>` anchors with `HREF`, `ADD_DATE`
//! and an optional inline `ICON` data URI.

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use thiserror::Error;

use crate::bookmarks::{generate_bookmark_id, group_by_folder, normalize_folder, Bookmark};
use crate::icons::{get_icon_by_id, validate_icon, Icon};

// Name of the synthetic root folder every export is wrapped in. Flagged
// as the personal-toolbar folder so browsers import straight into the
// favorites bar.
pub const ROOT_FOLDER_NAME: &str = "Microsoft 365 Bookmarks";

// --- Encoding ---

/// Serialize the collection stamped with the current time.
pub fn generate_bookmark_file(bookmarks: &[Bookmark], icons: &[Icon]) -> String {
    render_bookmark_file(bookmarks, icons, chrono::Utc::now().timestamp())
}

/// Serialize the collection into a Netscape bookmark document.
///
/// `captured_at` (Unix seconds) is reused for every ADD_DATE and
/// LAST_MODIFIED in the document: one capture-time stamp, not per-entry
/// times. Import tooling accepts either and the single stamp keeps the
/// output reproducible.
pub fn render_bookmark_file(bookmarks: &[Bookmark], icons: &[Icon], captured_at: i64) -> String {
    let (folders, ungrouped) = group_by_folder(bookmarks);

    let mut html = String::new();
    html.push_str("<!DOCTYPE NETSCAPE-Bookmark-file-1>\n");
    html.push_str("<!-- This is an automatically generated file.\n");
    html.push_str("     It will be read and overwritten.\n");
    html.push_str("     DO NOT EDIT! -->\n");
    html.push_str("<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">\n");
    html.push_str("<TITLE>Bookmarks</TITLE>\n");
    html.push_str("<H1>Bookmarks</H1>\n");
    html.push_str("<DL><p>\n");
    html.push_str(&format!(
        "    <DT><H3 ADD_DATE=\"{ts}\" LAST_MODIFIED=\"{ts}\" PERSONAL_TOOLBAR_FOLDER=\"true\">{name}</H3>\n",
        ts = captured_at,
        name = escape_text(ROOT_FOLDER_NAME),
    ));
    html.push_str("    <DL><p>\n");

    for folder in &folders {
        html.push_str(&format!(
            "        <DT><H3 ADD_DATE=\"{ts}\" LAST_MODIFIED=\"{ts}\">{name}</H3>\n",
            ts = captured_at,
            name = escape_text(&folder.name),
        ));
        html.push_str("        <DL><p>\n");
        for bookmark in &folder.bookmarks {
            html.push_str(&anchor_line(bookmark, icons, captured_at, "            "));
        }
        html.push_str("        </DL><p>\n");
    }

    // Ungrouped bookmarks go flat under the root folder, after the named
    // folders, with no heading of their own.
    for bookmark in &ungrouped {
        html.push_str(&anchor_line(bookmark, icons, captured_at, "        "));
    }

    html.push_str("    </DL><p>\n");
    html.push_str("</DL><p>");

    html
}

fn anchor_line(bookmark: &Bookmark, icons: &[Icon], captured_at: i64, indent: &str) -> String {
    format!(
        "{indent}<DT><A HREF=\"{href}\"{icon} ADD_DATE=\"{ts}\">{name}</A>\n",
        indent = indent,
        href = escape_attr(&bookmark.url),
        icon = icon_attribute(bookmark, icons),
        ts = captured_at,
        name = escape_text(&bookmark.name),
    )
}

// The ICON attribute is emitted only when the reference resolves to a
// shape-valid icon. A dangling or invalid reference degrades to no icon,
// never to an empty attribute.
fn icon_attribute(bookmark: &Bookmark, icons: &[Icon]) -> String {
    let Some(icon_id) = bookmark.icon_id.as_deref() else {
        return String::new();
    };
    match get_icon_by_id(icon_id, icons) {
        Some(icon) if validate_icon(&icon.base64_data) => {
            format!(" ICON=\"{}\"", escape_attr(&icon.base64_data))
        }
        _ => String::new(),
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

// --- Decoding ---

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("document contains no bookmark list (<DL>)")]
    MissingRootList,
}

/// The decoder's output: reconstructed records, the icons synthesized
/// from inline ICON attributes, and one diagnostic per skipped anchor.
#[derive(Debug, Default, Serialize)]
pub struct DecodedBookmarks {
    pub bookmarks: Vec<Bookmark>,
    pub icons: Vec<Icon>,
    pub skipped: Vec<String>,
}

impl DecodedBookmarks {
    // One synthesized icon per distinct payload; anchors sharing bytes
    // share the icon.
    fn intern_icon(&mut self, base64_data: &str) -> String {
        if let Some(existing) = self.icons.iter().find(|i| i.base64_data == base64_data) {
            return existing.id.clone();
        }
        let id = format!("imported-icon-{}", self.icons.len() + 1);
        self.icons.push(Icon {
            id: id.clone(),
            base64_data: base64_data.to_string(),
        });
        id
    }
}

/// Parse a Netscape bookmark document back into records.
///
/// Headings open a folder scope for every anchor until their list
/// closes; anchors outside any named scope are ungrouped. The synthetic
/// personal-toolbar root heading introduces no scope. Individual
/// malformed anchors are skipped with a recorded reason rather than
/// failing the parse.
pub fn parse_bookmark_file(html: &str) -> Result<DecodedBookmarks, ParseError> {
    let document = Html::parse_document(html);
    let dl = Selector::parse("dl").unwrap();
    let root = document
        .select(&dl)
        .next()
        .ok_or(ParseError::MissingRootList)?;

    let mut decoded = DecodedBookmarks::default();
    walk_list(root, None, &mut decoded);
    Ok(decoded)
}

fn walk_list(list: ElementRef, folder: Option<&str>, out: &mut DecodedBookmarks) {
    for child in list.children() {
        let Some(element) = ElementRef::wrap(child) else {
            continue;
        };
        match element.value().name() {
            "dt" => walk_entry(element, folder, out),
            // Tolerate lists nested without a <DT> wrapper.
            "dl" => walk_list(element, folder, out),
            _ => {}
        }
    }
}

// A <DT> entry is either a folder (an <H3> followed by its nested list)
// or a single bookmark anchor. The HTML parser places the nested <DL>
// inside the same <DT> as its heading.
fn walk_entry(entry: ElementRef, folder: Option<&str>, out: &mut DecodedBookmarks) {
    let mut scope: Option<String> = folder.map(str::to_string);

    for child in entry.children() {
        let Some(element) = ElementRef::wrap(child) else {
            continue;
        };
        match element.value().name() {
            "h3" => {
                // The personal-toolbar root heading is structural, not a
                // folder label.
                if element.value().attr("personal_toolbar_folder").is_some() {
                    continue;
                }
                let name = collapse_whitespace(&element.text().collect::<String>());
                if !name.is_empty() {
                    scope = Some(name);
                }
            }
            "a" => collect_anchor(element, scope.as_deref(), out),
            "dl" => walk_list(element, scope.as_deref(), out),
            _ => {}
        }
    }
}

fn collect_anchor(anchor: ElementRef, folder: Option<&str>, out: &mut DecodedBookmarks) {
    let name = collapse_whitespace(&anchor.text().collect::<String>());

    let Some(href) = anchor.value().attr("href") else {
        out.skipped
            .push(format!("anchor '{}' is missing an HREF attribute", name));
        return;
    };

    let icon_id = anchor
        .value()
        .attr("icon")
        .filter(|data| validate_icon(data))
        .map(|data| out.intern_icon(data));

    out.bookmarks.push(Bookmark {
        id: generate_bookmark_id(),
        name,
        url: href.to_string(),
        folder: normalize_folder(folder),
        icon_id,
    });
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
