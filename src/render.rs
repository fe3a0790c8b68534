// 🖼️ Renderer - filtered HTML view of a day's menus
//
// Owns the presentation policy: which processed entries are shown and what
// the page says when there is nothing to show or the feed failed.

use crate::collection::process_and_sort;
use crate::config::AppConfig;
use crate::feed::{today, MenuSource};
use crate::menu::{MenuEntry, ProcessedMenuEntry};
use crate::parser::BR_OUTPUT;
use anyhow::Result;
use chrono::NaiveDate;
use html_escape::encode_text;
use std::fmt::Write;
use tracing::{error, info};

pub const NO_MENUES_TEXT: &str = "Keine Menüs verfügbar.";
pub const LOAD_ERROR_TEXT: &str = "Fehler beim Laden der Menüs.";

// ============================================================================
// FILTER POLICY
// ============================================================================

/// Decides whether a processed entry is shown
pub trait MenuFilter {
    fn admits(&self, entry: &ProcessedMenuEntry) -> bool;
}

/// Show everything
pub struct AdmitAll;

impl MenuFilter for AdmitAll {
    fn admits(&self, _entry: &ProcessedMenuEntry) -> bool {
        true
    }
}

/// Hide locked menus and menus whose name mentions an excluded keyword
/// (default: "milch", "allergie" - the milk-free / allergy-diet variants)
#[derive(Debug, Clone, PartialEq)]
pub struct ExclusionPolicy {
    pub skip_locked: bool,

    /// Lower-case substrings matched against the lower-cased `bezeichnung`
    pub excluded_keywords: Vec<String>,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        ExclusionPolicy::from_config(&AppConfig::default())
    }
}

impl ExclusionPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        ExclusionPolicy {
            skip_locked: !config.show_locked,
            excluded_keywords: config.excluded_keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// First excluded keyword contained in the name, if any
    pub fn matched_keyword(&self, bezeichnung: &str) -> Option<&str> {
        let name = bezeichnung.to_lowercase();
        self.excluded_keywords
            .iter()
            .find(|keyword| name.contains(keyword.as_str()))
            .map(String::as_str)
    }
}

impl MenuFilter for ExclusionPolicy {
    fn admits(&self, entry: &ProcessedMenuEntry) -> bool {
        if self.skip_locked && entry.is_locked() {
            return false;
        }
        self.matched_keyword(entry.bezeichnung()).is_none()
    }
}

// ============================================================================
// VIEW STATE
// ============================================================================

/// What the page shows: processed menus, or the fallback after a feed failure
#[derive(Debug, Clone, PartialEq)]
pub enum MenuView {
    Ready(Vec<ProcessedMenuEntry>),
    Failed,
}

impl MenuView {
    /// Entries admitted by the filter (empty when the load failed)
    pub fn visible<'a>(&'a self, filter: &dyn MenuFilter) -> Vec<&'a ProcessedMenuEntry> {
        match self {
            MenuView::Ready(entries) => entries.iter().filter(|e| filter.admits(e)).collect(),
            MenuView::Failed => Vec::new(),
        }
    }
}

/// Fetch, process and sort one day. Feed errors end here and become `Failed`.
pub async fn load_view(source: &dyn MenuSource, datum: NaiveDate) -> MenuView {
    settle(datum, source.menues_for(datum).await)
}

/// `load_view` for the feed's current day
pub async fn load_today_view(source: &dyn MenuSource) -> MenuView {
    settle(today(), source.menues_for_today().await)
}

fn settle(datum: NaiveDate, loaded: Result<Vec<MenuEntry>>) -> MenuView {
    match loaded {
        Ok(entries) => {
            info!(%datum, count = entries.len(), "menus loaded");
            MenuView::Ready(process_and_sort(&entries))
        }
        Err(e) => {
            error!(%datum, "Error displaying menus: {:#}", e);
            MenuView::Failed
        }
    }
}

// ============================================================================
// HTML
// ============================================================================

/// One `menue-item` block per visible entry, or the matching fallback message
pub fn render_menues(view: &MenuView, filter: &dyn MenuFilter) -> String {
    if *view == MenuView::Failed {
        return notice_html(LOAD_ERROR_TEXT);
    }

    let mut html = String::new();
    for entry in view.visible(filter) {
        // writing into a String cannot fail
        let _ = write!(
            html,
            "<div class=\"menue-item\">\n    <h2>{}</h2>\n    <p>{}</p>\n</div>\n",
            encode_text(entry.bezeichnung()),
            escape_keeping_breaks(&entry.processed.menue_text_with_br),
        );
    }

    if html.trim().is_empty() {
        return notice_html(NO_MENUES_TEXT);
    }
    html
}

/// A plain message as a fragment, e.g. `<div>Keine Menüs verfügbar.</div>`
pub fn notice_html(text: &str) -> String {
    format!("<div>{}</div>", encode_text(text))
}

/// Escape menu text but keep the `<br/>` markers the parser inserted
fn escape_keeping_breaks(text: &str) -> String {
    text.split(BR_OUTPUT)
        .map(|line| encode_text(line).into_owned())
        .collect::<Vec<_>>()
        .join(BR_OUTPUT)
}

/// Wrap a fragment in a standalone page
pub fn render_page(title: &str, fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"de\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<h1>{}</h1>\n<div id=\"menues-container\">\n{}</div>\n</body>\n</html>\n",
        encode_text(title),
        encode_text(title),
        fragment
    )
}

/// Page title for a day, e.g. "Speiseplan 11.03.2024"
pub fn page_title(datum: NaiveDate) -> String {
    format!("Speiseplan {}", datum.format("%d.%m.%Y"))
}

// ============================================================================
// TESTS
// ============================================================================
