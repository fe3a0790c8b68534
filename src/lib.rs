// Speiseplan - Core Library
// Exposes the menu parsing core plus feed client and renderer for the CLI, TUI and server

pub mod reference;      // Zusatzstoffe + Allergene tables
pub mod codes;          // Code group shapes, scanner, stripper
pub mod menu;           // MenuEntry / ProcessedMenuEntry
pub mod parser;         // menueText → display text + codes
pub mod collection;     // process_and_sort
pub mod config;
pub mod logging;
pub mod feed;           // Speiseplan API client
pub mod render;         // HTML view + exclusion policy

// Re-export commonly used types
pub use reference::{
    additive_description, allergen_description, ReferenceTables, ALLERGENE, ZUSATZSTOFFE,
};
pub use codes::CodeShape;
pub use menu::{MenuAnnex, MenuEntry, ProcessedMenuEntry};
pub use parser::{annex_for, clean_lines, process, BR_MARKER, BR_OUTPUT};
pub use collection::{in_feed_order, process_and_sort};
pub use config::{AppConfig, FeedConfig};
pub use logging::LoggingConfig;
pub use feed::{FeedClient, MenuSource, SpeiseplanTag};
pub use render::{
    load_today_view, load_view, notice_html, page_title, render_menues, render_page, AdmitAll,
    ExclusionPolicy, MenuFilter, MenuView, LOAD_ERROR_TEXT, NO_MENUES_TEXT,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
