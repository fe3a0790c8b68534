// ⚙️ Configuration - explicit settings instead of page query parameters
//
// Everything the feed client, the renderer and the server need is read once
// at startup and passed down. Lookups go through a closure so tests never
// have to touch the process environment.

use std::time::Duration;
use tracing::warn;

pub const DEFAULT_REQUEST_URL: &str = "https://api-url.de/public";
pub const DEFAULT_REFERRER_URL: &str = "https://needed-referrer-url.de/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_EXCLUDED_KEYWORDS: &[&str] = &["milch", "allergie"];

// ============================================================================
// FEED CONFIG
// ============================================================================

/// Settings for the remote Speiseplan API
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    /// Endpoint receiving the POST request
    pub request_url: String,

    /// Sent as referrer; the API rejects requests without it
    pub referrer_url: String,

    /// Tenant the meal plan belongs to
    pub mandant_id: String,

    /// Meal plan number within the tenant
    pub speiseplan_nr: String,

    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            request_url: DEFAULT_REQUEST_URL.to_string(),
            referrer_url: DEFAULT_REFERRER_URL.to_string(),
            mandant_id: String::new(),
            speiseplan_nr: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

// ============================================================================
// APP CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub feed: FeedConfig,

    /// Address the web server binds to
    pub bind_addr: String,

    /// Lower-case substrings of `bezeichnung` that hide a menu
    pub excluded_keywords: Vec<String>,

    /// Show menus flagged `gesperrt`
    pub show_locked: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            feed: FeedConfig::default(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            excluded_keywords: DEFAULT_EXCLUDED_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            show_locked: false,
        }
    }
}

impl AppConfig {
    /// Read the configuration from `SPEISEPLAN_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key → value source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout = match get("SPEISEPLAN_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(value = %raw, "invalid SPEISEPLAN_TIMEOUT_SECS, using default");
                    defaults.feed.timeout
                }
            },
            None => defaults.feed.timeout,
        };

        let excluded_keywords = match lookup("SPEISEPLAN_EXCLUDE") {
            Some(raw) => parse_keywords(&raw),
            None => defaults.excluded_keywords,
        };

        AppConfig {
            feed: FeedConfig {
                request_url: get("SPEISEPLAN_REQUEST_URL").unwrap_or(defaults.feed.request_url),
                referrer_url: get("SPEISEPLAN_REFERRER_URL").unwrap_or(defaults.feed.referrer_url),
                mandant_id: lookup("SPEISEPLAN_MANDANT_ID").unwrap_or_default(),
                speiseplan_nr: lookup("SPEISEPLAN_NR").unwrap_or_default(),
                timeout,
            },
            bind_addr: get("SPEISEPLAN_BIND_ADDR").unwrap_or(defaults.bind_addr),
            excluded_keywords,
            show_locked: get("SPEISEPLAN_SHOW_LOCKED")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}

/// "Milch, Allergie,," → ["milch", "allergie"]
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
