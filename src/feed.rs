// 🌐 Feed Client - Speiseplan API
//
// POSTs a date range to the meal plan API and hands back raw MenuEntry
// records. Nothing here parses menu texts; that is the core's job.

use crate::collection::in_feed_order;
use crate::config::FeedConfig;
use crate::menu::MenuEntry;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, REFERER};
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub const FEED_COMMAND: &str = "speiseplan/mandantAPI_1_5";
pub const FEED_CLIENT: &str = "web";

/// Date format of the feed (request parameters and day keys)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct FeedRequest {
    pub command: &'static str,
    pub client: &'static str,
    pub parameter: FeedParameter,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedParameter {
    pub mandant_id: String,
    pub speiseplan_nr: String,
    pub von: String,
    pub bis: String,
}

impl FeedRequest {
    pub fn new(config: &FeedConfig, von: NaiveDate, bis: NaiveDate) -> Self {
        FeedRequest {
            command: FEED_COMMAND,
            client: FEED_CLIENT,
            parameter: FeedParameter {
                mandant_id: config.mandant_id.clone(),
                speiseplan_nr: config.speiseplan_nr.clone(),
                von: format_date(von),
                bis: format_date(bis),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub code: i64,

    pub content: FeedContent,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedContent {
    /// Days keyed by "YYYY-MM-DD"
    #[serde(default, deserialize_with = "map_or_empty")]
    pub speiseplan_tage: BTreeMap<String, SpeiseplanTag>,

    /// Order deadline notices
    #[serde(default, deserialize_with = "seq_or_empty")]
    pub bestellschluss_msg: Vec<BestellMsg>,

    #[serde(default)]
    pub splan_pdfs: serde_json::Value,
}

/// One day of the meal plan
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeiseplanTag {
    #[serde(default)]
    pub datum: String,

    /// Menus keyed by menu number, in the order the feed wrote them
    #[serde(default, deserialize_with = "keyed_menues")]
    pub tages_menues: Vec<(String, MenuEntry)>,

    /// Public holiday
    #[serde(default)]
    pub feiertag: bool,
}

impl SpeiseplanTag {
    /// Menus in feed order (see `in_feed_order`)
    pub fn menues(&self) -> Vec<MenuEntry> {
        in_feed_order(&self.tages_menues).into_iter().cloned().collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BestellMsg {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub params: Vec<serde_json::Value>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub typ: String,
}

/// `null` and `[]` (empty object serialized as a list) read as an empty object
fn object_or_empty<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<serde_json::Map<String, serde_json::Value>, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(serde_json::Map::new()),
        serde_json::Value::Array(items) if items.is_empty() => Ok(serde_json::Map::new()),
        serde_json::Value::Object(object) => Ok(object),
        other => Err(D::Error::custom(format!("expected an object, got {}", other))),
    }
}

fn map_or_empty<'de, D, V>(deserializer: D) -> std::result::Result<BTreeMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: DeserializeOwned,
{
    let object = object_or_empty(deserializer)?;
    serde_json::from_value(serde_json::Value::Object(object)).map_err(D::Error::custom)
}

/// A day's menus in document order (`preserve_order`). A record that is not
/// an object is logged and skipped; the rest of the day still loads.
fn keyed_menues<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<(String, MenuEntry)>, D::Error> {
    let object = object_or_empty(deserializer)?;

    Ok(object
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<MenuEntry>(value) {
            Ok(entry) => Some((key, entry)),
            Err(e) => {
                warn!(menu = %key, "Skipping unreadable menu record: {}", e);
                None
            }
        })
        .collect())
}

fn seq_or_empty<'de, D, V>(deserializer: D) -> std::result::Result<Vec<V>, D::Error>
where
    D: Deserializer<'de>,
    V: DeserializeOwned,
{
    match Option::<Vec<V>>::deserialize(deserializer)? {
        Some(items) => Ok(items),
        None => Ok(Vec::new()),
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {}", raw))
}

/// The feed's notion of "today" (UTC calendar date)
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parse a raw response body
pub fn parse_response(body: &str) -> Result<FeedResponse> {
    serde_json::from_str(body).context("Unexpected response shape from Speiseplan API")
}

// ============================================================================
// MENU SOURCE
// ============================================================================

/// Anything that can deliver the days of a meal plan
#[async_trait]
pub trait MenuSource: Send + Sync {
    /// All days between `von` and `bis` (inclusive), keyed by date
    async fn fetch_days(&self, von: NaiveDate, bis: NaiveDate) -> Result<BTreeMap<String, SpeiseplanTag>>;

    /// The menus of a single day; a day missing from the plan has no menus
    async fn menues_for(&self, datum: NaiveDate) -> Result<Vec<MenuEntry>> {
        let days = self.fetch_days(datum, datum).await?;
        Ok(days
            .get(&format_date(datum))
            .map(SpeiseplanTag::menues)
            .unwrap_or_default())
    }

    /// The menus of the feed's current day (UTC)
    async fn menues_for_today(&self) -> Result<Vec<MenuEntry>> {
        self.menues_for(today()).await
    }
}

// ============================================================================
// HTTP CLIENT
// ============================================================================

pub struct FeedClient {
    config: FeedConfig,
    http: reqwest::Client,
}

impl FeedClient {
    pub fn new(config: FeedConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers(&config)?)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(FeedClient { config, http })
    }
}

/// Headers the API expects from its browser client
fn default_headers(config: &FeedConfig) -> Result<HeaderMap> {
    let referrer = HeaderValue::from_str(&config.referrer_url)
        .with_context(|| format!("Invalid referrer URL: {}", config.referrer_url))?;

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/javascript, */*"));
    headers.insert(REFERER, referrer.clone());
    headers.insert(HeaderName::from_static("referrer"), referrer);
    headers.insert(HeaderName::from_static("sec-fetch-dest"), HeaderValue::from_static("empty"));
    headers.insert(HeaderName::from_static("sec-fetch-mode"), HeaderValue::from_static("cors"));
    headers.insert(HeaderName::from_static("sec-fetch-site"), HeaderValue::from_static("cross-site"));
    Ok(headers)
}

#[async_trait]
impl MenuSource for FeedClient {
    async fn fetch_days(&self, von: NaiveDate, bis: NaiveDate) -> Result<BTreeMap<String, SpeiseplanTag>> {
        let request = FeedRequest::new(&self.config, von, bis);
        debug!(url = %self.config.request_url, von = %request.parameter.von, bis = %request.parameter.bis, "requesting meal plan");

        let response = self
            .http
            .post(&self.config.request_url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.config.request_url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Failed to fetch data: {}", status);
        }

        let body = response.text().await.context("Failed to read response body")?;
        let parsed = parse_response(&body)?;

        info!(code = parsed.code, days = parsed.content.speiseplan_tage.len(), "meal plan received");
        Ok(parsed.content.speiseplan_tage)
    }
}

// ============================================================================
// TESTS
// ============================================================================
