// Speiseplan - Web Server
// Serves the filtered menu page and a small JSON API with Axum

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use speiseplan::feed::{parse_date, today};
use speiseplan::{
    load_today_view, load_view, page_title, process_and_sort, render_menues, render_page,
    AppConfig, ExclusionPolicy, FeedClient, LoggingConfig, MenuSource, MenuView,
    ProcessedMenuEntry, ReferenceTables,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

/// Shared application state
#[derive(Clone)]
struct AppState {
    source: Arc<dyn MenuSource>,
    policy: Arc<ExclusionPolicy>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn failed(data: T, error: String) -> Self {
        Self {
            success: false,
            data,
            error: Some(error),
        }
    }
}

// ============================================================================
// HTML Handlers
// ============================================================================

fn render_view(state: &AppState, datum: NaiveDate, view: &MenuView) -> Html<String> {
    let fragment = render_menues(view, state.policy.as_ref());
    Html(render_page(&page_title(datum), &fragment))
}

/// GET / - Today's menus
async fn serve_today(State(state): State<AppState>) -> impl IntoResponse {
    let view = load_today_view(state.source.as_ref()).await;
    render_view(&state, today(), &view)
}

/// GET /tag/:datum - Menus of a given day (YYYY-MM-DD)
async fn serve_day(State(state): State<AppState>, Path(datum): Path<String>) -> impl IntoResponse {
    match parse_date(&datum) {
        Ok(datum) => {
            let view = load_view(state.source.as_ref(), datum).await;
            render_view(&state, datum, &view).into_response()
        }
        Err(e) => {
            warn!("Rejected day {}: {}", datum, e);
            (StatusCode::BAD_REQUEST, Html(format!("<div>{}</div>", html_escape::encode_text(&e.to_string()))))
                .into_response()
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/menues/:datum - Processed and sorted menus, unfiltered
async fn get_menues(State(state): State<AppState>, Path(datum): Path<String>) -> impl IntoResponse {
    let datum = match parse_date(&datum) {
        Ok(d) => d,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::failed(Vec::<ProcessedMenuEntry>::new(), e.to_string())),
            )
                .into_response()
        }
    };

    match state.source.menues_for(datum).await {
        Ok(entries) => (StatusCode::OK, Json(ApiResponse::ok(process_and_sort(&entries)))).into_response(),
        Err(e) => {
            error!("Error getting menus for {}: {:#}", datum, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::failed(Vec::<ProcessedMenuEntry>::new(), format!("{:#}", e))),
            )
                .into_response()
        }
    }
}

/// GET /api/referenz - Zusatzstoffe and Allergene tables
async fn get_reference() -> impl IntoResponse {
    Json(ApiResponse::ok(ReferenceTables::snapshot()))
}

fn app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/menues/:datum", get(get_menues))
        .route("/referenz", get(get_reference))
        .with_state(state.clone());

    Router::new()
        .route("/", get(serve_today))
        .route("/tag/:datum", get(serve_day))
        .with_state(state)
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    LoggingConfig::from_env().init()?;

    println!("🍽️  Speiseplan - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = AppConfig::from_env();
    let client = FeedClient::new(config.feed.clone())?;
    info!(url = %config.feed.request_url, mandant = %config.feed.mandant_id, "feed client ready");

    let state = AppState {
        source: Arc::new(client),
        policy: Arc::new(ExclusionPolicy::from_config(&config)),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", config.bind_addr))?;

    println!("\n🚀 Server running on http://{}", config.bind_addr);
    println!("   Page: /  or  /tag/YYYY-MM-DD");
    println!("   API:  /api/menues/YYYY-MM-DD");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app(state))
        .await
        .context("Failed to start server")?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use speiseplan::feed::format_date;
    use speiseplan::{MenuEntry, SpeiseplanTag};
    use std::collections::BTreeMap;
    use tower::ServiceExt;

    struct FakeSource {
        fail: bool,
    }

    #[async_trait]
    impl MenuSource for FakeSource {
        async fn fetch_days(&self, von: NaiveDate, _bis: NaiveDate) -> Result<BTreeMap<String, SpeiseplanTag>> {
            if self.fail {
                return Err(anyhow!("Failed to fetch data: 500 Internal Server Error"));
            }

            let tages_menues = vec![
                ("1".to_string(), MenuEntry::new("Suppe (1)[br]Brot[br](A)", "Menü 1", 1, false)),
                ("2".to_string(), MenuEntry::new("Braten[br]Knödel", "Menü 2", 4, false)),
                ("3".to_string(), MenuEntry::new("Milchreis", "Milchfrei", 9, false)),
            ];

            let mut days = BTreeMap::new();
            days.insert(
                format_date(von),
                SpeiseplanTag { datum: format_date(von), tages_menues, feiertag: false },
            );
            Ok(days)
        }
    }

    fn test_app(fail: bool) -> Router {
        app(AppState {
            source: Arc::new(FakeSource { fail }),
            policy: Arc::new(ExclusionPolicy::default()),
        })
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_index_renders_filtered_menus() {
        let (status, body) = get_body(test_app(false), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h2>Menü 2</h2>"));
        assert!(body.contains("<p>Braten<br/>Knödel</p>"));
        assert!(body.contains("<p>Suppe<br/>Brot</p>"));
        assert!(!body.contains("Milchfrei"));
        assert!(body.find("Menü 2") < body.find("Menü 1"));
        assert!(body.contains(&page_title(today())));
    }

    #[tokio::test]
    async fn test_day_page_and_bad_date() {
        let (status, body) = get_body(test_app(false), "/tag/2024-03-11").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Speiseplan 11.03.2024"));

        let (status, _) = get_body(test_app(false), "/tag/morgen").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_feed_failure_shows_fallback() {
        let (status, body) = get_body(test_app(true), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Fehler beim Laden der Menüs."));
    }

    #[tokio::test]
    async fn test_api_menues_json() {
        let (status, body) = get_body(test_app(false), "/api/menues/2024-03-11").await;
        assert_eq!(status, StatusCode::OK);

        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["success"], true);
        let data = value["data"].as_array().unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data[0]["bezeichnung"], "Milchfrei");
        assert_eq!(data[2]["processed"]["additiveCodes"], serde_json::json!(["1"]));
        assert_eq!(data[2]["processed"]["allergenDescriptions"], serde_json::json!(["Glutenhaltige Getreide"]));
    }

    #[tokio::test]
    async fn test_api_menues_feed_error() {
        let (status, body) = get_body(test_app(true), "/api/menues/2024-03-11").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["success"], false);
        assert!(value["error"].as_str().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_health_and_reference() {
        let (status, body) = get_body(test_app(false), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"OK\""));

        let (_, body) = get_body(test_app(false), "/api/referenz").await;
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["data"]["zusatzstoffe"].as_array().unwrap().len(), 15);
        assert_eq!(value["data"]["allergene"][0]["code"], "A");
    }
}
