use crate::observability::metrics;
use crate::storage::{EventQuery, SqliteCatalog};
use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use hyper::Server;
use serde::Deserialize;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Raw query string of `GET /api/events`; everything optional.
#[derive(Debug, Default, Deserialize)]
pub struct EventsParams {
    pub q: Option<String>,
    pub source: Option<String>,
    pub category: Option<String>,
    pub page: Option<String>,
}

impl From<&EventsParams> for EventQuery {
    fn from(p: &EventsParams) -> Self {
        EventQuery::new(
            p.q.as_deref(),
            p.source.as_deref(),
            p.category.as_deref(),
            p.page.as_deref(),
        )
    }
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "partner-events-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn prometheus_metrics() -> impl IntoResponse {
    metrics::render()
}

fn internal_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

async fn list_events(
    State(catalog): State<SqliteCatalog>,
    Query(params): Query<EventsParams>,
) -> Response {
    metrics::api_request("/api/events");
    let query = EventQuery::from(&params);

    // rusqlite is blocking; keep it off the async workers
    let result = tokio::task::spawn_blocking(move || catalog.query_events(&query)).await;
    match result {
        Ok(Ok(page)) => Json(page).into_response(),
        Ok(Err(e)) => {
            error!("Event query failed: {}", e);
            internal_error(e.to_string())
        }
        Err(e) => {
            error!("Event query task failed: {}", e);
            internal_error("query task failed".to_string())
        }
    }
}

/// Router for the read API
pub fn create_server(catalog: SqliteCatalog) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .route("/api/events", get(list_events))
        .with_state(catalog)
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(catalog: SqliteCatalog, port: u16) -> anyhow::Result<()> {
    metrics::init();
    let app = create_server(catalog);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server running on http://localhost:{port}");
    info!("Events API: http://localhost:{port}/api/events");

    Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::CatalogStore;
    use crate::types::{Source, UnifiedEvent};
    use axum::body::Body;
    use axum::http::Request;
    use tempfile::tempdir;
    use tower::ServiceExt;

    fn seeded_catalog(dir: &std::path::Path) -> SqliteCatalog {
        let catalog = SqliteCatalog::open(dir.join("catalog.db"));
        let events: Vec<UnifiedEvent> = (0..18)
            .map(|i| UnifiedEvent {
                source: if i % 2 == 0 { Source::Aws } else { Source::Nvidia },
                title: Some(format!("Session {i}")),
                description: Some(if i == 3 { "Robotics deep dive".into() } else { String::new() }),
                start_date: Some(format!("2025-01-{:02}", i + 1)),
                end_date: None,
                location: None,
                register_link: None,
                category: "Webinar".to_string(),
            })
            .collect();
        catalog.insert_if_absent(&events).unwrap();
        catalog
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn lists_first_page_by_default() {
        let dir = tempdir().unwrap();
        let app = create_server(seeded_catalog(dir.path()));

        let (status, body) = get_json(app, "/api/events").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 1);
        assert_eq!(body["total_events"], 18);
        assert_eq!(body["total_pages"], 2);
        assert_eq!(body["start_page"], 1);
        assert_eq!(body["end_page"], 2);
        assert_eq!(body["events"].as_array().unwrap().len(), 16);
        assert_eq!(body["events"][0]["title"], "Session 17");
        assert_eq!(body["filters"]["q"], "");
    }

    #[tokio::test]
    async fn filters_combine_with_and() {
        let dir = tempdir().unwrap();
        let app = create_server(seeded_catalog(dir.path()));

        let (_, body) = get_json(app.clone(), "/api/events?source=NVIDIA&page=x").await;
        assert_eq!(body["total_events"], 9);
        assert_eq!(body["page"], 1);

        let (_, body) = get_json(app.clone(), "/api/events?q=robotics&source=NVIDIA").await;
        assert_eq!(body["total_events"], 1);
        assert_eq!(body["events"][0]["title"], "Session 3");
        assert_eq!(body["filters"]["source"], "NVIDIA");

        let (_, body) = get_json(app, "/api/events?q=robotics&source=AWS").await;
        assert_eq!(body["total_events"], 0);
    }

    #[tokio::test]
    async fn out_of_range_page_is_empty_not_an_error() {
        let dir = tempdir().unwrap();
        let app = create_server(seeded_catalog(dir.path()));

        let (status, body) = get_json(app, "/api/events?page=4294967295").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 4294967295u64);
        assert_eq!(body["total_events"], 18);
        assert!(body["events"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let dir = tempdir().unwrap();
        let app = create_server(SqliteCatalog::open(dir.path().join("c.db")));
        let (status, body) = get_json(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn store_errors_become_500() {
        let dir = tempdir().unwrap();
        let app = create_server(SqliteCatalog::open(dir.path()));
        let (status, body) = get_json(app, "/api/events").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
    }
}
