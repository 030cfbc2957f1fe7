//! `pots serve`: the JSON API over HTTP.

mod areas;
mod error;
mod plant_types;
mod plants;
mod plots;

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, put};
use axum::{Json, Router};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;

use crate::config::ServerConfig;

pub use error::AppError;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(pool: PgPool, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/areas", get(areas::list).post(areas::create))
        .route("/api/areas/{id}", get(areas::get_one))
        .route("/api/plots", get(plots::list).post(plots::create))
        .route(
            "/api/plots/{id}",
            get(plots::get_one).put(plots::update).delete(plots::delete),
        )
        .route("/api/plots/area/{area_id}", get(plots::list_for_area))
        .route("/api/plants", get(plants::list).post(plants::create))
        .route(
            "/api/plants/{id}",
            get(plants::get_one).put(plants::update).delete(plants::delete),
        )
        .route("/api/plants/{id}/move", put(plants::move_plant))
        .route("/api/plants/area/{area_id}", get(plants::list_for_area))
        .route(
            "/api/plants/area/{area_id}/free-standing",
            get(plants::list_free_standing),
        )
        .route("/api/plants/plot/{plot_id}", get(plants::list_for_plot))
        .route(
            "/api/plant-types",
            get(plant_types::list).post(plant_types::create),
        )
        .route("/api/plant-types/{id}", get(plant_types::get_one))
        .layer(cors)
        .with_state(pool)
}

/// CORS policy admitting a single browser origin.
pub fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("invalid CORS origin {origin:?}"))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(pool: PgPool, server: &ServerConfig) -> Result<()> {
    let app = build_router(pool, cors_layer(&server.cors_origin)?);
    let ip: IpAddr = server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {:?}", server.bind))?;
    let addr = SocketAddr::new(ip, server.port);
    tracing::info!(cors_origin = %server.cors_origin, "pots serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("pots serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test_http {
    use axum::body::Body;
    use axum::http::{Method, Request, header};
    use sqlx::PgPool;
    use tower::ServiceExt;

    use crate::config::DEFAULT_CORS_ORIGIN;

    pub async fn send_request(
        pool: PgPool,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> axum::response::Response {
        let app = super::build_router(pool, super::cors_layer(DEFAULT_CORS_ORIGIN).unwrap());
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.oneshot(request).await.unwrap()
    }

    pub async fn get(pool: PgPool, uri: &str) -> axum::response::Response {
        send_request(pool, Method::GET, uri, None).await
    }

    pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::json;
    use tower::ServiceExt;

    use pots_test_utils::{create_test_db, drop_test_db};

    use super::test_http::{body_json, get, send_request};

    #[test]
    fn cors_layer_rejects_garbage_origin() {
        assert!(super::cors_layer("http://localhost:3000").is_ok());
        assert!(super::cors_layer("bad\norigin").is_err());
    }

    #[tokio::test]
    async fn test_health() {
        let (pool, db_name) = create_test_db().await;

        let resp = get(pool.clone(), "/health").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({ "status": "ok" }));

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_configured_origin() {
        let (pool, db_name) = create_test_db().await;

        let cors = super::cors_layer("http://localhost:3000").unwrap();
        let app = super::build_router(pool.clone(), cors);
        let resp = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/plants")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:3000")
        );

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_end_to_end_placement_walkthrough() {
        let (pool, db_name) = create_test_db().await;

        let area = body_json(
            send_request(
                pool.clone(),
                Method::POST,
                "/api/areas",
                Some(json!({
                    "name": "A",
                    "locationType": "outdoor",
                    "brightness": "high"
                })),
            )
            .await,
        )
        .await;
        let area_id = area["id"].as_i64().unwrap();

        let species = body_json(
            send_request(
                pool.clone(),
                Method::POST,
                "/api/plant-types",
                Some(json!({ "commonName": "Tomato", "isEdible": true })),
            )
            .await,
        )
        .await;
        let species_id = species["id"].as_i64().unwrap();

        let resp = send_request(
            pool.clone(),
            Method::POST,
            "/api/plots",
            Some(json!({
                "name": "P",
                "areaId": area_id,
                "plotType": "raised_bed",
                "width": 4,
                "length": 2
            })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let plot_id = body_json(resp).await["id"].as_i64().unwrap();

        let plant_at_origin = |name: &str| {
            json!({
                "name": name,
                "speciesId": species_id,
                "areaId": area_id,
                "plotId": plot_id,
                "positionX": 0,
                "positionY": 0
            })
        };

        let body = Some(plant_at_origin("X"));
        let resp = send_request(pool.clone(), Method::POST, "/api/plants", body).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let x = body_json(resp).await;
        let x_id = x["id"].as_i64().unwrap();
        assert_eq!(x["healthStatus"], "healthy");

        let body = Some(plant_at_origin("Y"));
        let resp = send_request(pool.clone(), Method::POST, "/api/plants", body).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err = body_json(resp).await;
        assert!(
            err["error"].as_str().unwrap().contains("already occupied"),
            "unexpected error body: {err}"
        );

        let resp = send_request(
            pool.clone(),
            Method::PUT,
            &format!("/api/plants/{x_id}/move"),
            Some(json!({ "plotId": plot_id, "positionX": 1, "positionY": 0 })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let moved = body_json(resp).await;
        assert_eq!(moved["positionX"], 1);
        assert_eq!(moved["positionY"], 0);

        let resp = send_request(
            pool.clone(),
            Method::PUT,
            &format!("/api/plants/{x_id}/move"),
            Some(json!({ "plotId": null, "positionX": 3, "positionY": 3 })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let detached = body_json(resp).await;
        assert!(detached["plotId"].is_null());
        assert!(detached["positionX"].is_null());
        assert!(detached["positionY"].is_null());

        let uri = format!("/api/plots/{plot_id}");
        let resp = send_request(pool.clone(), Method::DELETE, &uri, None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let deleted = body_json(resp).await;
        assert_eq!(deleted["success"], true);
        assert_eq!(deleted["plantsConverted"], 0);

        let all = body_json(get(pool.clone(), "/api/plants").await).await;
        assert_eq!(all.as_array().unwrap().len(), 1);

        pool.close().await;
        drop_test_db(&db_name).await;
    }
}
