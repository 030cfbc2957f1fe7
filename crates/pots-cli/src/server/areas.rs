use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use sqlx::PgPool;

use pots_core::catalog::{self, NewAreaRequest};
use pots_db::models::Area;
use pots_db::queries::areas as area_db;

use super::AppError;

pub(super) async fn list(State(pool): State<PgPool>) -> Result<Json<Vec<Area>>, AppError> {
    Ok(Json(area_db::list_areas(&pool).await?))
}

/// `null` when the area does not exist.
pub(super) async fn get_one(
    State(pool): State<PgPool>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Option<Area>>, AppError> {
    let Path(id) = path?;
    Ok(Json(area_db::get_area(&pool, id).await?))
}

pub(super) async fn create(
    State(pool): State<PgPool>,
    body: Result<Json<NewAreaRequest>, JsonRejection>,
) -> Result<Json<Area>, AppError> {
    let Json(req) = body?;
    Ok(Json(catalog::create_area(&pool, &req).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use pots_test_utils::{create_test_db, drop_test_db, fixtures};

    use crate::server::test_http::{body_json, get, send_request};

    #[tokio::test]
    async fn test_list_and_get_areas() {
        let (pool, db_name) = create_test_db().await;

        let resp = get(pool.clone(), "/api/areas").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!([]));

        let area = fixtures::area(&pool, "Front Garden").await;

        let json = body_json(get(pool.clone(), "/api/areas").await).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["name"], "Front Garden");
        assert_eq!(json[0]["locationType"], "outdoor");

        let resp = get(pool.clone(), &format!("/api/areas/{}", area.id)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["id"], area.id);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_missing_area_is_null() {
        let (pool, db_name) = create_test_db().await;

        let resp = get(pool.clone(), "/api/areas/4242").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_json(resp).await.is_null());

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_create_area_validation() {
        let (pool, db_name) = create_test_db().await;

        let resp = send_request(
            pool.clone(),
            Method::POST,
            "/api/areas",
            Some(json!({
                "name": "Greenhouse",
                "locationType": "outdoor",
                "isCovered": true,
                "isGreenhouse": true,
                "brightness": "high"
            })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let area = body_json(resp).await;
        assert_eq!(area["isGreenhouse"], true);

        let resp = send_request(
            pool.clone(),
            Method::POST,
            "/api/areas",
            Some(json!({ "name": "Shed", "locationType": "underground", "brightness": "low" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await["error"]
            .as_str()
            .unwrap()
            .contains("underground"));

        let resp = send_request(
            pool.clone(),
            Method::POST,
            "/api/areas",
            Some(json!({ "name": " ", "locationType": "indoor", "brightness": "low" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = send_request(
            pool.clone(),
            Method::POST,
            "/api/areas",
            Some(json!({ "locationType": "indoor" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        pool.close().await;
        drop_test_db(&db_name).await;
    }
}
