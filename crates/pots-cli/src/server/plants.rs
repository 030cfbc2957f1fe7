use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use serde::Serialize;
use sqlx::PgPool;

use pots_core::placement::MoveRequest;
use pots_core::plants::{self as plant_service, NewPlantRequest, PlantUpdate};
use pots_db::models::Plant;
use pots_db::queries::plants as plant_db;

use super::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantDeletedResponse {
    pub success: bool,
    pub plant_id: i64,
}

pub(super) async fn list(State(pool): State<PgPool>) -> Result<Json<Vec<Plant>>, AppError> {
    Ok(Json(plant_db::list_plants(&pool).await?))
}

/// `null` when the plant does not exist.
pub(super) async fn get_one(
    State(pool): State<PgPool>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Option<Plant>>, AppError> {
    let Path(id) = path?;
    Ok(Json(plant_db::get_plant(&pool, id).await?))
}

pub(super) async fn list_for_area(
    State(pool): State<PgPool>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Plant>>, AppError> {
    let Path(area_id) = path?;
    Ok(Json(plant_db::list_plants_for_area(&pool, area_id).await?))
}

pub(super) async fn list_free_standing(
    State(pool): State<PgPool>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Plant>>, AppError> {
    let Path(area_id) = path?;
    Ok(Json(
        plant_db::list_free_standing_plants_for_area(&pool, area_id).await?,
    ))
}

pub(super) async fn list_for_plot(
    State(pool): State<PgPool>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Plant>>, AppError> {
    let Path(plot_id) = path?;
    Ok(Json(plant_db::list_plants_for_plot(&pool, plot_id).await?))
}

pub(super) async fn create(
    State(pool): State<PgPool>,
    body: Result<Json<NewPlantRequest>, JsonRejection>,
) -> Result<Json<Plant>, AppError> {
    let Json(req) = body?;
    Ok(Json(plant_service::create_plant(&pool, &req).await?))
}

pub(super) async fn update(
    State(pool): State<PgPool>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<PlantUpdate>, JsonRejection>,
) -> Result<Json<Plant>, AppError> {
    let Path(id) = path?;
    let Json(update) = body?;
    Ok(Json(plant_service::update_plant(&pool, id, &update).await?))
}

pub(super) async fn move_plant(
    State(pool): State<PgPool>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<Plant>, AppError> {
    let Path(id) = path?;
    let Json(changes) = body?;
    Ok(Json(plant_service::move_plant(&pool, id, &changes).await?))
}

pub(super) async fn delete(
    State(pool): State<PgPool>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<PlantDeletedResponse>, AppError> {
    let Path(id) = path?;
    plant_service::delete_plant(&pool, id).await?;
    Ok(Json(PlantDeletedResponse {
        success: true,
        plant_id: id,
    }))
}
