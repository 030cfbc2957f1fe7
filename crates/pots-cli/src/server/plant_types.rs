use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use sqlx::PgPool;

use pots_core::catalog::{self, NewPlantTypeRequest};
use pots_db::models::PlantType;
use pots_db::queries::plant_types as plant_type_db;

use super::AppError;

pub(super) async fn list(State(pool): State<PgPool>) -> Result<Json<Vec<PlantType>>, AppError> {
    Ok(Json(plant_type_db::list_plant_types(&pool).await?))
}

pub(super) async fn get_one(
    State(pool): State<PgPool>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Option<PlantType>>, AppError> {
    let Path(id) = path?;
    Ok(Json(plant_type_db::get_plant_type(&pool, id).await?))
}

pub(super) async fn create(
    State(pool): State<PgPool>,
    body: Result<Json<NewPlantTypeRequest>, JsonRejection>,
) -> Result<Json<PlantType>, AppError> {
    let Json(req) = body?;
    Ok(Json(catalog::create_plant_type(&pool, &req).await?))
}
