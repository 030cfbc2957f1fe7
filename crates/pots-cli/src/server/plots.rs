use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use serde::Serialize;
use sqlx::PgPool;

use pots_core::lifecycle::{self, PlotRequest, PlotUpdateRequest};
use pots_db::models::Plot;
use pots_db::queries::plots as plot_db;

use super::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotDeletedResponse {
    pub success: bool,
    pub message: &'static str,
    pub plants_converted: usize,
}

pub(super) async fn list(State(pool): State<PgPool>) -> Result<Json<Vec<Plot>>, AppError> {
    Ok(Json(plot_db::list_plots(&pool).await?))
}

pub(super) async fn get_one(
    State(pool): State<PgPool>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Plot>, AppError> {
    let Path(id) = path?;
    let plot = plot_db::get_plot(&pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("plot {id} not found")))?;
    Ok(Json(plot))
}

pub(super) async fn list_for_area(
    State(pool): State<PgPool>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Plot>>, AppError> {
    let Path(area_id) = path?;
    Ok(Json(plot_db::list_plots_for_area(&pool, area_id).await?))
}

pub(super) async fn create(
    State(pool): State<PgPool>,
    body: Result<Json<PlotRequest>, JsonRejection>,
) -> Result<Json<Plot>, AppError> {
    let Json(req) = body?;
    Ok(Json(lifecycle::create_plot(&pool, &req).await?))
}

pub(super) async fn update(
    State(pool): State<PgPool>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<PlotUpdateRequest>, JsonRejection>,
) -> Result<Json<Plot>, AppError> {
    let Path(id) = path?;
    let Json(req) = body?;
    Ok(Json(lifecycle::update_plot(&pool, id, &req).await?))
}

pub(super) async fn delete(
    State(pool): State<PgPool>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<PlotDeletedResponse>, AppError> {
    let Path(id) = path?;
    let outcome = lifecycle::delete_plot(&pool, id).await?;
    Ok(Json(PlotDeletedResponse {
        success: true,
        message: "Plot deleted successfully",
        plants_converted: outcome.plants_converted,
    }))
}
