//! Plot lifecycle: creation, resizing, and deletion.
//!
//! Deleting a plot never deletes plants. Every plant in the plot becomes
//! free-standing (no plot, no position) in the same transaction that removes
//! the plot row, so no plant is ever left pointing at a missing plot.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info};

use pots_db::models::Plot;
use pots_db::queries::plots::{self as plot_queries, NewPlot, PlotChanges};
use pots_db::queries::{areas, plants};

use crate::error::{GardenError, GardenResult, require_text};

/// Body of a plot creation request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotRequest {
    pub name: String,
    pub area_id: i64,
    pub plot_type: String,
    pub width: i32,
    pub length: i32,
    #[serde(default)]
    pub soil_type: Option<String>,
    #[serde(default)]
    pub drainage_level: Option<String>,
    #[serde(default)]
    pub ph: Option<f64>,
}

/// Body of a plot update. Replaces every editable field; the owning area
/// cannot change.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotUpdateRequest {
    pub name: String,
    pub plot_type: String,
    pub width: i32,
    pub length: i32,
    #[serde(default)]
    pub soil_type: Option<String>,
    #[serde(default)]
    pub drainage_level: Option<String>,
    #[serde(default)]
    pub ph: Option<f64>,
}

impl PlotUpdateRequest {
    fn changes(&self) -> PlotChanges<'_> {
        PlotChanges {
            name: &self.name,
            plot_type: &self.plot_type,
            width: self.width,
            length: self.length,
            soil_type: self.soil_type.as_deref(),
            drainage_level: self.drainage_level.as_deref(),
            ph: self.ph,
        }
    }
}

/// Outcome of [`delete_plot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotDeletion {
    pub plot_id: i64,
    /// Plants that were in the plot and are now free-standing.
    pub plants_converted: usize,
}

fn validate_shape(
    name: &str,
    plot_type: &str,
    width: i32,
    length: i32,
    ph: Option<f64>,
) -> GardenResult<()> {
    require_text("name", name)?;
    require_text("plotType", plot_type)?;
    if width <= 0 || length <= 0 {
        return Err(GardenError::validation(format!(
            "plot dimensions must be positive, got {width}x{length}"
        )));
    }
    if let Some(ph) = ph.filter(|ph| !(0.0..=14.0).contains(ph)) {
        return Err(GardenError::validation(format!("pH {ph} is outside 0-14")));
    }
    Ok(())
}

/// Create a plot in an existing area.
pub async fn create_plot(pool: &PgPool, req: &PlotRequest) -> GardenResult<Plot> {
    validate_shape(&req.name, &req.plot_type, req.width, req.length, req.ph)?;

    if !areas::area_exists(pool, req.area_id).await? {
        return Err(GardenError::not_found("area", req.area_id));
    }

    let plot = plot_queries::insert_plot(
        pool,
        &NewPlot {
            name: &req.name,
            area_id: req.area_id,
            plot_type: &req.plot_type,
            width: req.width,
            length: req.length,
            soil_type: req.soil_type.as_deref(),
            drainage_level: req.drainage_level.as_deref(),
            ph: req.ph,
        },
    )
    .await?;

    info!(plot_id = plot.id, area_id = plot.area_id, "plot created");
    Ok(plot)
}

/// Replace a plot's editable fields.
///
/// Shrinking the grid is refused while a plant sits outside the new bounds.
pub async fn update_plot(pool: &PgPool, id: i64, req: &PlotUpdateRequest) -> GardenResult<Plot> {
    validate_shape(&req.name, &req.plot_type, req.width, req.length, req.ph)?;

    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let current = plot_queries::get_plot_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| GardenError::not_found("plot", id))?;

    if req.width < current.width || req.length < current.length {
        let resized = Plot {
            width: req.width,
            length: req.length,
            ..current
        };
        let stranded = plants::list_plants_for_plot(&mut *tx, id)
            .await?
            .into_iter()
            .filter(|p| p.position().is_some_and(|(x, y)| !resized.contains(x, y)))
            .count();
        if stranded > 0 {
            return Err(GardenError::validation(format!(
                "resizing plot {id} to {}x{} would leave {stranded} plant(s) outside the grid",
                req.width, req.length
            )));
        }
    }

    let plot = plot_queries::update_plot(&mut *tx, id, &req.changes())
        .await?
        .ok_or_else(|| GardenError::not_found("plot", id))?;

    tx.commit().await.context("failed to commit transaction")?;

    info!(plot_id = id, "plot updated");
    Ok(plot)
}

/// Delete a plot, converting its plants to free-standing plants.
///
/// Runs as one transaction: lock the plot, detach every plant in it, delete
/// the row. A missing plot fails with [`GardenError::NotFound`] and changes
/// nothing. Any store failure rolls the whole operation back.
pub async fn delete_plot(pool: &PgPool, plot_id: i64) -> GardenResult<PlotDeletion> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let plot = plot_queries::get_plot_for_update(&mut *tx, plot_id)
        .await?
        .ok_or_else(|| GardenError::not_found("plot", plot_id))?;

    let converted = plants::detach_plants_from_plot(&mut *tx, plot_id).await?;
    for plant in &converted {
        debug!(
            plant_id = plant.id,
            plant = %plant.name,
            plot_id,
            "plant converted to free-standing"
        );
    }

    plot_queries::delete_plot(&mut *tx, plot_id).await?;

    tx.commit().await.context("failed to commit plot deletion")?;

    info!(
        plot_id,
        plot = %plot.name,
        plants_converted = converted.len(),
        "plot deleted"
    );

    Ok(PlotDeletion {
        plot_id,
        plants_converted: converted.len(),
    })
}
