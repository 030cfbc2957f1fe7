//! Plant service layer.
//!
//! Every write that can change where a plant sits goes through
//! [`crate::placement`] inside a single transaction.

use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use pots_db::models::Plant;
use pots_db::queries::plants::{self as plant_queries, NewPlant};
use pots_db::queries::{areas, plant_types};

use crate::error::{GardenError, GardenResult, require_text};
use crate::placement::{self, MoveRequest, Placement, request::present};

/// Body of a plant creation request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlantRequest {
    pub name: String,
    pub species_id: i64,
    pub area_id: i64,
    #[serde(default)]
    pub plot_id: Option<i64>,
    #[serde(default)]
    pub position_x: Option<i32>,
    #[serde(default)]
    pub position_y: Option<i32>,
    #[serde(default)]
    pub planted_date: Option<NaiveDate>,
    #[serde(default)]
    pub health_status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub watering_schedule: Option<String>,
}

/// Body of a partial plant update. Absent fields are left untouched.
///
/// A blank `name` is ignored rather than rejected. Placement fields follow
/// the same rules as [`MoveRequest`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub species_id: Option<i64>,
    #[serde(default)]
    pub health_status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub watering_schedule: Option<String>,
    #[serde(default)]
    pub planted_date: Option<NaiveDate>,
    #[serde(default)]
    pub area_id: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    pub plot_id: Option<Option<i64>>,
    #[serde(default)]
    pub position_x: Option<i32>,
    #[serde(default)]
    pub position_y: Option<i32>,
}

impl PlantUpdate {
    /// The placement part of this update.
    pub fn placement_changes(&self) -> MoveRequest {
        MoveRequest {
            area_id: self.area_id,
            plot_id: self.plot_id,
            position_x: self.position_x,
            position_y: self.position_y,
        }
    }
}

/// Create a plant after checking its references and placement.
///
/// Nothing is persisted when the requested cell is already taken.
pub async fn create_plant(pool: &PgPool, req: &NewPlantRequest) -> GardenResult<Plant> {
    require_text("name", &req.name)?;
    let placement = Placement::from_parts(req.plot_id, req.position_x, req.position_y)?;

    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    if !areas::area_exists(&mut *tx, req.area_id).await? {
        return Err(GardenError::not_found("area", req.area_id));
    }
    if !plant_types::plant_type_exists(&mut *tx, req.species_id).await? {
        return Err(GardenError::not_found("plant type", req.species_id));
    }
    placement::check_position(&mut *tx, &placement, None).await?;

    let (position_x, position_y) = match placement {
        Placement::InPlot { x, y, .. } => (Some(x), Some(y)),
        Placement::FreeStanding => (None, None),
    };
    let plant = plant_queries::insert_plant(
        &mut *tx,
        &NewPlant {
            name: &req.name,
            species_id: req.species_id,
            area_id: req.area_id,
            plot_id: placement.plot_id(),
            position_x,
            position_y,
            planted_date: req.planted_date,
            health_status: req.health_status.as_deref(),
            notes: req.notes.as_deref(),
            watering_schedule: req.watering_schedule.as_deref(),
        },
    )
    .await
    .map_err(|e| GardenError::from_placement_write(e, &placement))?;

    tx.commit().await.context("failed to commit transaction")?;

    info!(plant_id = plant.id, plot_id = ?plant.plot_id, "plant created");
    Ok(plant)
}

/// Merge `update` into an existing plant and persist it.
pub async fn update_plant(pool: &PgPool, id: i64, update: &PlantUpdate) -> GardenResult<Plant> {
    let changes = update.placement_changes();
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let mut plant = placement::lock_for_move(&mut *tx, id, &changes).await?;

    if let Some(name) = update.name.as_deref().filter(|n| !n.trim().is_empty()) {
        plant.name = name.to_owned();
    }
    if let Some(species_id) = update.species_id.filter(|&s| s != plant.species_id) {
        if !plant_types::plant_type_exists(&mut *tx, species_id).await? {
            return Err(GardenError::not_found("plant type", species_id));
        }
        plant.species_id = species_id;
    }
    if let Some(status) = &update.health_status {
        plant.health_status = status.clone();
    }
    if let Some(notes) = &update.notes {
        plant.notes = Some(notes.clone());
    }
    if let Some(schedule) = &update.watering_schedule {
        plant.watering_schedule = schedule.clone();
    }
    if let Some(date) = update.planted_date {
        plant.planted_date = date;
    }

    let placement = placement::relocate(&mut *tx, &mut plant, &changes).await?;
    let saved = persist(&mut *tx, &plant, &placement).await?;

    tx.commit().await.context("failed to commit transaction")?;

    info!(plant_id = id, "plant updated");
    Ok(saved)
}

/// Move a plant to another area, plot or cell, or make it free-standing.
pub async fn move_plant(pool: &PgPool, id: i64, changes: &MoveRequest) -> GardenResult<Plant> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let mut plant = placement::lock_for_move(&mut *tx, id, changes).await?;
    let placement = placement::relocate(&mut *tx, &mut plant, changes).await?;
    let saved = persist(&mut *tx, &plant, &placement).await?;

    tx.commit().await.context("failed to commit transaction")?;

    info!(
        plant_id = id,
        area_id = saved.area_id,
        plot_id = ?saved.plot_id,
        "plant moved"
    );
    Ok(saved)
}

/// Delete a plant.
pub async fn delete_plant(pool: &PgPool, id: i64) -> GardenResult<()> {
    if plant_queries::delete_plant(pool, id).await? == 0 {
        return Err(GardenError::not_found("plant", id));
    }
    info!(plant_id = id, "plant deleted");
    Ok(())
}

async fn persist(
    conn: &mut sqlx::PgConnection,
    plant: &Plant,
    placement: &Placement,
) -> GardenResult<Plant> {
    plant_queries::save_plant(conn, plant)
        .await
        .map_err(|e| GardenError::from_placement_write(e, placement))?
        .ok_or_else(|| GardenError::not_found("plant", plant.id))
}
