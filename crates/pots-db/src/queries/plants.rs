//! Database query functions for the `plants` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};

use crate::models::{DEFAULT_HEALTH_STATUS, DEFAULT_WATERING_SCHEDULE, Plant};

/// Name of the partial unique index that allows one plant per plot cell.
pub const PLOT_POSITION_INDEX: &str = "plants_plot_position_key";

/// Parameters for inserting a new plant row.
///
/// `None` for `planted_date` means today. `None` for `health_status` or
/// `watering_schedule` stores [`DEFAULT_HEALTH_STATUS`] or
/// [`DEFAULT_WATERING_SCHEDULE`].
#[derive(Debug, Clone)]
pub struct NewPlant<'a> {
    pub name: &'a str,
    pub species_id: i64,
    pub area_id: i64,
    pub plot_id: Option<i64>,
    pub position_x: Option<i32>,
    pub position_y: Option<i32>,
    pub planted_date: Option<NaiveDate>,
    pub health_status: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub watering_schedule: Option<&'a str>,
}

/// Insert a new plant. Returns the inserted row with its generated id and
/// filled-in defaults.
pub async fn insert_plant(executor: impl PgExecutor<'_>, new: &NewPlant<'_>) -> Result<Plant> {
    let plant = sqlx::query_as::<_, Plant>(
        "INSERT INTO plants (name, species_id, area_id, plot_id, position_x, position_y, \
         planted_date, health_status, notes, watering_schedule) \
         VALUES ($1, $2, $3, $4, $5, $6, \
                 COALESCE($7, CURRENT_DATE), $8, $9, $10) \
         RETURNING *",
    )
    .bind(new.name)
    .bind(new.species_id)
    .bind(new.area_id)
    .bind(new.plot_id)
    .bind(new.position_x)
    .bind(new.position_y)
    .bind(new.planted_date)
    .bind(new.health_status.unwrap_or(DEFAULT_HEALTH_STATUS))
    .bind(new.notes)
    .bind(new.watering_schedule.unwrap_or(DEFAULT_WATERING_SCHEDULE))
    .fetch_one(executor)
    .await
    .with_context(|| format!("failed to insert plant {:?}", new.name))?;

    Ok(plant)
}

/// Fetch a plant by id.
pub async fn get_plant(executor: impl PgExecutor<'_>, id: i64) -> Result<Option<Plant>> {
    let plant = sqlx::query_as::<_, Plant>("SELECT * FROM plants WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
        .context("failed to fetch plant")?;

    Ok(plant)
}

/// Fetch a plant by id and lock the row until the surrounding transaction ends.
pub async fn get_plant_for_update(executor: impl PgExecutor<'_>, id: i64) -> Result<Option<Plant>> {
    let plant = sqlx::query_as::<_, Plant>("SELECT * FROM plants WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await
        .context("failed to lock plant")?;

    Ok(plant)
}

/// List all plants in insertion order.
pub async fn list_plants(pool: &PgPool) -> Result<Vec<Plant>> {
    let plants = sqlx::query_as::<_, Plant>("SELECT * FROM plants ORDER BY id")
        .fetch_all(pool)
        .await
        .context("failed to list plants")?;

    Ok(plants)
}

/// List every plant in an area, whether in a plot or free-standing.
pub async fn list_plants_for_area(pool: &PgPool, area_id: i64) -> Result<Vec<Plant>> {
    let plants = sqlx::query_as::<_, Plant>("SELECT * FROM plants WHERE area_id = $1 ORDER BY id")
        .bind(area_id)
        .fetch_all(pool)
        .await
        .context("failed to list plants for area")?;

    Ok(plants)
}

/// List the free-standing plants of an area.
pub async fn list_free_standing_plants_for_area(pool: &PgPool, area_id: i64) -> Result<Vec<Plant>> {
    let plants = sqlx::query_as::<_, Plant>(
        "SELECT * FROM plants WHERE area_id = $1 AND plot_id IS NULL ORDER BY id",
    )
    .bind(area_id)
    .fetch_all(pool)
    .await
    .context("failed to list free-standing plants for area")?;

    Ok(plants)
}

/// List the plants assigned to a plot.
pub async fn list_plants_for_plot(
    executor: impl PgExecutor<'_>,
    plot_id: i64,
) -> Result<Vec<Plant>> {
    let plants = sqlx::query_as::<_, Plant>(
        "SELECT * FROM plants WHERE plot_id = $1 ORDER BY position_y, position_x",
    )
    .bind(plot_id)
    .fetch_all(executor)
    .await
    .context("failed to list plants for plot")?;

    Ok(plants)
}

/// Write every mutable column of `plant` back to its row.
///
/// Returns `None` when the row no longer exists.
pub async fn save_plant(executor: impl PgExecutor<'_>, plant: &Plant) -> Result<Option<Plant>> {
    let saved = sqlx::query_as::<_, Plant>(
        "UPDATE plants \
         SET name = $1, species_id = $2, area_id = $3, plot_id = $4, \
             position_x = $5, position_y = $6, planted_date = $7, \
             health_status = $8, notes = $9, watering_schedule = $10 \
         WHERE id = $11 \
         RETURNING *",
    )
    .bind(&plant.name)
    .bind(plant.species_id)
    .bind(plant.area_id)
    .bind(plant.plot_id)
    .bind(plant.position_x)
    .bind(plant.position_y)
    .bind(plant.planted_date)
    .bind(&plant.health_status)
    .bind(&plant.notes)
    .bind(&plant.watering_schedule)
    .bind(plant.id)
    .fetch_optional(executor)
    .await
    .with_context(|| format!("failed to save plant {}", plant.id))?;

    Ok(saved)
}

/// Make every plant in a plot free-standing: clear `plot_id` and both
/// positions. Returns the updated rows.
pub async fn detach_plants_from_plot(
    executor: impl PgExecutor<'_>,
    plot_id: i64,
) -> Result<Vec<Plant>> {
    let plants = sqlx::query_as::<_, Plant>(
        "UPDATE plants \
         SET plot_id = NULL, position_x = NULL, position_y = NULL \
         WHERE plot_id = $1 \
         RETURNING *",
    )
    .bind(plot_id)
    .fetch_all(executor)
    .await
    .with_context(|| format!("failed to detach plants from plot {plot_id}"))?;

    Ok(plants)
}

/// Delete a plant row. Returns the number of rows removed (0 or 1).
pub async fn delete_plant(executor: impl PgExecutor<'_>, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM plants WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await
        .with_context(|| format!("failed to delete plant {id}"))?;

    Ok(result.rows_affected())
}

/// Whether `err` was caused by two plants claiming the same plot cell.
///
/// Recognises unique violations on [`PLOT_POSITION_INDEX`] anywhere in the
/// error's context chain.
pub fn is_plot_position_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(sqlx::Error::as_database_error)
        .is_some_and(|db_err| {
            db_err.is_unique_violation() && db_err.constraint() == Some(PLOT_POSITION_INDEX)
        })
}
