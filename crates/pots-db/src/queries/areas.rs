//! Database query functions for the `areas` table.

use anyhow::{Context, Result};
use sqlx::{PgExecutor, PgPool};

use crate::models::{Area, LocationType};

/// Parameters for inserting a new area row.
#[derive(Debug, Clone)]
pub struct NewArea<'a> {
    pub name: &'a str,
    pub location_type: LocationType,
    pub is_covered: bool,
    pub is_greenhouse: bool,
    pub brightness: &'a str,
}

/// Insert a new area. Returns the inserted row with its generated id.
pub async fn insert_area(executor: impl PgExecutor<'_>, new: &NewArea<'_>) -> Result<Area> {
    let area = sqlx::query_as::<_, Area>(
        "INSERT INTO areas (name, location_type, is_covered, is_greenhouse, brightness) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING *",
    )
    .bind(new.name)
    .bind(new.location_type)
    .bind(new.is_covered)
    .bind(new.is_greenhouse)
    .bind(new.brightness)
    .fetch_one(executor)
    .await
    .with_context(|| format!("failed to insert area {:?}", new.name))?;

    Ok(area)
}

/// Fetch an area by id.
pub async fn get_area(executor: impl PgExecutor<'_>, id: i64) -> Result<Option<Area>> {
    let area = sqlx::query_as::<_, Area>("SELECT * FROM areas WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
        .context("failed to fetch area")?;

    Ok(area)
}

/// Whether an area with the given id exists.
pub async fn area_exists(executor: impl PgExecutor<'_>, id: i64) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM areas WHERE id = $1)")
        .bind(id)
        .fetch_one(executor)
        .await
        .context("failed to check area existence")?;

    Ok(exists)
}

/// List all areas in insertion order.
pub async fn list_areas(pool: &PgPool) -> Result<Vec<Area>> {
    let areas = sqlx::query_as::<_, Area>("SELECT * FROM areas ORDER BY id")
        .fetch_all(pool)
        .await
        .context("failed to list areas")?;

    Ok(areas)
}

/// Number of areas. Zero means the garden has never been set up.
pub async fn count_areas(executor: impl PgExecutor<'_>) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM areas")
        .fetch_one(executor)
        .await
        .context("failed to count areas")?;

    Ok(count)
}
