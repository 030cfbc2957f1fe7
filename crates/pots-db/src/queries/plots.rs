//! Database query functions for the `plots` table.

use anyhow::{Context, Result};
use sqlx::{PgExecutor, PgPool};

use crate::models::Plot;

/// Parameters for inserting a new plot row.
#[derive(Debug, Clone)]
pub struct NewPlot<'a> {
    pub name: &'a str,
    pub area_id: i64,
    pub plot_type: &'a str,
    pub width: i32,
    pub length: i32,
    pub soil_type: Option<&'a str>,
    pub drainage_level: Option<&'a str>,
    pub ph: Option<f64>,
}

/// Replacement values for the editable columns of a plot.
///
/// The owning area is not editable.
#[derive(Debug, Clone)]
pub struct PlotChanges<'a> {
    pub name: &'a str,
    pub plot_type: &'a str,
    pub width: i32,
    pub length: i32,
    pub soil_type: Option<&'a str>,
    pub drainage_level: Option<&'a str>,
    pub ph: Option<f64>,
}

/// Insert a new plot. Returns the inserted row with its generated id.
pub async fn insert_plot(executor: impl PgExecutor<'_>, new: &NewPlot<'_>) -> Result<Plot> {
    let plot = sqlx::query_as::<_, Plot>(
        "INSERT INTO plots \
         (name, area_id, plot_type, width, length, soil_type, drainage_level, ph) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING *",
    )
    .bind(new.name)
    .bind(new.area_id)
    .bind(new.plot_type)
    .bind(new.width)
    .bind(new.length)
    .bind(new.soil_type)
    .bind(new.drainage_level)
    .bind(new.ph)
    .fetch_one(executor)
    .await
    .with_context(|| format!("failed to insert plot {:?}", new.name))?;

    Ok(plot)
}

/// Fetch a plot by id.
pub async fn get_plot(executor: impl PgExecutor<'_>, id: i64) -> Result<Option<Plot>> {
    let plot = sqlx::query_as::<_, Plot>("SELECT * FROM plots WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
        .context("failed to fetch plot")?;

    Ok(plot)
}

/// Fetch a plot by id and lock the row until the surrounding transaction ends.
pub async fn get_plot_for_update(executor: impl PgExecutor<'_>, id: i64) -> Result<Option<Plot>> {
    let plot = sqlx::query_as::<_, Plot>("SELECT * FROM plots WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await
        .context("failed to lock plot")?;

    Ok(plot)
}

/// List all plots in insertion order.
pub async fn list_plots(pool: &PgPool) -> Result<Vec<Plot>> {
    let plots = sqlx::query_as::<_, Plot>("SELECT * FROM plots ORDER BY id")
        .fetch_all(pool)
        .await
        .context("failed to list plots")?;

    Ok(plots)
}

/// List the plots belonging to an area.
pub async fn list_plots_for_area(pool: &PgPool, area_id: i64) -> Result<Vec<Plot>> {
    let plots = sqlx::query_as::<_, Plot>("SELECT * FROM plots WHERE area_id = $1 ORDER BY id")
        .bind(area_id)
        .fetch_all(pool)
        .await
        .context("failed to list plots for area")?;

    Ok(plots)
}

/// Overwrite the editable columns of a plot.
///
/// Returns `None` when no plot has the given id.
pub async fn update_plot(
    executor: impl PgExecutor<'_>,
    id: i64,
    changes: &PlotChanges<'_>,
) -> Result<Option<Plot>> {
    let plot = sqlx::query_as::<_, Plot>(
        "UPDATE plots \
         SET name = $1, plot_type = $2, width = $3, length = $4, \
             soil_type = $5, drainage_level = $6, ph = $7 \
         WHERE id = $8 \
         RETURNING *",
    )
    .bind(changes.name)
    .bind(changes.plot_type)
    .bind(changes.width)
    .bind(changes.length)
    .bind(changes.soil_type)
    .bind(changes.drainage_level)
    .bind(changes.ph)
    .bind(id)
    .fetch_optional(executor)
    .await
    .with_context(|| format!("failed to update plot {id}"))?;

    Ok(plot)
}

/// Delete a plot row. Returns the number of rows removed (0 or 1).
///
/// Fails with a foreign-key error if any plant still references the plot.
pub async fn delete_plot(executor: impl PgExecutor<'_>, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM plots WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await
        .with_context(|| format!("failed to delete plot {id}"))?;

    Ok(result.rows_affected())
}
