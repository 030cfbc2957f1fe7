//! Database query functions for the `plant_types` table.

use anyhow::{Context, Result};
use sqlx::{PgExecutor, PgPool};

use crate::models::PlantType;

/// Parameters for inserting a new plant type row.
#[derive(Debug, Clone, Default)]
pub struct NewPlantType<'a> {
    pub common_name: &'a str,
    pub latin_name: Option<&'a str>,
    pub light_requirements: Option<&'a str>,
    pub water_requirements: Option<&'a str>,
    pub soil_requirements: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub is_edible: bool,
}

/// Insert a new plant type. Returns the inserted row with its generated id.
pub async fn insert_plant_type(
    executor: impl PgExecutor<'_>,
    new: &NewPlantType<'_>,
) -> Result<PlantType> {
    let plant_type = sqlx::query_as::<_, PlantType>(
        "INSERT INTO plant_types (common_name, latin_name, light_requirements, \
         water_requirements, soil_requirements, image_url, is_edible) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING *",
    )
    .bind(new.common_name)
    .bind(new.latin_name)
    .bind(new.light_requirements)
    .bind(new.water_requirements)
    .bind(new.soil_requirements)
    .bind(new.image_url)
    .bind(new.is_edible)
    .fetch_one(executor)
    .await
    .with_context(|| format!("failed to insert plant type {:?}", new.common_name))?;

    Ok(plant_type)
}

/// Fetch a plant type by id.
pub async fn get_plant_type(executor: impl PgExecutor<'_>, id: i64) -> Result<Option<PlantType>> {
    let plant_type = sqlx::query_as::<_, PlantType>("SELECT * FROM plant_types WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
        .context("failed to fetch plant type")?;

    Ok(plant_type)
}

/// Whether a plant type with the given id exists.
pub async fn plant_type_exists(executor: impl PgExecutor<'_>, id: i64) -> Result<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM plant_types WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await
            .context("failed to check plant type existence")?;

    Ok(exists)
}

/// List all plant types in insertion order.
pub async fn list_plant_types(pool: &PgPool) -> Result<Vec<PlantType>> {
    let plant_types = sqlx::query_as::<_, PlantType>("SELECT * FROM plant_types ORDER BY id")
        .fetch_all(pool)
        .await
        .context("failed to list plant types")?;

    Ok(plant_types)
}
