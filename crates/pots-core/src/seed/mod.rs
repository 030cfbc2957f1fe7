//! Sample garden data.
//!
//! The sample is defined in `garden.toml` and embedded in the binary at
//! compile time. Rows refer to each other by name; ids are resolved while
//! inserting.

use std::collections::HashMap;

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use pots_db::models::LocationType;
use pots_db::queries::areas::{self, NewArea};
use pots_db::queries::plant_types::{self, NewPlantType};
use pots_db::queries::plants::{self, NewPlant};
use pots_db::queries::plots::{self, NewPlot};

use crate::error::{GardenError, GardenResult};
use crate::placement::{self, Placement};

static GARDEN_TOML: &str = include_str!("garden.toml");

/// The full sample garden.
#[derive(Debug, Clone, Deserialize)]
pub struct SampleGarden {
    pub areas: Vec<SampleArea>,
    pub plots: Vec<SamplePlot>,
    pub plant_types: Vec<SamplePlantType>,
    pub plants: Vec<SamplePlant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SampleArea {
    pub name: String,
    pub location_type: LocationType,
    pub is_covered: bool,
    pub is_greenhouse: bool,
    pub brightness: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplePlot {
    pub name: String,
    /// Name of the owning area.
    pub area: String,
    pub plot_type: String,
    pub width: i32,
    pub length: i32,
    pub soil_type: Option<String>,
    pub drainage_level: Option<String>,
    pub ph: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplePlantType {
    pub common_name: String,
    pub latin_name: Option<String>,
    pub is_edible: bool,
    pub light_requirements: Option<String>,
    pub water_requirements: Option<String>,
    pub soil_requirements: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplePlant {
    pub name: String,
    /// Common name of the plant type.
    pub species: String,
    pub area: String,
    pub plot: Option<String>,
    pub position: Option<(i32, i32)>,
    pub planted_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Rows inserted by [`seed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub areas: usize,
    pub plots: usize,
    pub plant_types: usize,
    pub plants: usize,
}

impl SeedSummary {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Parse the embedded sample garden.
pub fn sample_garden() -> GardenResult<SampleGarden> {
    let garden: SampleGarden =
        toml::from_str(GARDEN_TOML).context("embedded garden.toml is invalid")?;
    Ok(garden)
}

/// Load the sample garden into an empty database.
///
/// Does nothing and returns an empty summary when any area already exists.
/// Everything is inserted in one transaction.
pub async fn seed(pool: &PgPool) -> GardenResult<SeedSummary> {
    let garden = sample_garden()?;

    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    if areas::count_areas(&mut *tx).await? > 0 {
        info!("garden already has data, skipping seed");
        return Ok(SeedSummary::default());
    }

    let mut area_ids = HashMap::new();
    for area in &garden.areas {
        let row = areas::insert_area(
            &mut *tx,
            &NewArea {
                name: &area.name,
                location_type: area.location_type,
                is_covered: area.is_covered,
                is_greenhouse: area.is_greenhouse,
                brightness: &area.brightness,
            },
        )
        .await?;
        area_ids.insert(area.name.as_str(), row.id);
    }

    let mut plot_ids = HashMap::new();
    for plot in &garden.plots {
        let row = plots::insert_plot(
            &mut *tx,
            &NewPlot {
                name: &plot.name,
                area_id: lookup(&area_ids, "area", &plot.area)?,
                plot_type: &plot.plot_type,
                width: plot.width,
                length: plot.length,
                soil_type: plot.soil_type.as_deref(),
                drainage_level: plot.drainage_level.as_deref(),
                ph: plot.ph,
            },
        )
        .await?;
        plot_ids.insert(plot.name.as_str(), row.id);
    }

    let mut species_ids = HashMap::new();
    for plant_type in &garden.plant_types {
        let row = plant_types::insert_plant_type(
            &mut *tx,
            &NewPlantType {
                common_name: &plant_type.common_name,
                latin_name: plant_type.latin_name.as_deref(),
                light_requirements: plant_type.light_requirements.as_deref(),
                water_requirements: plant_type.water_requirements.as_deref(),
                soil_requirements: plant_type.soil_requirements.as_deref(),
                image_url: plant_type.image_url.as_deref(),
                is_edible: plant_type.is_edible,
            },
        )
        .await?;
        species_ids.insert(plant_type.common_name.as_str(), row.id);
    }

    for plant in &garden.plants {
        let plot_id = plant
            .plot
            .as_deref()
            .map(|name| lookup(&plot_ids, "plot", name))
            .transpose()?;
        let placement = Placement::from_parts(
            plot_id,
            plant.position.map(|(x, _)| x),
            plant.position.map(|(_, y)| y),
        )?;
        placement::check_position(&mut *tx, &placement, None).await?;

        plants::insert_plant(
            &mut *tx,
            &NewPlant {
                name: &plant.name,
                species_id: lookup(&species_ids, "plant type", &plant.species)?,
                area_id: lookup(&area_ids, "area", &plant.area)?,
                plot_id,
                position_x: plant.position.map(|(x, _)| x),
                position_y: plant.position.map(|(_, y)| y),
                planted_date: plant.planted_date,
                health_status: None,
                notes: plant.notes.as_deref(),
                watering_schedule: None,
            },
        )
        .await?;
    }

    tx.commit().await.context("failed to commit seed data")?;

    let summary = SeedSummary {
        areas: garden.areas.len(),
        plots: garden.plots.len(),
        plant_types: garden.plant_types.len(),
        plants: garden.plants.len(),
    };
    info!(?summary, "sample garden loaded");
    Ok(summary)
}

fn lookup(ids: &HashMap<&str, i64>, entity: &str, name: &str) -> GardenResult<i64> {
    ids.get(name).copied().ok_or_else(|| {
        GardenError::Internal(anyhow!("sample garden refers to unknown {entity} {name:?}"))
    })
}
