//! Minimal rows for tests that only need something to point at.

use sqlx::PgPool;

use pots_db::models::{Area, LocationType, Plant, PlantType, Plot};
use pots_db::queries::areas::{self, NewArea};
use pots_db::queries::plant_types::{self, NewPlantType};
use pots_db::queries::plants::{self, NewPlant};
use pots_db::queries::plots::{self, NewPlot};

pub async fn area(pool: &PgPool, name: &str) -> Area {
    areas::insert_area(
        pool,
        &NewArea {
            name,
            location_type: LocationType::Outdoor,
            is_covered: false,
            is_greenhouse: false,
            brightness: "high",
        },
    )
    .await
    .expect("insert_area should succeed")
}

pub async fn plant_type(pool: &PgPool, common_name: &str) -> PlantType {
    plant_types::insert_plant_type(
        pool,
        &NewPlantType {
            common_name,
            is_edible: true,
            ..Default::default()
        },
    )
    .await
    .expect("insert_plant_type should succeed")
}

pub async fn plot(pool: &PgPool, area_id: i64, name: &str, width: i32, length: i32) -> Plot {
    plots::insert_plot(
        pool,
        &NewPlot {
            name,
            area_id,
            plot_type: "raised_bed",
            width,
            length,
            soil_type: None,
            drainage_level: None,
            ph: None,
        },
    )
    .await
    .expect("insert_plot should succeed")
}

/// Insert a plant directly, bypassing placement validation.
pub async fn plant(
    pool: &PgPool,
    name: &str,
    species_id: i64,
    area_id: i64,
    cell: Option<(i64, i32, i32)>,
) -> Plant {
    plants::insert_plant(
        pool,
        &NewPlant {
            name,
            species_id,
            area_id,
            plot_id: cell.map(|(plot_id, _, _)| plot_id),
            position_x: cell.map(|(_, x, _)| x),
            position_y: cell.map(|(_, _, y)| y),
            planted_date: None,
            health_status: None,
            notes: None,
            watering_schedule: None,
        },
    )
    .await
    .expect("insert_plant should succeed")
}
