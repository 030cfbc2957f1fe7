//! Areas and plant types: the reference data plants point at.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use pots_db::models::{Area, LocationType, LocationTypeParseError, PlantType};
use pots_db::queries::areas::{self, NewArea};
use pots_db::queries::plant_types::{self, NewPlantType};

use crate::error::{GardenError, GardenResult, require_text};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAreaRequest {
    pub name: String,
    /// `indoor` or `outdoor`.
    pub location_type: String,
    #[serde(default)]
    pub is_covered: bool,
    #[serde(default)]
    pub is_greenhouse: bool,
    pub brightness: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlantTypeRequest {
    pub common_name: String,
    #[serde(default)]
    pub latin_name: Option<String>,
    #[serde(default)]
    pub light_requirements: Option<String>,
    #[serde(default)]
    pub water_requirements: Option<String>,
    #[serde(default)]
    pub soil_requirements: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_edible: bool,
}

/// Create an area.
pub async fn create_area(pool: &PgPool, req: &NewAreaRequest) -> GardenResult<Area> {
    require_text("name", &req.name)?;
    require_text("brightness", &req.brightness)?;
    let location_type: LocationType = req
        .location_type
        .parse()
        .map_err(|e: LocationTypeParseError| GardenError::validation(e.to_string()))?;

    let area = areas::insert_area(
        pool,
        &NewArea {
            name: &req.name,
            location_type,
            is_covered: req.is_covered,
            is_greenhouse: req.is_greenhouse,
            brightness: &req.brightness,
        },
    )
    .await?;

    info!(area_id = area.id, %location_type, "area created");
    Ok(area)
}

/// Create a plant type.
pub async fn create_plant_type(
    pool: &PgPool,
    req: &NewPlantTypeRequest,
) -> GardenResult<PlantType> {
    require_text("commonName", &req.common_name)?;

    let plant_type = plant_types::insert_plant_type(
        pool,
        &NewPlantType {
            common_name: &req.common_name,
            latin_name: req.latin_name.as_deref(),
            light_requirements: req.light_requirements.as_deref(),
            water_requirements: req.water_requirements.as_deref(),
            soil_requirements: req.soil_requirements.as_deref(),
            image_url: req.image_url.as_deref(),
            is_edible: req.is_edible,
        },
    )
    .await?;

    info!(plant_type_id = plant_type.id, "plant type created");
    Ok(plant_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_flags_default_to_false() {
        let req: NewAreaRequest = serde_json::from_value(serde_json::json!({
            "name": "Front Garden",
            "locationType": "outdoor",
            "brightness": "high"
        }))
        .unwrap();
        assert!(!req.is_covered);
        assert!(!req.is_greenhouse);
    }

    #[test]
    fn plant_type_optionals() {
        let req: NewPlantTypeRequest =
            serde_json::from_value(serde_json::json!({ "commonName": "Basil", "isEdible": true }))
                .unwrap();
        assert_eq!(req.common_name, "Basil");
        assert!(req.is_edible);
        assert_eq!(req.latin_name, None);
    }
}
