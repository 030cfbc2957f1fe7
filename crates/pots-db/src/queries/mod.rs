pub mod areas;
pub mod plant_types;
pub mod plants;
pub mod plots;
