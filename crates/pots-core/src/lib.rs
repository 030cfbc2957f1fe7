//! Garden rules for pots.
//!
//! Placement checks, plot lifecycle, and the service functions the HTTP
//! layer calls. Storage lives in `pots-db`.

pub mod catalog;
pub mod error;
pub mod lifecycle;
pub mod placement;
pub mod plants;
pub mod seed;

pub use error::{GardenError, GardenResult};
