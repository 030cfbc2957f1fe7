//! Placement rules: where a plant may sit.
//!
//! A plant is either free-standing or occupies one cell of a plot's grid, and
//! no two plants share a cell of the same plot. Uniqueness is scoped by plot;
//! two plants in the same area but different plots may share coordinates.
//!
//! Writers run the checks here inside a transaction that holds the target
//! plot's row lock, so concurrent placements into one plot are serialized.
//! The partial unique index on `plants (plot_id, position_x, position_y)`
//! backs this up at the store.
//!
//! Row locks are always taken plot first, then plant. Plot deletion locks
//! the plot and then rewrites its plants, so moves follow the same order.

pub mod request;

use sqlx::PgConnection;
use tracing::{debug, warn};

use pots_db::models::Plant;
use pots_db::queries::{areas, plants, plots};

use crate::error::{GardenError, GardenResult};

pub use request::MoveRequest;

/// How often [`lock_for_move`] re-reads a plant whose plot changed under it.
const LOCK_ATTEMPTS: usize = 3;

/// A validated plot/position assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// No plot and no position.
    FreeStanding,
    /// One cell of a plot's grid.
    InPlot { plot_id: i64, x: i32, y: i32 },
}

impl Placement {
    /// Build a placement from raw optional fields.
    ///
    /// Without a plot the plant is free-standing and any supplied coordinates
    /// are discarded. With a plot both coordinates are required and must be
    /// non-negative.
    pub fn from_parts(plot_id: Option<i64>, x: Option<i32>, y: Option<i32>) -> GardenResult<Self> {
        let Some(plot_id) = plot_id else {
            return Ok(Self::FreeStanding);
        };
        match (x, y) {
            (Some(x), Some(y)) if x >= 0 && y >= 0 => Ok(Self::InPlot { plot_id, x, y }),
            (Some(x), Some(y)) => Err(GardenError::InvalidPlacement(format!(
                "position ({x}, {y}) must not be negative"
            ))),
            _ => Err(GardenError::InvalidPlacement(format!(
                "placing a plant in plot {plot_id} requires both positionX and positionY"
            ))),
        }
    }

    /// The placement a stored plant currently has.
    pub fn of(plant: &Plant) -> Self {
        match (plant.plot_id, plant.position()) {
            (Some(plot_id), Some((x, y))) => Self::InPlot { plot_id, x, y },
            _ => Self::FreeStanding,
        }
    }

    pub fn plot_id(&self) -> Option<i64> {
        match self {
            Self::FreeStanding => None,
            Self::InPlot { plot_id, .. } => Some(*plot_id),
        }
    }

    /// Copy this placement onto the plant's plot and position fields.
    pub fn apply_to(&self, plant: &mut Plant) {
        match *self {
            Self::FreeStanding => {
                plant.plot_id = None;
                plant.position_x = None;
                plant.position_y = None;
            }
            Self::InPlot { plot_id, x, y } => {
                plant.plot_id = Some(plot_id);
                plant.position_x = Some(x);
                plant.position_y = Some(y);
            }
        }
    }
}

/// Verify that `placement` names a free cell of an existing plot.
///
/// Locks the target plot row for the rest of the caller's transaction.
/// `exclude_plant` is the plant being moved, which never conflicts with
/// itself. Free-standing placements always pass.
pub async fn check_position(
    conn: &mut PgConnection,
    placement: &Placement,
    exclude_plant: Option<i64>,
) -> GardenResult<()> {
    let Placement::InPlot { plot_id, x, y } = *placement else {
        return Ok(());
    };

    let plot = plots::get_plot_for_update(&mut *conn, plot_id)
        .await?
        .ok_or_else(|| GardenError::not_found("plot", plot_id))?;

    if !plot.contains(x, y) {
        return Err(GardenError::OutOfBounds {
            plot_id,
            x,
            y,
            width: plot.width,
            length: plot.length,
        });
    }

    let occupants = plants::list_plants_for_plot(&mut *conn, plot_id).await?;
    let occupied = occupants
        .iter()
        .filter(|p| Some(p.id) != exclude_plant)
        .any(|p| p.position() == Some((x, y)));

    if occupied {
        warn!(plot_id, x, y, "rejected placement on an occupied cell");
        return Err(GardenError::PositionConflict { plot_id, x, y });
    }

    Ok(())
}

/// Lock a plant for a move, taking plot row locks before the plant row.
///
/// The plots locked are the plant's current plot and the plot `changes`
/// targets, in ascending id order. The plant is read unlocked first to learn
/// those ids, then locked and re-checked; if another writer moved it to a
/// different plot in between, the plots are looked up again.
pub async fn lock_for_move(
    conn: &mut PgConnection,
    plant_id: i64,
    changes: &MoveRequest,
) -> GardenResult<Plant> {
    let mut locked: Vec<i64> = Vec::new();

    for _ in 0..LOCK_ATTEMPTS {
        let seen = plants::get_plant(&mut *conn, plant_id)
            .await?
            .ok_or_else(|| GardenError::not_found("plant", plant_id))?;

        let mut wanted: Vec<i64> = [seen.plot_id, changes.plot_id.unwrap_or(seen.plot_id)]
            .into_iter()
            .flatten()
            .filter(|id| !locked.contains(id))
            .collect();
        wanted.sort_unstable();
        wanted.dedup();
        for plot_id in wanted {
            // A plot deleted meanwhile locks nothing; the re-check below sees
            // the plant already detached from it.
            plots::get_plot_for_update(&mut *conn, plot_id).await?;
            locked.push(plot_id);
        }

        let plant = plants::get_plant_for_update(&mut *conn, plant_id)
            .await?
            .ok_or_else(|| GardenError::not_found("plant", plant_id))?;
        if plant.plot_id == seen.plot_id {
            return Ok(plant);
        }
        debug!(
            plant_id,
            was = ?seen.plot_id,
            now = ?plant.plot_id,
            "plant changed plot while locking"
        );
    }

    Err(GardenError::Internal(anyhow::anyhow!(
        "plant {plant_id} kept changing plot while being locked"
    )))
}

/// Apply a [`MoveRequest`] to `plant` in memory, validating the result.
///
/// Fields the request omits keep their current values: a new plot without
/// coordinates reuses the plant's current ones, and coordinates without a
/// plot apply to the current plot. An explicit `plotId: null` makes the plant
/// free-standing whatever coordinates accompany it. The caller persists the
/// plant afterwards; the returned placement is what it now holds.
pub async fn relocate(
    conn: &mut PgConnection,
    plant: &mut Plant,
    changes: &MoveRequest,
) -> GardenResult<Placement> {
    if let Some(area_id) = changes.area_id.filter(|&id| id != plant.area_id) {
        if !areas::area_exists(&mut *conn, area_id).await? {
            return Err(GardenError::not_found("area", area_id));
        }
        plant.area_id = area_id;
    }

    let current = Placement::of(plant);
    let plot_id = changes.plot_id.unwrap_or(plant.plot_id);
    let target = Placement::from_parts(
        plot_id,
        changes.position_x.or(plant.position_x),
        changes.position_y.or(plant.position_y),
    )?;

    if target != current {
        check_position(conn, &target, Some(plant.id)).await?;
        target.apply_to(plant);
    }

    Ok(target)
}
