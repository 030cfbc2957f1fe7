//! Domain error taxonomy shared by every garden operation.

use thiserror::Error;

use pots_db::queries::plants::is_plot_position_violation;

use crate::placement::Placement;

/// Errors returned by garden operations.
///
/// Everything except [`GardenError::Internal`] is caused by the request and
/// can be corrected by the caller.
#[derive(Debug, Error)]
pub enum GardenError {
    #[error("position ({x}, {y}) in plot {plot_id} is already occupied")]
    PositionConflict { plot_id: i64, x: i32, y: i32 },

    #[error("position ({x}, {y}) is outside plot {plot_id} ({width}x{length})")]
    OutOfBounds {
        plot_id: i64,
        x: i32,
        y: i32,
        width: i32,
        length: i32,
    },

    #[error("invalid placement: {0}")]
    InvalidPlacement(String),

    #[error("{0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience alias for results of garden operations.
pub type GardenResult<T> = Result<T, GardenError>;

impl GardenError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Classify a store failure raised while writing `placement`.
    ///
    /// A concurrent writer that claimed the same cell after our pre-check
    /// trips the plot position index; that is reported as the same
    /// [`GardenError::PositionConflict`] the pre-check would have produced.
    pub(crate) fn from_placement_write(err: anyhow::Error, placement: &Placement) -> Self {
        match *placement {
            Placement::InPlot { plot_id, x, y } if is_plot_position_violation(&err) => {
                Self::PositionConflict { plot_id, x, y }
            }
            _ => Self::Internal(err),
        }
    }
}

/// Reject blank required text fields.
pub(crate) fn require_text(field: &str, value: &str) -> GardenResult<()> {
    if value.trim().is_empty() {
        return Err(GardenError::validation(format!("{field} must not be blank")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_cell() {
        let err = GardenError::PositionConflict {
            plot_id: 3,
            x: 0,
            y: 1,
        };
        assert_eq!(err.to_string(), "position (0, 1) in plot 3 is already occupied");

        let err = GardenError::not_found("plot", 42);
        assert_eq!(err.to_string(), "plot 42 not found");
    }

    #[test]
    fn non_constraint_store_errors_stay_internal() {
        let placement = Placement::InPlot {
            plot_id: 1,
            x: 0,
            y: 0,
        };
        let cause = anyhow::anyhow!("connection reset");
        let err = GardenError::from_placement_write(cause, &placement);
        assert!(matches!(err, GardenError::Internal(_)));
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text("name", "Basil").is_ok());
        let err = require_text("name", "  \t").unwrap_err();
        assert_eq!(err.to_string(), "name must not be blank");
    }
}
