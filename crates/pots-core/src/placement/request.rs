//! Partial placement changes carried by move and update requests.

use serde::{Deserialize, Deserializer};

/// Requested changes to a plant's area, plot and position.
///
/// Every field is independent; an absent field leaves the current value in
/// place. `plot_id` distinguishes "absent" (`None`) from an explicit JSON
/// `null` (`Some(None)`), which detaches the plant from its plot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    #[serde(default)]
    pub area_id: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    pub plot_id: Option<Option<i64>>,
    #[serde(default)]
    pub position_x: Option<i32>,
    #[serde(default)]
    pub position_y: Option<i32>,
}

/// Deserialize a field that was present in the input, keeping `null` as
/// `Some(None)`. Paired with `#[serde(default)]` so a missing field is `None`.
pub(crate) fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> MoveRequest {
        serde_json::from_str(json).expect("valid move request")
    }

    #[test]
    fn absent_plot_is_left_unchanged() {
        let req = parse(r#"{"areaId": 2}"#);
        assert_eq!(req.area_id, Some(2));
        assert_eq!(req.plot_id, None);
        assert_eq!(req.position_x, None);
    }

    #[test]
    fn null_plot_means_detach() {
        let req = parse(r#"{"areaId": 1, "plotId": null}"#);
        assert_eq!(req.plot_id, Some(None));
    }

    #[test]
    fn plot_with_position() {
        let req = parse(r#"{"plotId": 5, "positionX": 1, "positionY": 0}"#);
        assert_eq!(req.plot_id, Some(Some(5)));
        assert_eq!(req.position_x, Some(1));
        assert_eq!(req.position_y, Some(0));
    }

    #[test]
    fn empty_object_changes_nothing() {
        assert_eq!(parse("{}"), MoveRequest::default());
    }
}
