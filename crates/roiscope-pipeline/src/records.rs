//! Request bodies handed to the persistence layer.

use roiscope_core::{
    validate_edge_actions, validate_edge_indices, ActionKind, BoundaryAction, Direction,
    ImageSize, PointXY, Polygon, Pt2, Result,
};
use serde::{Deserialize, Serialize};

/// An ROI polygon in normalized `[0,1]²` coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiRecord {
    pub points: Vec<PointXY>,
}

impl RoiRecord {
    pub fn from_polygon(polygon: &Polygon, size: ImageSize) -> Self {
        Self {
            points: polygon.normalized(size).into_iter().map(PointXY::from).collect(),
        }
    }

    /// Back to pixels for display on an image of `size`.
    pub fn to_polygon(&self, size: ImageSize) -> Result<Polygon> {
        let normalized: Vec<Pt2> = self.points.iter().map(|&p| p.into()).collect();
        Polygon::new(roiscope_core::denormalize_polygon(&normalized, size)?)
    }
}

/// One boundary action bound to the vertices of its edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeConfigRecord {
    pub roi_id: String,
    pub start: PointXY,
    pub end: PointXY,
    pub boundary_name: String,
    pub direction: Direction,
    pub action: ActionKind,
    pub counter_id: Option<String>,
    pub notify_condition: Option<String>,
}

/// Validate `actions` against `polygon` and build one record per action.
///
/// Edge endpoints are taken from `polygon` as given, so pass the normalized
/// polygon when the store expects normalized coordinates.
pub fn edge_config_records(
    roi_id: &str,
    polygon: &Polygon,
    actions: &[BoundaryAction],
) -> Result<Vec<EdgeConfigRecord>> {
    validate_edge_indices(actions, polygon.len())?;
    validate_edge_actions(actions)?;

    actions
        .iter()
        .map(|action| {
            let (start, end) = polygon.edge(action.edge_index())?;
            Ok(EdgeConfigRecord {
                roi_id: roi_id.to_owned(),
                start: start.into(),
                end: end.into(),
                boundary_name: polygon.edge_ref(action.edge_index())?.name(),
                direction: action.direction(),
                action: action.kind(),
                counter_id: action.counter_ref().map(str::to_owned),
                notify_condition: action.notify_condition().map(str::to_owned),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roiscope_core::RoiError;

    fn quad() -> Polygon {
        Polygon::new(vec![
            Pt2::new(100.0, 100.0),
            Pt2::new(500.0, 100.0),
            Pt2::new(500.0, 400.0),
            Pt2::new(100.0, 400.0),
        ])
        .unwrap()
    }

    #[test]
    fn records_name_edges_and_endpoints() {
        let actions = vec![
            BoundaryAction::counter(1, Direction::Inward, ActionKind::Increment, "c-7").unwrap(),
            BoundaryAction::notify(3, Direction::Outward, "person").unwrap(),
        ];
        let records = edge_config_records("roi-1", &quad(), &actions).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].boundary_name, "B-C");
        assert_eq!(records[0].start, PointXY { x: 500.0, y: 100.0 });
        assert_eq!(records[0].end, PointXY { x: 500.0, y: 400.0 });
        assert_eq!(records[0].counter_id.as_deref(), Some("c-7"));
        assert_eq!(records[0].notify_condition, None);

        assert_eq!(records[1].boundary_name, "D-A");
        assert_eq!(records[1].end, PointXY { x: 100.0, y: 100.0 });

        let json = serde_json::to_value(&records[1]).unwrap();
        assert_eq!(json["direction"], "outward");
        assert_eq!(json["action"], "notify");
        assert!(json["counter_id"].is_null());
    }

    #[test]
    fn invalid_action_sets_produce_no_records() {
        let conflicting = vec![
            BoundaryAction::counter(0, Direction::Inward, ActionKind::Increment, "c").unwrap(),
            BoundaryAction::counter(0, Direction::Inward, ActionKind::Decrement, "c").unwrap(),
        ];
        assert!(matches!(
            edge_config_records("roi-1", &quad(), &conflicting),
            Err(RoiError::InvalidBoundaryAction(_))
        ));

        let off_polygon = vec![BoundaryAction::notify(4, Direction::Inward, "x").unwrap()];
        assert!(matches!(
            edge_config_records("roi-1", &quad(), &off_polygon),
            Err(RoiError::OutOfRange(_))
        ));
    }

    #[test]
    fn roi_record_roundtrip() {
        let size = ImageSize::new(1000, 500).unwrap();
        let record = RoiRecord::from_polygon(&quad(), size);
        assert_eq!(record.points[1], PointXY { x: 0.5, y: 0.2 });
        let back = record.to_polygon(size).unwrap();
        assert_eq!(back, quad());
    }
}
