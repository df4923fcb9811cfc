// Closest-marker selection for frames with several visible markers.
//
// Distance is estimated from apparent size alone:
//   distance = marker_size * image_width / mean_edge_length_px
// This ignores focal length and lens distortion, so the absolute value is only a
// rough proxy. Ranking between markers in the same frame is what matters.

use crate::domain::Detection;

/// One marker located in a frame, corners in pixel coordinates, in perimeter order.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerObservation {
    pub id: String,
    pub corners: [[f64; 2]; 4],
}

impl MarkerObservation {
    /// Mean length of the four perimeter edges, in pixels.
    pub fn mean_edge_length(&self) -> f64 {
        let total: f64 = (0..4)
            .map(|i| {
                let [x1, y1] = self.corners[i];
                let [x2, y2] = self.corners[(i + 1) % 4];
                (x2 - x1).hypot(y2 - y1)
            })
            .sum();
        total / 4.0
    }
}

pub fn estimate_distance(marker_size: f64, image_width: u32, edge_length_px: f64) -> f64 {
    if edge_length_px <= 0.0 || !edge_length_px.is_finite() {
        return f64::INFINITY;
    }
    marker_size * f64::from(image_width) / edge_length_px
}

/// Picks the closest marker whose id is in `valid_targets`.
///
/// Ties keep the first marker encountered. Markers with no measurable size are
/// never selected.
pub fn closest_target(
    markers: &[MarkerObservation],
    image_width: u32,
    marker_size: f64,
    valid_targets: &[String],
) -> Option<Detection> {
    let mut best: Option<Detection> = None;

    for marker in markers {
        if !valid_targets.iter().any(|id| id == &marker.id) {
            continue;
        }
        let distance = estimate_distance(marker_size, image_width, marker.mean_edge_length());
        if !distance.is_finite() {
            continue;
        }
        let closer = best
            .as_ref()
            .is_none_or(|current| distance < current.distance);
        if closer {
            best = Some(Detection {
                target_id: marker.id.clone(),
                distance,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(id: &str, origin: f64, side: f64) -> MarkerObservation {
        MarkerObservation {
            id: id.to_string(),
            corners: [
                [origin, origin],
                [origin + side, origin],
                [origin + side, origin + side],
                [origin, origin + side],
            ],
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn when_marker_is_a_square_then_mean_edge_is_its_side() {
        assert_eq!(square("A1", 10.0, 50.0).mean_edge_length(), 50.0);
    }

    #[test]
    fn when_several_markers_are_visible_then_largest_one_wins() {
        let markers = vec![square("A2", 0.0, 40.0), square("A3", 100.0, 80.0)];

        let detection = closest_target(&markers, 1280, 18.7, &ids(&["A2", "A3"]))
            .expect("expected a detection");

        assert_eq!(detection.target_id, "A3");
        assert!((detection.distance - 18.7 * 1280.0 / 80.0).abs() < 1e-9);
    }

    #[test]
    fn when_markers_tie_then_first_encountered_wins() {
        let markers = vec![square("A2", 0.0, 60.0), square("A3", 100.0, 60.0)];

        let detection = closest_target(&markers, 640, 18.7, &ids(&["A2", "A3"]))
            .expect("expected a detection");

        assert_eq!(detection.target_id, "A2");
    }

    #[test]
    fn when_closest_marker_is_not_a_valid_target_then_it_is_skipped() {
        let markers = vec![square("A1", 0.0, 200.0), square("A2", 300.0, 30.0)];

        let detection =
            closest_target(&markers, 640, 18.7, &ids(&["A2"])).expect("expected a detection");

        assert_eq!(detection.target_id, "A2");
    }

    #[test]
    fn when_marker_has_no_size_then_nothing_is_detected() {
        let markers = vec![square("A2", 5.0, 0.0)];

        assert_eq!(closest_target(&markers, 640, 18.7, &ids(&["A2"])), None);
    }

    #[test]
    fn when_no_markers_are_visible_then_nothing_is_detected() {
        assert_eq!(closest_target(&[], 640, 18.7, &ids(&["A2"])), None);
    }
}
