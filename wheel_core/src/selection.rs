// Pre-armed spin outcome: pointer picks and type-ahead matches.

use serde::{Deserialize, Serialize};

use crate::entries::EntryList;
use crate::geometry::{point_angle, segment_at_angle};
use crate::surface::{Point, SurfaceSize};

/// Distance from the wheel rim inside which a pick is not accepted.
const PICK_RIM_MARGIN: f64 = 10.0;

/// An entry value pinned as the next spin's target.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionOverride {
    pinned: Option<String>,
}

impl SelectionOverride {
    pub fn new() -> Self {
        SelectionOverride::default()
    }

    pub fn pinned(&self) -> Option<&str> {
        self.pinned.as_deref()
    }

    pub fn pin(&mut self, value: &str) {
        self.pinned = Some(value.to_string());
    }

    /// Index of the pinned value in `entries`, if it is still there.
    pub fn resolve(&self, entries: &EntryList) -> Option<usize> {
        self.pinned.as_deref().and_then(|v| entries.position(v))
    }

    /// Drop the pin once its value has left the list. Returns true if dropped.
    pub fn reconcile(&mut self, entries: &EntryList) -> bool {
        match self.pinned.as_deref() {
            Some(value) if !entries.contains(value) => {
                self.pinned = None;
                true
            }
            _ => false,
        }
    }
}

/// Segment index under a point on the surface, or `None` outside the wheel.
pub fn segment_at_point(
    point: Point,
    size: SurfaceSize,
    total: usize,
    orientation: f64,
) -> Option<usize> {
    if total == 0 {
        return None;
    }
    let center = size.center();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    let radius = size.inner_radius() - PICK_RIM_MARGIN;
    if radius <= 0.0 || dx * dx + dy * dy > radius * radius {
        return None;
    }
    Some(segment_at_angle(point_angle(dx, dy), total, orientation))
}

/// Entry matching a typed query, case-insensitively by substring.
pub fn entry_matching<'a>(entries: &'a EntryList, query: &str) -> Option<&'a str> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    entries.find_containing(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{angle_of_segment_center, POINTER_ANGLE};

    fn list() -> EntryList {
        EntryList::parse("Alice,Bob,Carol,Dan")
    }

    #[test]
    fn resolve_follows_current_index() {
        let mut pick = SelectionOverride::new();
        pick.pin("Carol");
        assert_eq!(pick.resolve(&list()), Some(2));
        assert_eq!(pick.resolve(&EntryList::parse("Carol,Alice")), Some(0));
    }

    #[test]
    fn reconcile_keeps_present_value() {
        let mut pick = SelectionOverride::new();
        pick.pin("Bob");
        assert!(!pick.reconcile(&EntryList::parse("Dan,Bob")));
        assert_eq!(pick.pinned(), Some("Bob"));
        assert!(pick.reconcile(&EntryList::parse("Dan")));
        assert_eq!(pick.pinned(), None);
    }

    #[test]
    fn point_at_top_hits_segment_under_pointer() {
        let size = SurfaceSize::new(400, 400);
        // Rest the wheel with segment 3 centred under the pointer.
        let orientation = POINTER_ANGLE - angle_of_segment_center(3, 4);
        let top = Point::new(200.0, 40.0);
        assert_eq!(segment_at_point(top, size, 4, orientation), Some(3));
    }

    #[test]
    fn unrotated_quadrants() {
        let size = SurfaceSize::new(200, 200);
        // Segment 0 of 4 covers the lower-right quadrant on an unrotated wheel.
        assert_eq!(segment_at_point(Point::new(150.0, 150.0), size, 4, 0.0), Some(0));
        assert_eq!(segment_at_point(Point::new(50.0, 150.0), size, 4, 0.0), Some(1));
        assert_eq!(segment_at_point(Point::new(50.0, 50.0), size, 4, 0.0), Some(2));
        assert_eq!(segment_at_point(Point::new(150.0, 50.0), size, 4, 0.0), Some(3));
    }

    #[test]
    fn points_outside_wheel_are_ignored() {
        let size = SurfaceSize::new(200, 200);
        assert_eq!(segment_at_point(Point::new(2.0, 2.0), size, 4, 0.0), None);
        assert_eq!(segment_at_point(Point::new(100.0, 5.0), size, 4, 0.0), None);
        assert_eq!(segment_at_point(Point::new(100.0, 100.0), size, 0, 0.0), None);
    }

    #[test]
    fn blank_query_matches_nothing() {
        assert_eq!(entry_matching(&list(), "   "), None);
        assert_eq!(entry_matching(&list(), " da "), Some("Dan"));
    }
}
