// Segment/angle mapping and the segment color rule.
// Angles use the canvas convention: radians, clockwise, 0 at 3 o'clock (y points down).

use std::f64::consts::{PI, TAU};

use crate::surface::Rgba;

/// Where the fixed pointer sits: 12 o'clock.
pub const POINTER_ANGLE: f64 = 3.0 * PI / 2.0;

pub const BLUE: Rgba = Rgba::rgb(0x25, 0x63, 0xa8);
pub const WHITE: Rgba = Rgba::rgb(0xff, 0xff, 0xff);
pub const ORANGE: Rgba = Rgba::rgb(0xfd, 0x92, 0x01);

/// Segment fills, indexed by [`color_for_segment`].
pub const PALETTE: [Rgba; 3] = [BLUE, WHITE, ORANGE];

/// Palette index of segment `i` on a ring of `total` segments.
///
/// Plain `i mod 3`, except that when `total mod 3 == 1` the last segment takes
/// index 1 so it does not share a color with segment 0 across the wrap seam.
pub fn color_for_segment(i: usize, total: usize) -> usize {
    let colors = PALETTE.len();
    if total % colors == 1 && i + 1 == total {
        return 1;
    }
    i % colors
}

/// Text color readable on top of a palette entry.
pub fn label_color_for(palette_index: usize) -> Rgba {
    if PALETTE[palette_index % PALETTE.len()] == WHITE {
        BLUE
    } else {
        WHITE
    }
}

/// Angular width of one segment.
pub fn segment_arc(total: usize) -> f64 {
    TAU / total.max(1) as f64
}

/// Start and end angle of segment `i` on an unrotated wheel.
pub fn segment_span(i: usize, total: usize) -> (f64, f64) {
    let arc = segment_arc(total);
    let start = i as f64 * arc;
    (start, start + arc)
}

pub fn angle_of_segment_center(i: usize, total: usize) -> f64 {
    let arc = segment_arc(total);
    i as f64 * arc + arc / 2.0
}

/// Fold any angle into `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negatives up to exactly TAU
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Index of the segment found at screen angle `angle` when the wheel is
/// rotated by `orientation`. A boundary belongs to the segment starting there.
pub fn segment_at_angle(angle: f64, total: usize, orientation: f64) -> usize {
    if total == 0 {
        return 0;
    }
    let local = normalize_angle(angle - orientation);
    let index = (local / segment_arc(total)).floor() as usize;
    index.min(total - 1)
}

/// Canvas angle of a point given by its offset from the wheel center.
pub fn point_angle(dx: f64, dy: f64) -> f64 {
    normalize_angle(dy.atan2(dx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_cycle_when_no_seam_conflict() {
        let colors: Vec<usize> = (0..6).map(|i| color_for_segment(i, 6)).collect();
        assert_eq!(colors, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn last_segment_shifts_on_seam_conflict() {
        let colors: Vec<usize> = (0..4).map(|i| color_for_segment(i, 4)).collect();
        assert_eq!(colors, vec![0, 1, 2, 1]);
        assert_eq!(color_for_segment(0, 1), 1);
    }

    #[test]
    fn labels_contrast_with_fill() {
        assert_eq!(label_color_for(0), WHITE);
        assert_eq!(label_color_for(1), BLUE);
        assert_eq!(label_color_for(2), WHITE);
    }

    #[test]
    fn centers_sit_mid_segment() {
        let (start, end) = segment_span(2, 8);
        let center = angle_of_segment_center(2, 8);
        assert!((center - (start + end) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn normalize_folds_into_range() {
        assert!((normalize_angle(-PI / 2.0) - 3.0 * PI / 2.0).abs() < 1e-12);
        assert!((normalize_angle(5.0 * TAU + 1.0) - 1.0).abs() < 1e-9);
        assert_eq!(normalize_angle(-1e-18), 0.0);
        assert_eq!(normalize_angle(TAU), 0.0);
    }

    #[test]
    fn boundary_belongs_to_next_segment() {
        let (_, end) = segment_span(0, 4);
        assert_eq!(segment_at_angle(end + 1e-9, 4, 0.0), 1);
        assert_eq!(segment_at_angle(end - 1e-9, 4, 0.0), 0);
    }

    #[test]
    fn rotation_is_inverted() {
        // A quarter turn clockwise: segment 0 of 4 now starts at 6 o'clock.
        let orientation = PI / 2.0;
        assert_eq!(segment_at_angle(PI / 2.0 + 0.1, 4, orientation), 0);
        assert_eq!(segment_at_angle(POINTER_ANGLE + 0.1, 4, orientation), 2);
    }

    #[test]
    fn point_angle_matches_canvas_convention() {
        assert!((point_angle(0.0, -10.0) - POINTER_ANGLE).abs() < 1e-12);
        assert!(point_angle(10.0, 0.0).abs() < 1e-12);
        assert!((point_angle(0.0, 10.0) - PI / 2.0).abs() < 1e-12);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Neighbours never share a color, including across the wrap seam.
            #[test]
            fn adjacent_segments_differ(total in 2usize..2000, offset in 0usize..2000) {
                let i = offset % total;
                let next = (i + 1) % total;
                prop_assert_ne!(color_for_segment(i, total), color_for_segment(next, total));
            }

            #[test]
            fn center_round_trips(total in 1usize..5000, offset in 0usize..5000) {
                let i = offset % total;
                prop_assert_eq!(segment_at_angle(angle_of_segment_center(i, total), total, 0.0), i);
            }

            #[test]
            fn rotation_shifts_lookup(total in 1usize..500, offset in 0usize..500, turns in -50i32..50) {
                let i = offset % total;
                let orientation = turns as f64 * 0.37;
                let screen = angle_of_segment_center(i, total) + orientation;
                prop_assert_eq!(segment_at_angle(screen, total, orientation), i);
            }

            #[test]
            fn normalized_angles_stay_in_range(angle in -1e6f64..1e6) {
                let n = normalize_angle(angle);
                prop_assert!((0.0..TAU).contains(&n));
            }
        }
    }
}
