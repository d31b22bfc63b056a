//! Display placement engine
//!
//! Computes a non-overlapping, gap-free virtual-desktop layout for a set of
//! per-source device modes. Stale stored positions are treated as hints of
//! where each display used to sit, never trusted directly: the whole layout
//! is re-anchored at the primary display's origin and every display is
//! re-placed by snapping it against the already-placed ones with the
//! smallest possible translation.
//!
//! Greedy minimum-offset placement approximates "keep monitors visually
//! where the user last had them, snapped together with no gaps" without an
//! explicit stored layout graph. Ties between equal minimal offsets resolve
//! to the first candidate found in traversal order.

use crate::devmode::DeviceMode;
use crate::geometry::{Point, Rect};
use smallvec::SmallVec;
use tracing::trace;

fn offset_length_sq(offset: Point) -> i64 {
    let dx = i64::from(offset.x);
    let dy = i64::from(offset.y);
    dx * dx + dy * dy
}

/// Minimum-length translation placing `placing` adjacent to the placed
/// rectangles without overlapping any of them
///
/// Candidates are each corner of the placing rectangle aligned to each
/// vertex of each placed rectangle, plus flush edge alignments generated
/// where the rectangles' horizontal or vertical extents overlap (so a
/// display can slide to side-by-side alignment rather than only
/// corner-to-corner). Returns `None` when nothing is placed yet: the first
/// rectangle anchors the desktop where it is.
fn get_placement_offset(placed: &[Rect], placing: Rect) -> Option<Point> {
    if placed.is_empty() {
        return None;
    }

    let mut candidates: SmallVec<[Point; 64]> = SmallVec::new();
    let corners = |r: Rect| {
        [
            Point::new(r.left, r.top),
            Point::new(r.right, r.top),
            Point::new(r.left, r.bottom),
            Point::new(r.right, r.bottom),
        ]
    };

    for &rect in placed {
        for own in corners(placing) {
            for vertex in corners(rect) {
                candidates.push(Point::new(vertex.x - own.x, vertex.y - own.y));
            }
        }
        // Flush edge alignments, keeping the other axis unchanged, valid
        // only while the extents actually overlap so the result is adjacent
        if placing.top < rect.bottom && rect.top < placing.bottom {
            candidates.push(Point::new(rect.right - placing.left, 0));
            candidates.push(Point::new(rect.left - placing.right, 0));
        }
        if placing.left < rect.right && rect.left < placing.right {
            candidates.push(Point::new(0, rect.bottom - placing.top));
            candidates.push(Point::new(0, rect.top - placing.bottom));
        }
    }

    let mut best: Option<(Point, i64)> = None;
    for candidate in candidates {
        let moved = placing.offset(candidate.x, candidate.y);
        if placed.iter().any(|r| moved.intersects(r)) {
            continue;
        }
        let length = offset_length_sq(candidate);
        // Strict comparison keeps the first-found candidate on ties
        if best.is_none_or(|(_, b)| length < b) {
            best = Some((candidate, length));
        }
    }
    best.map(|(offset, _)| offset)
}

/// Compute positions for every attached mode in the batch
///
/// The mode at `primary` anchors the layout: every position is first
/// translated so the primary sits at the origin, then all attached modes
/// are re-placed greedily, lowest-cost candidate first. Detached modes are
/// left untouched and contribute no placement constraint. Fields other
/// than position are never modified.
pub fn place_all(modes: &mut [DeviceMode], primary: usize) {
    let Some(origin) = modes.get(primary).and_then(|m| m.position) else {
        return;
    };

    // Re-anchor the whole layout without changing relative offsets
    for mode in modes.iter_mut() {
        if let Some(pos) = mode.position {
            mode.position = Some(Point::new(pos.x - origin.x, pos.y - origin.y));
        }
    }

    // Everything attached gets re-placed fresh; the translated rectangles
    // only serve as desired locations for the offset search
    let mut pending: Vec<usize> = (0..modes.len())
        .filter(|&i| !modes[i].is_detached() && !modes[i].rect().is_empty())
        .collect();
    // The primary is considered first on every pass, so the zero-length
    // first-anchor tie resolves to it and it stays at the origin
    if let Some(pos) = pending.iter().position(|&i| i == primary) {
        pending.swap(0, pos);
    }

    let mut placed_rects: Vec<Rect> = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let mut best: Option<(usize, Point, i64)> = None;
        for (slot, &index) in pending.iter().enumerate() {
            let rect = modes[index].rect();
            let offset = get_placement_offset(&placed_rects, rect).unwrap_or_default();
            let length = offset_length_sq(offset);
            if best.is_none_or(|(_, _, b)| length < b) {
                best = Some((slot, offset, length));
            }
        }
        let Some((slot, offset, length)) = best else {
            break;
        };
        let index = pending.remove(slot);
        let pos = modes[index].position.unwrap_or_default();
        let placed = Point::new(pos.x + offset.x, pos.y + offset.y);
        trace!(
            "placed {} at ({},{}) offset length {length}",
            modes[index], placed.x, placed.y
        );
        modes[index].position = Some(placed);
        placed_rects.push(modes[index].rect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode_at(x: i32, y: i32, w: u32, h: u32) -> DeviceMode {
        let mut m = DeviceMode::active(w, h, 32, 60);
        m.position = Some(Point::new(x, y));
        m
    }

    #[test]
    fn test_primary_anchors_at_origin() {
        let mut modes = vec![mode_at(300, 400, 1920, 1080), mode_at(2220, 400, 1280, 1024)];
        place_all(&mut modes, 0);
        assert_eq!(modes[0].position, Some(Point::new(0, 0)));
    }

    #[test]
    fn test_two_monitor_gap_closes_to_flush() {
        // A at the origin, B 80 pixels adrift to the right: placement must
        // snap B flush against A's right edge
        let mut modes = vec![mode_at(0, 0, 1920, 1080), mode_at(2000, 0, 1920, 1080)];
        place_all(&mut modes, 0);
        assert_eq!(modes[0].position, Some(Point::new(0, 0)));
        assert_eq!(modes[1].position, Some(Point::new(1920, 0)));
        assert_eq!(modes[1].rect(), Rect::new(1920, 0, 3840, 1080));
    }

    #[test]
    fn test_already_flush_layout_is_stable() {
        let mut modes = vec![mode_at(0, 0, 1920, 1080), mode_at(1920, 0, 1920, 1080)];
        place_all(&mut modes, 0);
        assert_eq!(modes[0].position, Some(Point::new(0, 0)));
        assert_eq!(modes[1].position, Some(Point::new(1920, 0)));
    }

    #[test]
    fn test_overlapping_layout_separates() {
        let mut modes = vec![mode_at(0, 0, 1920, 1080), mode_at(100, 0, 1920, 1080)];
        place_all(&mut modes, 0);
        let a = modes[0].rect();
        let b = modes[1].rect();
        assert!(!a.intersects(&b));
        // Sliding down is the shortest escape (1080 < 1820), keeping the
        // horizontal drift the user had
        assert_eq!(modes[1].position, Some(Point::new(100, 1080)));
    }

    #[test]
    fn test_vertical_stack() {
        let mut modes = vec![mode_at(0, 0, 1920, 1080), mode_at(0, 1200, 1920, 1080)];
        place_all(&mut modes, 0);
        assert_eq!(modes[1].position, Some(Point::new(0, 1080)));
    }

    #[test]
    fn test_primary_not_first_in_list() {
        let mut modes = vec![mode_at(-1300, 0, 1280, 1024), mode_at(0, 0, 1920, 1080)];
        place_all(&mut modes, 1);
        assert_eq!(modes[1].position, Some(Point::new(0, 0)));
        assert_eq!(modes[0].position, Some(Point::new(-1280, 0)));
    }

    #[test]
    fn test_detached_modes_untouched() {
        let sentinel = DeviceMode::detached(Point::new(5000, 5000));
        let mut modes = vec![mode_at(0, 0, 1920, 1080), sentinel, mode_at(2000, 0, 1280, 1024)];
        place_all(&mut modes, 0);
        assert_eq!(modes[1], sentinel);
        // The attached pair still snaps together around the sentinel
        assert_eq!(modes[2].position, Some(Point::new(1920, 0)));
    }

    #[test]
    fn test_all_detached_is_a_no_op() {
        let a = DeviceMode::detached(Point::new(0, 0));
        let b = DeviceMode::detached(Point::new(1920, 0));
        let mut modes = vec![a, b];
        place_all(&mut modes, 0);
        assert_eq!(modes, vec![a, b]);
    }

    #[test]
    fn test_three_monitors_no_overlap_no_gap() {
        let mut modes = vec![
            mode_at(0, 0, 1920, 1080),
            mode_at(1950, 10, 1920, 1080),
            mode_at(-1300, -5, 1280, 1024),
        ];
        place_all(&mut modes, 0);
        for i in 0..modes.len() {
            for j in i + 1..modes.len() {
                assert!(
                    !modes[i].rect().intersects(&modes[j].rect()),
                    "{} overlaps {}",
                    modes[i],
                    modes[j]
                );
            }
        }
        // Each non-primary display touches at least one other display
        for i in 1..modes.len() {
            let grown = {
                let r = modes[i].rect();
                Rect::new(r.left - 1, r.top - 1, r.right + 1, r.bottom + 1)
            };
            let touches = (0..modes.len())
                .filter(|&j| j != i)
                .any(|j| grown.intersects(&modes[j].rect()));
            assert!(touches, "{} is isolated", modes[i]);
        }
    }

    #[test]
    fn test_fields_other_than_position_untouched() {
        let mut mode = mode_at(100, 100, 1920, 1080);
        mode.interlaced = Some(true);
        mode.bits_per_pixel = Some(16);
        let mut modes = vec![mode];
        place_all(&mut modes, 0);
        assert_eq!(modes[0].interlaced, Some(true));
        assert_eq!(modes[0].bits_per_pixel, Some(16));
        assert_eq!(modes[0].width, Some(1920));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_layout() -> impl Strategy<Value = Vec<DeviceMode>> {
            prop::collection::vec(
                (
                    -4000i32..4000,
                    -4000i32..4000,
                    prop::sample::select(vec![800u32, 1024, 1280, 1920, 2560]),
                    prop::sample::select(vec![600u32, 768, 1024, 1080, 1440]),
                ),
                1..6,
            )
            .prop_map(|slots| {
                slots
                    .into_iter()
                    .map(|(x, y, w, h)| mode_at(x, y, w, h))
                    .collect()
            })
        }

        proptest! {
            /// Property: placement never produces overlapping rectangles and
            /// always pins the primary to the origin
            #[test]
            fn placement_is_non_overlapping(mut modes in arb_layout()) {
                place_all(&mut modes, 0);
                prop_assert_eq!(modes[0].position, Some(Point::new(0, 0)));
                for i in 0..modes.len() {
                    prop_assert!(modes[i].position.is_some());
                    for j in i + 1..modes.len() {
                        prop_assert!(!modes[i].rect().intersects(&modes[j].rect()));
                    }
                }
            }

            /// Property: re-running placement on its own output changes nothing
            #[test]
            fn placement_is_idempotent(mut modes in arb_layout()) {
                place_all(&mut modes, 0);
                let once = modes.clone();
                place_all(&mut modes, 0);
                prop_assert_eq!(modes, once);
            }
        }
    }
}
