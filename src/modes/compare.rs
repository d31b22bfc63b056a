//! Total order over device modes
//!
//! Every per-source supported-mode list is kept sorted under this
//! comparator so negotiation can take the first compatible entry and rely
//! on it being the best one.

use crate::devmode::DeviceMode;
use std::cmp::Ordering;

/// Compare two modes under the canonical list order
///
/// Depth descending, landscape-normalized size ascending (width before
/// height), refresh descending, then orientation, interlace flag and
/// fixed-output ascending. The order is total: any two modes differing in
/// any of these fields compare unequal, so re-sorting a sorted list is a
/// no-op and sorting is stable by construction.
pub fn mode_compare(a: &DeviceMode, b: &DeviceMode) -> Ordering {
    let depth_a = a.bits_per_pixel.unwrap_or(0);
    let depth_b = b.bits_per_pixel.unwrap_or(0);
    depth_b
        .cmp(&depth_a)
        .then_with(|| {
            let (wa, ha) = a.landscape_size();
            let (wb, hb) = b.landscape_size();
            wa.cmp(&wb).then_with(|| ha.cmp(&hb))
        })
        .then_with(|| b.refresh.unwrap_or(0).cmp(&a.refresh.unwrap_or(0)))
        .then_with(|| a.orientation.unwrap_or_default().cmp(&b.orientation.unwrap_or_default()))
        .then_with(|| a.interlaced.unwrap_or(false).cmp(&b.interlaced.unwrap_or(false)))
        .then_with(|| a.fixed_output.unwrap_or_default().cmp(&b.fixed_output.unwrap_or_default()))
}
