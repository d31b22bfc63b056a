//! Virtual mode synthesis
//!
//! Non-multi-mode host backends report a single native resolution. To give
//! applications the resolution menu they expect, a list of virtual modes is
//! synthesized from a fixed table of standard sizes bounded by the host's
//! maximum, crossed with a small set of color depths and refresh rates.

use crate::devmode::DeviceMode;
use smallvec::SmallVec;
use tracing::debug;

/// Standard sizes considered for virtual modes, grouped by aspect ratio
const VIRTUAL_SIZES: &[(u32, u32)] = &[
    // 4:3
    (320, 240),
    (400, 300),
    (512, 384),
    (640, 480),
    (768, 576),
    (800, 600),
    (1024, 768),
    (1152, 864),
    (1280, 960),
    (1400, 1050),
    (1600, 1200),
    (2048, 1536),
    // 16:9
    (1280, 720),
    (1366, 768),
    (1600, 900),
    (1920, 1080),
    (2560, 1440),
    (3200, 1800),
    (3840, 2160),
    // 16:10
    (1280, 800),
    (1440, 900),
    (1680, 1050),
    (1920, 1200),
    (2560, 1600),
    // 3:2
    (2160, 1440),
    (2256, 1504),
    // 21:9
    (2560, 1080),
    (3440, 1440),
    // 12:5
    (1920, 800),
    (3840, 1600),
    // 5:4
    (1280, 1024),
    // 5:3
    (1280, 768),
];

/// Landscape-ordered dimensions of a mode, by comparing the dimensions
/// themselves rather than trusting the orientation field (the native
/// orientation may itself be rotated)
fn natural_size(mode: &DeviceMode) -> (u32, u32, bool) {
    let w = mode.width.unwrap_or(0);
    let h = mode.height.unwrap_or(0);
    if h > w { (h, w, true) } else { (w, h, false) }
}

/// Synthesize the virtual mode list for a source whose host reports a
/// single native mode
///
/// Sizes come from the standard table bounded by `maximum`, with the exact
/// `initial` and `maximum` sizes always included; each size is crossed with
/// depths {8, 16, initial depth} and refresh rates {60, initial rate if
/// higher}. Orientation is pinned to the initial mode's orientation, with
/// width and height swapped when the natural orientation is portrait.
pub fn synthesize_virtual_modes(initial: &DeviceMode, maximum: &DeviceMode) -> Vec<DeviceMode> {
    let (init_w, init_h, portrait) = natural_size(initial);
    let (max_w, max_h, _) = natural_size(maximum);

    let mut sizes: SmallVec<[(u32, u32); 40]> = SmallVec::new();
    let mut push_size = |w: u32, h: u32| {
        if !sizes.contains(&(w, h)) {
            sizes.push((w, h));
        }
    };
    push_size(init_w, init_h);
    push_size(max_w, max_h);
    for &(w, h) in VIRTUAL_SIZES {
        if w <= max_w && h <= max_h {
            push_size(w, h);
        }
    }

    let initial_depth = initial.bits_per_pixel.unwrap_or(32);
    let mut depths: SmallVec<[u32; 3]> = SmallVec::new();
    for depth in [8, 16, initial_depth] {
        if !depths.contains(&depth) {
            depths.push(depth);
        }
    }

    let initial_refresh = initial.refresh.unwrap_or(60);
    let mut refreshes: SmallVec<[u32; 2]> = SmallVec::new();
    refreshes.push(60);
    if initial_refresh > 60 {
        refreshes.push(initial_refresh);
    }

    let mut modes = Vec::with_capacity(sizes.len() * depths.len() * refreshes.len());
    for &(w, h) in &sizes {
        let (w, h) = if portrait { (h, w) } else { (w, h) };
        for &depth in &depths {
            for &refresh in &refreshes {
                let mut mode = DeviceMode::active(w, h, depth, refresh);
                mode.orientation = initial.orientation;
                modes.push(mode);
            }
        }
    }
    debug!(
        "synthesized {} virtual modes up to {max_w}x{max_h}",
        modes.len()
    );
    modes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devmode::Orientation;

    #[test]
    fn test_all_modes_within_maximum() {
        let initial = DeviceMode::active(1920, 1080, 32, 60);
        let modes = synthesize_virtual_modes(&initial, &initial);
        for mode in &modes {
            assert!(mode.width.unwrap() <= 1920, "{mode}");
            assert!(mode.height.unwrap() <= 1080, "{mode}");
        }
    }

    #[test]
    fn test_initial_and_maximum_included() {
        let initial = DeviceMode::active(1280, 720, 32, 60);
        let maximum = DeviceMode::active(2560, 1440, 32, 60);
        let modes = synthesize_virtual_modes(&initial, &maximum);
        assert!(modes.iter().any(|m| m.width == Some(1280) && m.height == Some(720)));
        assert!(modes.iter().any(|m| m.width == Some(2560) && m.height == Some(1440)));
    }

    #[test]
    fn test_nonstandard_initial_size_kept_verbatim() {
        let initial = DeviceMode::active(1437, 891, 32, 60);
        let maximum = DeviceMode::active(1920, 1080, 32, 60);
        let modes = synthesize_virtual_modes(&initial, &maximum);
        assert!(modes.iter().any(|m| m.width == Some(1437) && m.height == Some(891)));
    }

    #[test]
    fn test_depth_and_refresh_cross_product() {
        let initial = DeviceMode::active(1920, 1080, 32, 144);
        let modes = synthesize_virtual_modes(&initial, &initial);
        let full_size: Vec<_> = modes
            .iter()
            .filter(|m| m.width == Some(1920) && m.height == Some(1080))
            .collect();
        // depths {8, 16, 32} x refreshes {60, 144}
        assert_eq!(full_size.len(), 6);
        for &depth in &[8u32, 16, 32] {
            for &refresh in &[60u32, 144] {
                assert!(
                    full_size
                        .iter()
                        .any(|m| m.bits_per_pixel == Some(depth) && m.refresh == Some(refresh))
                );
            }
        }
    }

    #[test]
    fn test_initial_depth_not_duplicated() {
        let initial = DeviceMode::active(640, 480, 16, 60);
        let modes = synthesize_virtual_modes(&initial, &initial);
        let depths: Vec<_> = modes
            .iter()
            .filter(|m| m.width == Some(640))
            .map(|m| m.bits_per_pixel)
            .collect();
        assert_eq!(depths.iter().filter(|d| **d == Some(16)).count(), 1);
    }

    #[test]
    fn test_portrait_host_swaps_dimensions() {
        // Native portrait panel reporting default orientation: portrait is
        // detected from the dimensions, not the orientation field
        let initial = DeviceMode::active(1080, 1920, 32, 60);
        let modes = synthesize_virtual_modes(&initial, &initial);
        assert!(modes.iter().any(|m| m.width == Some(1080) && m.height == Some(1920)));
        // Every synthesized mode is portrait
        for mode in &modes {
            assert!(mode.height.unwrap() >= mode.width.unwrap(), "{mode}");
        }
        // Standard sizes appear rotated
        assert!(modes.iter().any(|m| m.width == Some(720) && m.height == Some(1280)));
    }

    #[test]
    fn test_orientation_pinned_to_initial() {
        let mut initial = DeviceMode::active(1920, 1080, 32, 60);
        initial.orientation = Some(Orientation::Rotate180);
        let modes = synthesize_virtual_modes(&initial, &initial);
        assert!(modes.iter().all(|m| m.orientation == Some(Orientation::Rotate180)));
    }

    #[test]
    fn test_no_duplicate_sizes_before_cross_product() {
        // 1920x1080 is both the initial size and a table entry; the size
        // list must dedup before materializing
        let initial = DeviceMode::active(1920, 1080, 32, 60);
        let modes = synthesize_virtual_modes(&initial, &initial);
        let count = modes
            .iter()
            .filter(|m| {
                m.width == Some(1920)
                    && m.height == Some(1080)
                    && m.bits_per_pixel == Some(32)
                    && m.refresh == Some(60)
            })
            .count();
        assert_eq!(count, 1);
    }
}
