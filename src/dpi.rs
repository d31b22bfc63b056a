//! DPI and coordinate-space mapping
//!
//! Pure functions converting rectangles and points between independent
//! scalar coordinate spaces. Nothing here holds state: callers resolve the
//! ambient DPI awareness (per thread, falling back to the process default)
//! into plain `dpi_from`/`dpi_to` arguments before mapping.
//!
//! Three spaces exist: unaware (fixed 96 DPI), system-DPI, and per-monitor
//! raw DPI. Mapping into a monitor's raw space additionally compounds the
//! DPI ratio with the monitor's virtual-to-physical resolution ratio,
//! applied around the monitor's own origin, because "raw" (physical) and
//! "virtual" (possibly synthesized) spaces generally differ in scale along
//! each axis.

use crate::devmode::DeviceMode;
use crate::geometry::{Point, Rect};
use std::cell::Cell;

/// The DPI of the unaware coordinate space
pub const USER_DEFAULT_SCREEN_DPI: u32 = 96;

/// Per-thread / per-process DPI awareness
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DpiAwareness {
    /// Caller sees 96-DPI-fixed pixels
    #[default]
    Unaware,
    /// Caller sees system-DPI-scaled pixels
    SystemAware,
    /// Caller sees device-native pixels
    PerMonitorAware,
}

thread_local! {
    static THREAD_AWARENESS: Cell<Option<DpiAwareness>> = const { Cell::new(None) };
}

/// Override the DPI awareness of the calling thread
///
/// Returns the previous thread override, if any. Passing `None` clears the
/// override, falling back to the process default.
pub fn set_thread_dpi_awareness(awareness: Option<DpiAwareness>) -> Option<DpiAwareness> {
    THREAD_AWARENESS.with(|cell| cell.replace(awareness))
}

/// The calling thread's DPI awareness, falling back to the given process default
pub fn thread_dpi_awareness(process_default: DpiAwareness) -> DpiAwareness {
    THREAD_AWARENESS.with(Cell::get).unwrap_or(process_default)
}

/// Rounding multiply-divide, the scaling primitive for every mapping
///
/// Matches the Win32 `MulDiv` contract: the result is rounded to the
/// nearest integer, away from zero on exact halves.
fn muldiv(value: i32, numerator: i32, denominator: i32) -> i32 {
    if denominator == 0 {
        return 0;
    }
    let product = i64::from(value) * i64::from(numerator);
    let denominator = i64::from(denominator);
    let half = denominator.abs() / 2;
    let rounded = if product < 0 {
        (product - half) / denominator
    } else {
        (product + half) / denominator
    };
    i32::try_from(rounded).unwrap_or(if rounded < 0 { i32::MIN } else { i32::MAX })
}

/// Scale a point between two DPI spaces
///
/// A zero/unset DPI on either side, or equal DPIs, make this a no-op; an
/// uninitialized monitor DPI must never corrupt coordinates.
pub fn map_dpi_point(pt: Point, dpi_from: u32, dpi_to: u32) -> Point {
    if dpi_from == 0 || dpi_to == 0 || dpi_from == dpi_to {
        return pt;
    }
    let (num, den) = (dpi_to.cast_signed(), dpi_from.cast_signed());
    Point::new(muldiv(pt.x, num, den), muldiv(pt.y, num, den))
}

/// Scale all four edges of a rectangle between two DPI spaces
pub fn map_dpi_rect(rect: Rect, dpi_from: u32, dpi_to: u32) -> Rect {
    if dpi_from == 0 || dpi_to == 0 || dpi_from == dpi_to {
        return rect;
    }
    let (num, den) = (dpi_to.cast_signed(), dpi_from.cast_signed());
    Rect::new(
        muldiv(rect.left, num, den),
        muldiv(rect.top, num, den),
        muldiv(rect.right, num, den),
        muldiv(rect.bottom, num, den),
    )
}

/// Scale every rectangle of a region between two DPI spaces
pub fn map_dpi_region(rects: &mut [Rect], dpi_from: u32, dpi_to: u32) {
    for rect in rects {
        *rect = map_dpi_rect(*rect, dpi_from, dpi_to);
    }
}

/// Per-axis scale factor between a source's virtual and physical modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleRatio {
    /// Numerator (physical dimension)
    pub num: u32,
    /// Denominator (virtual dimension)
    pub den: u32,
}

impl ScaleRatio {
    /// The identity ratio
    pub const ONE: Self = Self { num: 1, den: 1 };

    /// True if scaling by this ratio changes nothing
    pub fn is_identity(&self) -> bool {
        self.num == self.den || self.num == 0 || self.den == 0
    }
}

/// Ratio between a source's physical mode and its current (possibly
/// virtual) mode, on the aspect-matched dimension
///
/// When the two modes have different aspect ratios only one axis scales
/// cleanly; the dimension kept is the one the physical panel constrains
/// first (width when the physical aspect is at least as wide as the
/// current aspect, height otherwise).
pub fn virt_to_raw_ratio(physical: &DeviceMode, current: &DeviceMode) -> ScaleRatio {
    let (pw, ph) = (physical.width.unwrap_or(0), physical.height.unwrap_or(0));
    let (cw, ch) = (current.width.unwrap_or(0), current.height.unwrap_or(0));
    if pw == 0 || ph == 0 || cw == 0 || ch == 0 {
        return ScaleRatio::ONE;
    }
    // Cross-multiplied aspect comparison avoids rounding
    if u64::from(pw) * u64::from(ch) >= u64::from(ph) * u64::from(cw) {
        ScaleRatio { num: pw, den: cw }
    } else {
        ScaleRatio { num: ph, den: ch }
    }
}

fn scale_coord(value: i32, ratio: ScaleRatio) -> i32 {
    if ratio.is_identity() {
        return value;
    }
    muldiv(value, ratio.num.cast_signed(), ratio.den.cast_signed())
}

/// Map a rectangle from a monitor's virtual space to its raw space
///
/// Two-stage transform around the monitor's own origin: translate into
/// monitor-local coordinates, scale by the DPI ratio, scale again by the
/// virtual-to-physical resolution ratio, then translate to the raw-space
/// origin. Off-monitor global coordinates translate correctly even when
/// the monitor is not at the origin.
pub fn map_rect_virt_to_raw(
    rect: Rect,
    virt_origin: Point,
    raw_origin: Point,
    dpi_from: u32,
    dpi_to: u32,
    ratio: ScaleRatio,
) -> Rect {
    let local = rect.offset(-virt_origin.x, -virt_origin.y);
    let local = map_dpi_rect(local, dpi_from, dpi_to);
    let local = Rect::new(
        scale_coord(local.left, ratio),
        scale_coord(local.top, ratio),
        scale_coord(local.right, ratio),
        scale_coord(local.bottom, ratio),
    );
    local.offset(raw_origin.x, raw_origin.y)
}

/// Inverse of [`map_rect_virt_to_raw`]
pub fn map_rect_raw_to_virt(
    rect: Rect,
    raw_origin: Point,
    virt_origin: Point,
    dpi_from: u32,
    dpi_to: u32,
    ratio: ScaleRatio,
) -> Rect {
    let inverse = ScaleRatio {
        num: ratio.den,
        den: ratio.num,
    };
    let local = rect.offset(-raw_origin.x, -raw_origin.y);
    let local = Rect::new(
        scale_coord(local.left, inverse),
        scale_coord(local.top, inverse),
        scale_coord(local.right, inverse),
        scale_coord(local.bottom, inverse),
    );
    let local = map_dpi_rect(local, dpi_from, dpi_to);
    local.offset(virt_origin.x, virt_origin.y)
}
