//! System metrics
//!
//! `GetSystemMetrics`-shaped queries. Each metric resolves to a stored
//! parameter, a value derived from a couple of stored parameters (the
//! minimum-tracking sizes come from the caption metrics), or a live
//! display-topology query (screen size, virtual-screen bounds, monitor
//! count). Metrics never fail: when the topology is unusable the screen
//! metrics fall back to a 640x480 default rather than reporting an error.

use crate::dpi::{USER_DEFAULT_SCREEN_DPI, map_dpi_rect};
use crate::geometry::Rect;
use crate::sysparams::SystemParameter;
use crate::system::WinSystem;
use tracing::warn;

/// Fallback screen rectangle when no topology is available
const FALLBACK_SCREEN: Rect = Rect::new(0, 0, 640, 480);

/// The metrics addressable through `GetSystemMetrics`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum SystemMetric {
    CxScreen,
    CyScreen,
    CxVirtualScreen,
    CyVirtualScreen,
    XVirtualScreen,
    YVirtualScreen,
    CMonitors,
    SameDisplayFormat,
    CxBorder,
    CyBorder,
    CxDoubleClk,
    CyDoubleClk,
    CxDrag,
    CyDrag,
    CxIcon,
    CyIcon,
    CxCursor,
    CyCursor,
    CxIconSpacing,
    CyIconSpacing,
    CyCaption,
    CySmCaption,
    CxSize,
    CySize,
    CxSmSize,
    CySmSize,
    CxVScroll,
    CyVScroll,
    CxHScroll,
    CyHScroll,
    CyMenu,
    CxMenuSize,
    CyMenuSize,
    CxEdge,
    CyEdge,
    CxFixedFrame,
    CyFixedFrame,
    CxSizeFrame,
    CySizeFrame,
    CxMinTrack,
    CyMinTrack,
    CxMaxTrack,
    CyMaxTrack,
    CxFullScreen,
    CyFullScreen,
    CxFocusBorder,
    CyFocusBorder,
    MouseButtons,
    SwapButton,
    CleanBoot,
}

impl WinSystem {
    /// Query a system metric in the caller's DPI space
    pub fn get_system_metrics(&self, metric: SystemMetric) -> i32 {
        let dpi = self.caller_dpi(self.system_dpi());
        self.metric_for_dpi(metric, dpi)
    }

    /// Query a system metric at an explicit DPI
    pub fn get_system_metrics_for_dpi(&self, metric: SystemMetric, dpi: u32) -> i32 {
        let dpi = if dpi == 0 { USER_DEFAULT_SCREEN_DPI } else { dpi };
        self.metric_for_dpi(metric, dpi)
    }

    fn param_uint(&self, param: SystemParameter, dpi: u32) -> i32 {
        let value = self.params().get(param, dpi);
        i32::try_from(value.as_uint().unwrap_or(0)).unwrap_or(i32::MAX)
    }

    /// Primary monitor rectangle mapped into the given DPI space
    fn screen_rect(&self, dpi: u32) -> Rect {
        match self.topology().read(false) {
            Ok(topo) => topo.primary_monitor().map_or(FALLBACK_SCREEN, |m| {
                map_dpi_rect(m.rc_monitor, m.dpi(), dpi)
            }),
            Err(e) => {
                warn!("screen metric without topology: {e}");
                FALLBACK_SCREEN
            }
        }
    }

    /// Virtual-screen bounds mapped into the given DPI space
    fn virtual_rect(&self, dpi: u32) -> Rect {
        match self.topology().read(false) {
            Ok(topo) => {
                let rect = topo.virtual_screen_rect();
                if rect.is_empty() {
                    FALLBACK_SCREEN
                } else {
                    map_dpi_rect(rect, self.system_dpi(), dpi)
                }
            }
            Err(_) => FALLBACK_SCREEN,
        }
    }

    #[allow(clippy::too_many_lines)]
    fn metric_for_dpi(&self, metric: SystemMetric, dpi: u32) -> i32 {
        use SystemMetric as M;
        match metric {
            M::CxScreen => self.screen_rect(dpi).width(),
            M::CyScreen => self.screen_rect(dpi).height(),
            M::CxVirtualScreen => self.virtual_rect(dpi).width(),
            M::CyVirtualScreen => self.virtual_rect(dpi).height(),
            M::XVirtualScreen => self.virtual_rect(dpi).left,
            M::YVirtualScreen => self.virtual_rect(dpi).top,
            M::CMonitors => self
                .topology()
                .read(false)
                .map(|topo| {
                    i32::try_from(topo.active_monitors().filter(|m| !m.is_clone).count())
                        .unwrap_or(i32::MAX)
                })
                .unwrap_or(1),
            M::SameDisplayFormat => self
                .topology()
                .read(false)
                .map(|topo| {
                    let mut depths = topo
                        .sources
                        .iter()
                        .filter(|s| s.is_attached())
                        .map(|s| s.current_mode().bits_per_pixel.unwrap_or(32));
                    let first = depths.next().unwrap_or(32);
                    i32::from(depths.all(|d| d == first))
                })
                .unwrap_or(1),
            M::CxBorder | M::CyBorder => self.param_uint(SystemParameter::Border, dpi),
            M::CxDoubleClk => self.param_uint(SystemParameter::DoubleClickWidth, dpi),
            M::CyDoubleClk => self.param_uint(SystemParameter::DoubleClickHeight, dpi),
            M::CxDrag => self.param_uint(SystemParameter::DragWidth, dpi),
            M::CyDrag => self.param_uint(SystemParameter::DragHeight, dpi),
            M::CxIcon | M::CyIcon | M::CxCursor | M::CyCursor => {
                crate::dpi::map_dpi_point(crate::geometry::Point::new(32, 32), 96, dpi).x
            }
            M::CxIconSpacing => self.param_uint(SystemParameter::IconHorizontalSpacing, dpi),
            M::CyIconSpacing => self.param_uint(SystemParameter::IconVerticalSpacing, dpi),
            // Caption bars are one pixel taller than the stored glyph size
            M::CyCaption => self.param_uint(SystemParameter::CaptionHeight, dpi) + 1,
            M::CySmCaption => self.param_uint(SystemParameter::SmCaptionHeight, dpi) + 1,
            M::CxSize => self.param_uint(SystemParameter::CaptionWidth, dpi),
            M::CySize => self.param_uint(SystemParameter::CaptionHeight, dpi),
            M::CxSmSize => self.param_uint(SystemParameter::SmCaptionWidth, dpi),
            M::CySmSize => self.param_uint(SystemParameter::SmCaptionHeight, dpi),
            M::CxVScroll | M::CxHScroll => self.param_uint(SystemParameter::ScrollWidth, dpi),
            M::CyVScroll | M::CyHScroll => self.param_uint(SystemParameter::ScrollHeight, dpi),
            M::CyMenu => self.param_uint(SystemParameter::MenuHeight, dpi) + 1,
            M::CxMenuSize => self.param_uint(SystemParameter::MenuWidth, dpi),
            M::CyMenuSize => self.param_uint(SystemParameter::MenuHeight, dpi),
            M::CxEdge | M::CyEdge => 2,
            M::CxFixedFrame | M::CyFixedFrame => {
                self.param_uint(SystemParameter::Border, dpi) + 2
            }
            M::CxSizeFrame | M::CySizeFrame => {
                self.param_uint(SystemParameter::Border, dpi) + 3
            }
            M::CxMinTrack => {
                // Room for the caption buttons plus the resize frame
                2 * self.metric_for_dpi(M::CxSizeFrame, dpi)
                    + 4 * self.metric_for_dpi(M::CxSize, dpi)
            }
            M::CyMinTrack => {
                self.metric_for_dpi(M::CyCaption, dpi)
                    + 2 * self.metric_for_dpi(M::CySizeFrame, dpi)
            }
            M::CxMaxTrack => {
                self.virtual_rect(dpi).width() + 2 * self.metric_for_dpi(M::CxSizeFrame, dpi)
            }
            M::CyMaxTrack => {
                self.virtual_rect(dpi).height() + 2 * self.metric_for_dpi(M::CySizeFrame, dpi)
            }
            M::CxFullScreen => self.screen_rect(dpi).width(),
            M::CyFullScreen => {
                self.screen_rect(dpi).height() - self.metric_for_dpi(M::CyCaption, dpi)
            }
            M::CxFocusBorder => self.param_uint(SystemParameter::FocusBorderWidth, dpi),
            M::CyFocusBorder => self.param_uint(SystemParameter::FocusBorderHeight, dpi),
            M::MouseButtons => 3,
            M::SwapButton => i32::from(
                self.params()
                    .get(SystemParameter::MouseButtonSwap, dpi)
                    .as_bool()
                    .unwrap_or(false),
            ),
            M::CleanBoot => 0,
        }
    }
}
