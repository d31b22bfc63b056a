//! System parameter table and dispatch
//!
//! The getters and setters behind `SystemParametersInfo` resolve here: a
//! static table maps each [`SystemParameter`] to the store key and typed
//! kind it persists as, and [`SysParams`] dispatches get/set per kind with
//! a per-process cache invalidated by the store's per-key write serials.
//!
//! Getters never fail: a missing or corrupt stored value degrades to the
//! entry's default, matching long-standing caller expectations that these
//! functions "always return something".

pub mod entry;

use crate::dpi::USER_DEFAULT_SCREEN_DPI;
use crate::error::{Result, WinDisplayError};
use crate::registry::{RegistryStore, Value};
use entry::{FontSpec, LogFont, ParamEntry, ParamKind, ParamValue, Rgb, metric_to_pixels};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

const DESKTOP_KEY: &str = "Control Panel\\Desktop";
const METRICS_KEY: &str = "Control Panel\\Desktop\\WindowMetrics";
const MOUSE_KEY: &str = "Control Panel\\Mouse";
const KEYBOARD_KEY: &str = "Control Panel\\Keyboard";
const SOUND_KEY: &str = "Control Panel\\Sound";
const COLORS_KEY: &str = "Control Panel\\Colors";
const SHOWSOUNDS_KEY: &str = "Control Panel\\Accessibility\\ShowSounds";

/// Default `UserPreferencesMask` bits
const USER_PREFERENCES_DEFAULT: &[u8] = &[0x9E, 0x3E, 0x07, 0x80, 0x12, 0x00, 0x00, 0x00];

const CAPTION_FONT: FontSpec = FontSpec {
    height: -11,
    weight: 700,
    face: "Tahoma",
};
const UI_FONT: FontSpec = FontSpec {
    height: -11,
    weight: 400,
    face: "Tahoma",
};

/// Every parameter addressable through the `SystemParametersInfo` surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum SystemParameter {
    Beep,
    MouseThreshold1,
    MouseThreshold2,
    MouseAcceleration,
    MouseSpeed,
    MouseButtonSwap,
    MouseHoverWidth,
    MouseHoverHeight,
    MouseHoverTime,
    DoubleClickTime,
    DoubleClickWidth,
    DoubleClickHeight,
    KeyboardSpeed,
    KeyboardDelay,
    Border,
    IconHorizontalSpacing,
    IconVerticalSpacing,
    IconTitleWrap,
    ScreenSaveTimeout,
    ScreenSaveActive,
    GridGranularity,
    MenuDropAlignment,
    MenuShowDelay,
    DragFullWindows,
    DragWidth,
    DragHeight,
    ShowSounds,
    WheelScrollLines,
    WheelScrollChars,
    CaretWidth,
    FocusBorderWidth,
    FocusBorderHeight,
    ForegroundLockTimeout,
    ScrollWidth,
    ScrollHeight,
    CaptionWidth,
    CaptionHeight,
    SmCaptionWidth,
    SmCaptionHeight,
    MenuWidth,
    MenuHeight,
    CaptionFont,
    SmCaptionFont,
    MenuFont,
    MessageFont,
    StatusFont,
    IconFont,
    BackgroundColor,
    UserPreferencesMask,
    ActiveWindowTracking,
    MenuAnimation,
    GradientCaptions,
    KeyboardCues,
    HotTracking,
    SelectionFade,
    CursorShadow,
    UiEffects,
}

impl SystemParameter {
    /// The static table row for this parameter
    pub const fn entry(self) -> ParamEntry {
        use ParamKind::{Binary, Bool, Dword, Font, PrefBit, Rgb, Twips, UInt, YesNo};
        let (key, name, kind) = match self {
            Self::Beep => (SOUND_KEY, "Beep", YesNo(true)),
            Self::MouseThreshold1 => (MOUSE_KEY, "MouseThreshold1", UInt(6)),
            Self::MouseThreshold2 => (MOUSE_KEY, "MouseThreshold2", UInt(10)),
            Self::MouseAcceleration => (MOUSE_KEY, "MouseSpeed", UInt(1)),
            Self::MouseSpeed => (MOUSE_KEY, "MouseSensitivity", UInt(10)),
            Self::MouseButtonSwap => (MOUSE_KEY, "SwapMouseButtons", Bool(false)),
            Self::MouseHoverWidth => (MOUSE_KEY, "MouseHoverWidth", UInt(4)),
            Self::MouseHoverHeight => (MOUSE_KEY, "MouseHoverHeight", UInt(4)),
            Self::MouseHoverTime => (MOUSE_KEY, "MouseHoverTime", UInt(400)),
            Self::DoubleClickTime => (MOUSE_KEY, "DoubleClickSpeed", UInt(500)),
            Self::DoubleClickWidth => (MOUSE_KEY, "DoubleClickWidth", UInt(4)),
            Self::DoubleClickHeight => (MOUSE_KEY, "DoubleClickHeight", UInt(4)),
            Self::KeyboardSpeed => (KEYBOARD_KEY, "KeyboardSpeed", UInt(31)),
            Self::KeyboardDelay => (KEYBOARD_KEY, "KeyboardDelay", UInt(1)),
            Self::Border => (DESKTOP_KEY, "BorderWidth", Twips(1)),
            Self::IconHorizontalSpacing => (METRICS_KEY, "IconSpacing", Twips(-1125)),
            Self::IconVerticalSpacing => (METRICS_KEY, "IconVerticalSpacing", Twips(-1125)),
            Self::IconTitleWrap => (DESKTOP_KEY, "IconTitleWrap", Bool(true)),
            Self::ScreenSaveTimeout => (DESKTOP_KEY, "ScreenSaveTimeOut", UInt(300)),
            Self::ScreenSaveActive => (DESKTOP_KEY, "ScreenSaveActive", YesNo(true)),
            Self::GridGranularity => (DESKTOP_KEY, "GridGranularity", UInt(0)),
            Self::MenuDropAlignment => ("Software\\Windows", "MenuDropAlignment", Bool(false)),
            Self::MenuShowDelay => (DESKTOP_KEY, "MenuShowDelay", UInt(400)),
            Self::DragFullWindows => (DESKTOP_KEY, "DragFullWindows", Bool(false)),
            Self::DragWidth => (DESKTOP_KEY, "DragWidth", UInt(4)),
            Self::DragHeight => (DESKTOP_KEY, "DragHeight", UInt(4)),
            Self::ShowSounds => (SHOWSOUNDS_KEY, "On", Bool(false)),
            Self::WheelScrollLines => (DESKTOP_KEY, "WheelScrollLines", UInt(3)),
            Self::WheelScrollChars => (DESKTOP_KEY, "WheelScrollChars", UInt(3)),
            Self::CaretWidth => (DESKTOP_KEY, "CaretWidth", Dword(1)),
            Self::FocusBorderWidth => (DESKTOP_KEY, "FocusBorderWidth", Dword(1)),
            Self::FocusBorderHeight => (DESKTOP_KEY, "FocusBorderHeight", Dword(1)),
            Self::ForegroundLockTimeout => (DESKTOP_KEY, "ForegroundLockTimeout", Dword(0)),
            Self::ScrollWidth => (METRICS_KEY, "ScrollWidth", Twips(16)),
            Self::ScrollHeight => (METRICS_KEY, "ScrollHeight", Twips(16)),
            Self::CaptionWidth => (METRICS_KEY, "CaptionWidth", Twips(18)),
            Self::CaptionHeight => (METRICS_KEY, "CaptionHeight", Twips(18)),
            Self::SmCaptionWidth => (METRICS_KEY, "SmCaptionWidth", Twips(12)),
            Self::SmCaptionHeight => (METRICS_KEY, "SmCaptionHeight", Twips(14)),
            Self::MenuWidth => (METRICS_KEY, "MenuWidth", Twips(18)),
            Self::MenuHeight => (METRICS_KEY, "MenuHeight", Twips(18)),
            Self::CaptionFont => (METRICS_KEY, "CaptionFont", Font(CAPTION_FONT)),
            Self::SmCaptionFont => (METRICS_KEY, "SmCaptionFont", Font(UI_FONT)),
            Self::MenuFont => (METRICS_KEY, "MenuFont", Font(UI_FONT)),
            Self::MessageFont => (METRICS_KEY, "MessageFont", Font(UI_FONT)),
            Self::StatusFont => (METRICS_KEY, "StatusFont", Font(UI_FONT)),
            Self::IconFont => (METRICS_KEY, "IconFont", Font(UI_FONT)),
            Self::BackgroundColor => (COLORS_KEY, "Background", Rgb(entry::Rgb::new(58, 110, 165))),
            Self::UserPreferencesMask => (
                DESKTOP_KEY,
                "UserPreferencesMask",
                Binary(USER_PREFERENCES_DEFAULT),
            ),
            Self::ActiveWindowTracking => (DESKTOP_KEY, "UserPreferencesMask", PrefBit { byte: 0, mask: 0x01 }),
            Self::MenuAnimation => (DESKTOP_KEY, "UserPreferencesMask", PrefBit { byte: 0, mask: 0x02 }),
            Self::GradientCaptions => (DESKTOP_KEY, "UserPreferencesMask", PrefBit { byte: 0, mask: 0x10 }),
            Self::KeyboardCues => (DESKTOP_KEY, "UserPreferencesMask", PrefBit { byte: 0, mask: 0x20 }),
            Self::HotTracking => (DESKTOP_KEY, "UserPreferencesMask", PrefBit { byte: 0, mask: 0x80 }),
            Self::SelectionFade => (DESKTOP_KEY, "UserPreferencesMask", PrefBit { byte: 1, mask: 0x04 }),
            Self::CursorShadow => (DESKTOP_KEY, "UserPreferencesMask", PrefBit { byte: 1, mask: 0x20 }),
            Self::UiEffects => (DESKTOP_KEY, "UserPreferencesMask", PrefBit { byte: 3, mask: 0x80 }),
        };
        ParamEntry { key, name, kind }
    }
}

/// Per-process parameter cache over the configuration store
pub struct SysParams {
    store: Arc<RegistryStore>,
    cache: Mutex<HashMap<SystemParameter, (u64, ParamValue)>>,
}

impl SysParams {
    /// Create the dispatcher over a store
    pub fn new(store: Arc<RegistryStore>) -> Self {
        Self {
            store,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Read a parameter, converting metrics to pixels at `dpi`
    ///
    /// Never fails: missing or corrupt stored values fall back to the
    /// entry's default.
    pub fn get(&self, param: SystemParameter, dpi: u32) -> ParamValue {
        let entry = param.entry();
        let key_serial = self.store.last_write(entry.key).unwrap_or(0);

        // Metric conversion depends on the caller's DPI, so only
        // DPI-independent kinds are cached
        let cacheable = !matches!(entry.kind, ParamKind::Twips(_) | ParamKind::Font(_));
        if cacheable {
            if let Some((serial, value)) = self.cache.lock().get(&param) {
                if *serial >= key_serial {
                    return value.clone();
                }
            }
        }

        let value = self.load(&entry, dpi);
        if cacheable {
            self.cache.lock().insert(param, (key_serial, value.clone()));
        }
        value
    }

    fn load(&self, entry: &ParamEntry, dpi: u32) -> ParamValue {
        match entry.kind {
            ParamKind::UInt(default) => ParamValue::UInt(
                self.store
                    .get_sz(entry.key, entry.name)
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(default),
            ),
            ParamKind::Bool(default) => ParamValue::Bool(
                self.store
                    .get_sz(entry.key, entry.name)
                    .map(|s| s.trim() != "0")
                    .unwrap_or(default),
            ),
            ParamKind::YesNo(default) => ParamValue::Bool(
                self.store
                    .get_sz(entry.key, entry.name)
                    .map(|s| {
                        let s = s.trim();
                        s.eq_ignore_ascii_case("yes") || s == "1"
                    })
                    .unwrap_or(default),
            ),
            ParamKind::Dword(default) => ParamValue::UInt(
                self.store
                    .get_dword(entry.key, entry.name)
                    .unwrap_or(default),
            ),
            ParamKind::Rgb(default) => ParamValue::Rgb(
                self.store
                    .get_sz(entry.key, entry.name)
                    .and_then(|s| Rgb::from_store_string(&s))
                    .unwrap_or(default),
            ),
            ParamKind::Twips(default) => {
                let raw = self
                    .store
                    .get_sz(entry.key, entry.name)
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(default);
                let pixels = metric_to_pixels(raw, dpi);
                ParamValue::UInt(u32::try_from(pixels).unwrap_or(0))
            }
            ParamKind::Font(default) => {
                let mut font = self
                    .store
                    .get_binary(entry.key, entry.name)
                    .and_then(|blob| LogFont::from_blob(&blob))
                    .unwrap_or_else(|| default.to_font());
                if dpi != 0 && dpi != USER_DEFAULT_SCREEN_DPI {
                    let scaled = i64::from(font.height) * i64::from(dpi)
                        / i64::from(USER_DEFAULT_SCREEN_DPI);
                    font.height = i32::try_from(scaled).unwrap_or(font.height);
                }
                ParamValue::Font(font)
            }
            ParamKind::Binary(default) => ParamValue::Binary(
                self.store
                    .get_binary(entry.key, entry.name)
                    .unwrap_or_else(|| default.to_vec()),
            ),
            ParamKind::PrefBit { byte, mask } => {
                let parent = self
                    .store
                    .get_binary(entry.key, entry.name)
                    .unwrap_or_else(|| USER_PREFERENCES_DEFAULT.to_vec());
                let set = parent.get(byte).is_some_and(|b| b & mask != 0);
                ParamValue::Bool(set)
            }
        }
    }

    /// Write a parameter to the store and the cache
    ///
    /// The supplied value must match the entry's kind; a mismatch is
    /// reported as [`WinDisplayError::InvalidParameter`] without touching
    /// the store.
    pub fn set(&self, param: SystemParameter, value: &ParamValue) -> Result<()> {
        let entry = param.entry();
        match (entry.kind, value) {
            (ParamKind::UInt(_), ParamValue::UInt(v)) => {
                self.store.set(entry.key, entry.name, Value::Sz(v.to_string()))?;
            }
            (ParamKind::Bool(_), ParamValue::Bool(b)) => {
                self.store
                    .set(entry.key, entry.name, Value::Sz(String::from(if *b { "1" } else { "0" })))?;
            }
            (ParamKind::YesNo(_), ParamValue::Bool(b)) => {
                self.store.set(
                    entry.key,
                    entry.name,
                    Value::Sz(String::from(if *b { "Yes" } else { "No" })),
                )?;
            }
            (ParamKind::Dword(_), ParamValue::UInt(v)) => {
                self.store.set(entry.key, entry.name, Value::Dword(*v))?;
            }
            (ParamKind::Rgb(_), ParamValue::Rgb(rgb)) => {
                self.store
                    .set(entry.key, entry.name, Value::Sz(rgb.to_store_string()))?;
            }
            (ParamKind::Twips(_), ParamValue::UInt(pixels)) => {
                // Pixels are stored directly; only defaults use twips
                self.store
                    .set(entry.key, entry.name, Value::Sz(pixels.to_string()))?;
            }
            (ParamKind::Font(_), ParamValue::Font(font)) => {
                self.store
                    .set(entry.key, entry.name, Value::Binary(font.to_blob()))?;
            }
            (ParamKind::Binary(_), ParamValue::Binary(bytes)) => {
                self.store
                    .set(entry.key, entry.name, Value::Binary(bytes.clone()))?;
            }
            (ParamKind::PrefBit { byte, mask }, ParamValue::Bool(set)) => {
                let mut parent = self
                    .store
                    .get_binary(entry.key, entry.name)
                    .unwrap_or_else(|| USER_PREFERENCES_DEFAULT.to_vec());
                if parent.len() <= byte {
                    parent.resize(byte + 1, 0);
                }
                if *set {
                    parent[byte] |= mask;
                } else {
                    parent[byte] &= !mask;
                }
                self.store.set(entry.key, entry.name, Value::Binary(parent))?;
                // The parent's cached copy is now stale too
                self.cache.lock().remove(&SystemParameter::UserPreferencesMask);
            }
            _ => {
                warn!("parameter {param:?} rejected mismatched value {value:?}");
                return Err(WinDisplayError::InvalidParameter);
            }
        }
        self.cache.lock().remove(&param);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SysParams {
        SysParams::new(Arc::new(RegistryStore::new()))
    }

    #[test]
    fn test_defaults_without_store_values() {
        let params = params();
        assert_eq!(
            params.get(SystemParameter::DoubleClickTime, 96),
            ParamValue::UInt(500)
        );
        assert_eq!(
            params.get(SystemParameter::Beep, 96),
            ParamValue::Bool(true)
        );
        assert_eq!(
            params.get(SystemParameter::IconHorizontalSpacing, 96),
            ParamValue::UInt(75)
        );
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let params = params();
        params
            .set(SystemParameter::WheelScrollLines, &ParamValue::UInt(7))
            .unwrap();
        assert_eq!(
            params.get(SystemParameter::WheelScrollLines, 96),
            ParamValue::UInt(7)
        );
        // Persisted as a decimal string
        assert_eq!(
            params.store.get_sz("Control Panel\\Desktop", "WheelScrollLines").as_deref(),
            Some("7")
        );
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let params = params();
        let result = params.set(
            SystemParameter::WheelScrollLines,
            &ParamValue::Bool(true),
        );
        assert!(matches!(result, Err(WinDisplayError::InvalidParameter)));
    }

    #[test]
    fn test_metric_scales_with_dpi() {
        let params = params();
        // Default caption height is 18 pixels at any DPI (positive metric)
        assert_eq!(
            params.get(SystemParameter::CaptionHeight, 96),
            ParamValue::UInt(18)
        );
        // Twips default scales: -1125 at 144 dpi = 113px
        assert_eq!(
            params.get(SystemParameter::IconVerticalSpacing, 144),
            ParamValue::UInt(113)
        );
    }

    #[test]
    fn test_yesno_storage_format() {
        let params = params();
        params
            .set(SystemParameter::ScreenSaveActive, &ParamValue::Bool(false))
            .unwrap();
        assert_eq!(
            params.store.get_sz("Control Panel\\Desktop", "ScreenSaveActive").as_deref(),
            Some("No")
        );
        assert_eq!(
            params.get(SystemParameter::ScreenSaveActive, 96),
            ParamValue::Bool(false)
        );
    }

    #[test]
    fn test_pref_bit_reads_parent_default() {
        let params = params();
        // 0x9E has bit 0x02 set and bit 0x01 clear
        assert_eq!(
            params.get(SystemParameter::MenuAnimation, 96),
            ParamValue::Bool(true)
        );
        assert_eq!(
            params.get(SystemParameter::ActiveWindowTracking, 96),
            ParamValue::Bool(false)
        );
    }

    #[test]
    fn test_pref_bit_set_modifies_parent() {
        let params = params();
        params
            .set(SystemParameter::ActiveWindowTracking, &ParamValue::Bool(true))
            .unwrap();
        assert_eq!(
            params.get(SystemParameter::ActiveWindowTracking, 96),
            ParamValue::Bool(true)
        );
        // Sibling bits in the parent mask are untouched
        assert_eq!(
            params.get(SystemParameter::MenuAnimation, 96),
            ParamValue::Bool(true)
        );
        let mask = params.get(SystemParameter::UserPreferencesMask, 96);
        let ParamValue::Binary(bytes) = mask else {
            panic!("expected binary mask");
        };
        assert_eq!(bytes[0], 0x9F);
    }

    #[test]
    fn test_cache_invalidated_by_external_store_write() {
        let params = params();
        assert_eq!(
            params.get(SystemParameter::DoubleClickTime, 96),
            ParamValue::UInt(500)
        );
        params
            .store
            .set("Control Panel\\Mouse", "DoubleClickSpeed", Value::Sz("250".into()))
            .unwrap();
        assert_eq!(
            params.get(SystemParameter::DoubleClickTime, 96),
            ParamValue::UInt(250)
        );
    }

    #[test]
    fn test_font_height_scales_for_dpi() {
        let params = params();
        let ParamValue::Font(font) = params.get(SystemParameter::CaptionFont, 96) else {
            panic!("expected font");
        };
        assert_eq!(font.height, -11);
        let ParamValue::Font(font) = params.get(SystemParameter::CaptionFont, 192) else {
            panic!("expected font");
        };
        assert_eq!(font.height, -22);
    }
}
