//! Integration tests for `windisplay`
//!
//! Exercises the full stack end to end: driver bootstrap, store
//! persistence, metric and work-area queries, monitor enumeration, mode
//! negotiation and display re-layout.

use std::sync::Arc;
use windisplay::devmode::DeviceMode;
use windisplay::geometry::{Point, Rect};
use windisplay::sysparams::entry::ParamValue;
use windisplay::system::{SystemOptions, WinSystem};
use windisplay::topology::{DeviceEvent, HostDriver, PciId, SourceFlags, StaticDriver};
use windisplay::{ChangeFlags, EnumSettingsFlags, SettingsMode, SystemMetric, SystemParameter, UpdateFlags};

/// One GPU, one primary 1920x1080 source, one monitor with a 40px taskbar
/// strip reserved at the bottom of its work area
fn desktop_events() -> Vec<DeviceEvent> {
    let mut current = DeviceMode::active(1920, 1080, 32, 60);
    current.position = Some(Point::default());
    vec![
        DeviceEvent::AddGpu {
            name: "Integration GPU".to_string(),
            pci_id: PciId {
                vendor: 0x1002,
                device: 0x744C,
            },
            vulkan_uuid: None,
        },
        DeviceEvent::AddSource {
            name: "card0-DP-1".to_string(),
            flags: SourceFlags::ATTACHED | SourceFlags::PRIMARY,
            dpi: 96,
        },
        DeviceEvent::AddMonitor {
            monitor_rect: Rect::new(0, 0, 1920, 1080),
            work_rect: Rect::new(0, 0, 1920, 1040),
            edid: Vec::new(),
        },
        DeviceEvent::AddModes {
            current,
            modes: vec![
                DeviceMode::active(1024, 768, 32, 60),
                DeviceMode::active(1920, 1080, 16, 60),
                DeviceMode::active(1920, 1080, 32, 60),
            ],
        },
    ]
}

fn desktop_system() -> WinSystem {
    WinSystem::init(
        Arc::new(StaticDriver::new(desktop_events())),
        SystemOptions::default(),
    )
}

/// Fresh cache with one GPU, one primary source and one monitor: the work
/// area reflects the driver's taskbar reservation and exactly one monitor
/// is enumerated with the full monitor rectangle
#[test]
fn test_work_area_and_monitor_enumeration_scenario() {
    let sys = desktop_system();

    assert_eq!(sys.get_work_area(), Rect::new(0, 0, 1920, 1040));

    let mut callbacks = Vec::new();
    sys.enum_display_monitors(|handle, rect| {
        callbacks.push((handle, rect));
        true
    })
    .unwrap();
    assert_eq!(callbacks.len(), 1);
    assert_eq!(callbacks[0].1, Rect::new(0, 0, 1920, 1080));

    let info = sys.get_monitor_info(callbacks[0].0).unwrap();
    assert!(info.primary);
    assert_eq!(info.rc_monitor, Rect::new(0, 0, 1920, 1080));
    assert_eq!(info.rc_work, Rect::new(0, 0, 1920, 1040));
}

/// Requesting 1920x1080 at 16bpp selects the 16bpp/60Hz entry even though
/// the 32bpp entry matches width and height too
#[test]
fn test_depth_negotiation_scenario() {
    let sys = desktop_system();

    let mut request = DeviceMode::default();
    request.width = Some(1920);
    request.height = Some(1080);
    request.bits_per_pixel = Some(16);
    sys.change_display_settings(None, Some(&request), ChangeFlags::empty())
        .unwrap();

    let current = sys
        .enum_display_settings(None, SettingsMode::Current, EnumSettingsFlags::default())
        .unwrap();
    assert_eq!(current.bits_per_pixel, Some(16));
    assert_eq!(current.refresh, Some(60));
    assert_eq!(current.width, Some(1920));
}

/// Metrics and parameters work against the same live topology
#[test]
fn test_metrics_follow_display_changes() {
    let sys = desktop_system();
    assert_eq!(sys.get_system_metrics(SystemMetric::CxScreen), 1920);
    assert_eq!(sys.get_system_metrics(SystemMetric::CyScreen), 1080);
    assert_eq!(sys.get_system_metrics(SystemMetric::CMonitors), 1);

    let request = DeviceMode::active(1024, 768, 32, 60);
    sys.change_display_settings(None, Some(&request), ChangeFlags::empty())
        .unwrap();

    assert_eq!(sys.get_system_metrics(SystemMetric::CxScreen), 1024);
    assert_eq!(sys.get_system_metrics(SystemMetric::CyScreen), 768);
}

/// Parameter writes persist through a store snapshot across contexts
#[test]
fn test_parameter_persistence_across_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    {
        let sys = WinSystem::init(
            Arc::new(StaticDriver::new(desktop_events())),
            SystemOptions {
                snapshot_path: Some(path.clone()),
                ..SystemOptions::default()
            },
        );
        sys.spi_set(
            SystemParameter::DoubleClickTime,
            &ParamValue::UInt(250),
            UpdateFlags::UPDATE_INI_FILE,
        )
        .unwrap();
        sys.shutdown().unwrap();
    }

    let sys = WinSystem::init(
        Arc::new(StaticDriver::new(desktop_events())),
        SystemOptions {
            snapshot_path: Some(path),
            ..SystemOptions::default()
        },
    );
    assert_eq!(
        sys.spi_get(SystemParameter::DoubleClickTime),
        ParamValue::UInt(250)
    );
}

/// A second context over the same store picks up display changes made by
/// the first, without consulting its own driver
#[test]
fn test_cross_context_staleness_detection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let first = WinSystem::init(
        Arc::new(StaticDriver::new(desktop_events())),
        SystemOptions {
            snapshot_path: Some(path.clone()),
            ..SystemOptions::default()
        },
    );
    first.topology().read(false).unwrap();

    let request = DeviceMode::active(1024, 768, 32, 60);
    first
        .change_display_settings(None, Some(&request), ChangeFlags::UPDATE_REGISTRY)
        .unwrap();
    first.shutdown().unwrap();

    let second_driver = Arc::new(StaticDriver::new(desktop_events()));
    let second = WinSystem::init(
        Arc::clone(&second_driver) as Arc<dyn HostDriver>,
        SystemOptions {
            snapshot_path: Some(path),
            ..SystemOptions::default()
        },
    );
    assert_eq!(second.get_system_metrics(SystemMetric::CxScreen), 1024);
    assert_eq!(second_driver.enumeration_count(), 0);
}

/// Dual-monitor desktop: changing the primary's resolution re-places the
/// secondary flush against it, and the virtual screen follows
#[test]
fn test_multi_monitor_relayout_scenario() {
    let mut primary_mode = DeviceMode::active(1920, 1080, 32, 60);
    primary_mode.position = Some(Point::default());
    let mut secondary_mode = DeviceMode::active(1920, 1080, 32, 60);
    secondary_mode.position = Some(Point::new(2000, 0));

    let events = vec![
        DeviceEvent::AddGpu {
            name: "Integration GPU".to_string(),
            pci_id: PciId {
                vendor: 0x1002,
                device: 0x744C,
            },
            vulkan_uuid: None,
        },
        DeviceEvent::AddSource {
            name: "card0-DP-1".to_string(),
            flags: SourceFlags::ATTACHED | SourceFlags::PRIMARY,
            dpi: 96,
        },
        DeviceEvent::AddMonitor {
            monitor_rect: Rect::new(0, 0, 1920, 1080),
            work_rect: Rect::new(0, 0, 1920, 1080),
            edid: Vec::new(),
        },
        DeviceEvent::AddModes {
            current: primary_mode,
            modes: vec![DeviceMode::active(1920, 1080, 32, 60)],
        },
        DeviceEvent::AddSource {
            name: "card0-HDMI-1".to_string(),
            flags: SourceFlags::ATTACHED,
            dpi: 96,
        },
        DeviceEvent::AddMonitor {
            monitor_rect: Rect::new(2000, 0, 3920, 1080),
            work_rect: Rect::new(2000, 0, 3920, 1080),
            edid: Vec::new(),
        },
        DeviceEvent::AddModes {
            current: secondary_mode,
            modes: vec![DeviceMode::active(1920, 1080, 32, 60)],
        },
    ];
    let sys = WinSystem::init(
        Arc::new(StaticDriver::new(events)),
        SystemOptions::default(),
    );

    // Re-applying the current primary mode snaps the drifted secondary
    // flush: A=(0,0,1920,1080), B originally 80px adrift, lands at 1920
    let request = DeviceMode::active(1920, 1080, 32, 60);
    sys.change_display_settings(None, Some(&request), ChangeFlags::empty())
        .unwrap();

    let secondary = sys
        .enum_display_settings(
            Some("DISPLAY2"),
            SettingsMode::Current,
            EnumSettingsFlags::default(),
        )
        .unwrap();
    assert_eq!(secondary.position, Some(Point::new(1920, 0)));
    assert_eq!(
        sys.get_system_metrics(SystemMetric::CxVirtualScreen),
        3840
    );
    assert_eq!(sys.get_system_metrics(SystemMetric::CMonitors), 2);
}

/// A single-native-mode host still offers a full resolution menu through
/// settings enumeration, and every entry fits the native bounds
#[test]
fn test_virtual_mode_menu_scenario() {
    let mut current = DeviceMode::active(1920, 1080, 32, 60);
    current.position = Some(Point::default());
    let events = vec![
        DeviceEvent::AddGpu {
            name: "Embedded GPU".to_string(),
            pci_id: PciId::default(),
            vulkan_uuid: None,
        },
        DeviceEvent::AddSource {
            name: "builtin".to_string(),
            flags: SourceFlags::ATTACHED | SourceFlags::PRIMARY,
            dpi: 96,
        },
        DeviceEvent::AddMonitor {
            monitor_rect: Rect::new(0, 0, 1920, 1080),
            work_rect: Rect::new(0, 0, 1920, 1080),
            edid: Vec::new(),
        },
        DeviceEvent::AddModes {
            current,
            modes: vec![current],
        },
    ];
    let sys = WinSystem::init(
        Arc::new(StaticDriver::new(events)),
        SystemOptions::default(),
    );

    let mut count = 0;
    let mut saw_800x600 = false;
    while let Some(mode) = sys.enum_display_settings(
        None,
        SettingsMode::Index(count),
        EnumSettingsFlags::default(),
    ) {
        assert!(mode.width.unwrap() <= 1920);
        assert!(mode.height.unwrap() <= 1080);
        saw_800x600 |= mode.width == Some(800) && mode.height == Some(600);
        count += 1;
    }
    assert!(count > 20, "only {count} modes enumerated");
    assert!(saw_800x600);

    // Negotiating one of the synthesized modes works end to end
    let request = DeviceMode::active(1280, 720, 32, 60);
    sys.change_display_settings(None, Some(&request), ChangeFlags::empty())
        .unwrap();
    assert_eq!(sys.get_system_metrics(SystemMetric::CxScreen), 1280);
}

/// Without a display backend the whole surface still answers with the
/// synthetic default adapter
#[test]
fn test_degraded_mode_without_backend() {
    let sys = WinSystem::init(
        Arc::new(windisplay::topology::NoopDriver),
        SystemOptions::default(),
    );
    assert_eq!(sys.get_system_metrics(SystemMetric::CxScreen), 1024);
    assert_eq!(sys.get_work_area(), Rect::new(0, 0, 1024, 768));

    let device = sys.enum_display_devices(None, 0).unwrap();
    assert_eq!(device.device_string, "Default Display Adapter");

    let mut count = 0;
    sys.enum_display_monitors(|_, _| {
        count += 1;
        true
    })
    .unwrap();
    assert_eq!(count, 1);
}

/// Service sessions get the pinned synthetic monitor
#[test]
fn test_service_session_scenario() {
    let sys = WinSystem::init(
        Arc::new(StaticDriver::new(desktop_events())),
        SystemOptions {
            service_session: true,
            ..SystemOptions::default()
        },
    );
    assert_eq!(sys.get_work_area(), Rect::new(0, 0, 1024, 768));
    assert_eq!(sys.get_system_metrics(SystemMetric::CMonitors), 1);
    assert_eq!(sys.enum_display_devices(None, 0), None);
}
