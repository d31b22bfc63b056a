//! Shared test utilities for `windisplay` unit tests.
//!
//! This module provides common test infrastructure used across multiple
//! test modules. It is only compiled during testing (`#[cfg(test)]`).

use crate::devmode::DeviceMode;
use crate::geometry::{Point, Rect};
use crate::topology::{DeviceEvent, PciId, SourceFlags};

/// Driver event sequence for one GPU with one primary 1920x1080 source and
/// one monitor reserving a 40px taskbar strip at the bottom
pub fn single_source_events() -> Vec<DeviceEvent> {
    let mut current = DeviceMode::active(1920, 1080, 32, 60);
    current.position = Some(Point::default());
    vec![
        DeviceEvent::AddGpu {
            name: "Test GPU".to_string(),
            pci_id: PciId {
                vendor: 0x10DE,
                device: 0x2684,
            },
            vulkan_uuid: None,
        },
        DeviceEvent::AddSource {
            name: "host-0".to_string(),
            flags: SourceFlags::ATTACHED | SourceFlags::PRIMARY | SourceFlags::VGA_COMPATIBLE,
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
                DeviceMode::active(640, 480, 32, 60),
                DeviceMode::active(800, 600, 32, 60),
                DeviceMode::active(1024, 768, 32, 60),
                DeviceMode::active(1920, 1080, 16, 60),
                DeviceMode::active(1920, 1080, 32, 60),
                DeviceMode::active(1920, 1080, 32, 144),
            ],
        },
    ]
}

/// Driver event sequence for one GPU with a primary 1920x1080 source and a
/// secondary 1280x1024 source to its right
pub fn dual_source_events() -> Vec<DeviceEvent> {
    let mut primary_mode = DeviceMode::active(1920, 1080, 32, 60);
    primary_mode.position = Some(Point::default());
    let mut secondary_mode = DeviceMode::active(1280, 1024, 32, 60);
    secondary_mode.position = Some(Point::new(1920, 0));
    vec![
        DeviceEvent::AddGpu {
            name: "Test GPU".to_string(),
            pci_id: PciId {
                vendor: 0x10DE,
                device: 0x2684,
            },
            vulkan_uuid: None,
        },
        DeviceEvent::AddSource {
            name: "host-0".to_string(),
            flags: SourceFlags::ATTACHED | SourceFlags::PRIMARY,
            dpi: 96,
        },
        DeviceEvent::AddMonitor {
            monitor_rect: Rect::new(0, 0, 1920, 1080),
            work_rect: Rect::new(0, 0, 1920, 1040),
            edid: Vec::new(),
        },
        DeviceEvent::AddModes {
            current: primary_mode,
            modes: vec![
                DeviceMode::active(1024, 768, 32, 60),
                DeviceMode::active(1920, 1080, 32, 60),
            ],
        },
        DeviceEvent::AddSource {
            name: "host-1".to_string(),
            flags: SourceFlags::ATTACHED,
            dpi: 96,
        },
        DeviceEvent::AddMonitor {
            monitor_rect: Rect::new(1920, 0, 1920 + 1280, 1024),
            work_rect: Rect::new(1920, 0, 1920 + 1280, 1024),
            edid: Vec::new(),
        },
        DeviceEvent::AddModes {
            current: secondary_mode,
            modes: vec![
                DeviceMode::active(1024, 768, 32, 60),
                DeviceMode::active(1280, 1024, 32, 60),
            ],
        },
    ]
}
