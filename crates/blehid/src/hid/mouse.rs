//! Mouse profile
//!
//! Three buttons, relative X/Y and a wheel. Input reports are five bytes:
//! report ID, button bitmask, then signed 8-bit dx, dy and wheel.

use super::descriptor::*;
use super::profile::{HidProfile, ReportSet, DEFAULT_REPORT_ID};
use crate::report::InputReportSender;
use bitflags::bitflags;
use log::debug;
use std::time::Duration;

pub const MOUSE_REPORT_LEN: usize = 5;

pub const MOUSE_REPORT_INTERVAL: Duration = Duration::from_millis(10);

#[rustfmt::skip]
pub const MOUSE_REPORT_MAP: &[u8] = &[
    usage_page(1), USAGE_PAGE_GENERIC_DESKTOP,
    usage(1), USAGE_MOUSE,
    collection(1), COLLECTION_APPLICATION,
    report_id(1), DEFAULT_REPORT_ID,
    usage(1), USAGE_POINTER,
    collection(1), COLLECTION_PHYSICAL,
    // Buttons
    usage_page(1), USAGE_PAGE_BUTTON,
    usage_minimum(1), 0x01,
    usage_maximum(1), 0x03,
    logical_minimum(1), 0x00,
    logical_maximum(1), 0x01,
    report_count(1), 0x03,
    report_size(1), 0x01,
    input(1), DATA_VARIABLE_ABSOLUTE,
    // Padding
    report_count(1), 0x01,
    report_size(1), 0x05,
    input(1), CONSTANT_VARIABLE_ABSOLUTE,
    // Axes
    usage_page(1), USAGE_PAGE_GENERIC_DESKTOP,
    usage(1), USAGE_X,
    usage(1), USAGE_Y,
    usage(1), USAGE_WHEEL,
    logical_minimum(1), 0x81,
    logical_maximum(1), 0x7F,
    report_size(1), 0x08,
    report_count(1), 0x03,
    input(1), DATA_VARIABLE_RELATIVE,
    end_collection(0),
    end_collection(0),
];

bitflags! {
    /// Button byte of a mouse input report
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MouseButtons: u8 {
        const LEFT = 0x01;
        const RIGHT = 0x02;
        const MIDDLE = 0x04;
    }
}

/// Encodes a movement report. Deltas wrap to 8 bits, they are not clamped.
pub fn movement_report(dx: i32, dy: i32, wheel: i32, buttons: MouseButtons) -> [u8; MOUSE_REPORT_LEN] {
    [
        DEFAULT_REPORT_ID,
        buttons.bits(),
        dx as i8 as u8,
        dy as i8 as u8,
        wheel as i8 as u8,
    ]
}

/// GATT side of the mouse
#[derive(Debug, Default)]
pub struct MouseProfile;

impl MouseProfile {
    pub fn new() -> Self {
        MouseProfile
    }
}

impl HidProfile for MouseProfile {
    fn report_descriptor(&self) -> &[u8] {
        MOUSE_REPORT_MAP
    }

    fn handle_output_report(&mut self, report: &[u8]) {
        debug!("Mouse has no output reports, ignoring {}", hex::encode(report));
    }

    fn reports(&self) -> ReportSet {
        ReportSet {
            input: true,
            output: false,
            feature: false,
        }
    }

    fn report_interval(&self) -> Duration {
        MOUSE_REPORT_INTERVAL
    }

    fn name(&self) -> &'static str {
        "mouse"
    }
}

/// Produces mouse input reports onto the engine's queue
#[derive(Debug, Clone)]
pub struct MouseEncoder {
    reports: InputReportSender,
}

impl MouseEncoder {
    pub fn new(reports: InputReportSender) -> Self {
        Self { reports }
    }

    pub fn send_movement(&self, dx: i32, dy: i32, wheel: i32, buttons: MouseButtons) -> bool {
        self.reports.push(movement_report(dx, dy, wheel, buttons).to_vec())
    }

    /// Presses and releases `buttons` without moving.
    pub fn send_click(&self, buttons: MouseButtons) -> bool {
        let pressed = self.send_movement(0, 0, 0, buttons);
        let released = self.send_movement(0, 0, 0, MouseButtons::empty());
        pressed && released
    }
}
