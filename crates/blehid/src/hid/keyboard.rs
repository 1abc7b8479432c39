//! Keyboard profile
//!
//! Boot-compatible keyboard with a report ID prefix. Input reports are nine
//! bytes: report ID, modifier bitmask, a reserved byte and six key slots. The
//! single output report carries the host's LED state.

use super::descriptor::*;
use super::profile::{HidProfile, ReportSet, DEFAULT_REPORT_ID};
use crate::report::InputReportSender;
use bitflags::bitflags;
use log::{debug, info, warn};
use std::time::Duration;

/// Input report length including the report ID.
pub const KEYBOARD_REPORT_LEN: usize = 9;

/// Scheduler interval for keyboard reports.
pub const KEYBOARD_REPORT_INTERVAL: Duration = Duration::from_millis(20);

/// Report sent after every key press to release all keys.
pub const KEY_UP_REPORT: [u8; KEYBOARD_REPORT_LEN] = [DEFAULT_REPORT_ID, 0, 0, 0, 0, 0, 0, 0, 0];

#[rustfmt::skip]
pub const KEYBOARD_REPORT_MAP: &[u8] = &[
    usage_page(1), USAGE_PAGE_GENERIC_DESKTOP,
    usage(1), USAGE_KEYBOARD,
    collection(1), COLLECTION_APPLICATION,
    report_id(1), DEFAULT_REPORT_ID,
    // Modifier byte
    usage_page(1), USAGE_PAGE_KEY_CODES,
    usage_minimum(1), 0xE0,
    usage_maximum(1), 0xE7,
    logical_minimum(1), 0x00,
    logical_maximum(1), 0x01,
    report_size(1), 0x01,
    report_count(1), 0x08,
    input(1), DATA_VARIABLE_ABSOLUTE,
    // Reserved byte
    report_count(1), 0x01,
    report_size(1), 0x08,
    input(1), CONSTANT,
    // LED output report
    report_count(1), 0x05,
    report_size(1), 0x01,
    usage_page(1), USAGE_PAGE_LEDS,
    usage_minimum(1), 0x01,
    usage_maximum(1), 0x05,
    output(1), DATA_VARIABLE_ABSOLUTE,
    report_count(1), 0x01,
    report_size(1), 0x03,
    output(1), CONSTANT,
    // Key slots
    report_count(1), 0x06,
    report_size(1), 0x08,
    logical_minimum(1), 0x00,
    logical_maximum(1), 0x65,
    usage_page(1), USAGE_PAGE_KEY_CODES,
    usage_minimum(1), 0x00,
    usage_maximum(1), 0x65,
    input(1), DATA_ARRAY_ABSOLUTE,
    end_collection(0),
];

bitflags! {
    /// Modifier byte of a keyboard input report
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const LEFT_CTRL = 0x01;
        const LEFT_SHIFT = 0x02;
        const LEFT_ALT = 0x04;
        const LEFT_GUI = 0x08;
        const RIGHT_CTRL = 0x10;
        const RIGHT_SHIFT = 0x20;
        const RIGHT_ALT = 0x40;
        const RIGHT_GUI = 0x80;
    }
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers::empty();
    pub const CTRL: Modifiers = Modifiers::LEFT_CTRL;
    pub const SHIFT: Modifiers = Modifiers::LEFT_SHIFT;
    pub const ALT: Modifiers = Modifiers::LEFT_ALT;
}

bitflags! {
    /// Keyboard LEDs as written by the host
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LedState: u8 {
        const NUM_LOCK = 0x01;
        const CAPS_LOCK = 0x02;
        const SCROLL_LOCK = 0x04;
        const COMPOSE = 0x08;
        const KANA = 0x10;
    }
}

// Key codes outside the character table
pub const KEY_ENTER: u8 = 0x28;
pub const KEY_ESCAPE: u8 = 0x29;
pub const KEY_BACKSPACE: u8 = 0x2A;
pub const KEY_TAB: u8 = 0x2B;
pub const KEY_SPACE: u8 = 0x2C;
pub const KEY_CAPS_LOCK: u8 = 0x39;
pub const KEY_F1: u8 = 0x3A;
pub const KEY_F12: u8 = 0x45;
pub const KEY_DELETE: u8 = 0x4C;
pub const KEY_RIGHT_ARROW: u8 = 0x4F;
pub const KEY_LEFT_ARROW: u8 = 0x50;
pub const KEY_DOWN_ARROW: u8 = 0x51;
pub const KEY_UP_ARROW: u8 = 0x52;

/// Modifier needed to type `c` on a US layout.
pub fn modifier(c: char) -> Modifiers {
    match c {
        'A'..='Z' => Modifiers::SHIFT,
        '!' | '@' | '#' | '$' | '%' | '^' | '&' | '*' | '(' | ')' => Modifiers::SHIFT,
        '_' | '+' | '{' | '}' | '|' | ':' | '"' | '~' | '<' | '>' | '?' => Modifiers::SHIFT,
        _ => Modifiers::NONE,
    }
}

/// US layout key code for `c`, independent of shift state.
pub fn key_code(c: char) -> Option<u8> {
    let code = match c {
        'a'..='z' => 0x04 + (c as u8 - b'a'),
        'A'..='Z' => 0x04 + (c as u8 - b'A'),
        '1'..='9' => 0x1E + (c as u8 - b'1'),
        '!' => 0x1E,
        '@' => 0x1F,
        '#' => 0x20,
        '$' => 0x21,
        '%' => 0x22,
        '^' => 0x23,
        '&' => 0x24,
        '*' => 0x25,
        '(' => 0x26,
        '0' | ')' => 0x27,
        '\n' => KEY_ENTER,
        '\u{1b}' => KEY_ESCAPE,
        '\u{8}' => KEY_BACKSPACE,
        '\t' => KEY_TAB,
        ' ' => KEY_SPACE,
        '-' | '_' => 0x2D,
        '=' | '+' => 0x2E,
        '[' | '{' => 0x2F,
        ']' | '}' => 0x30,
        '\\' | '|' => 0x31,
        ';' | ':' => 0x33,
        '\'' | '"' => 0x34,
        '`' | '~' => 0x35,
        ',' | '<' => 0x36,
        '.' | '>' => 0x37,
        '/' | '?' => 0x38,
        _ => return None,
    };
    Some(code)
}

/// Input report with one key held.
pub fn key_down_report(modifiers: Modifiers, key: u8) -> [u8; KEYBOARD_REPORT_LEN] {
    [DEFAULT_REPORT_ID, modifiers.bits(), 0, key, 0, 0, 0, 0, 0]
}

/// Press/release report pairs typing `text`. Characters missing from the layout are skipped.
pub fn text_reports(text: &str) -> Vec<[u8; KEYBOARD_REPORT_LEN]> {
    let mut reports = Vec::with_capacity(text.len() * 2);
    for c in text.chars() {
        match key_code(c) {
            Some(key) => {
                reports.push(key_down_report(modifier(c), key));
                reports.push(KEY_UP_REPORT);
            }
            None => debug!("No key code for {:?}, skipping", c),
        }
    }
    reports
}

/// Decodes an LED output report.
///
/// Accepts either `[report id, leds, ..]` or a bare LED byte.
pub fn decode_led_report(report: &[u8]) -> Option<LedState> {
    let raw = match report {
        [DEFAULT_REPORT_ID, leds, ..] => *leds,
        [leds] => *leds,
        _ => return None,
    };
    Some(LedState::from_bits_truncate(raw))
}

/// GATT side of the keyboard: report map and LED handling
#[derive(Debug, Default)]
pub struct KeyboardProfile {
    leds: LedState,
}

impl KeyboardProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// LED state last written by the host.
    pub fn leds(&self) -> LedState {
        self.leds
    }
}

impl HidProfile for KeyboardProfile {
    fn report_descriptor(&self) -> &[u8] {
        KEYBOARD_REPORT_MAP
    }

    fn handle_output_report(&mut self, report: &[u8]) {
        match decode_led_report(report) {
            Some(leds) => {
                info!("Host LED state: {:?}", leds);
                self.leds = leds;
            }
            None => warn!("Ignoring malformed LED report {}", hex::encode(report)),
        }
    }

    fn reports(&self) -> ReportSet {
        ReportSet {
            input: true,
            output: true,
            feature: false,
        }
    }

    fn report_interval(&self) -> Duration {
        KEYBOARD_REPORT_INTERVAL
    }

    fn name(&self) -> &'static str {
        "keyboard"
    }
}

/// Produces keyboard input reports onto the engine's queue
#[derive(Debug, Clone)]
pub struct KeyboardEncoder {
    reports: InputReportSender,
}

impl KeyboardEncoder {
    pub fn new(reports: InputReportSender) -> Self {
        Self { reports }
    }

    /// Types `text`, one press and one release per character.
    ///
    /// Returns the number of reports queued.
    pub fn send_keys(&self, text: &str) -> usize {
        text_reports(text)
            .into_iter()
            .filter(|report| self.reports.push(report.to_vec()))
            .count()
    }

    pub fn send_key_down(&self, modifiers: Modifiers, key: u8) -> bool {
        self.reports.push(key_down_report(modifiers, key).to_vec())
    }

    pub fn send_key_up(&self) -> bool {
        self.reports.push(KEY_UP_REPORT.to_vec())
    }
}
