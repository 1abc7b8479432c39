//! Thread-safe handle to a running engine
//!
//! Every operation posts to the engine's channels and returns immediately.

use crate::config::DeviceIdentity;
use crate::error::{Error, Result};
use crate::event::{Command, Event, EventSender};
use crate::hid::{KeyboardEncoder, MouseEncoder};
use crate::report::InputReportSender;

#[derive(Debug, Clone)]
pub struct PeripheralHandle {
    events: EventSender,
    reports: InputReportSender,
}

impl PeripheralHandle {
    pub(crate) fn new(events: EventSender, reports: InputReportSender) -> Self {
        Self { events, reports }
    }

    fn command(&self, command: Command) -> Result<()> {
        self.events.send(Event::Command(command))
    }

    pub fn start(&self) -> Result<()> {
        self.command(Command::Start)
    }

    pub fn stop(&self) -> Result<()> {
        self.command(Command::Stop)
    }

    pub fn disconnect_all(&self) -> Result<()> {
        self.command(Command::DisconnectAll)
    }

    pub fn set_battery_level(&self, level: u8) -> Result<()> {
        self.command(Command::SetBatteryLevel(level))
    }

    pub fn set_identity(&self, identity: DeviceIdentity) -> Result<()> {
        self.command(Command::SetIdentity(identity))
    }

    /// Stops the peripheral and ends the engine's dispatch loop.
    pub fn shutdown(&self) -> Result<()> {
        self.events.send(Event::Shutdown)
    }

    /// Queues a raw input report.
    pub fn send_report(&self, report: Vec<u8>) -> Result<()> {
        if report.is_empty() || self.reports.push(report) {
            Ok(())
        } else {
            Err(Error::EngineClosed)
        }
    }

    pub fn reports(&self) -> InputReportSender {
        self.reports.clone()
    }

    pub fn keyboard(&self) -> KeyboardEncoder {
        KeyboardEncoder::new(self.reports.clone())
    }

    pub fn mouse(&self) -> MouseEncoder {
        MouseEncoder::new(self.reports.clone())
    }
}
