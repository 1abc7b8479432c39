//! Capability interface implemented by every HID profile

use crate::gatt::ReportKind;
use std::time::Duration;

/// Report ID used by the built-in keyboard and mouse report maps.
pub const DEFAULT_REPORT_ID: u8 = 0x01;

/// Which Report characteristics a profile exposes in the HID service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSet {
    pub input: bool,
    pub output: bool,
    pub feature: bool,
}

impl ReportSet {
    /// Report kinds in declaration order.
    pub fn kinds(&self) -> Vec<ReportKind> {
        let mut kinds = Vec::new();
        if self.input {
            kinds.push(ReportKind::Input);
        }
        if self.output {
            kinds.push(ReportKind::Output);
        }
        if self.feature {
            kinds.push(ReportKind::Feature);
        }
        kinds
    }
}

/// A HID device personality served over GATT.
///
/// The engine reads the report map and report layout from the profile and
/// hands it every report the host writes.
pub trait HidProfile: Send {
    /// The report map served on the Report Map characteristic.
    fn report_descriptor(&self) -> &[u8];

    /// Called with the raw value of every write to a Report characteristic.
    fn handle_output_report(&mut self, report: &[u8]);

    /// Report characteristics to declare.
    fn reports(&self) -> ReportSet;

    /// Report ID announced in Report Reference descriptors.
    fn report_id(&self) -> u8 {
        DEFAULT_REPORT_ID
    }

    /// How often the scheduler drains one queued input report.
    fn report_interval(&self) -> Duration;

    /// Short name used in log output.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_set_order() {
        let all = ReportSet {
            input: true,
            output: true,
            feature: true,
        };
        assert_eq!(
            all.kinds(),
            vec![ReportKind::Input, ReportKind::Output, ReportKind::Feature]
        );

        let input_only = ReportSet {
            input: true,
            output: false,
            feature: false,
        };
        assert_eq!(input_only.kinds(), vec![ReportKind::Input]);
    }
}
