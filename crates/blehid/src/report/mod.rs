//! Input report pipeline
//!
//! Producers push encoded reports onto a queue; the engine drains at most one
//! report per timer tick and notifies it to connected hosts.

pub mod queue;
pub mod scheduler;

pub use queue::{input_report_queue, InputReportQueue, InputReportSender};
pub use scheduler::ReportTimer;
