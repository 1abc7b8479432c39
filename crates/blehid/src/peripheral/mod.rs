//! HID peripheral orchestration
//!
//! [`PeripheralEngine`] ties the advertising controller, service sequencer,
//! connection registry, request router and report scheduler together behind
//! a single event loop. [`PeripheralHandle`] drives it from other threads.

pub mod engine;
pub mod handle;


pub use engine::PeripheralEngine;
pub use handle::PeripheralHandle;
