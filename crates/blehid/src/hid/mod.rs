//! HID profiles served over GATT
//!
//! Report descriptor items, the `HidProfile` capability trait and the
//! built-in keyboard and mouse profiles with their report encoders.

pub mod descriptor;
pub mod keyboard;
pub mod mouse;
pub mod profile;

#[cfg(test)]
mod tests;

pub use keyboard::{KeyboardEncoder, KeyboardProfile, LedState, Modifiers};
pub use mouse::{MouseButtons, MouseEncoder, MouseProfile};
pub use profile::{HidProfile, ReportSet, DEFAULT_REPORT_ID};
