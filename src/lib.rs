#![cfg_attr(not(test), no_std)]

//! # greenhouse-ctl
//! ## A single-loop greenhouse controller in Rust
//!
//! Features:
//! - Temperature monitoring against a knob-set reference (ventilation)
//! - Humidity monitoring against a threshold (blinking irrigation indicator)
//! - Debounced page button for the 128x64 status display
//! - Serial menu for status, setpoint edits and manual actuator override
//!
//! Everything in here is hardware agnostic; the board lives in `main.rs`.

pub mod actuators;
pub mod blink;
pub mod button;
pub mod config;
pub mod console;
pub mod greenhouse;
pub mod numbers;
pub mod rendering;
pub mod sensors;
pub mod setpoints;
pub mod timer;

#[cfg(test)]
pub(crate) mod testing;

/// Error types for the greenhouse controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Error {
    /// A digital pin could not be read or driven
    Pin,
    /// The serial console could not be written
    Serial,
    /// The display rejected a draw or flush
    Display,
}
