//! Control logic of the footswitch MIDI controller.
//!
//! Everything in here is independent of the board: inputs, the MIDI transport, the status
//! LED and the bootloader are reached through the small traits defined next to the code
//! that uses them, so the whole control loop runs on the host in tests.

#![cfg_attr(not(test), no_std)]

// must stay first, the logging macros are used by every other module
#[macro_use]
mod fmt;

pub mod analog_filter;
pub mod color_override;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod input;
pub mod led;
pub mod midi;

#[cfg(test)]
mod mock;

pub use controller::{Bootloader, Controller, ControllerState, Io};
pub use error::Error;
