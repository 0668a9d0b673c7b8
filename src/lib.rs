#![no_std]

// shared by the controller firmware and the hardware check tool

pub mod adc;
pub mod board;
pub mod config;
pub mod usb_midi;
pub mod ws2812b;
