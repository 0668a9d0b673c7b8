//! Status LED presentation.
//!
//! The displayed frame is a pure function of the switch states, the color override and
//! the ambient pot reading; nothing carries over between ticks.

use crate::config::{FULL_BRIGHTNESS, STATUS_LED_INDEX};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scales every channel by `brightness`, clamped to 0.0..=1.0.
    pub fn dimmed(self, brightness: f32) -> Self {
        let brightness = clamp_brightness(brightness);
        let scale = |c: u8| (c as f32 * brightness + 0.5) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

// 0xRRGGBB, the layout the LED driver takes
impl From<Rgb> for u32 {
    fn from(rgb: Rgb) -> u32 {
        ((rgb.r as u32) << 16) | ((rgb.g as u32) << 8) | rgb.b as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedFrame {
    pub color: Rgb,
    pub brightness: f32,
}

/// Pressed state of the three switches shown on the LED.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchStates {
    pub toggle0: bool,
    pub toggle1: bool,
    pub foot_switch: bool,
}

/// Computes the frame for this tick.
///
/// An override wins outright and is shown at full brightness. Without one each switch
/// drives one channel: a pressed toggle turns its red/green channel off, a pressed
/// footswitch turns blue on, and the live pot reading sets the brightness.
pub fn render(states: SwitchStates, color_override: Option<Rgb>, ambient: f32) -> LedFrame {
    match color_override {
        Some(color) => LedFrame {
            color,
            brightness: FULL_BRIGHTNESS,
        },
        None => LedFrame {
            color: Rgb::new(
                if states.toggle0 { 0 } else { 255 },
                if states.toggle1 { 0 } else { 255 },
                if states.foot_switch { 255 } else { 0 },
            ),
            brightness: clamp_brightness(ambient),
        },
    }
}

fn clamp_brightness(brightness: f32) -> f32 {
    if brightness.is_nan() {
        0.0
    } else {
        brightness.clamp(0.0, FULL_BRIGHTNESS)
    }
}

/// A strip of addressable pixels. Color and brightness are latched by `flush`.
#[allow(async_fn_in_trait)]
pub trait StatusLed {
    fn set_pixel(&mut self, index: usize, color: Rgb);
    fn set_brightness(&mut self, brightness: f32);
    async fn flush(&mut self);
}

pub async fn show<L: StatusLed>(led: &mut L, frame: LedFrame) {
    led.set_pixel(STATUS_LED_INDEX, frame.color);
    led.set_brightness(frame.brightness);
    led.flush().await;
}
