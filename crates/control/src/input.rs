//! Raw input sampling.
//!
//! All switches are wired to ground with pull-ups, so a pressed switch reads low. Levels
//! are kept exactly as read; [`is_pressed`] is the only place the polarity is decided.

use core::fmt::Debug;

use embedded_hal::digital::InputPin;

use crate::config::{ADC_FULL_SCALE, ADC_TO_9BIT_SHIFT};
use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DigitalChannel {
    Toggle0,
    Toggle1,
    FootSwitch,
    BootButton,
}

impl DigitalChannel {
    /// Channels that report their transitions over MIDI, in sampling order.
    pub const EDGE_TRIGGERED: [DigitalChannel; 3] = [
        DigitalChannel::Toggle0,
        DigitalChannel::Toggle1,
        DigitalChannel::FootSwitch,
    ];
}

/// Which input a failed read came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadSource {
    Digital(DigitalChannel),
    Analog,
}

/// Active-low: an electrically low input is a pressed switch.
pub const fn is_pressed(level: bool) -> bool {
    !level
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DigitalLevels {
    pub toggle0: bool,
    pub toggle1: bool,
    pub foot_switch: bool,
    pub boot_button: bool,
}

impl DigitalLevels {
    pub fn get(&self, channel: DigitalChannel) -> bool {
        match channel {
            DigitalChannel::Toggle0 => self.toggle0,
            DigitalChannel::Toggle1 => self.toggle1,
            DigitalChannel::FootSwitch => self.foot_switch,
            DigitalChannel::BootButton => self.boot_button,
        }
    }
}

pub trait DigitalInputs {
    /// Instantaneous level of one channel, `true` meaning electrically high.
    fn read(&mut self, channel: DigitalChannel) -> Result<bool, Error>;

    fn poll(&mut self) -> Result<DigitalLevels, Error> {
        Ok(DigitalLevels {
            toggle0: self.read(DigitalChannel::Toggle0)?,
            toggle1: self.read(DigitalChannel::Toggle1)?,
            foot_switch: self.read(DigitalChannel::FootSwitch)?,
            boot_button: self.read(DigitalChannel::BootButton)?,
        })
    }
}

/// The four switch inputs of the board.
pub struct Switches<T0, T1, F, B> {
    pub toggle0: T0,
    pub toggle1: T1,
    pub foot_switch: F,
    pub boot_button: B,
}

impl<T0, T1, F, B> DigitalInputs for Switches<T0, T1, F, B>
where
    T0: InputPin,
    T1: InputPin,
    F: InputPin,
    B: InputPin,
{
    fn read(&mut self, channel: DigitalChannel) -> Result<bool, Error> {
        match channel {
            DigitalChannel::Toggle0 => pin_level(&mut self.toggle0, channel),
            DigitalChannel::Toggle1 => pin_level(&mut self.toggle1, channel),
            DigitalChannel::FootSwitch => pin_level(&mut self.foot_switch, channel),
            DigitalChannel::BootButton => pin_level(&mut self.boot_button, channel),
        }
    }
}

fn pin_level<P: InputPin>(pin: &mut P, channel: DigitalChannel) -> Result<bool, Error> {
    pin.is_high()
        .map_err(|_| Error::HardwareRead(ReadSource::Digital(channel)))
}

/// An ADC channel reporting full 16-bit readings.
#[allow(async_fn_in_trait)]
pub trait AnalogInput {
    type Error: Debug;

    async fn read_raw(&mut self) -> Result<u16, Self::Error>;
}

async fn sample_raw<A: AnalogInput>(analog: &mut A) -> Result<u16, Error> {
    analog.read_raw().await.map_err(|e| {
        debug!("ADC read failed: {}", debug_fmt(&e));
        Error::HardwareRead(ReadSource::Analog)
    })
}

/// One sample reduced to 9 bits (0..=511).
pub async fn read_9bit<A: AnalogInput>(analog: &mut A) -> Result<u16, Error> {
    Ok(sample_raw(analog).await? >> ADC_TO_9BIT_SHIFT)
}

/// One unfiltered sample normalized to 0.0..1.0.
pub async fn read_level<A: AnalogInput>(analog: &mut A) -> Result<f32, Error> {
    Ok(sample_raw(analog).await? as f32 / ADC_FULL_SCALE)
}

#[cfg(feature = "defmt")]
fn debug_fmt<T: Debug>(value: &T) -> defmt::Debug2Format<'_, T> {
    defmt::Debug2Format(value)
}

#[cfg(not(feature = "defmt"))]
fn debug_fmt<T: Debug>(value: &T) -> &T {
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockPin, MockPot};
    use embassy_futures::block_on;

    fn switches() -> Switches<MockPin, MockPin, MockPin, MockPin> {
        Switches {
            toggle0: MockPin::new(true),
            toggle1: MockPin::new(false),
            foot_switch: MockPin::new(true),
            boot_button: MockPin::new(true),
        }
    }

    #[test]
    fn poll_reads_every_channel() {
        let mut s = switches();
        assert_eq!(
            s.poll().unwrap(),
            DigitalLevels {
                toggle0: true,
                toggle1: false,
                foot_switch: true,
                boot_button: true,
            }
        );
        s.foot_switch.set(false);
        assert!(!s.read(DigitalChannel::FootSwitch).unwrap());
    }

    #[test]
    fn pin_failure_names_the_channel() {
        let mut s = switches();
        s.toggle1.fail(true);
        assert_eq!(
            s.poll(),
            Err(Error::HardwareRead(ReadSource::Digital(
                DigitalChannel::Toggle1
            )))
        );
        assert!(s.read(DigitalChannel::Toggle0).is_ok());
    }

    #[test]
    fn low_level_is_pressed() {
        assert!(is_pressed(false));
        assert!(!is_pressed(true));
    }

    #[test]
    fn analog_is_reduced_to_nine_bits() {
        let mut pot = MockPot::new(0xffff);
        assert_eq!(block_on(read_9bit(&mut pot)).unwrap(), 511);
        pot.set(103 << 7);
        assert_eq!(block_on(read_9bit(&mut pot)).unwrap(), 103);
        pot.set((103 << 7) + 127);
        assert_eq!(block_on(read_9bit(&mut pot)).unwrap(), 103);
    }

    #[test]
    fn analog_level_is_normalized() {
        let mut pot = MockPot::new(32768);
        assert_eq!(block_on(read_level(&mut pot)).unwrap(), 0.5);
        pot.set(0);
        assert_eq!(block_on(read_level(&mut pot)).unwrap(), 0.0);
    }

    #[test]
    fn analog_failure_is_a_read_error() {
        let mut pot = MockPot::new(0);
        pot.fail(true);
        assert_eq!(
            block_on(read_9bit(&mut pot)),
            Err(Error::HardwareRead(ReadSource::Analog))
        );
    }
}
