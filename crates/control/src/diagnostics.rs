//! Startup diagnostics and the bench hardware check.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::config::*;
use crate::controller::Bootloader;
use crate::input::{
    is_pressed, read_level, AnalogInput, DigitalChannel, DigitalInputs, DigitalLevels,
};
use crate::led::{render, show, LedFrame, Rgb, StatusLed, SwitchStates};
use crate::self_test::EepromSelfTest;
use crate::Error;

/// Alternates the alarm color with darkness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Alarm {
    lit: bool,
}

impl Alarm {
    pub fn next_frame(&mut self) -> LedFrame {
        self.lit = !self.lit;
        LedFrame {
            color: if self.lit { ALARM_COLOR } else { Rgb::OFF },
            brightness: ALARM_BRIGHTNESS,
        }
    }
}

/// Blinks the status LED forever. Only a power cycle gets out of here.
pub async fn alarm_forever<L, D>(led: &mut L, delay: &mut D) -> !
where
    L: StatusLed,
    D: DelayNs,
{
    let mut alarm = Alarm::default();
    loop {
        show(led, alarm.next_frame()).await;
        delay.delay_ms(ALARM_HALF_PERIOD_MS).await;
    }
}

/// Runs the EEPROM self-test and only returns if it passed.
pub async fn self_test_or_alarm<I2C, L, D>(
    test: &mut EepromSelfTest<I2C>,
    led: &mut L,
    delay: &mut D,
) where
    I2C: I2c,
    L: StatusLed,
    D: DelayNs,
{
    if let Err(failure) = test.run(delay).await {
        error!("{}", Error::from(failure));
        alarm_forever(led, delay).await
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CheckOutcome {
    Show(LedFrame),
    EnterBootloader,
}

/// Bench test of a freshly assembled board.
///
/// The switches are mirrored on the LED like in normal operation, the pot sets the
/// brightness with both end stops inverted so a pot that fails to reach them is easy to
/// spot, and holding the footswitch for a few seconds drops into the bootloader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HardwareCheck {
    levels: DigitalLevels,
    hold_ticks: u32,
}

impl HardwareCheck {
    pub fn new(levels: DigitalLevels) -> Self {
        Self {
            levels,
            hold_ticks: 0,
        }
    }

    pub fn update(&mut self, levels: DigitalLevels, pot_level: f32) -> CheckOutcome {
        if is_pressed(levels.boot_button) {
            return CheckOutcome::EnterBootloader;
        }

        for channel in DigitalChannel::EDGE_TRIGGERED {
            if levels.get(channel) != self.levels.get(channel) {
                info!("{} switched: {}", channel, levels.get(channel));
            }
        }
        self.levels = levels;

        self.hold_ticks = if is_pressed(levels.foot_switch) {
            self.hold_ticks + 1
        } else {
            0
        };
        if self.hold_ticks > HW_CHECK_HOLD_TICKS {
            return CheckOutcome::EnterBootloader;
        }

        let states = SwitchStates {
            toggle0: is_pressed(levels.toggle0),
            toggle1: is_pressed(levels.toggle1),
            foot_switch: is_pressed(levels.foot_switch),
        };
        let mut frame = render(states, None, pot_level);
        frame.brightness = if pot_level >= POT_END_STOP_HIGH {
            0.0
        } else if pot_level <= POT_END_STOP_LOW {
            1.0
        } else {
            frame.brightness
        };
        CheckOutcome::Show(frame)
    }
}

pub async fn run_hardware_check<S, A, L, B, D>(
    switches: &mut S,
    pot: &mut A,
    led: &mut L,
    bootloader: &mut B,
    delay: &mut D,
) -> Result<(), Error>
where
    S: DigitalInputs,
    A: AnalogInput,
    L: StatusLed,
    B: Bootloader,
    D: DelayNs,
{
    let mut check = HardwareCheck::new(switches.poll()?);
    info!("hardware check running");
    loop {
        let levels = switches.poll()?;
        let pot_level = read_level(pot).await?;
        match check.update(levels, pot_level) {
            CheckOutcome::Show(frame) => show(led, frame).await,
            CheckOutcome::EnterBootloader => {
                info!("resetting to bootloader");
                bootloader.reset_to_bootloader();
            }
        }
        delay.delay_ms(HW_CHECK_TICK_MS).await;
    }
}
