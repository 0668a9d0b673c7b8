use wmidi::Channel;

use crate::led::Rgb;

// constants used throughout the code

// control change numbers, fixed both ways
pub const TOGGLE0_CONTROL: u8 = 110;
pub const TOGGLE1_CONTROL: u8 = 111;
pub const FOOT_SWITCH_CONTROL: u8 = 112;
pub const POT_CONTROL: u8 = 113;

pub const RED_OVERRIDE_CONTROL: u8 = TOGGLE0_CONTROL;
pub const GREEN_OVERRIDE_CONTROL: u8 = TOGGLE1_CONTROL;
pub const BLUE_OVERRIDE_CONTROL: u8 = FOOT_SWITCH_CONTROL;

pub const PRESSED_VALUE: u8 = 0;
pub const RELEASED_VALUE: u8 = 127;

// 7-bit override values are doubled, so 127 lands on 254
pub const OVERRIDE_SCALE: u8 = 2;

// midi
pub const MIDI_OUT_CHANNEL: Channel = Channel::Ch1;
pub const MIDI_CHANNEL_SIZE: usize = 16;
pub const USB_MIDI_CABLE: u8 = 0;

// potentiometer
pub const ADC_FULL_SCALE: f32 = 65536.0;
pub const ADC_TO_9BIT_SHIFT: u32 = 7;
pub const POT_9BIT_TO_7BIT_SHIFT: u32 = 2;
pub const POT_SAMPLE_COUNT: usize = 15;
pub const POT_SETTLE_DELAY_US: u32 = 1_000;
pub const POT_HYSTERESIS: u16 = 3;

// status led
pub const STATUS_LED_INDEX: usize = 0;
pub const FULL_BRIGHTNESS: f32 = 1.0;

// self-test alarm
pub const ALARM_COLOR: Rgb = Rgb::new(200, 200, 200);
pub const ALARM_BRIGHTNESS: f32 = 0.3;
pub const ALARM_HALF_PERIOD_MS: u32 = 200;

// eeprom self-test
pub const EEPROM_ADDRESS: u8 = 0x50;
pub const EEPROM_PAGES: usize = 3;
pub const EEPROM_PAGE_LEN: usize = 8;
pub const EEPROM_WRITE_DELAY_MS: u32 = 5;
pub const EEPROM_ERASED: u8 = 0xff;

// hardware check mode
pub const HW_CHECK_TICK_MS: u32 = 100;
pub const HW_CHECK_HOLD_TICKS: u32 = 60;
pub const POT_END_STOP_HIGH: f32 = 0.99;
pub const POT_END_STOP_LOW: f32 = 0.01;
