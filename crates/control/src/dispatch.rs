//! Mapping between physical controls and MIDI control changes.

use crate::color_override::{ColorChannel, OverrideMutation};
use crate::config::*;
use crate::input::{is_pressed, DigitalChannel};
use crate::midi::MidiMsg;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutboundEvent {
    pub control: u8,
    pub value: u8,
}

impl From<OutboundEvent> for MidiMsg {
    fn from(event: OutboundEvent) -> Self {
        MidiMsg::control_change(event.control, event.value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeAction {
    Send(OutboundEvent),
    EnterBootloader,
}

/// Turns an inbound message into an override update. Anything but a control change on
/// one of the three color controls is ignored.
pub fn on_inbound(msg: &MidiMsg) -> Option<OverrideMutation> {
    let MidiMsg::ControlChange { control, value } = *msg else {
        return None;
    };
    let channel = match control {
        RED_OVERRIDE_CONTROL => ColorChannel::Red,
        GREEN_OVERRIDE_CONTROL => ColorChannel::Green,
        BLUE_OVERRIDE_CONTROL => ColorChannel::Blue,
        _ => return None,
    };
    Some(OverrideMutation {
        channel,
        value: value.saturating_mul(OVERRIDE_SCALE),
    })
}

/// Action for a channel whose new level was just observed.
///
/// The switches report pressed as 0 and released as 127. The boot button never reaches
/// MIDI: being seen pressed is enough to ask for the bootloader.
pub fn on_digital_edge(channel: DigitalChannel, level: bool) -> Option<EdgeAction> {
    let control = match channel {
        DigitalChannel::Toggle0 => TOGGLE0_CONTROL,
        DigitalChannel::Toggle1 => TOGGLE1_CONTROL,
        DigitalChannel::FootSwitch => FOOT_SWITCH_CONTROL,
        DigitalChannel::BootButton => {
            return is_pressed(level).then_some(EdgeAction::EnterBootloader);
        }
    };
    let value = if is_pressed(level) {
        PRESSED_VALUE
    } else {
        RELEASED_VALUE
    };
    Some(EdgeAction::Send(OutboundEvent { control, value }))
}

pub fn on_analog_committed(value_7bit: u8) -> OutboundEvent {
    OutboundEvent {
        control: POT_CONTROL,
        value: value_7bit & 0x7f,
    }
}
