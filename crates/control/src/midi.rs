use core::fmt::Debug;

use embassy_sync::blocking_mutex::raw::{NoopRawMutex, RawMutex};
use embassy_sync::channel::{Channel, Receiver, Sender, TrySendError};
use wmidi::{ControlFunction, MidiMessage, U7};

use crate::config::{MIDI_CHANNEL_SIZE, MIDI_OUT_CHANNEL};

// USB-MIDI code index number of a control change event
const CIN_CONTROL_CHANGE: u8 = 0x0b;
pub const USB_MIDI_PACKET_LEN: usize = 4;

/// The MIDI traffic the controller cares about; everything else collapses into `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MidiMsg {
    ControlChange { control: u8, value: u8 },
    Other,
}

impl MidiMsg {
    pub fn control_change(control: u8, value: u8) -> Self {
        MidiMsg::ControlChange {
            control: control & 0x7f,
            value: value & 0x7f,
        }
    }

    /// Decodes a raw MIDI message. Control changes are accepted on any channel.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match MidiMessage::from_bytes(bytes) {
            Ok(MidiMessage::ControlChange(_, function, value)) => MidiMsg::ControlChange {
                control: u8::from(function),
                value: u8::from(value),
            },
            _ => MidiMsg::Other,
        }
    }

    /// Decodes one 32-bit USB-MIDI event packet. The header byte is skipped.
    pub fn from_usb_packet(packet: &[u8]) -> Self {
        if packet.len() != USB_MIDI_PACKET_LEN {
            return MidiMsg::Other;
        }
        Self::from_bytes(&packet[1..])
    }

    /// Frames the message as a USB-MIDI event packet on the given cable.
    /// `Other` has no wire form and yields `None`.
    pub fn to_usb_packet(&self, cable: u8) -> Option<[u8; USB_MIDI_PACKET_LEN]> {
        match *self {
            MidiMsg::ControlChange { control, value } => {
                let msg = MidiMessage::ControlChange(
                    MIDI_OUT_CHANNEL,
                    ControlFunction(U7::from_u8_lossy(control)),
                    U7::from_u8_lossy(value),
                );
                let mut packet = [0u8; USB_MIDI_PACKET_LEN];
                packet[0] = (cable << 4) | CIN_CONTROL_CHANGE;
                msg.copy_to_slice(&mut packet[1..]).ok()?;
                Some(packet)
            }
            MidiMsg::Other => None,
        }
    }
}

/// Non-blocking source of inbound MIDI messages.
pub trait MidiIn {
    fn try_receive(&mut self) -> Option<MidiMsg>;
}

/// Fire-and-forget sink for outbound MIDI messages.
pub trait MidiOut {
    type Error: Debug;

    fn send(&mut self, msg: MidiMsg) -> Result<(), Self::Error>;
}

impl<'ch, M: RawMutex, const N: usize> MidiIn for Receiver<'ch, M, MidiMsg, N> {
    fn try_receive(&mut self) -> Option<MidiMsg> {
        Receiver::try_receive(self).ok()
    }
}

impl<'ch, M: RawMutex, const N: usize> MidiOut for Sender<'ch, M, MidiMsg, N> {
    type Error = TrySendError<MidiMsg>;

    fn send(&mut self, msg: MidiMsg) -> Result<(), Self::Error> {
        self.try_send(msg)
    }
}

pub type MidiChannel = Channel<NoopRawMutex, MidiMsg, MIDI_CHANNEL_SIZE>;
pub type MidiChannelReceiver<'ch> = Receiver<'ch, NoopRawMutex, MidiMsg, MIDI_CHANNEL_SIZE>;
pub type MidiChannelSender<'ch> = Sender<'ch, NoopRawMutex, MidiMsg, MIDI_CHANNEL_SIZE>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_change_is_decoded_on_any_channel() {
        assert_eq!(
            MidiMsg::from_bytes(&[0xb0, 110, 64]),
            MidiMsg::ControlChange {
                control: 110,
                value: 64
            }
        );
        assert_eq!(
            MidiMsg::from_bytes(&[0xbf, 112, 127]),
            MidiMsg::ControlChange {
                control: 112,
                value: 127
            }
        );
    }

    #[test]
    fn other_messages_collapse() {
        // note on
        assert_eq!(MidiMsg::from_bytes(&[0x90, 60, 100]), MidiMsg::Other);
        // garbage
        assert_eq!(MidiMsg::from_bytes(&[0x12]), MidiMsg::Other);
        assert_eq!(MidiMsg::from_bytes(&[]), MidiMsg::Other);
    }

    #[test]
    fn usb_packet_round_trip() {
        let msg = MidiMsg::control_change(113, 25);
        let packet = msg.to_usb_packet(0).unwrap();
        assert_eq!(packet, [0x0b, 0xb0, 113, 25]);
        assert_eq!(MidiMsg::from_usb_packet(&packet), msg);
    }

    #[test]
    fn usb_packet_header_carries_cable() {
        let packet = MidiMsg::control_change(110, 0).to_usb_packet(2).unwrap();
        assert_eq!(packet[0], 0x2b);
    }

    #[test]
    fn short_usb_packet_is_rejected() {
        assert_eq!(MidiMsg::from_usb_packet(&[0x0b, 0xb0, 110]), MidiMsg::Other);
        assert_eq!(MidiMsg::Other.to_usb_packet(0), None);
    }

    #[test]
    fn control_change_masks_to_seven_bits() {
        assert_eq!(
            MidiMsg::control_change(0xff, 0x80),
            MidiMsg::ControlChange {
                control: 0x7f,
                value: 0
            }
        );
    }

    #[test]
    fn channel_endpoints_implement_transport() {
        let channel = MidiChannel::new();
        let mut tx = channel.sender();
        let mut rx = channel.receiver();

        assert_eq!(MidiIn::try_receive(&mut rx), None);
        let msg = MidiMsg::control_change(111, 127);
        MidiOut::send(&mut tx, msg).unwrap();
        assert_eq!(MidiIn::try_receive(&mut rx), Some(msg));
    }

    #[test]
    fn full_channel_reports_send_failure() {
        let channel = MidiChannel::new();
        let mut tx = channel.sender();
        for _ in 0..MIDI_CHANNEL_SIZE {
            let msg = MidiMsg::control_change(113, 1);
            MidiOut::send(&mut tx, msg).unwrap();
        }
        let overflow = MidiOut::send(&mut tx, MidiMsg::control_change(113, 2));
        assert!(overflow.is_err());
    }
}
