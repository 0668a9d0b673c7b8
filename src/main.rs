//! Footswitch MIDI controller firmware.
//!
//! Checks the EEPROM, then runs the controller loop next to the USB MIDI device.

#![no_std]
#![no_main]

use defmt::*;
use defmt::panic;
use embassy_executor::Spawner;
use embassy_futures::join::join;
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use footswitch_control::analog_filter::FilterConfig;
use footswitch_control::config::EEPROM_ADDRESS;
use footswitch_control::diagnostics::self_test_or_alarm;
use footswitch_control::midi::MidiChannel;
use footswitch_control::self_test::EepromSelfTest;
use footswitch_control::{Controller, Io};

use footswitch_controller::adc::Pot;
use footswitch_controller::board::{self, RomBootloader};
use footswitch_controller::usb_midi::UsbMidi;
use footswitch_controller::ws2812b::{StatusPixel, WS2812B};

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    let board = board::init(p);

    let mut led = StatusPixel::new(WS2812B::new(board.leds_pio, board.leds_pin));
    let mut delay = Delay;

    let mut eeprom = EepromSelfTest::new(board.eeprom, EEPROM_ADDRESS);
    self_test_or_alarm(&mut eeprom, &mut led, &mut delay).await;

    let outbound = MidiChannel::new();
    let inbound = MidiChannel::new();

    let mut usb = UsbMidi::new(board.usb, outbound.receiver(), inbound.sender());

    let io = Io {
        switches: board.switches,
        pot: Pot::new(board.adc, board.pot_pin),
        midi_in: inbound.receiver(),
        midi_out: outbound.sender(),
        led,
        bootloader: RomBootloader,
        delay,
    };

    let controller_task = async {
        match Controller::new(io, FilterConfig::default()).await {
            Ok(mut controller) => controller.run().await,
            Err(e) => panic!("controller init failed: {}", e),
        }
    };

    info!("running");
    join(usb.task(), controller_task).await;
}
