use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{AnyPin, Input, Pin, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::*;
use embassy_rp::Peripherals;

use footswitch_control::input::Switches;
use footswitch_control::Bootloader;

pub type LedsPio = PIO0;
pub type LedsPin = PIN_3;

pub type PotPin = PIN_26;

pub type MidiUsb = USB;

pub type EepromI2c = I2c<'static, I2C0, i2c::Async>;

pub type BoardSwitches = Switches<
    Input<'static, AnyPin>,
    Input<'static, AnyPin>,
    Input<'static, AnyPin>,
    Input<'static, AnyPin>,
>;

bind_interrupts!(pub struct Irqs {
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
    ADC_IRQ_FIFO => embassy_rp::adc::InterruptHandler;
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

pub struct BoardSetup {
    pub switches: BoardSwitches,

    pub leds_pio: LedsPio,
    pub leds_pin: LedsPin,

    pub adc: ADC,
    pub pot_pin: PotPin,

    pub usb: MidiUsb,

    pub eeprom: EepromI2c,
}

fn switch(pin: AnyPin) -> Input<'static, AnyPin> {
    let mut input = Input::new(pin, Pull::Up);
    input.set_schmitt(true);
    input
}

pub fn init(p: Peripherals) -> BoardSetup {
    BoardSetup {
        switches: Switches {
            toggle0: switch(p.PIN_8.degrade()),
            toggle1: switch(p.PIN_7.degrade()),
            foot_switch: switch(p.PIN_28.degrade()),
            boot_button: switch(p.PIN_6.degrade()),
        },

        leds_pio: p.PIO0,
        leds_pin: p.PIN_3,

        adc: p.ADC,
        pot_pin: p.PIN_26,

        usb: p.USB,

        eeprom: I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c::Config::default()),
    }
}

/// Reboots into the RP2040 ROM USB mass-storage bootloader.
pub struct RomBootloader;

impl Bootloader for RomBootloader {
    fn reset_to_bootloader(&mut self) -> ! {
        embassy_rp::rom_data::reset_to_usb_boot(0, 0);
        loop {
            cortex_m::asm::wfi();
        }
    }
}
