use embassy_rp::adc::{self, Channel, Config};
use embassy_rp::gpio::Pull;
use embassy_rp::peripherals::ADC;
use embassy_rp::Peripheral;

use footswitch_control::input::AnalogInput;

use crate::board::{Irqs, PotPin};

/// The pot wiper on its ADC channel, read on demand.
pub struct Pot<'d> {
    adc: adc::Adc<'d, adc::Async>,
    channel: Channel<'d>,
}

impl<'d> Pot<'d> {
    pub fn new(adc_per: impl Peripheral<P = ADC> + 'd, pin: PotPin) -> Self {
        let adc = adc::Adc::new(adc_per, Irqs, Config::default());
        let channel = Channel::new_pin(pin, Pull::None);
        Self { adc, channel }
    }
}

impl<'d> AnalogInput for Pot<'d> {
    type Error = adc::Error;

    /// 12-bit conversion stretched to the full 16-bit range.
    async fn read_raw(&mut self) -> Result<u16, Self::Error> {
        let value = self.adc.read(&mut self.channel).await?;
        Ok((value << 4) | (value >> 8))
    }
}
