use embassy_rp::gpio::{Drive, SlewRate};
use embassy_rp::peripherals;
use embassy_rp::pio;
use embassy_rp::Peripheral;
use embassy_time::{Instant, Timer};
use fixed::traits::ToFixed;
use fixed_macro::types::U56F8;

use footswitch_control::led::{Rgb, StatusLed};

use crate::board::{Irqs, LedsPio};
use crate::config::{LED_RESET_TIME_US, NUM_LEDS};

pub struct WS2812B {
    pio: pio::Pio<'static, peripherals::PIO0>,
    last_write: Instant,
}

impl WS2812B {
    pub fn new(
        pio_per: impl Peripheral<P = LedsPio> + 'static,
        pin: impl pio::PioPin + 'static,
    ) -> Self {
        let mut pio = pio::Pio::new(pio_per, Irqs);
        let mut out_pin = pio.common.make_pio_pin(pin);
        out_pin.set_drive_strength(Drive::_8mA);
        out_pin.set_slew_rate(SlewRate::Fast);
        let prg = pio_proc::pio_file!("src/ws2812b.pio", select_program("ws2812b"));
        let mut cfg = pio::Config::default();
        cfg.use_program(&pio.common.load_program(&prg.program), &[&out_pin]);
        cfg.clock_divider = (U56F8!(125_000_000) / U56F8!(20_000_000)).to_fixed();
        cfg.shift_out.auto_fill = true;
        cfg.shift_out.threshold = 24;
        cfg.shift_out.direction = pio::ShiftDirection::Left;
        cfg.fifo_join = pio::FifoJoin::TxOnly;
        pio.sm0.set_pin_dirs(pio::Direction::Out, &[&out_pin]);
        pio.sm0.set_config(&cfg);
        pio.sm0.set_enable(true);

        Self {
            pio,
            last_write: Instant::now(),
        }
    }

    /// Writes 0xRRGGBB colors, one per pixel down the chain.
    pub async fn write(&mut self, colors: &[u32]) {
        let elapsed = self.last_write.elapsed().as_micros();
        if elapsed < LED_RESET_TIME_US {
            Timer::after_micros(LED_RESET_TIME_US - elapsed).await;
        }
        let tx = self.pio.sm0.tx();
        for rgb in colors {
            // the pixel shifts in green first, the top 24 bits of the word go out
            let grb = ((rgb & 0x00ff00) << 16) | (rgb & 0xff0000) | ((rgb & 0x0000ff) << 8);
            tx.wait_push(grb).await;
        }

        self.last_write = Instant::now();
    }
}

/// The status pixel chain. Brightness is applied in software when the frame is flushed.
pub struct StatusPixel {
    leds: WS2812B,
    colors: [Rgb; NUM_LEDS],
    brightness: f32,
}

impl StatusPixel {
    pub fn new(leds: WS2812B) -> Self {
        Self {
            leds,
            colors: [Rgb::OFF; NUM_LEDS],
            brightness: 0.0,
        }
    }
}

impl StatusLed for StatusPixel {
    fn set_pixel(&mut self, index: usize, color: Rgb) {
        if let Some(pixel) = self.colors.get_mut(index) {
            *pixel = color;
        }
    }

    fn set_brightness(&mut self, brightness: f32) {
        self.brightness = brightness;
    }

    async fn flush(&mut self) {
        let words = self.colors.map(|c| u32::from(c.dimmed(self.brightness)));
        self.leds.write(&words).await;
    }
}
