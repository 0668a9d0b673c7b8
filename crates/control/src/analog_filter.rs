//! Oversampling and two-stage hysteresis for the expression pot.
//!
//! Readings are averaged at 9 bits. A new average is only committed once it has moved by
//! at least the threshold from the last committed one, which keeps the pot from
//! flickering between neighbouring values. A commit is reported only when its 7-bit
//! bucket differs from the last one sent, so no identical value goes out twice.

use embedded_hal_async::delay::DelayNs;

use crate::config::{
    POT_9BIT_TO_7BIT_SHIFT, POT_HYSTERESIS, POT_SAMPLE_COUNT, POT_SETTLE_DELAY_US,
};
use crate::input::{read_9bit, AnalogInput};
use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FilterConfig {
    /// Sub-samples averaged per reading, at least one is always taken.
    pub samples: usize,
    pub settle_delay_us: u32,
    /// Minimum 9-bit movement before a new value is committed.
    pub threshold: u16,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            samples: POT_SAMPLE_COUNT,
            settle_delay_us: POT_SETTLE_DELAY_US,
            threshold: POT_HYSTERESIS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnalogFilter {
    config: FilterConfig,
    committed: u16,
    sent: u8,
}

impl AnalogFilter {
    /// Starts from a single reading, which also counts as already sent.
    pub fn new(config: FilterConfig, initial_9bit: u16) -> Self {
        Self {
            config,
            committed: initial_9bit,
            sent: to_7bit(initial_9bit),
        }
    }

    pub fn committed(&self) -> u16 {
        self.committed
    }

    pub fn sent(&self) -> u8 {
        self.sent
    }

    /// Feeds one averaged 9-bit reading, returning the 7-bit value still to be sent if any.
    ///
    /// A value only counts as sent after [`mark_sent`](Self::mark_sent), so one whose send
    /// failed is offered again with the next reading.
    pub fn filter(&mut self, mean_9bit: u16) -> Option<u8> {
        if mean_9bit.abs_diff(self.committed) >= self.config.threshold {
            self.committed = mean_9bit;
        }
        let value = to_7bit(self.committed);
        (value != self.sent).then_some(value)
    }

    pub fn mark_sent(&mut self, value: u8) {
        self.sent = value;
    }

    pub async fn sample_and_filter<A, D>(
        &mut self,
        analog: &mut A,
        delay: &mut D,
    ) -> Result<Option<u8>, Error>
    where
        A: AnalogInput,
        D: DelayNs,
    {
        let mean = sample_mean(
            analog,
            delay,
            self.config.samples,
            self.config.settle_delay_us,
        )
        .await?;
        Ok(self.filter(mean))
    }
}

fn to_7bit(value_9bit: u16) -> u8 {
    (value_9bit >> POT_9BIT_TO_7BIT_SHIFT) as u8
}

/// Rounded mean of `samples` 9-bit readings, each followed by `settle_delay_us`.
pub async fn sample_mean<A, D>(
    analog: &mut A,
    delay: &mut D,
    samples: usize,
    settle_delay_us: u32,
) -> Result<u16, Error>
where
    A: AnalogInput,
    D: DelayNs,
{
    let samples = samples.max(1) as u32;
    let mut sum = 0u32;
    for _ in 0..samples {
        sum += read_9bit(analog).await? as u32;
        delay.delay_us(settle_delay_us).await;
    }
    Ok(((sum + samples / 2) / samples) as u16)
}
