use crate::led::Rgb;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorChannel {
    Red,
    Green,
    Blue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OverrideMutation {
    pub channel: ColorChannel,
    pub value: u8,
}

/// Remote color set over MIDI. Once a channel is written the override stays in force;
/// there is no way to go back to the switch-driven color short of a reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColorOverrideStore {
    color: Option<Rgb>,
}

impl ColorOverrideStore {
    pub fn get(&self) -> Option<Rgb> {
        self.color
    }

    /// Updates one channel, starting from black when no override exists yet.
    pub fn apply(&mut self, mutation: OverrideMutation) -> Rgb {
        let color = self.color.get_or_insert(Rgb::OFF);
        match mutation.channel {
            ColorChannel::Red => color.r = mutation.value,
            ColorChannel::Green => color.g = mutation.value,
            ColorChannel::Blue => color.b = mutation.value,
        }
        *color
    }
}
