//! The control loop.
//!
//! Every tick drains inbound MIDI into the color override, checks the boot button, sends
//! a control change for each switch that flipped and for each committed pot movement,
//! then renders the status LED. Inbound messages are handled first so an override
//! received this tick is already visible on this tick's LED frame.

use embedded_hal_async::delay::DelayNs;
use portable_atomic::{AtomicBool, Ordering};

use crate::analog_filter::{AnalogFilter, FilterConfig};
use crate::color_override::ColorOverrideStore;
use crate::dispatch::{
    on_analog_committed, on_digital_edge, on_inbound, EdgeAction, OutboundEvent,
};
use crate::input::{
    is_pressed, read_9bit, read_level, AnalogInput, DigitalChannel, DigitalInputs, DigitalLevels,
};
use crate::led::{render, show, LedFrame, StatusLed, SwitchStates};
use crate::midi::{MidiIn, MidiMsg, MidiOut};
use crate::Error;

pub trait Bootloader {
    /// Reboots into the USB mass-storage bootloader. Never returns.
    fn reset_to_bootloader(&mut self) -> !;
}

/// Everything the controller remembers between ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerState {
    toggle0: bool,
    toggle1: bool,
    foot_switch: bool,
    color_override: ColorOverrideStore,
    pot: AnalogFilter,
}

impl ControllerState {
    pub fn new(levels: DigitalLevels, pot: AnalogFilter) -> Self {
        Self {
            toggle0: levels.toggle0,
            toggle1: levels.toggle1,
            foot_switch: levels.foot_switch,
            color_override: ColorOverrideStore::default(),
            pot,
        }
    }

    /// Last level reported for an edge-triggered channel. The boot button is not tracked.
    pub fn level(&self, channel: DigitalChannel) -> Option<bool> {
        match channel {
            DigitalChannel::Toggle0 => Some(self.toggle0),
            DigitalChannel::Toggle1 => Some(self.toggle1),
            DigitalChannel::FootSwitch => Some(self.foot_switch),
            DigitalChannel::BootButton => None,
        }
    }

    /// The event to send if `level` differs from the last reported one. Nothing is stored
    /// until [`commit_level`](Self::commit_level), so an edge whose send failed shows up
    /// again on the next tick.
    pub fn edge(&self, channel: DigitalChannel, level: bool) -> Option<OutboundEvent> {
        if self.level(channel)? == level {
            return None;
        }
        match on_digital_edge(channel, level) {
            Some(EdgeAction::Send(event)) => Some(event),
            _ => None,
        }
    }

    pub fn commit_level(&mut self, channel: DigitalChannel, level: bool) {
        match channel {
            DigitalChannel::Toggle0 => self.toggle0 = level,
            DigitalChannel::Toggle1 => self.toggle1 = level,
            DigitalChannel::FootSwitch => self.foot_switch = level,
            DigitalChannel::BootButton => {}
        }
    }

    /// Routes an inbound message into the override, returning whether it was a color control.
    pub fn apply_inbound(&mut self, msg: &MidiMsg) -> bool {
        match on_inbound(msg) {
            Some(mutation) => {
                let color = self.color_override.apply(mutation);
                info!("override color: {}", color);
                true
            }
            None => false,
        }
    }

    pub fn pot(&self) -> &AnalogFilter {
        &self.pot
    }

    pub fn switch_states(&self) -> SwitchStates {
        SwitchStates {
            toggle0: is_pressed(self.toggle0),
            toggle1: is_pressed(self.toggle1),
            foot_switch: is_pressed(self.foot_switch),
        }
    }
}

/// The collaborators the controller drives.
pub struct Io<S, A, Rx, Tx, L, B, D> {
    pub switches: S,
    pub pot: A,
    pub midi_in: Rx,
    pub midi_out: Tx,
    pub led: L,
    pub bootloader: B,
    pub delay: D,
}

pub struct Controller<S, A, Rx, Tx, L, B, D> {
    io: Io<S, A, Rx, Tx, L, B, D>,
    state: ControllerState,
}

impl<S, A, Rx, Tx, L, B, D> Controller<S, A, Rx, Tx, L, B, D>
where
    S: DigitalInputs,
    A: AnalogInput,
    Rx: MidiIn,
    Tx: MidiOut,
    L: StatusLed,
    B: Bootloader,
    D: DelayNs,
{
    /// Takes the initial switch levels and pot position from one read of the hardware.
    pub async fn new(
        mut io: Io<S, A, Rx, Tx, L, B, D>,
        config: FilterConfig,
    ) -> Result<Self, Error> {
        let levels = io.switches.poll()?;
        let pot = read_9bit(&mut io.pot).await?;
        info!("initial levels: {}, pot: {}", levels, pot);
        Ok(Self {
            state: ControllerState::new(levels, AnalogFilter::new(config, pot)),
            io,
        })
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Runs one iteration and returns the frame pushed to the LED.
    ///
    /// A read failure ends the tick on the spot. A send failure does not: the remaining
    /// inputs are still handled and the LED is still updated before the error is returned.
    pub async fn tick(&mut self) -> Result<LedFrame, Error> {
        while let Some(msg) = self.io.midi_in.try_receive() {
            self.state.apply_inbound(&msg);
        }

        let boot_level = self.io.switches.read(DigitalChannel::BootButton)?;
        if let Some(EdgeAction::EnterBootloader) =
            on_digital_edge(DigitalChannel::BootButton, boot_level)
        {
            info!("boot button pressed, resetting to bootloader");
            self.io.bootloader.reset_to_bootloader();
        }

        // first send failure, returned once the LED is updated
        let mut failed = None;

        for channel in DigitalChannel::EDGE_TRIGGERED {
            let level = self.io.switches.read(channel)?;
            if let Some(event) = self.state.edge(channel, level) {
                info!("{} switched: {}", channel, event.value);
                match self.send(event) {
                    Ok(()) => self.state.commit_level(channel, level),
                    Err(e) => failed = failed.or(Some(e)),
                }
            }
        }

        let committed = self
            .state
            .pot
            .sample_and_filter(&mut self.io.pot, &mut self.io.delay)
            .await?;
        if let Some(value) = committed {
            info!("pot adjusted: {}", value);
            match self.send(on_analog_committed(value)) {
                Ok(()) => self.state.pot.mark_sent(value),
                Err(e) => failed = failed.or(Some(e)),
            }
        }

        let ambient = read_level(&mut self.io.pot).await?;
        let frame = render(
            self.state.switch_states(),
            self.state.color_override.get(),
            ambient,
        );
        show(&mut self.io.led, frame).await;
        match failed {
            Some(e) => Err(e),
            None => Ok(frame),
        }
    }

    /// Ticks until `running` is cleared. Failed ticks are logged and skipped.
    pub async fn run_while(&mut self, running: &AtomicBool) {
        while running.load(Ordering::Relaxed) {
            if let Err(e) = self.tick().await {
                warn!("tick failed: {}", e);
            }
        }
    }

    pub async fn run(&mut self) -> ! {
        loop {
            if let Err(e) = self.tick().await {
                warn!("tick failed: {}", e);
            }
        }
    }

    fn send(&mut self, event: OutboundEvent) -> Result<(), Error> {
        let msg = MidiMsg::from(event);
        self.io
            .midi_out
            .send(msg)
            .map_err(|_| Error::TransportSend(msg))
    }
}
