//! Error taxonomy of the controller.

use core::fmt;

use crate::input::ReadSource;
use crate::midi::MidiMsg;
use crate::self_test::SelfTestFailure;

/// Everything that can go wrong while the controller runs.
///
/// Read and send failures end the current tick; the loop logs them and carries on.
/// A diagnostic failure is terminal and is answered with the blinking alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A digital pin or the ADC could not be read.
    HardwareRead(ReadSource),

    /// The MIDI transport refused an outbound message.
    TransportSend(MidiMsg),

    /// The startup self-test did not pass.
    Diagnostic(SelfTestFailure),
}

impl From<SelfTestFailure> for Error {
    fn from(failure: SelfTestFailure) -> Self {
        Error::Diagnostic(failure)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::HardwareRead(source) => write!(f, "hardware read failed: {:?}", source),
            Error::TransportSend(msg) => write!(f, "MIDI send failed: {:?}", msg),
            Error::Diagnostic(failure) => write!(f, "self-test failed: {}", failure),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::HardwareRead(source) => defmt::write!(f, "hardware read failed: {}", source),
            Error::TransportSend(msg) => defmt::write!(f, "MIDI send failed: {}", msg),
            Error::Diagnostic(failure) => defmt::write!(f, "self-test failed: {}", failure),
        }
    }
}
