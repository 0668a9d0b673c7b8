// Hand-rolled test doubles for the collaborators. Clones share state, so a test can keep
// one handle while the code under test owns another.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::digital::{self, ErrorType as PinErrorType, InputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{
    self, ErrorType as I2cErrorType, I2c, NoAcknowledgeSource, Operation,
};
use portable_atomic::{AtomicBool, Ordering};

use crate::controller::Bootloader;
use crate::input::AnalogInput;
use crate::led::{LedFrame, Rgb, StatusLed};
use crate::midi::{MidiIn, MidiMsg, MidiOut};

#[derive(Clone)]
pub struct MockPin {
    level: Rc<Cell<bool>>,
    fail: Rc<Cell<bool>>,
}

impl MockPin {
    pub fn new(level: bool) -> Self {
        Self {
            level: Rc::new(Cell::new(level)),
            fail: Rc::new(Cell::new(false)),
        }
    }

    pub fn set(&self, level: bool) {
        self.level.set(level);
    }

    pub fn fail(&self, fail: bool) {
        self.fail.set(fail);
    }
}

impl PinErrorType for MockPin {
    type Error = digital::ErrorKind;
}

impl InputPin for MockPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        if self.fail.get() {
            Err(digital::ErrorKind::Other)
        } else {
            Ok(self.level.get())
        }
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Returns queued readings first, then the steady value.
#[derive(Clone)]
pub struct MockPot {
    queue: Rc<RefCell<VecDeque<u16>>>,
    value: Rc<Cell<u16>>,
    failures: Rc<Cell<usize>>,
    fail: Rc<Cell<bool>>,
}

impl MockPot {
    pub fn new(value: u16) -> Self {
        Self::queued(&[], value)
    }

    pub fn queued(readings: &[u16], value: u16) -> Self {
        Self {
            queue: Rc::new(RefCell::new(readings.iter().copied().collect())),
            value: Rc::new(Cell::new(value)),
            failures: Rc::new(Cell::new(0)),
            fail: Rc::new(Cell::new(false)),
        }
    }

    pub fn set(&self, value: u16) {
        self.value.set(value);
    }

    pub fn fail(&self, fail: bool) {
        self.fail.set(fail);
    }

    pub fn fail_next(&self, reads: usize) {
        self.failures.set(reads);
    }
}

impl AnalogInput for MockPot {
    type Error = ();

    async fn read_raw(&mut self) -> Result<u16, Self::Error> {
        if self.fail.get() {
            return Err(());
        }
        if self.failures.get() > 0 {
            self.failures.set(self.failures.get() - 1);
            return Err(());
        }
        let queued = self.queue.borrow_mut().pop_front();
        Ok(queued.unwrap_or(self.value.get()))
    }
}

#[derive(Clone, Default)]
pub struct MockDelay {
    calls: Rc<Cell<usize>>,
    total_ns: Rc<Cell<u64>>,
}

impl MockDelay {
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn total_ns(&self) -> u64 {
        self.total_ns.get()
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.calls.set(self.calls.get() + 1);
        self.total_ns.set(self.total_ns.get() + ns as u64);
    }
}

#[derive(Clone, Default)]
pub struct MockMidiIn {
    queue: Rc<RefCell<VecDeque<MidiMsg>>>,
}

impl MockMidiIn {
    pub fn push(&self, msg: MidiMsg) {
        self.queue.borrow_mut().push_back(msg);
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl MidiIn for MockMidiIn {
    fn try_receive(&mut self) -> Option<MidiMsg> {
        self.queue.borrow_mut().pop_front()
    }
}

#[derive(Clone, Default)]
pub struct MockMidiOut {
    sent: Rc<RefCell<Vec<MidiMsg>>>,
    fail: Rc<Cell<bool>>,
}

impl MockMidiOut {
    pub fn sent(&self) -> Vec<MidiMsg> {
        self.sent.borrow().clone()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.set(fail);
    }
}

impl MidiOut for MockMidiOut {
    type Error = ();

    fn send(&mut self, msg: MidiMsg) -> Result<(), Self::Error> {
        if self.fail.get() {
            return Err(());
        }
        self.sent.borrow_mut().push(msg);
        Ok(())
    }
}

/// Records every flushed frame together with the pixel index it was set on.
#[derive(Clone, Default)]
pub struct MockLed {
    pending: Rc<Cell<(usize, Rgb, f32)>>,
    frames: Rc<RefCell<Vec<(usize, LedFrame)>>>,
    stop: Rc<RefCell<Option<(usize, Rc<AtomicBool>)>>>,
}

impl MockLed {
    pub fn frames(&self) -> Vec<(usize, LedFrame)> {
        self.frames.borrow().clone()
    }

    /// Returns a run flag that is cleared by the `frames`-th flush.
    pub fn stop_after(&self, frames: usize) -> Rc<AtomicBool> {
        let running = Rc::new(AtomicBool::new(true));
        *self.stop.borrow_mut() = Some((frames, running.clone()));
        running
    }
}

impl StatusLed for MockLed {
    fn set_pixel(&mut self, index: usize, color: Rgb) {
        let (_, _, brightness) = self.pending.get();
        self.pending.set((index, color, brightness));
    }

    fn set_brightness(&mut self, brightness: f32) {
        let (index, color, _) = self.pending.get();
        self.pending.set((index, color, brightness));
    }

    async fn flush(&mut self) {
        let (index, color, brightness) = self.pending.get();
        let mut frames = self.frames.borrow_mut();
        frames.push((index, LedFrame { color, brightness }));
        if let Some((limit, running)) = self.stop.borrow().as_ref() {
            if frames.len() >= *limit {
                running.store(false, Ordering::Relaxed);
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct MockBootloader {
    calls: Rc<Cell<usize>>,
}

impl MockBootloader {
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Bootloader for MockBootloader {
    fn reset_to_bootloader(&mut self) -> ! {
        self.calls.set(self.calls.get() + 1);
        panic!("reset to bootloader");
    }
}

/// A 24Cxx-style EEPROM: a write sets the word address and stores any following bytes,
/// a read continues from the current address.
#[derive(Clone)]
pub struct MockEeprom {
    pub address: u8,
    pub memory: Rc<RefCell<[u8; 256]>>,
    pointer: Rc<Cell<u8>>,
    /// Page writes accepted before the chip turns read-only.
    pub writable_pages: Rc<Cell<Option<usize>>>,
    /// Bits that never read back as set.
    pub stuck_low: Rc<Cell<u8>>,
    pub fail: Rc<Cell<bool>>,
}

impl MockEeprom {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            memory: Rc::new(RefCell::new([0; 256])),
            pointer: Rc::new(Cell::new(0)),
            writable_pages: Rc::new(Cell::new(None)),
            stuck_low: Rc::new(Cell::new(0)),
            fail: Rc::new(Cell::new(false)),
        }
    }
}

impl I2cErrorType for MockEeprom {
    type Error = i2c::ErrorKind;
}

impl I2c for MockEeprom {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.fail.get() {
            return Err(i2c::ErrorKind::Bus);
        }
        if address != self.address {
            return Err(i2c::ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    let Some((&word, data)) = bytes.split_first() else {
                        continue;
                    };
                    self.pointer.set(word);
                    if data.is_empty() {
                        continue;
                    }
                    let writable = match self.writable_pages.get() {
                        Some(0) => false,
                        Some(n) => {
                            self.writable_pages.set(Some(n - 1));
                            true
                        }
                        None => true,
                    };
                    let mut memory = self.memory.borrow_mut();
                    for &byte in data.iter() {
                        let at = self.pointer.get();
                        if writable {
                            memory[at as usize] = byte & !self.stuck_low.get();
                        }
                        self.pointer.set(at.wrapping_add(1));
                    }
                }
                Operation::Read(buf) => {
                    let memory = self.memory.borrow();
                    for byte in buf.iter_mut() {
                        let at = self.pointer.get();
                        *byte = memory[at as usize];
                        self.pointer.set(at.wrapping_add(1));
                    }
                }
            }
        }
        Ok(())
    }
}
