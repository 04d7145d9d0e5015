//! Hand-written hardware doubles shared by the integration tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use myrtio_pwm_fixture::{
    AnalogInput, ButtonInput, GpioPin, KeyValueStore, MemoryStore, PwmChannel, PwmError,
    PwmOutput, StorageError,
};

/// Records every PWM call
#[derive(Debug, Default)]
pub struct MockPwm {
    pub setups: Vec<(PwmChannel, u32, u8)>,
    pub attachments: Vec<(GpioPin, PwmChannel)>,
    pub writes: Vec<(PwmChannel, u16)>,
    pub duty: [u16; 8],
    /// Writes to this channel are rejected
    pub reject: Option<PwmChannel>,
}

impl MockPwm {
    pub fn duty_of(&self, channel: u8) -> u16 {
        self.duty[channel as usize]
    }

    pub fn write_count(&self) -> usize {
        self.writes.len()
    }
}

impl PwmOutput for MockPwm {
    fn setup(
        &mut self,
        channel: PwmChannel,
        frequency_hz: u32,
        resolution_bits: u8,
    ) -> Result<(), PwmError> {
        self.setups.push((channel, frequency_hz, resolution_bits));
        Ok(())
    }

    fn attach(&mut self, pin: GpioPin, channel: PwmChannel) -> Result<(), PwmError> {
        self.attachments.push((pin, channel));
        Ok(())
    }

    fn write(&mut self, channel: PwmChannel, duty: u16) -> Result<(), PwmError> {
        if self.reject == Some(channel) {
            return Err(PwmError::Rejected);
        }
        self.writes.push((channel, duty));
        self.duty[channel.0 as usize] = duty;
        Ok(())
    }
}

/// Store handle that can be shared between a driver and an outside actor
#[derive(Debug, Clone, Default)]
pub struct SharedStore(pub Rc<RefCell<MemoryStore<4>>>);

impl KeyValueStore for SharedStore {
    fn begin(&mut self, namespace: &str) -> Result<(), StorageError> {
        self.0.borrow_mut().begin(namespace)
    }

    fn get_bool(&mut self, key: &str) -> Result<Option<bool>, StorageError> {
        self.0.borrow_mut().get_bool(key)
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), StorageError> {
        self.0.borrow_mut().put_bool(key, value)
    }

    fn end(&mut self) {
        self.0.borrow_mut().end();
    }
}

/// Store whose operations can be made to fail
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore<4>,
    pub fail_open: bool,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub opened: usize,
    pub closed: usize,
}

impl KeyValueStore for FlakyStore {
    fn begin(&mut self, namespace: &str) -> Result<(), StorageError> {
        if self.fail_open {
            return Err(StorageError::Unavailable);
        }
        self.opened += 1;
        self.inner.begin(namespace)
    }

    fn get_bool(&mut self, key: &str) -> Result<Option<bool>, StorageError> {
        if self.fail_reads {
            return Err(StorageError::ReadFailed);
        }
        self.inner.get_bool(key)
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::WriteFailed);
        }
        self.inner.put_bool(key, value)
    }

    fn end(&mut self) {
        self.closed += 1;
        self.inner.end();
    }
}

/// ADC returning a fixed value per channel id
#[derive(Debug, Default)]
pub struct FakeAdc {
    pub values: [u16; 8],
    pub reads: usize,
}

impl FakeAdc {
    /// Set the left / middle / right knobs of the default wiring
    pub fn set_knobs(&mut self, left: u16, middle: u16, right: u16) {
        self.values[4] = left;
        self.values[3] = middle;
        self.values[0] = right;
    }
}

impl AnalogInput for FakeAdc {
    fn read_channel(&mut self, id: u8) -> u16 {
        self.reads += 1;
        self.values[id as usize]
    }
}

/// ADC replaying a sequence of samples for every channel
#[derive(Debug, Default)]
pub struct ScriptedAdc {
    pub samples: Vec<u16>,
    pub cursor: usize,
}

impl AnalogInput for ScriptedAdc {
    fn read_channel(&mut self, _id: u8) -> u16 {
        let value = self.samples[self.cursor % self.samples.len()];
        self.cursor += 1;
        value
    }
}

#[derive(Debug, Default)]
pub struct FakeButton {
    pub pressed: bool,
}

impl ButtonInput for FakeButton {
    fn read_button(&mut self) -> bool {
        self.pressed
    }
}
