//! Stand-ins for the board used by the unit tests

use core::convert::Infallible;

use embedded_hal::digital::{ErrorKind, ErrorType, InputPin, OutputPin, StatefulOutputPin};

use crate::sensors::{ClimateSensor, Reading, SetpointKnob};

/// Push-pull output that remembers its level
#[derive(Debug, Default)]
pub struct FakePin {
    high: bool,
}

impl ErrorType for FakePin {
    type Error = Infallible;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}

impl StatefulOutputPin for FakePin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }
}

/// Pulled-up, active-low push button
#[derive(Debug)]
pub struct FakeButton {
    high: bool,
}

impl FakeButton {
    pub fn released() -> FakeButton {
        Self { high: true }
    }

    pub fn press(&mut self) {
        self.high = false;
    }

    pub fn release(&mut self) {
        self.high = true;
    }
}

impl ErrorType for FakeButton {
    type Error = Infallible;
}

impl InputPin for FakeButton {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }
}

/// Button whose GPIO read always fails
pub struct DeadButton;

impl ErrorType for DeadButton {
    type Error = ErrorKind;
}

impl InputPin for DeadButton {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Err(ErrorKind::Other)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Err(ErrorKind::Other)
    }
}

pub struct FakeSensor {
    pub reading: Reading,
    pub reads: usize,
}

impl FakeSensor {
    pub fn new(temperature: f32, humidity: f32) -> FakeSensor {
        Self {
            reading: Reading {
                temperature,
                humidity,
            },
            reads: 0,
        }
    }
}

impl ClimateSensor for FakeSensor {
    fn read(&mut self) -> Reading {
        self.reads += 1;
        self.reading
    }
}

pub struct FakeKnob(pub u16);

impl SetpointKnob for FakeKnob {
    fn read_raw(&mut self) -> u16 {
        self.0
    }
}
