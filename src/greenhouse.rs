//! The controller's whole state, passed explicitly to every component

use embedded_hal::digital::{InputPin, StatefulOutputPin};

use crate::actuators::{ActuatorKind, ActuatorStatus, Actuators};
use crate::blink::BlinkTimer;
use crate::button::{Debouncer, Page};
use crate::sensors::{ClimateSensor, Reading, SampleOutcome, SensorSampler, SetpointKnob};
use crate::setpoints::Setpoints;
use crate::Error;

/// Everything that changed during one loop step, for logging
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tick {
    pub sample: Option<SampleOutcome>,
    pub page: Option<Page>,
}

pub struct Greenhouse<V, I> {
    pub reading: Reading,
    pub setpoints: Setpoints,
    pub actuators: Actuators<V, I>,
    pub blink: BlinkTimer,
    pub button: Debouncer,
    sampler: SensorSampler,
}

impl<V, I> Greenhouse<V, I>
where
    V: StatefulOutputPin,
    I: StatefulOutputPin,
{
    pub fn new(ventilation: V, irrigation: I, setpoints: Setpoints) -> Greenhouse<V, I> {
        Self {
            reading: Reading::default(),
            setpoints,
            actuators: Actuators::new(ventilation, irrigation),
            blink: BlinkTimer::default(),
            button: Debouncer::default(),
            sampler: SensorSampler::default(),
        }
    }

    pub fn page(&self) -> Page {
        self.button.page()
    }

    /// Runs one pass of the control loop, minus display and console
    /// Order: sample, blink, page button, actuators
    /// A button that cannot be read is reported after the actuators are driven
    /// param now_ms: current time in milliseconds
    pub fn tick<S, K, B>(
        &mut self,
        now_ms: u32,
        sensor: &mut S,
        knob: &mut K,
        button: &mut B,
    ) -> Result<Tick, Error>
    where
        S: ClimateSensor,
        K: SetpointKnob,
        B: InputPin,
    {
        let sample = self.sampler.poll(
            now_ms,
            sensor,
            knob,
            &mut self.reading,
            &mut self.setpoints,
        );
        let blink_on = self.blink.poll(now_ms);
        let page = self.button.poll_pin(button, now_ms);
        self.actuators
            .update(&self.reading, &self.setpoints, blink_on)?;

        Ok(Tick {
            sample,
            page: page?,
        })
    }

    /// Status of one actuator against the current reading and setpoints
    pub fn status(&mut self, kind: ActuatorKind) -> Result<ActuatorStatus, Error> {
        self.actuators.status(kind, &self.reading, &self.setpoints)
    }
}
