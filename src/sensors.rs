use crate::config::SENSOR_INTERVAL_MS;
use crate::setpoints::Setpoints;
use crate::timer::Interval;

/// Last accepted climate reading
/// temperature: Celsius
/// humidity: Relative humidity percentage
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Reading {
    pub temperature: f32,
    pub humidity: f32,
}

impl Reading {
    /// What a sensor reports when a conversion fails
    pub const INVALID: Reading = Reading {
        temperature: f32::NAN,
        humidity: f32::NAN,
    };

    /// A reading is only usable if both channels are numbers
    pub fn is_valid(&self) -> bool {
        !self.temperature.is_nan() && !self.humidity.is_nan()
    }
}

/// Temperature/humidity source. Drivers report a failed conversion as NaN on
/// either channel instead of an error.
pub trait ClimateSensor {
    fn read(&mut self) -> Reading;
}

/// The reference potentiometer, in raw 12-bit ADC counts
pub trait SetpointKnob {
    fn read_raw(&mut self) -> u16;
}

/// What happened on a sampling pass
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum SampleOutcome {
    /// The reading was stored
    Updated(Reading),
    /// The sensor returned NaN; the previous reading was kept
    Invalid,
}

#[cfg(target_os = "none")]
impl defmt::Format for Reading {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}C {}%", self.temperature, self.humidity)
    }
}

/// Samples the climate sensor and the reference knob on a fixed interval
pub struct SensorSampler {
    interval: Interval,
}

impl Default for SensorSampler {
    fn default() -> Self {
        Self::new(SENSOR_INTERVAL_MS)
    }
}

impl SensorSampler {
    pub fn new(period_ms: u32) -> SensorSampler {
        Self {
            interval: Interval::new(period_ms),
        }
    }

    /// Takes one sample if the interval has elapsed
    /// param now_ms: current time in milliseconds
    /// param sensor: climate sensor
    /// param knob: reference potentiometer
    /// param reading: overwritten only by a valid sample
    /// param setpoints: temperature reference always follows the knob, manual mode or not
    /// returns None if it was not time to sample
    pub fn poll<S, K>(
        &mut self,
        now_ms: u32,
        sensor: &mut S,
        knob: &mut K,
        reading: &mut Reading,
        setpoints: &mut Setpoints,
    ) -> Option<SampleOutcome>
    where
        S: ClimateSensor,
        K: SetpointKnob,
    {
        if !self.interval.poll(now_ms) {
            return None;
        }

        let sample = sensor.read();
        let outcome = if sample.is_valid() {
            *reading = sample;
            SampleOutcome::Updated(sample)
        } else {
            SampleOutcome::Invalid
        };

        setpoints.track_knob(knob.read_raw());
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeKnob, FakeSensor};

    #[test]
    fn samples_only_after_the_interval() {
        let mut sampler = SensorSampler::default();
        let mut sensor = FakeSensor::new(30.0, 50.0);
        let mut knob = FakeKnob(4095);
        let mut reading = Reading::default();
        let mut setpoints = Setpoints::from_seed(0);

        let outcome = sampler.poll(1000, &mut sensor, &mut knob, &mut reading, &mut setpoints);
        assert_eq!(outcome, None);
        assert_eq!(reading, Reading::default());
        assert_eq!(setpoints.temperature_reference(), 25.0);

        let outcome = sampler.poll(2000, &mut sensor, &mut knob, &mut reading, &mut setpoints);
        assert!(matches!(outcome, Some(SampleOutcome::Updated(_))));
        assert_eq!(reading.temperature, 30.0);
        assert_eq!(reading.humidity, 50.0);
        assert_eq!(setpoints.temperature_reference(), 40.0);
        assert_eq!(sensor.reads, 1);
    }

    #[test]
    fn nan_keeps_previous_reading_but_knob_still_tracks() {
        let mut sampler = SensorSampler::default();
        let mut sensor = FakeSensor::new(22.5, 48.0);
        let mut knob = FakeKnob(0);
        let mut reading = Reading::default();
        let mut setpoints = Setpoints::from_seed(0);

        sampler.poll(2000, &mut sensor, &mut knob, &mut reading, &mut setpoints);

        sensor.reading = Reading {
            temperature: 35.0,
            humidity: f32::NAN,
        };
        knob.0 = 4095;
        let outcome = sampler.poll(4000, &mut sensor, &mut knob, &mut reading, &mut setpoints);
        assert_eq!(outcome, Some(SampleOutcome::Invalid));
        assert_eq!(reading.temperature, 22.5);
        assert_eq!(reading.humidity, 48.0);
        assert_eq!(setpoints.temperature_reference(), 40.0);

        // The next interval simply tries again
        sensor.reading = Reading {
            temperature: 35.0,
            humidity: 41.0,
        };
        sampler.poll(6000, &mut sensor, &mut knob, &mut reading, &mut setpoints);
        assert_eq!(reading.temperature, 35.0);
    }
}
