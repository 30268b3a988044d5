use crate::config::{
    DEFAULT_TEMPERATURE_REFERENCE, HUM_MAX, HUM_MIN, KNOB_MAX, TEMP_MAX, TEMP_MIN,
};

/// Setpoints are the reference values each reading is compared against.
/// temperature_reference: Ventilation turns on above this, in Celsius.
///                        Live from the knob, editable over the console.
/// humidity_threshold: Irrigation turns on below this relative humidity percentage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setpoints {
    temperature_reference: f32,
    humidity_threshold: u8,
}

/// A console edit outside the accepted range; nothing was stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange;

impl Setpoints {
    /// Builds setpoints with the humidity threshold drawn from `seed`
    /// param seed: any entropy, reduced into [HUM_MIN, HUM_MAX]
    pub fn from_seed(seed: u32) -> Setpoints {
        let span = (HUM_MAX - HUM_MIN) as u32 + 1;
        Setpoints {
            temperature_reference: DEFAULT_TEMPERATURE_REFERENCE,
            humidity_threshold: HUM_MIN + (seed % span) as u8,
        }
    }

    pub fn temperature_reference(&self) -> f32 {
        self.temperature_reference
    }

    pub fn humidity_threshold(&self) -> u8 {
        self.humidity_threshold
    }

    /// Stores a console-entered temperature reference if it is within [TEMP_MIN, TEMP_MAX]
    pub fn set_temperature_reference(&mut self, celsius: f32) -> Result<(), OutOfRange> {
        // NaN fails both comparisons and is rejected with everything else
        if celsius >= TEMP_MIN as f32 && celsius <= TEMP_MAX as f32 {
            self.temperature_reference = celsius;
            Ok(())
        } else {
            Err(OutOfRange)
        }
    }

    /// Stores a console-entered humidity threshold if it is within [HUM_MIN, HUM_MAX]
    pub fn set_humidity_threshold(&mut self, percent: i32) -> Result<(), OutOfRange> {
        if (HUM_MIN as i32..=HUM_MAX as i32).contains(&percent) {
            self.humidity_threshold = percent as u8;
            Ok(())
        } else {
            Err(OutOfRange)
        }
    }

    /// Overwrites the temperature reference from the knob position
    pub fn track_knob(&mut self, raw: u16) {
        self.temperature_reference = knob_to_reference(raw);
    }
}

/// Maps a raw 12-bit knob reading onto [TEMP_MIN, TEMP_MAX] whole degrees
/// Integer math truncates, so only full scale reaches TEMP_MAX
/// param raw: ADC counts, values above KNOB_MAX are clamped
pub fn knob_to_reference(raw: u16) -> f32 {
    let raw = raw.min(KNOB_MAX) as i32;
    let degrees = raw * (TEMP_MAX - TEMP_MIN) / KNOB_MAX as i32 + TEMP_MIN;
    degrees as f32
}
