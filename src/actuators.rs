use embedded_hal::digital::StatefulOutputPin;

use crate::sensors::Reading;
use crate::setpoints::Setpoints;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum ActuatorKind {
    Ventilation,
    Irrigation,
}

/// What an actuator is doing, as shown on the display and the console
/// on: for automatic mode this is the comparison result, for manual mode the pin level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorStatus {
    pub on: bool,
    pub manual: bool,
}

/// Ventilation is wanted strictly above the reference
pub fn ventilation_demand(temperature: f32, reference: f32) -> bool {
    temperature > reference
}

/// Irrigation is wanted strictly below the threshold
pub fn irrigation_demand(humidity: f32, threshold: u8) -> bool {
    humidity < threshold as f32
}

/// One indicator output plus its manual override flag
pub struct Actuator<P> {
    pin: P,
    manual: bool,
}

impl<P: StatefulOutputPin> Actuator<P> {
    pub fn new(pin: P) -> Actuator<P> {
        Self { pin, manual: false }
    }

    pub fn is_manual(&self) -> bool {
        self.manual
    }

    /// Reads back the level currently driven on the pin
    pub fn level(&mut self) -> Result<bool, Error> {
        self.pin.is_set_high().map_err(|_| Error::Pin)
    }

    fn drive(&mut self, on: bool) -> Result<(), Error> {
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| Error::Pin)
    }
}

/// Ventilation and irrigation outputs
pub struct Actuators<V, I> {
    pub ventilation: Actuator<V>,
    pub irrigation: Actuator<I>,
}

impl<V, I> Actuators<V, I>
where
    V: StatefulOutputPin,
    I: StatefulOutputPin,
{
    pub fn new(ventilation: V, irrigation: I) -> Actuators<V, I> {
        Self {
            ventilation: Actuator::new(ventilation),
            irrigation: Actuator::new(irrigation),
        }
    }

    /// Drives every actuator that is under automatic control
    /// Manual actuators are skipped entirely; their pin keeps the last commanded level
    /// param blink_on: the blink flip-flop, gating irrigation while it is wanted
    pub fn update(&mut self, reading: &Reading, setpoints: &Setpoints, blink_on: bool) -> Result<(), Error> {
        if !self.ventilation.manual {
            let on = ventilation_demand(reading.temperature, setpoints.temperature_reference());
            self.ventilation.drive(on)?;
        }

        if !self.irrigation.manual {
            let wanted = irrigation_demand(reading.humidity, setpoints.humidity_threshold());
            self.irrigation.drive(wanted && blink_on)?;
        }
        Ok(())
    }

    /// Puts an actuator in manual mode and forces its output
    /// Switching off keeps manual mode, only `return_to_automatic` leaves it
    pub fn force(&mut self, kind: ActuatorKind, on: bool) -> Result<(), Error> {
        match kind {
            ActuatorKind::Ventilation => {
                self.ventilation.manual = true;
                self.ventilation.drive(on)
            }
            ActuatorKind::Irrigation => {
                self.irrigation.manual = true;
                self.irrigation.drive(on)
            }
        }
    }

    /// Clears both overrides together and drives both outputs low
    pub fn return_to_automatic(&mut self) -> Result<(), Error> {
        self.ventilation.manual = false;
        self.irrigation.manual = false;
        self.ventilation.drive(false)?;
        self.irrigation.drive(false)
    }

    /// Status for display, mirroring the automatic decision or reading back the manual level
    pub fn status(
        &mut self,
        kind: ActuatorKind,
        reading: &Reading,
        setpoints: &Setpoints,
    ) -> Result<ActuatorStatus, Error> {
        let (manual, on) = match kind {
            ActuatorKind::Ventilation if self.ventilation.manual => (true, self.ventilation.level()?),
            ActuatorKind::Irrigation if self.irrigation.manual => (true, self.irrigation.level()?),
            ActuatorKind::Ventilation => (
                false,
                ventilation_demand(reading.temperature, setpoints.temperature_reference()),
            ),
            ActuatorKind::Irrigation => (
                false,
                irrigation_demand(reading.humidity, setpoints.humidity_threshold()),
            ),
        };
        Ok(ActuatorStatus { on, manual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePin;

    fn reading(temperature: f32, humidity: f32) -> Reading {
        Reading {
            temperature,
            humidity,
        }
    }

    fn setpoints(reference: f32, threshold: i32) -> Setpoints {
        let mut setpoints = Setpoints::from_seed(0);
        setpoints.set_temperature_reference(reference).unwrap();
        setpoints.set_humidity_threshold(threshold).unwrap();
        setpoints
    }

    #[test]
    fn decisions_need_strict_inequality() {
        assert!(ventilation_demand(30.0, 25.0));
        assert!(!ventilation_demand(25.0, 25.0));
        assert!(!ventilation_demand(20.0, 25.0));
        assert!(irrigation_demand(55.0, 60));
        assert!(!irrigation_demand(60.0, 60));
        assert!(!irrigation_demand(65.0, 60));
    }

    #[test]
    fn ventilation_follows_temperature() {
        let mut actuators = Actuators::new(FakePin::default(), FakePin::default());
        let setpoints = setpoints(25.0, 60);

        actuators.update(&reading(30.0, 70.0), &setpoints, false).unwrap();
        assert!(actuators.ventilation.level().unwrap());

        actuators.update(&reading(25.0, 70.0), &setpoints, false).unwrap();
        assert!(!actuators.ventilation.level().unwrap());
    }

    #[test]
    fn irrigation_blinks_while_dry() {
        let mut actuators = Actuators::new(FakePin::default(), FakePin::default());
        let setpoints = setpoints(25.0, 60);
        let dry = reading(20.0, 55.0);

        let mut levels = Vec::new();
        for blink_on in [true, false, true, false] {
            actuators.update(&dry, &setpoints, blink_on).unwrap();
            levels.push(actuators.irrigation.level().unwrap());
        }
        assert_eq!(levels, vec![true, false, true, false]);

        // Wet enough: steady off whatever the blink state
        actuators.update(&reading(20.0, 60.0), &setpoints, true).unwrap();
        assert!(!actuators.irrigation.level().unwrap());
    }

    #[test]
    fn manual_mode_ignores_the_comparison() {
        let mut actuators = Actuators::new(FakePin::default(), FakePin::default());
        let setpoints = setpoints(25.0, 60);

        actuators.force(ActuatorKind::Ventilation, true).unwrap();
        actuators.force(ActuatorKind::Irrigation, false).unwrap();
        for _ in 0..5 {
            actuators.update(&reading(10.0, 10.0), &setpoints, true).unwrap();
        }
        assert!(actuators.ventilation.level().unwrap());
        assert!(!actuators.irrigation.level().unwrap());
        assert!(actuators.ventilation.is_manual());
        assert!(actuators.irrigation.is_manual());

        let status = actuators
            .status(ActuatorKind::Irrigation, &reading(10.0, 10.0), &setpoints)
            .unwrap();
        assert_eq!(status, ActuatorStatus { on: false, manual: true });
    }

    #[test]
    fn deactivate_is_not_return_to_automatic() {
        let mut actuators = Actuators::new(FakePin::default(), FakePin::default());
        let setpoints = setpoints(25.0, 60);

        actuators.force(ActuatorKind::Ventilation, false).unwrap();
        actuators.update(&reading(35.0, 70.0), &setpoints, false).unwrap();
        assert!(actuators.ventilation.is_manual());
        assert!(!actuators.ventilation.level().unwrap());
    }

    #[test]
    fn return_to_automatic_clears_both_and_drives_low() {
        let mut actuators = Actuators::new(FakePin::default(), FakePin::default());
        actuators.force(ActuatorKind::Ventilation, true).unwrap();
        actuators.force(ActuatorKind::Irrigation, true).unwrap();

        actuators.return_to_automatic().unwrap();
        assert!(!actuators.ventilation.is_manual());
        assert!(!actuators.irrigation.is_manual());
        assert!(!actuators.ventilation.level().unwrap());
        assert!(!actuators.irrigation.level().unwrap());

        // Automatic control resumes on the next update
        let setpoints = setpoints(25.0, 60);
        actuators.update(&reading(30.0, 70.0), &setpoints, false).unwrap();
        assert!(actuators.ventilation.level().unwrap());
    }

    #[test]
    fn automatic_status_reports_the_decision() {
        let mut actuators = Actuators::new(FakePin::default(), FakePin::default());
        let setpoints = setpoints(25.0, 60);
        let status = actuators
            .status(ActuatorKind::Irrigation, &reading(20.0, 50.0), &setpoints)
            .unwrap();
        // Wanted even though the blink currently has the pin low
        assert_eq!(status, ActuatorStatus { on: true, manual: false });
    }
}
