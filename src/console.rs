//! Serial menu for status, setpoint edits and manual actuator control
//!
//! The menu never blocks the control loop. Each loop iteration hands over the
//! bytes the UART has pending and the console advances its state:
//!
//! - selection states (`Menu`, `SetpointSelect`, `ActuatorSelect`) take the first
//!   byte and drop the rest of the batch
//! - `SetpointEntry` collects bytes, across batches, until CR or LF, then commits
//!   or rejects the value. Whatever followed the terminator stays unread and is
//!   handled as the next batch, like bytes left waiting in the UART.
//!
//! An LF straight after the CR that finished an entry belongs to that entry, even
//! when it arrives in a later batch.

use embedded_hal::digital::StatefulOutputPin;
use heapless::{String, Vec};
use ufmt::{uWrite, uwrite, uwriteln};

use crate::actuators::{ActuatorKind, ActuatorStatus};
use crate::config::{
    CONSOLE_BACKLOG, HUM_MAX, HUM_MIN, INPUT_LINE_CAPACITY, TEMP_MAX, TEMP_MIN,
};
use crate::greenhouse::Greenhouse;
use crate::numbers::{parse_leading_float, parse_leading_int, Fixed, NumberScan};
use crate::Error;

/// Which setpoint a numeric entry is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum SetpointTarget {
    TemperatureReference,
    HumidityThreshold,
}

/// A completed console action
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum ConsoleEvent {
    StatusReported,
    TemperatureReferenceSet(f32),
    HumidityThresholdSet(u8),
    SetpointRejected(SetpointTarget),
    Override { actuator: ActuatorKind, on: bool },
    AutomaticRestored,
    Exit,
    InvalidOption,
}

/// A numeric entry being typed
#[derive(Debug, Clone, PartialEq, Default)]
struct Entry {
    line: String<INPUT_LINE_CAPACITY>,
    scan: NumberScan,
    /// Part of the number did not fit in `line`
    overflowed: bool,
}

impl Entry {
    fn push(&mut self, byte: u8) {
        // Leading blanks and zeros never change the value
        if self.line.is_empty() && byte.is_ascii_whitespace() {
            return;
        }
        if byte == b'0' && matches!(self.line.as_str(), "" | "+" | "-") {
            return;
        }

        let fraction_digit = byte.is_ascii_digit() && self.scan.in_fraction();
        let extends_number = self.scan.push(byte);
        if self.line.push(byte as char).is_err() && extends_number && !fraction_digit {
            self.overflowed = true;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Menu,
    SetpointSelect,
    SetpointEntry { target: SetpointTarget, entry: Entry },
    ActuatorSelect,
}

pub struct MenuConsole {
    state: State,
    /// Bytes that followed a finished entry, read before the next batch
    backlog: Vec<u8, CONSOLE_BACKLOG>,
    /// The last entry ended on CR
    after_cr: bool,
}

impl Default for MenuConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuConsole {
    pub fn new() -> MenuConsole {
        Self {
            state: State::Menu,
            backlog: Vec::new(),
            after_cr: false,
        }
    }

    #[cfg(test)]
    fn is_idle(&self) -> bool {
        self.state == State::Menu
    }

    /// Prints the startup banner and the menu
    pub fn start<W>(&mut self, threshold: u8, out: &mut W) -> Result<(), Error>
    where
        W: uWrite + ?Sized,
    {
        self.state = State::Menu;
        uwriteln!(out, "System started!").map_err(|_| Error::Serial)?;
        uwriteln!(out, "Humidity threshold: {}%", threshold).map_err(|_| Error::Serial)?;
        print_menu(out)
    }

    /// Feeds the bytes received since the last call
    /// param input: pending serial bytes, possibly empty
    /// param gh: controller state, read for status and changed by commands
    /// param out: serial output
    /// returns the action completed by this batch, if any
    pub fn feed<V, I, W>(
        &mut self,
        input: &[u8],
        gh: &mut Greenhouse<V, I>,
        out: &mut W,
    ) -> Result<Option<ConsoleEvent>, Error>
    where
        V: StatefulOutputPin,
        I: StatefulOutputPin,
        W: uWrite + ?Sized,
    {
        let mut batch = core::mem::take(&mut self.backlog);
        for &byte in input {
            // Beyond the backlog the newest bytes are lost, like a full UART FIFO
            if batch.push(byte).is_err() {
                break;
            }
        }

        let mut pending = batch.as_slice();
        if self.after_cr && !pending.is_empty() {
            self.after_cr = false;
            if pending[0] == b'\n' {
                pending = &pending[1..];
            }
        }
        let Some(&first) = pending.first() else {
            return Ok(None);
        };

        match core::mem::replace(&mut self.state, State::Menu) {
            State::Menu => self.select_top(first, gh, out),
            State::SetpointSelect => self.select_setpoint(first, out),
            State::ActuatorSelect => {
                let event = select_actuator(first, gh, out)?;
                print_menu(out)?;
                Ok(Some(event))
            }
            State::SetpointEntry { target, mut entry } => {
                for (i, &byte) in pending.iter().enumerate() {
                    if byte == b'\r' || byte == b'\n' {
                        self.after_cr = byte == b'\r';
                        // The rest was typed ahead for the menu
                        for &next in &pending[i + 1..] {
                            let _ = self.backlog.push(next);
                        }
                        let event = commit(target, &entry, gh, out)?;
                        print_menu(out)?;
                        return Ok(Some(event));
                    }
                    entry.push(byte);
                }
                self.state = State::SetpointEntry { target, entry };
                Ok(None)
            }
        }
    }

    fn select_top<V, I, W>(
        &mut self,
        choice: u8,
        gh: &mut Greenhouse<V, I>,
        out: &mut W,
    ) -> Result<Option<ConsoleEvent>, Error>
    where
        V: StatefulOutputPin,
        I: StatefulOutputPin,
        W: uWrite + ?Sized,
    {
        let event = match choice {
            b'1' => {
                print_status(gh, out)?;
                ConsoleEvent::StatusReported
            }
            b'2' => {
                uwriteln!(out, "").map_err(|_| Error::Serial)?;
                uwriteln!(out, "=== EDIT REFERENCE VALUES ===").map_err(|_| Error::Serial)?;
                uwriteln!(out, "What do you want to change?").map_err(|_| Error::Serial)?;
                uwriteln!(out, "1. Temperature reference").map_err(|_| Error::Serial)?;
                uwriteln!(out, "2. Humidity threshold").map_err(|_| Error::Serial)?;
                self.state = State::SetpointSelect;
                return Ok(None);
            }
            b'3' => {
                uwriteln!(out, "").map_err(|_| Error::Serial)?;
                uwriteln!(out, "=== MANUAL ACTUATOR CONTROL ===").map_err(|_| Error::Serial)?;
                uwriteln!(out, "1. Ventilation on").map_err(|_| Error::Serial)?;
                uwriteln!(out, "2. Ventilation off").map_err(|_| Error::Serial)?;
                uwriteln!(out, "3. Irrigation on").map_err(|_| Error::Serial)?;
                uwriteln!(out, "4. Irrigation off").map_err(|_| Error::Serial)?;
                uwriteln!(out, "5. Back to automatic mode").map_err(|_| Error::Serial)?;
                self.state = State::ActuatorSelect;
                return Ok(None);
            }
            b'4' => {
                uwriteln!(out, "Leaving menu...").map_err(|_| Error::Serial)?;
                ConsoleEvent::Exit
            }
            _ => {
                uwriteln!(out, "Invalid option").map_err(|_| Error::Serial)?;
                ConsoleEvent::InvalidOption
            }
        };
        print_menu(out)?;
        Ok(Some(event))
    }

    fn select_setpoint<W>(&mut self, choice: u8, out: &mut W) -> Result<Option<ConsoleEvent>, Error>
    where
        W: uWrite + ?Sized,
    {
        let target = match choice {
            b'1' => {
                uwriteln!(out, "Enter new temperature reference and press Enter:")
                    .map_err(|_| Error::Serial)?;
                SetpointTarget::TemperatureReference
            }
            b'2' => {
                uwriteln!(out, "Enter new humidity threshold and press Enter:")
                    .map_err(|_| Error::Serial)?;
                SetpointTarget::HumidityThreshold
            }
            _ => {
                uwriteln!(out, "Invalid option").map_err(|_| Error::Serial)?;
                print_menu(out)?;
                return Ok(Some(ConsoleEvent::InvalidOption));
            }
        };
        self.state = State::SetpointEntry {
            target,
            entry: Entry::default(),
        };
        Ok(None)
    }
}

fn print_menu<W>(out: &mut W) -> Result<(), Error>
where
    W: uWrite + ?Sized,
{
    uwriteln!(out, "").map_err(|_| Error::Serial)?;
    uwriteln!(out, "=== GREENHOUSE MENU ===").map_err(|_| Error::Serial)?;
    uwriteln!(out, "1. Show greenhouse status").map_err(|_| Error::Serial)?;
    uwriteln!(out, "2. Edit reference values").map_err(|_| Error::Serial)?;
    uwriteln!(out, "3. Manual actuator control").map_err(|_| Error::Serial)?;
    uwriteln!(out, "4. Exit").map_err(|_| Error::Serial)?;
    uwriteln!(out, "Select an option (1-4):").map_err(|_| Error::Serial)
}

fn print_status<V, I, W>(gh: &mut Greenhouse<V, I>, out: &mut W) -> Result<(), Error>
where
    V: StatefulOutputPin,
    I: StatefulOutputPin,
    W: uWrite + ?Sized,
{
    let ventilation = gh.status(ActuatorKind::Ventilation)?;
    let irrigation = gh.status(ActuatorKind::Irrigation)?;

    uwriteln!(out, "").map_err(|_| Error::Serial)?;
    uwriteln!(out, "=== GREENHOUSE STATUS ===").map_err(|_| Error::Serial)?;
    uwriteln!(out, "Temperature: {} C", Fixed::new(gh.reading.temperature, 2))
        .map_err(|_| Error::Serial)?;
    uwriteln!(out, "Humidity: {} %", Fixed::new(gh.reading.humidity, 2))
        .map_err(|_| Error::Serial)?;
    uwriteln!(
        out,
        "Temperature reference: {} C",
        Fixed::new(gh.setpoints.temperature_reference(), 2)
    )
    .map_err(|_| Error::Serial)?;
    uwriteln!(out, "Humidity threshold: {} %", gh.setpoints.humidity_threshold())
        .map_err(|_| Error::Serial)?;
    uwrite!(out, "Ventilation: ").map_err(|_| Error::Serial)?;
    print_actuator_status(ventilation, out)?;
    uwrite!(out, "Irrigation: ").map_err(|_| Error::Serial)?;
    print_actuator_status(irrigation, out)
}

fn print_actuator_status<W>(status: ActuatorStatus, out: &mut W) -> Result<(), Error>
where
    W: uWrite + ?Sized,
{
    let text = match (status.on, status.manual) {
        (true, true) => "ON (manual)",
        (false, true) => "OFF (manual)",
        (true, false) => "ON",
        (false, false) => "OFF",
    };
    uwriteln!(out, "{}", text).map_err(|_| Error::Serial)
}

fn select_actuator<V, I, W>(
    choice: u8,
    gh: &mut Greenhouse<V, I>,
    out: &mut W,
) -> Result<ConsoleEvent, Error>
where
    V: StatefulOutputPin,
    I: StatefulOutputPin,
    W: uWrite + ?Sized,
{
    let (actuator, on, message) = match choice {
        b'1' => (ActuatorKind::Ventilation, true, "Ventilation switched ON manually"),
        b'2' => (ActuatorKind::Ventilation, false, "Ventilation switched OFF manually"),
        b'3' => (ActuatorKind::Irrigation, true, "Irrigation switched ON manually"),
        b'4' => (ActuatorKind::Irrigation, false, "Irrigation switched OFF manually"),
        b'5' => {
            gh.actuators.return_to_automatic()?;
            uwriteln!(out, "Back to automatic mode").map_err(|_| Error::Serial)?;
            return Ok(ConsoleEvent::AutomaticRestored);
        }
        _ => {
            uwriteln!(out, "Invalid option").map_err(|_| Error::Serial)?;
            return Ok(ConsoleEvent::InvalidOption);
        }
    };

    gh.actuators.force(actuator, on)?;
    uwriteln!(out, "{}", message).map_err(|_| Error::Serial)?;
    Ok(ConsoleEvent::Override { actuator, on })
}

/// Parses a finished entry and stores it if it is in range
/// An entry whose number did not fit is rejected like an out of range one
fn commit<V, I, W>(
    target: SetpointTarget,
    entry: &Entry,
    gh: &mut Greenhouse<V, I>,
    out: &mut W,
) -> Result<ConsoleEvent, Error>
where
    V: StatefulOutputPin,
    I: StatefulOutputPin,
    W: uWrite + ?Sized,
{
    let line = entry.line.as_str();
    match target {
        SetpointTarget::TemperatureReference => {
            let value = parse_leading_float(line);
            if !entry.overflowed && gh.setpoints.set_temperature_reference(value).is_ok() {
                uwriteln!(out, "New temperature reference: {} C", Fixed::new(value, 1))
                    .map_err(|_| Error::Serial)?;
                Ok(ConsoleEvent::TemperatureReferenceSet(value))
            } else {
                uwriteln!(out, "Value out of range ({}-{} C)", TEMP_MIN, TEMP_MAX)
                    .map_err(|_| Error::Serial)?;
                Ok(ConsoleEvent::SetpointRejected(target))
            }
        }
        SetpointTarget::HumidityThreshold => {
            let value = parse_leading_int(line);
            if !entry.overflowed && gh.setpoints.set_humidity_threshold(value).is_ok() {
                let threshold = gh.setpoints.humidity_threshold();
                uwriteln!(out, "New humidity threshold: {}%", threshold)
                    .map_err(|_| Error::Serial)?;
                Ok(ConsoleEvent::HumidityThresholdSet(threshold))
            } else {
                uwriteln!(out, "Value out of range ({}-{}%)", HUM_MIN, HUM_MAX)
                    .map_err(|_| Error::Serial)?;
                Ok(ConsoleEvent::SetpointRejected(target))
            }
        }
    }
}
