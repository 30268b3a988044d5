use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::digital::StatefulOutputPin;
use heapless::{String, Vec};
use ufmt::uwrite;

use crate::actuators::{ActuatorKind, ActuatorStatus};
use crate::button::Page;
use crate::config::{DISPLAY_LINES, LINE_CAPACITY, LINE_HEIGHT};
use crate::greenhouse::Greenhouse;
use crate::numbers::Fixed;
use crate::Error;

pub type Line = String<LINE_CAPACITY>;

/// One screenful of text, top to bottom
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Frame {
    lines: Vec<Line, DISPLAY_LINES>,
}

impl Frame {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.as_str())
    }

    /// Appends a line; anything past the panel height or width is cut off
    fn push(&mut self, line: Line) {
        let _ = self.lines.push(line);
    }

    fn push_str(&mut self, text: &str) {
        let mut line = Line::new();
        for c in text.chars() {
            if line.push(c).is_err() {
                break;
            }
        }
        self.push(line);
    }
}

/// Boot screen shown before the control loop starts
/// param threshold: humidity threshold picked at startup
pub fn splash_frame(threshold: u8) -> Frame {
    let mut frame = Frame::default();
    frame.push_str("Starting system...");
    let mut line = Line::new();
    // Overflow drops the rest of the line
    let _ = uwrite!(line, "Hum threshold: {}%", threshold);
    frame.push(line);
    frame
}

/// Composes the status page from the current state
/// Manual actuators show the level read back from their pin
pub fn compose_page<V, I>(page: Page, gh: &mut Greenhouse<V, I>) -> Result<Frame, Error>
where
    V: StatefulOutputPin,
    I: StatefulOutputPin,
{
    let mut frame = Frame::default();
    let mut line = Line::new();

    match page {
        Page::Temperature => {
            frame.push_str("Temperature & Vent.");
            let _ = uwrite!(line, "Temp now: {} C", Fixed::new(gh.reading.temperature, 1));
            frame.push(core::mem::take(&mut line));
            let _ = uwrite!(
                line,
                "Temp ref: {} C",
                Fixed::new(gh.setpoints.temperature_reference(), 1)
            );
            frame.push(core::mem::take(&mut line));
            let status = gh.status(ActuatorKind::Ventilation)?;
            frame.push_str(status_text(ActuatorKind::Ventilation, status));
        }
        Page::Humidity => {
            frame.push_str("Humidity & Irrig.");
            let _ = uwrite!(line, "Hum now: {} %", Fixed::new(gh.reading.humidity, 1));
            frame.push(core::mem::take(&mut line));
            let _ = uwrite!(line, "Hum threshold: {} %", gh.setpoints.humidity_threshold());
            frame.push(core::mem::take(&mut line));
            let status = gh.status(ActuatorKind::Irrigation)?;
            frame.push_str(status_text(ActuatorKind::Irrigation, status));
        }
    }
    Ok(frame)
}

/// Status line for an actuator
/// Automatic irrigation is labelled as blinking
fn status_text(kind: ActuatorKind, status: ActuatorStatus) -> &'static str {
    match (kind, status.manual, status.on) {
        (ActuatorKind::Ventilation, true, true) => "Vent.: ON (Manual)",
        (ActuatorKind::Ventilation, true, false) => "Vent.: OFF (Manual)",
        (ActuatorKind::Ventilation, false, true) => "Vent.: ON",
        (ActuatorKind::Ventilation, false, false) => "Vent.: OFF",
        (ActuatorKind::Irrigation, true, true) => "Irrig.: ON (Manual)",
        (ActuatorKind::Irrigation, true, false) => "Irrig.: OFF (Manual)",
        (ActuatorKind::Irrigation, false, true) => "Irrig.: ON (blink)",
        (ActuatorKind::Irrigation, false, false) => "Irrig.: OFF",
    }
}

/// Clears the target and draws the frame in the 6x10 font
pub fn draw_frame<D>(target: &mut D, frame: &Frame) -> Result<(), Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    target.clear(BinaryColor::Off).map_err(|_| Error::Display)?;
    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    for (row, line) in frame.lines().enumerate() {
        Text::with_baseline(line, Point::new(0, row as i32 * LINE_HEIGHT), style, Baseline::Top)
            .draw(target)
            .map_err(|_| Error::Display)?;
    }
    Ok(())
}
