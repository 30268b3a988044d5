use embedded_hal::digital::InputPin;

use crate::config::DEBOUNCE_MS;
use crate::timer::elapsed;
use crate::Error;

/// Display pages, cycled by the page button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Page {
    /// Temperature, reference and ventilation
    #[default]
    Temperature,
    /// Humidity, threshold and irrigation
    Humidity,
}

impl Page {
    /// The page after this one, wrapping around
    pub fn next(self) -> Page {
        match self {
            Page::Temperature => Page::Humidity,
            Page::Humidity => Page::Temperature,
        }
    }
}

/// Debounced momentary button that advances the display page on each press
///
/// A raw level has to hold for more than `DEBOUNCE_MS` before it is accepted.
/// Only the accepted press edge does anything; releases are just tracked.
pub struct Debouncer {
    settle_ms: u32,
    last_raw: bool,
    stable: bool,
    last_change_ms: u32,
    page: Page,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_MS)
    }
}

impl Debouncer {
    pub fn new(settle_ms: u32) -> Debouncer {
        Self {
            settle_ms,
            last_raw: false,
            stable: false,
            last_change_ms: 0,
            page: Page::default(),
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    /// Feeds one raw sample
    /// param pressed: raw level, true while the button is held
    /// param now_ms: current time in milliseconds
    /// returns the new page if this sample completed a press
    pub fn poll(&mut self, pressed: bool, now_ms: u32) -> Option<Page> {
        if pressed != self.last_raw {
            self.last_change_ms = now_ms;
        }
        self.last_raw = pressed;

        if elapsed(self.last_change_ms, now_ms) > self.settle_ms && pressed != self.stable {
            self.stable = pressed;
            if pressed {
                self.page = self.page.next();
                return Some(self.page);
            }
        }
        None
    }

    /// Samples an active-low button pin
    pub fn poll_pin<B: InputPin>(&mut self, button: &mut B, now_ms: u32) -> Result<Option<Page>, Error> {
        let pressed = button.is_low().map_err(|_| Error::Pin)?;
        Ok(self.poll(pressed, now_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeButton;

    #[test]
    fn glitches_shorter_than_settle_time_are_ignored() {
        let mut button = Debouncer::default();
        assert_eq!(button.poll(true, 100), None);
        assert_eq!(button.poll(true, 140), None);
        assert_eq!(button.poll(false, 149), None);
        assert_eq!(button.poll(false, 400), None);
        assert_eq!(button.page(), Page::Temperature);
    }

    #[test]
    fn exactly_settle_time_is_not_enough() {
        let mut button = Debouncer::default();
        button.poll(true, 100);
        assert_eq!(button.poll(true, 150), None);
        assert_eq!(button.poll(true, 151), Some(Page::Humidity));
        assert_eq!(button.poll(true, 400), None);
    }

    #[test]
    fn each_press_advances_one_page_and_wraps() {
        let mut button = Debouncer::default();
        let mut now = 0;
        let mut pages = Vec::new();
        for _ in 0..3 {
            for pressed in [true, false] {
                for _ in 0..10 {
                    now += 10;
                    if let Some(page) = button.poll(pressed, now) {
                        pages.push(page);
                    }
                }
            }
        }
        assert_eq!(pages, vec![Page::Humidity, Page::Temperature, Page::Humidity]);
    }

    #[test]
    fn holding_the_button_counts_once() {
        let mut button = Debouncer::default();
        let mut turns = 0;
        for now in (0..2000).step_by(10) {
            if button.poll(true, now).is_some() {
                turns += 1;
            }
        }
        assert_eq!(turns, 1);
    }

    #[test]
    fn reads_active_low_pins() {
        let mut debouncer = Debouncer::default();
        let mut pin = FakeButton::released();
        assert_eq!(debouncer.poll_pin(&mut pin, 100), Ok(None));
        pin.press();
        assert_eq!(debouncer.poll_pin(&mut pin, 200), Ok(None));
        assert_eq!(debouncer.poll_pin(&mut pin, 260), Ok(Some(Page::Humidity)));
    }
}
