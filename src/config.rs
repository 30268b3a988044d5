//! Board wide constants

/*** Timing ***/
pub const SENSOR_INTERVAL_MS: u32 = 2000; // 2000ms between climate samples
pub const BLINK_INTERVAL_MS: u32 = 500;
pub const DEBOUNCE_MS: u32 = 50;
pub const LOOP_DELAY_MS: u32 = 10;
pub const SPLASH_MS: u32 = 2000;

/*** Setpoint ranges (inclusive) ***/
pub const TEMP_MIN: i32 = 10;
pub const TEMP_MAX: i32 = 40;
pub const HUM_MIN: u8 = 40;
pub const HUM_MAX: u8 = 60;

/// Reference used until the knob is first sampled
pub const DEFAULT_TEMPERATURE_REFERENCE: f32 = 25.0;

/// Full scale of the 12-bit knob ADC
pub const KNOB_MAX: u16 = 4095;

/*** Serial console ***/
pub const SERIAL_BAUD: u32 = 9600;
/// Longest numeric entry kept by the console, extra characters are dropped
pub const INPUT_LINE_CAPACITY: usize = 16;
/// Bytes drained from the UART per loop iteration
pub const SERIAL_BATCH: usize = 64;
/// Unread input held back after a finished entry plus the next batch
pub const CONSOLE_BACKLOG: usize = 2 * SERIAL_BATCH;

/*** Display ***/
pub const DISPLAY_ADDRESS: u8 = 0x3C;
/// Rows of 6x10 text that fit on the panel
pub const DISPLAY_LINES: usize = 6;
pub const LINE_HEIGHT: i32 = 10;
/// 128px / 6px glyphs gives 21 visible columns
pub const LINE_CAPACITY: usize = 24;
