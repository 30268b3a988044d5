//! Number formatting and parsing for the text surfaces
//!
//! `ufmt` has no float support, so readings go through [`Fixed`]. Console entries
//! are parsed with the leading-number rule: take the longest numeric prefix,
//! exponent included, and ignore whatever follows it.

use ufmt::{uDisplay, uWrite, Formatter};

/// A float printed with a fixed number of decimal places
#[derive(Debug, Clone, Copy)]
pub struct Fixed {
    value: f32,
    places: u8,
}

impl Fixed {
    pub fn new(value: f32, places: u8) -> Fixed {
        // 10^4 still fits comfortably in u32 alongside the integer part
        Self {
            value,
            places: places.min(4),
        }
    }
}

impl uDisplay for Fixed {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        if self.value.is_nan() {
            return f.write_str("nan");
        }
        if self.value.is_infinite() {
            return f.write_str(if self.value < 0.0 { "-inf" } else { "inf" });
        }

        let scale = 10u32.pow(self.places as u32);
        let magnitude = if self.value < 0.0 {
            -self.value
        } else {
            self.value
        };
        // Round half away from zero, saturating on huge values
        let scaled = (magnitude * scale as f32 + 0.5) as u32;
        let whole = scaled / scale;
        let fraction = scaled % scale;

        if self.value < 0.0 && scaled != 0 {
            f.write_str("-")?;
        }
        whole.fmt(f)?;
        if self.places == 0 {
            return Ok(());
        }

        f.write_str(".")?;
        let mut divisor = scale / 10;
        while divisor > 1 && fraction < divisor {
            f.write_str("0")?;
            divisor /= 10;
        }
        fraction.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ScanState {
    #[default]
    Start,
    Sign,
    Whole,
    /// A point with no digits before it yet
    Point,
    Fraction,
    Exponent,
    ExponentSign,
    ExponentDigits,
    Done,
}

/// Incremental scanner for a leading decimal number, the prefix `atof` reads
///
/// Bytes go in one at a time. [`NumberScan::len`] is the length of the longest
/// complete number seen so far, so a dangling `"-"`, `"."` or `"3e"` is not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumberScan {
    state: ScanState,
    consumed: usize,
    complete: usize,
}

impl NumberScan {
    /// Feeds the next byte
    /// returns: false once the number has ended; later bytes are ignored
    pub fn push(&mut self, byte: u8) -> bool {
        use ScanState::*;

        let next = match (self.state, byte) {
            (Start, b'+' | b'-') => Sign,
            (Start | Sign | Whole, b'0'..=b'9') => Whole,
            (Start | Sign, b'.') => Point,
            (Whole, b'.') => Fraction,
            (Point | Fraction, b'0'..=b'9') => Fraction,
            (Whole | Fraction, b'e' | b'E') => Exponent,
            (Exponent, b'+' | b'-') => ExponentSign,
            (Exponent | ExponentSign | ExponentDigits, b'0'..=b'9') => ExponentDigits,
            _ => {
                self.state = Done;
                return false;
            }
        };
        self.state = next;
        self.consumed += 1;
        if matches!(next, Whole | Fraction | ExponentDigits) {
            self.complete = self.consumed;
        }
        true
    }

    /// Bytes that make up the number; 0 if there is none
    pub fn len(&self) -> usize {
        self.complete
    }

    pub fn is_empty(&self) -> bool {
        self.complete == 0
    }

    /// In the digits after the decimal point, with no exponent started
    pub fn in_fraction(&self) -> bool {
        self.state == ScanState::Fraction
    }
}

/// Parses the longest leading decimal number, like `atof`
/// Leading whitespace is skipped; no digits at all reads as 0.0
pub fn parse_leading_float(text: &str) -> f32 {
    let text = text.trim_start();
    let mut scan = NumberScan::default();
    for byte in text.bytes() {
        if !scan.push(byte) {
            break;
        }
    }

    if scan.is_empty() {
        return 0.0;
    }
    text[..scan.len()].parse().unwrap_or(0.0)
}

/// Parses the longest leading integer, like `atol`, saturating at the i32 bounds
pub fn parse_leading_int(text: &str) -> i32 {
    let text = text.trim_start();
    let mut bytes = text.bytes().peekable();

    let negative = match bytes.peek() {
        Some(b'-') => {
            bytes.next();
            true
        }
        Some(b'+') => {
            bytes.next();
            false
        }
        _ => false,
    };

    let mut value: i32 = 0;
    for byte in bytes {
        if !byte.is_ascii_digit() {
            break;
        }
        let digit = (byte - b'0') as i32;
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}
