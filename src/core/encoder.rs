//! Append-only value encoding
//!
//! Every function here appends to a caller-owned `Vec<u8>` and never allocates
//! anything of its own; the only heap activity is the vector growing.
//!
//! Float policy (kept stable for log diffing): finite values with
//! `1e-6 <= |v| < 1e15` are printed with at most six fractional digits and
//! trailing zeros trimmed (`3.14`, `2`, `-0.5`). Other finite values use the
//! shortest exponent form (`1e300`, `1.5e-9`). Zero of either sign is `0`.
//! Non-finite values are `NaN`, `+Inf` and `-Inf`.

use super::field::Value;
use super::log_level::LogLevel;
use super::output_format::OutputFormat;
use std::io::Write;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Smallest magnitude printed in fixed notation
const FIXED_MIN: f64 = 1e-6;
/// Magnitude from which exponent notation takes over
const FIXED_MAX: f64 = 1e15;
/// Fractional digits kept in fixed notation
const FIXED_PRECISION: usize = 6;

#[inline]
pub fn append_level(buf: &mut Vec<u8>, level: LogLevel) {
    buf.extend_from_slice(level.to_str().as_bytes());
}

#[inline]
pub fn append_bool(buf: &mut Vec<u8>, value: bool) {
    buf.extend_from_slice(if value { b"true" } else { b"false" });
}

pub fn append_uint(buf: &mut Vec<u8>, mut value: u64) {
    // u64::MAX has 20 digits
    let mut digits = [0u8; 20];
    let mut pos = digits.len();
    loop {
        pos -= 1;
        digits[pos] = b'0' + (value % 10) as u8;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    buf.extend_from_slice(&digits[pos..]);
}

pub fn append_int(buf: &mut Vec<u8>, value: i64) {
    if value < 0 {
        buf.push(b'-');
    }
    // unsigned_abs keeps i64::MIN representable
    append_uint(buf, value.unsigned_abs());
}

pub fn append_float(buf: &mut Vec<u8>, value: f64) {
    if value.is_nan() {
        buf.extend_from_slice(b"NaN");
        return;
    }
    if value.is_infinite() {
        buf.extend_from_slice(if value > 0.0 { b"+Inf" } else { b"-Inf" });
        return;
    }

    let magnitude = value.abs();
    if magnitude == 0.0 {
        buf.push(b'0');
        return;
    }

    // Writing into a Vec<u8> cannot fail
    if (FIXED_MIN..FIXED_MAX).contains(&magnitude) {
        let _ = write!(buf, "{:.*}", FIXED_PRECISION, value);
        while buf.last() == Some(&b'0') {
            buf.pop();
        }
        if buf.last() == Some(&b'.') {
            buf.pop();
        }
    } else {
        let _ = write!(buf, "{:e}", value);
    }
}

/// Append a string for the text format.
///
/// Line breaks and tabs become `\n`, `\r`, `\t` so a record can never be
/// split into several lines by its own content.
pub fn append_text_escaped(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    let mut start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        let escaped: &[u8] = match b {
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            _ => continue,
        };
        buf.extend_from_slice(&bytes[start..i]);
        buf.extend_from_slice(escaped);
        start = i + 1;
    }

    buf.extend_from_slice(&bytes[start..]);
}

/// Append the body of a JSON string (without the surrounding quotes).
///
/// `"` and `\` are backslash-escaped. Control bytes below 0x20 use the short
/// escapes where JSON has one and `\u00XX` otherwise.
pub fn append_json_escaped(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    let mut start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        let escaped: &[u8] = match b {
            b'"' => b"\\\"",
            b'\\' => b"\\\\",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            0x08 => b"\\b",
            0x0c => b"\\f",
            0x00..=0x1f => {
                buf.extend_from_slice(&bytes[start..i]);
                buf.extend_from_slice(b"\\u00");
                buf.push(HEX_DIGITS[(b >> 4) as usize]);
                buf.push(HEX_DIGITS[(b & 0x0f) as usize]);
                start = i + 1;
                continue;
            }
            _ => continue,
        };
        buf.extend_from_slice(&bytes[start..i]);
        buf.extend_from_slice(escaped);
        start = i + 1;
    }

    buf.extend_from_slice(&bytes[start..]);
}

/// Append a quoted, escaped JSON string
#[inline]
pub fn append_json_string(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    append_json_escaped(buf, s);
    buf.push(b'"');
}

/// Append `value` in the representation `format` uses for field values.
///
/// In JSON, strings, `unknown` and non-finite floats are quoted; numbers and
/// booleans are bare.
pub fn append_value(buf: &mut Vec<u8>, value: &Value<'_>, format: OutputFormat) {
    match (value, format) {
        (Value::Str(s), OutputFormat::Text) => append_text_escaped(buf, s),
        (Value::Str(s), OutputFormat::Json) => append_json_string(buf, s),
        (Value::Int(i), _) => append_int(buf, *i),
        (Value::Uint(u), _) => append_uint(buf, *u),
        (Value::Float(f), OutputFormat::Json) if !f.is_finite() => {
            buf.push(b'"');
            append_float(buf, *f);
            buf.push(b'"');
        }
        (Value::Float(f), _) => append_float(buf, *f),
        (Value::Bool(b), _) => append_bool(buf, *b),
        (Value::Unknown, OutputFormat::Text) => buf.extend_from_slice(b"unknown"),
        (Value::Unknown, OutputFormat::Json) => buf.extend_from_slice(b"\"unknown\""),
    }
}
