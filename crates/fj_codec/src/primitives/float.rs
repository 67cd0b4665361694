//! Float ⇄ text.
//!
//! Writing uses the shortest representation that parses back to the same
//! value, switching to exponent form for very large or very small numbers.
//! Reading takes an exact fast path for short mantissas with small exponents
//! and defers to the standard parser otherwise.
//!
//! Non-finite values have no JSON number form. They are written as the
//! strings `"NaN"`, `"Infinity"` and `"-Infinity"`.

use core::fmt::Write;

// -----------------------------------------------------------------------------
// Write

const PLAIN_UPPER: f64 = 1e16;
const PLAIN_LOWER: f64 = 1e-5;

/// Returns the string literal content for a non-finite value.
#[inline]
pub fn non_finite_name(x: f64) -> Option<&'static str> {
    if x.is_nan() {
        Some("NaN")
    } else if x.is_infinite() {
        Some(if x > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        None
    }
}

/// Appends a finite `f64`.
///
/// # Examples
///
/// ```
/// use fj_codec::primitives::float;
///
/// let mut out = String::new();
/// float::write_f64(&mut out, 0.1);
/// out.push(' ');
/// float::write_f64(&mut out, 2.5e20);
/// assert_eq!(out, "0.1 2.5e20");
/// ```
pub fn write_f64(out: &mut String, x: f64) {
    let abs = x.abs();
    // `fmt::Write` for `String` never fails.
    let _ = if abs == 0.0 || (PLAIN_LOWER..PLAIN_UPPER).contains(&abs) {
        write!(out, "{x}")
    } else {
        write!(out, "{x:e}")
    };
}

/// Appends a finite `f32`, using the shortest `f32` representation.
pub fn write_f32(out: &mut String, x: f32) {
    let abs = f64::from(x.abs());
    let _ = if abs == 0.0 || (PLAIN_LOWER..PLAIN_UPPER).contains(&abs) {
        write!(out, "{x}")
    } else {
        write!(out, "{x:e}")
    };
}

// -----------------------------------------------------------------------------
// Read

const POW10: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

const MAX_EXACT_MANTISSA: u64 = 1 << 53;

/// Parses a JSON number, or one of the non-finite names.
///
/// ```
/// use fj_codec::primitives::float;
///
/// assert_eq!(float::parse_f64("-12.5e1"), Some(-125.0));
/// assert!(float::parse_f64("NaN").is_some_and(f64::is_nan));
/// assert_eq!(float::parse_f64("1.2.3"), None);
/// ```
pub fn parse_f64(text: &str) -> Option<f64> {
    if let Some(x) = parse_special(text) {
        return Some(x);
    }
    match fast_path(text) {
        Some(x) => Some(x),
        None => slow_path(text),
    }
}

/// Parses an `f32`. Values beyond the fast path go through `str::parse::<f32>`
/// to avoid double rounding.
pub fn parse_f32(text: &str) -> Option<f32> {
    if let Some(x) = parse_special(text) {
        return Some(x as f32);
    }
    if !is_json_number(text) {
        return None;
    }
    text.parse::<f32>().ok()
}

fn parse_special(text: &str) -> Option<f64> {
    match text {
        "NaN" => Some(f64::NAN),
        "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

/// Integer part, fractional digits and a signed exponent.
///
/// Only succeeds when the mantissa and the power of ten are both exactly
/// representable, in which case one multiplication or division is correctly
/// rounded.
fn fast_path(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut i = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    let mut mantissa: u64 = 0;
    let mut digit_count = 0usize;
    let mut exponent: i32 = 0;

    let int_start = i;
    while let Some(&b) = bytes.get(i).filter(|b| b.is_ascii_digit()) {
        mantissa = mantissa.checked_mul(10)?.checked_add(u64::from(b - b'0'))?;
        digit_count += 1;
        i += 1;
    }
    if i == int_start {
        return None;
    }

    if bytes.get(i) == Some(&b'.') {
        i += 1;
        let frac_start = i;
        while let Some(&b) = bytes.get(i).filter(|b| b.is_ascii_digit()) {
            mantissa = mantissa.checked_mul(10)?.checked_add(u64::from(b - b'0'))?;
            digit_count += 1;
            exponent -= 1;
            i += 1;
        }
        if i == frac_start {
            return None;
        }
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        let exp_negative = match bytes.get(i) {
            Some(b'-') => {
                i += 1;
                true
            }
            Some(b'+') => {
                i += 1;
                false
            }
            _ => false,
        };
        let exp_start = i;
        let mut exp: i32 = 0;
        while let Some(&b) = bytes.get(i).filter(|b| b.is_ascii_digit()) {
            exp = exp.checked_mul(10)?.checked_add(i32::from(b - b'0'))?;
            i += 1;
        }
        if i == exp_start {
            return None;
        }
        exponent = exponent.checked_add(if exp_negative { -exp } else { exp })?;
    }

    if i != bytes.len() || digit_count > 19 || mantissa > MAX_EXACT_MANTISSA {
        return None;
    }
    if exponent.unsigned_abs() as usize >= POW10.len() {
        return None;
    }

    let mut value = mantissa as f64;
    if exponent < 0 {
        value /= POW10[exponent.unsigned_abs() as usize];
    } else {
        value *= POW10[exponent as usize];
    }
    Some(if negative { -value } else { value })
}

fn slow_path(text: &str) -> Option<f64> {
    if !is_json_number(text) {
        return None;
    }
    text.parse::<f64>().ok()
}

/// `str::parse` also accepts `inf`, `nan`, `.5` and `1.`, which are not numbers.
fn is_json_number(text: &str) -> bool {
    fn digit_run(bytes: &[u8], i: &mut usize) -> bool {
        let start = *i;
        while bytes.get(*i).is_some_and(u8::is_ascii_digit) {
            *i += 1;
        }
        *i > start
    }

    let bytes = text.as_bytes();
    let mut i = usize::from(matches!(bytes.first(), Some(b'-' | b'+')));

    if !digit_run(bytes, &mut i) {
        return false;
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        if !digit_run(bytes, &mut i) {
            return false;
        }
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'-' | b'+')) {
            i += 1;
        }
        if !digit_run(bytes, &mut i) {
            return false;
        }
    }
    i == bytes.len()
}
