//! Integer ⇄ ASCII decimal.
//!
//! Writing extracts two digits at a time from a lookup table. Reading is a
//! checked base-10 accumulation, so overflow is reported instead of wrapped.

// -----------------------------------------------------------------------------
// Write

const DIGIT_PAIRS: &[u8; 200] = b"\
0001020304050607080910111213141516171819\
2021222324252627282930313233343536373839\
4041424344454647484950515253545556575859\
6061626364656667686970717273747576777879\
8081828384858687888990919293949596979899";

/// Appends the decimal digits of `n` to `out`.
///
/// # Examples
///
/// ```
/// use fj_codec::primitives::integer;
///
/// let mut out = String::new();
/// integer::write_u64(&mut out, 1_234_567);
/// assert_eq!(out, "1234567");
/// ```
pub fn write_u64(out: &mut String, mut n: u64) {
    let mut buf = [0u8; 20];
    let mut pos = buf.len();

    while n >= 100 {
        let pair = (n % 100) as usize * 2;
        n /= 100;
        pos -= 2;
        buf[pos] = DIGIT_PAIRS[pair];
        buf[pos + 1] = DIGIT_PAIRS[pair + 1];
    }
    if n >= 10 {
        let pair = n as usize * 2;
        pos -= 2;
        buf[pos] = DIGIT_PAIRS[pair];
        buf[pos + 1] = DIGIT_PAIRS[pair + 1];
    } else {
        pos -= 1;
        buf[pos] = b'0' + n as u8;
    }

    out.extend(buf[pos..].iter().map(|&b| char::from(b)));
}

/// Appends the decimal digits of `n` to `out`, with a leading `-` if negative.
///
/// ```
/// use fj_codec::primitives::integer;
///
/// let mut out = String::new();
/// integer::write_i64(&mut out, i64::MIN);
/// assert_eq!(out, "-9223372036854775808");
/// ```
pub fn write_i64(out: &mut String, n: i64) {
    if n < 0 {
        out.push('-');
    }
    write_u64(out, n.unsigned_abs());
}

// -----------------------------------------------------------------------------
// Read

#[inline]
fn digits(text: &str) -> Option<&[u8]> {
    let bytes = text.as_bytes();
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(bytes)
}

/// Parses an unsigned decimal. An optional leading `+` is accepted.
pub fn parse_u64(text: &str) -> Option<u64> {
    let text = text.strip_prefix('+').unwrap_or(text);
    digits(text)?.iter().try_fold(0u64, |acc, &d| {
        acc.checked_mul(10)?.checked_add(u64::from(d - b'0'))
    })
}

/// Parses a signed decimal.
///
/// Negative values accumulate downwards, so `i64::MIN` parses.
pub fn parse_i64(text: &str) -> Option<i64> {
    match text.strip_prefix('-') {
        Some(rest) => digits(rest)?.iter().try_fold(0i64, |acc, &d| {
            acc.checked_mul(10)?.checked_sub(i64::from(d - b'0'))
        }),
        None => {
            let rest = text.strip_prefix('+').unwrap_or(text);
            digits(rest)?.iter().try_fold(0i64, |acc, &d| {
                acc.checked_mul(10)?.checked_add(i64::from(d - b'0'))
            })
        }
    }
}

macro_rules! narrow_parser {
    ($($name:ident: $ty:ty => $wide:ident;)*) => {
        $(
            #[doc = concat!("Parses a `", stringify!($ty), "`, rejecting out-of-range values.")]
            #[inline]
            pub fn $name(text: &str) -> Option<$ty> {
                <$ty>::try_from($wide(text)?).ok()
            }
        )*
    };
}

narrow_parser! {
    parse_i8: i8 => parse_i64;
    parse_i16: i16 => parse_i64;
    parse_i32: i32 => parse_i64;
    parse_isize: isize => parse_i64;
    parse_u8: u8 => parse_u64;
    parse_u16: u16 => parse_u64;
    parse_u32: u32 => parse_u64;
    parse_usize: usize => parse_u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(n: i64) -> String {
        let mut out = String::new();
        write_i64(&mut out, n);
        out
    }

    #[test]
    fn write_matches_display() {
        for n in [0, 7, 10, 99, 100, 101, -1, -10, 1_000_000, i64::MAX, i64::MIN] {
            assert_eq!(written(n), n.to_string());
        }
        let mut out = String::new();
        write_u64(&mut out, u64::MAX);
        assert_eq!(out, u64::MAX.to_string());
    }

    #[test]
    fn parse_bounds() {
        assert_eq!(parse_i64("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_i64("9223372036854775808"), None);
        assert_eq!(parse_u64("18446744073709551615"), Some(u64::MAX));
        assert_eq!(parse_u64("18446744073709551616"), None);
        assert_eq!(parse_i8("-128"), Some(-128));
        assert_eq!(parse_i8("128"), None);
        assert_eq!(parse_u8("-1"), None);
        assert_eq!(parse_i32("+42"), Some(42));
    }

    #[test]
    fn parse_rejects_garbage() {
        for text in ["", "-", "+", "1.5", "1e3", "12a", " 1"] {
            assert_eq!(parse_i64(text), None, "{text}");
        }
    }
}
