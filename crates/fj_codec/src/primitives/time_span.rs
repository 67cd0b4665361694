//! Time interval ⇄ `[-][d.]hh:mm:ss[.fffffffff]`.

use core::fmt::Write;

use chrono::TimeDelta;

const SECS_PER_DAY: i64 = 86_400;

/// Appends the content of a time interval (no quotes).
///
/// # Examples
///
/// ```
/// use chrono::TimeDelta;
/// use fj_codec::primitives::time_span;
///
/// let mut out = String::new();
/// let span = TimeDelta::days(2) + TimeDelta::minutes(90) + TimeDelta::milliseconds(5);
/// time_span::write(&mut out, span);
/// assert_eq!(out, "2.01:30:00.005");
/// ```
pub fn write(out: &mut String, value: TimeDelta) {
    let negative = value < TimeDelta::zero();
    let abs = if negative { -value } else { value };
    if negative {
        out.push('-');
    }

    let secs = abs.num_seconds();
    let days = secs / SECS_PER_DAY;
    if days > 0 {
        super::integer::write_i64(out, days);
        out.push('.');
    }
    let _ = write!(
        out,
        "{:02}:{:02}:{:02}",
        secs / 3600 % 24,
        secs / 60 % 60,
        secs % 60
    );
    super::date::write_fraction(out, abs.subsec_nanos().unsigned_abs());
}

/// Parses `[-][d.]hh:mm:ss[.fffffffff]`.
///
/// ```
/// use chrono::TimeDelta;
/// use fj_codec::primitives::time_span;
///
/// assert_eq!(time_span::parse("-00:00:01.5"), Some(TimeDelta::milliseconds(-1500)));
/// assert_eq!(time_span::parse("25:00:00"), None);
/// ```
pub fn parse(text: &str) -> Option<TimeDelta> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let mut parts = body.split(':');
    let (head, minutes, seconds) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let (days, hours) = match head.split_once('.') {
        Some((days, hours)) => (super::integer::parse_u64(days)?, hours),
        None => (0, head),
    };
    let hours = super::integer::parse_u8(hours).filter(|h| *h < 24)?;
    let minutes = super::integer::parse_u8(minutes).filter(|m| *m < 60)?;

    let (seconds, fraction) = match seconds.split_once('.') {
        Some((s, f)) => (s, Some(f)),
        None => (seconds, None),
    };
    let seconds = super::integer::parse_u8(seconds).filter(|s| *s < 60)?;

    let nanos = match fraction {
        None => 0,
        Some(f) if (1..=9).contains(&f.len()) => {
            let digits = super::integer::parse_u32(f)?;
            digits * 10u32.pow(9 - f.len() as u32)
        }
        Some(_) => return None,
    };

    let total = i64::try_from(days)
        .ok()?
        .checked_mul(SECS_PER_DAY)?
        .checked_add(i64::from(hours) * 3600 + i64::from(minutes) * 60 + i64::from(seconds))?;
    let value = TimeDelta::new(total, nanos)?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::{parse, write};
    use chrono::TimeDelta;

    fn written(value: TimeDelta) -> String {
        let mut out = String::new();
        write(&mut out, value);
        out
    }

    #[test]
    fn round_trip() {
        for value in [
            TimeDelta::zero(),
            TimeDelta::seconds(59),
            TimeDelta::hours(23) + TimeDelta::nanoseconds(1),
            TimeDelta::days(400) + TimeDelta::seconds(3661),
            -TimeDelta::milliseconds(250),
            -(TimeDelta::days(3) + TimeDelta::hours(4)),
        ] {
            assert_eq!(parse(&written(value)), Some(value), "{}", written(value));
        }
    }

    #[test]
    fn formats() {
        assert_eq!(written(TimeDelta::zero()), "00:00:00");
        assert_eq!(written(-TimeDelta::days(1)), "-1.00:00:00");
        assert_eq!(written(TimeDelta::microseconds(1234)), "00:00:00.001234");
    }

    #[test]
    fn rejects() {
        for text in ["", "1:2", "00:60:00", "00:00:00.", "00:00:00.1234567890", "a.00:00:00"] {
            assert_eq!(parse(text), None, "{text}");
        }
    }
}
