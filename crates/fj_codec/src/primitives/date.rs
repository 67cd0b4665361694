//! Date-time ⇄ text for the three wire schemes plus custom formats.
//!
//! Three value kinds are supported:
//!
//! - [`DateTime<Utc>`]: an instant.
//! - [`NaiveDateTime`]: a wall-clock time without zone (unspecified kind).
//! - [`DateTime<FixedOffset>`]: a wall-clock time with its offset.
//!
//! Writers follow [`Settings::date_format`] and [`Settings::time_zone`].
//! Readers accept every scheme regardless of the configured format, then
//! convert the parsed moment into the target kind.
//!
//! The legacy scheme covers `0001-01-01T00:00:00Z` to
//! `9999-12-31T23:59:59.999Z`. Values outside are written as the nearer of the
//! sentinels [`LEGACY_MIN_MILLIS`] and [`LEGACY_MAX_MILLIS`], which read back
//! as those two instants.
//!
//! Offsets are applied with checked arithmetic. A moment that cannot be
//! shifted into range is a parse failure, never a panic.

use core::fmt::{self, Write};

use chrono::{
    DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone, Timelike,
    Utc,
};

use crate::settings::{DateFormat, Settings, TimeZoneFormat};

/// Legacy text of the minimum date, `0001-01-01T00:00:00Z` in milliseconds.
pub const LEGACY_MIN_MILLIS: i64 = -62_135_596_800_000;
/// Legacy text of the maximum date, `9999-12-31T23:59:59.999Z` in milliseconds.
pub const LEGACY_MAX_MILLIS: i64 = 253_402_300_799_999;

// -----------------------------------------------------------------------------
// Moment

/// How a wall-clock time relates to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Designator {
    /// No zone information.
    Unspecified,
    /// The wall-clock time is UTC.
    Zulu,
    Offset(FixedOffset),
}

/// A wall-clock time plus its designator.
#[derive(Debug, Clone, Copy)]
struct Moment {
    wall: NaiveDateTime,
    designator: Designator,
}

impl Moment {
    fn utc(wall: NaiveDateTime) -> Self {
        Self {
            wall,
            designator: Designator::Zulu,
        }
    }

    /// The UTC wall-clock time. Unspecified moments are taken as UTC.
    ///
    /// `None` when the offset moves the time out of range.
    fn utc_wall(&self) -> Option<NaiveDateTime> {
        match self.designator {
            Designator::Offset(offset) => self.wall.checked_sub_offset(offset),
            _ => Some(self.wall),
        }
    }

    fn offset(&self) -> FixedOffset {
        match self.designator {
            Designator::Offset(offset) => offset,
            _ => Utc.fix(),
        }
    }
}

fn local_offset_at_utc(utc_wall: &NaiveDateTime) -> FixedOffset {
    Local.offset_from_utc_datetime(utc_wall)
}

fn local_offset_at_wall(wall: &NaiveDateTime) -> FixedOffset {
    Local
        .from_local_datetime(wall)
        .earliest()
        .map(|dt| *dt.offset())
        .unwrap_or_else(|| local_offset_at_utc(wall))
}

fn to_local(utc_wall: NaiveDateTime) -> Option<Moment> {
    let offset = local_offset_at_utc(&utc_wall);
    Some(Moment {
        wall: utc_wall.checked_add_offset(offset)?,
        designator: Designator::Offset(offset),
    })
}

/// The local moment of `utc_wall`, or the UTC one when it cannot be shifted.
fn to_local_or_utc(utc_wall: NaiveDateTime) -> Moment {
    let local = if is_extreme(&utc_wall) {
        None
    } else {
        to_local(utc_wall)
    };
    local.unwrap_or_else(|| Moment::utc(utc_wall))
}

// -----------------------------------------------------------------------------
// Write

/// Appends a [`DateTime<Utc>`] as a complete JSON token.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use fj_codec::primitives::date;
/// use fj_codec::settings::{DateFormat, Settings};
///
/// let value = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
///
/// let mut out = String::new();
/// date::write_utc(&mut out, &value, &Settings::default()).unwrap();
/// assert_eq!(out, r#""2024-05-01T12:30:00Z""#);
///
/// out.clear();
/// let legacy = Settings::default().with_date_format(DateFormat::Legacy);
/// date::write_utc(&mut out, &value, &legacy).unwrap();
/// assert_eq!(out, r#""\/Date(1714566600000)\/""#);
/// ```
pub fn write_utc(out: &mut String, value: &DateTime<Utc>, settings: &Settings) -> fmt::Result {
    let utc_wall = value.naive_utc();
    let moment = match settings.time_zone {
        TimeZoneFormat::Local => to_local_or_utc(utc_wall),
        _ => Moment::utc(utc_wall),
    };
    write_moment(out, moment, settings)
}

/// Appends a [`NaiveDateTime`] as a complete JSON token.
pub fn write_naive(out: &mut String, value: &NaiveDateTime, settings: &Settings) -> fmt::Result {
    let moment = match settings.time_zone {
        TimeZoneFormat::Unspecified => Moment {
            wall: *value,
            designator: Designator::Unspecified,
        },
        TimeZoneFormat::Utc => Moment::utc(*value),
        TimeZoneFormat::Local if is_extreme(value) => Moment::utc(*value),
        TimeZoneFormat::Local => Moment {
            wall: *value,
            designator: Designator::Offset(local_offset_at_wall(value)),
        },
    };
    write_moment(out, moment, settings)
}

/// Appends a [`DateTime<FixedOffset>`] as a complete JSON token.
pub fn write_offset(
    out: &mut String,
    value: &DateTime<FixedOffset>,
    settings: &Settings,
) -> fmt::Result {
    let utc_wall = value.naive_utc();
    let moment = match settings.time_zone {
        TimeZoneFormat::Unspecified => Moment {
            wall: value.naive_local(),
            designator: Designator::Offset(*value.offset()),
        },
        TimeZoneFormat::Utc => Moment::utc(utc_wall),
        TimeZoneFormat::Local => to_local_or_utc(utc_wall),
    };
    write_moment(out, moment, settings)
}

/// Values this close to the representable range cannot be shifted by an offset.
fn is_extreme(wall: &NaiveDateTime) -> bool {
    let year = wall.year();
    year <= NaiveDateTime::MIN.year() + 1 || year >= NaiveDateTime::MAX.year() - 1
}

fn write_moment(out: &mut String, moment: Moment, settings: &Settings) -> fmt::Result {
    let quote = settings.write_quote();
    match &settings.date_format {
        DateFormat::Legacy => {
            out.push(quote);
            write_legacy(out, moment)?;
            out.push(quote);
        }
        DateFormat::Iso => {
            out.push(quote);
            write_iso(out, moment)?;
            out.push(quote);
        }
        DateFormat::EpochMilliseconds => {
            let utc_wall = moment.utc_wall().ok_or(fmt::Error)?;
            super::integer::write_i64(out, utc_wall.and_utc().timestamp_millis());
        }
        DateFormat::Custom(format) => {
            let mut text = String::new();
            match moment.designator {
                Designator::Unspecified => write!(text, "{}", moment.wall.format(format))?,
                _ => {
                    let offset = moment.offset();
                    let value = offset.from_utc_datetime(&moment.utc_wall().ok_or(fmt::Error)?);
                    write!(text, "{}", value.format(format))?;
                }
            }
            super::text::write_escaped(out, &text, quote);
        }
    }
    Ok(())
}

fn write_legacy(out: &mut String, moment: Moment) -> fmt::Result {
    let exact = match moment.utc_wall() {
        Some(utc_wall) => utc_wall.and_utc().timestamp_millis(),
        None if moment.wall.year() < 0 => i64::MIN,
        None => i64::MAX,
    };
    let millis = exact.clamp(LEGACY_MIN_MILLIS, LEGACY_MAX_MILLIS);

    out.push_str("\\/Date(");
    super::integer::write_i64(out, millis);
    // Sentinels carry no offset.
    if let Designator::Offset(offset) = moment.designator
        && millis == exact
    {
        let secs = offset.local_minus_utc();
        let sign = if secs < 0 { '-' } else { '+' };
        let secs = secs.unsigned_abs();
        write!(out, "{sign}{:02}{:02}", secs / 3600, secs / 60 % 60)?;
    }
    out.push_str(")\\/");
    Ok(())
}

fn write_iso(out: &mut String, moment: Moment) -> fmt::Result {
    write!(out, "{}", moment.wall.format("%Y-%m-%dT%H:%M:%S"))?;
    write_fraction(out, moment.wall.nanosecond() % 1_000_000_000);
    match moment.designator {
        Designator::Unspecified => {}
        Designator::Zulu => out.push('Z'),
        Designator::Offset(offset) => {
            let secs = offset.local_minus_utc();
            let sign = if secs < 0 { '-' } else { '+' };
            let secs = secs.unsigned_abs();
            write!(out, "{sign}{:02}:{:02}", secs / 3600, secs / 60 % 60)?;
        }
    }
    Ok(())
}

/// Appends `.fffffffff` without trailing zeros, or nothing for zero.
pub(crate) fn write_fraction(out: &mut String, nanos: u32) {
    if nanos == 0 {
        return;
    }
    let mut digits = [b'0'; 9];
    let mut n = nanos;
    for slot in digits.iter_mut().rev() {
        *slot = b'0' + (n % 10) as u8;
        n /= 10;
    }
    let len = digits.iter().rposition(|&d| d != b'0').map_or(0, |i| i + 1);
    out.push('.');
    out.extend(digits[..len].iter().map(|&b| char::from(b)));
}

// -----------------------------------------------------------------------------
// Read

/// Parses token text into a [`DateTime<Utc>`].
///
/// `text` is the decoded string content, or the bare token for epoch numbers.
///
/// ```
/// use fj_codec::primitives::date;
/// use fj_codec::settings::Settings;
///
/// let s = Settings::default();
/// let a = date::parse_utc("2024-05-01T14:30:00+02:00", &s).unwrap();
/// let b = date::parse_utc("/Date(1714566600000)/", &s).unwrap();
/// let c = date::parse_utc("1714566600000", &s).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(b, c);
/// ```
pub fn parse_utc(text: &str, settings: &Settings) -> Option<DateTime<Utc>> {
    let moment = parse_moment(text, settings)?;
    let utc_wall = match moment.designator {
        Designator::Unspecified
            if settings.time_zone == TimeZoneFormat::Local && !is_extreme(&moment.wall) =>
        {
            moment
                .wall
                .checked_sub_offset(local_offset_at_wall(&moment.wall))?
        }
        _ => moment.utc_wall()?,
    };
    Some(utc_wall.and_utc())
}

/// Parses token text into a [`NaiveDateTime`].
///
/// Zoned input is converted per time zone mode: UTC wall-clock for
/// [`TimeZoneFormat::Utc`], system local time for [`TimeZoneFormat::Local`],
/// and the wall-clock time as written otherwise.
pub fn parse_naive(text: &str, settings: &Settings) -> Option<NaiveDateTime> {
    let moment = parse_moment(text, settings)?;
    if moment.designator == Designator::Unspecified {
        return Some(moment.wall);
    }
    match settings.time_zone {
        TimeZoneFormat::Unspecified => Some(moment.wall),
        TimeZoneFormat::Utc => moment.utc_wall(),
        TimeZoneFormat::Local => Some(to_local_or_utc(moment.utc_wall()?).wall),
    }
}

/// Parses token text into a [`DateTime<FixedOffset>`].
///
/// Input without zone information takes the local offset in
/// [`TimeZoneFormat::Local`] mode and `+00:00` otherwise.
pub fn parse_offset(text: &str, settings: &Settings) -> Option<DateTime<FixedOffset>> {
    let moment = parse_moment(text, settings)?;
    let offset = match moment.designator {
        Designator::Unspecified
            if settings.time_zone == TimeZoneFormat::Local && !is_extreme(&moment.wall) =>
        {
            local_offset_at_wall(&moment.wall)
        }
        _ => moment.offset(),
    };
    let utc_wall = match moment.designator {
        Designator::Unspecified => moment.wall.checked_sub_offset(offset)?,
        _ => moment.utc_wall()?,
    };
    Some(offset.from_utc_datetime(&utc_wall))
}

fn parse_moment(text: &str, settings: &Settings) -> Option<Moment> {
    if let Some(inner) = text
        .strip_prefix("/Date(")
        .and_then(|rest| rest.strip_suffix(")/"))
    {
        return parse_legacy(inner);
    }
    if let Some(millis) = super::integer::parse_i64(text) {
        return DateTime::from_timestamp_millis(millis).map(|dt| Moment::utc(dt.naive_utc()));
    }
    if let DateFormat::Custom(format) = &settings.date_format
        && let Some(moment) = parse_custom(text, format)
    {
        return Some(moment);
    }
    parse_iso(text)
}

fn parse_legacy(inner: &str) -> Option<Moment> {
    let split = inner
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '+' || c == '-')
        .map(|(i, _)| i);

    let (millis, offset) = match split {
        Some(i) => (&inner[..i], Some(&inner[i..])),
        None => (inner, None),
    };
    let millis = super::integer::parse_i64(millis)?;

    let utc_wall = DateTime::from_timestamp_millis(millis)?.naive_utc();
    match offset {
        None => Some(Moment::utc(utc_wall)),
        Some(offset) => {
            let offset = parse_hhmm(offset)?;
            Some(Moment {
                wall: utc_wall.checked_add_offset(offset)?,
                designator: Designator::Offset(offset),
            })
        }
    }
}

/// `+hhmm` or `-hhmm`.
fn parse_hhmm(text: &str) -> Option<FixedOffset> {
    let (sign, digits) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours = super::integer::parse_i32(&digits[..2])?;
    let minutes = super::integer::parse_i32(&digits[2..])?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn parse_iso(text: &str) -> Option<Moment> {
    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        let zulu = text.ends_with(['Z', 'z']);
        return Some(if zulu {
            Moment::utc(value.naive_utc())
        } else {
            Moment {
                wall: value.naive_local(),
                designator: Designator::Offset(*value.offset()),
            }
        });
    }

    const NAIVE_FORMATS: [&str; 3] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    let wall = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    Some(Moment {
        wall,
        designator: Designator::Unspecified,
    })
}

fn parse_custom(text: &str, format: &str) -> Option<Moment> {
    if let Ok(value) = DateTime::parse_from_str(text, format) {
        return Some(Moment {
            wall: value.naive_local(),
            designator: Designator::Offset(*value.offset()),
        });
    }
    let wall = NaiveDateTime::parse_from_str(text, format).ok().or_else(|| {
        NaiveDate::parse_from_str(text, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    })?;
    Some(Moment {
        wall,
        designator: Designator::Unspecified,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn sample() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap() + chrono::TimeDelta::milliseconds(890)
    }

    fn written(f: impl FnOnce(&mut String)) -> String {
        let mut out = String::new();
        f(&mut out);
        out
    }

    #[test]
    fn iso_utc() {
        let s = Settings::default();
        let text = written(|out| write_utc(out, &sample(), &s).unwrap());
        assert_eq!(text, r#""2021-03-04T05:06:07.89Z""#);
        assert_eq!(parse_utc("2021-03-04T05:06:07.89Z", &s), Some(sample()));
    }

    #[test]
    fn iso_naive_has_no_designator() {
        let s = Settings::default();
        let naive = sample().naive_utc();
        let text = written(|out| write_naive(out, &naive, &s).unwrap());
        assert_eq!(text, r#""2021-03-04T05:06:07.89""#);
        assert_eq!(parse_naive("2021-03-04T05:06:07.89", &s), Some(naive));

        let utc = s.clone().with_time_zone(TimeZoneFormat::Utc);
        let text = written(|out| write_naive(out, &naive, &utc).unwrap());
        assert_eq!(text, r#""2021-03-04T05:06:07.89Z""#);
    }

    #[test]
    fn offset_round_trip() {
        let s = Settings::default();
        let offset = FixedOffset::east_opt(-(5 * 3600 + 30 * 60)).unwrap();
        let value = offset.with_ymd_and_hms(2020, 12, 31, 23, 0, 0).unwrap();
        let text = written(|out| write_offset(out, &value, &s).unwrap());
        assert_eq!(text, r#""2020-12-31T23:00:00-05:30""#);
        assert_eq!(parse_offset("2020-12-31T23:00:00-05:30", &s), Some(value));

        let legacy = s.clone().with_date_format(DateFormat::Legacy);
        let text = written(|out| write_offset(out, &value, &legacy).unwrap());
        let inner = text.trim_matches('"').replace("\\/", "/");
        assert!(inner.ends_with("-0530)/"), "{inner}");
        assert_eq!(parse_offset(&inner, &legacy), Some(value));
    }

    #[test]
    fn legacy_sentinels() {
        let s = Settings::default().with_date_format(DateFormat::Legacy);
        let min = written(|out| write_utc(out, &DateTime::<Utc>::MIN_UTC, &s).unwrap());
        let max = written(|out| write_utc(out, &DateTime::<Utc>::MAX_UTC, &s).unwrap());
        assert_eq!(min, r#""\/Date(-62135596800000)\/""#);
        assert_eq!(max, r#""\/Date(253402300799999)\/""#);

        let first = Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap();
        let last = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap()
            + chrono::TimeDelta::milliseconds(999);
        assert_eq!(parse_utc("/Date(-62135596800000)/", &s), Some(first));
        assert_eq!(parse_utc("/Date(253402300799999)/", &s), Some(last));
        assert_eq!(
            parse_naive("/Date(253402300799999)/", &s),
            Some(last.naive_utc())
        );
    }

    #[test]
    fn legacy_range_boundaries_round_trip() {
        let s = Settings::default().with_date_format(DateFormat::Legacy);
        let first = Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap();
        let last = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap()
            + chrono::TimeDelta::milliseconds(999);
        for value in [first, last] {
            let text = written(|out| write_utc(out, &value, &s).unwrap());
            let inner = text.trim_matches('"').replace("\\/", "/");
            assert_eq!(parse_utc(&inner, &s), Some(value), "{text}");
        }

        // Out of range values are clamped and carry no offset.
        let before = Utc.with_ymd_and_hms(-5, 6, 1, 0, 0, 0).unwrap();
        let text = written(|out| write_utc(out, &before, &s).unwrap());
        assert_eq!(text, r#""\/Date(-62135596800000)\/""#);
    }

    #[test]
    fn offsets_out_of_range_fail() {
        let s = Settings::default();
        let max_millis = NaiveDateTime::MAX.and_utc().timestamp_millis();
        let min_millis = NaiveDateTime::MIN.and_utc().timestamp_millis();
        assert_eq!(parse_utc(&format!("/Date({max_millis}+2359)/"), &s), None);
        assert_eq!(parse_utc(&format!("/Date({min_millis}-2359)/"), &s), None);
        assert_eq!(parse_offset(&format!("/Date({max_millis}+2359)/"), &s), None);
        assert_eq!(parse_naive(&format!("/Date({min_millis}-2359)/"), &s), None);
        assert!(parse_utc(&format!("/Date({max_millis})/"), &s).is_some());
    }

    #[test]
    fn legacy_offset_digits() {
        let s = Settings::default();
        assert_eq!(parse_utc("/Date(0+1é2)/", &s), None);
        assert_eq!(parse_utc("/Date(0+12:0)/", &s), None);
        assert_eq!(parse_utc("/Date(0++120)/", &s), None);
        assert_eq!(
            parse_offset("/Date(0+0130)/", &s).map(|v| v.offset().local_minus_utc()),
            Some(5400)
        );
    }

    #[test]
    fn local_time_zone() {
        let s = Settings::default().with_time_zone(TimeZoneFormat::Local);
        let value = sample();
        let offset = Local.offset_from_utc_datetime(&value.naive_utc());
        let local = value.with_timezone(&offset);

        let text = written(|out| write_utc(out, &value, &s).unwrap());
        let expected = format!(
            "\"{}.89{}\"",
            local.format("%Y-%m-%dT%H:%M:%S"),
            local.format("%:z")
        );
        assert_eq!(text, expected);
        assert_eq!(parse_utc(text.trim_matches('"'), &s), Some(value));

        // Zoned input becomes the local wall-clock time.
        assert_eq!(
            parse_naive("2021-03-04T05:06:07.89Z", &s),
            Some(local.naive_local())
        );
        // Input without zone is read as local time.
        let wall = local.naive_local();
        let iso = wall.format("%Y-%m-%dT%H:%M:%S%.f").to_string();
        assert_eq!(parse_utc(&iso, &s), Some(value));
        assert_eq!(
            parse_offset(&iso, &s).map(|v| *v.offset()),
            Local.from_local_datetime(&wall).earliest().map(|v| v.offset().fix())
        );

        // Naive values take the local offset at their wall-clock time.
        let text = written(|out| write_naive(out, &wall, &s).unwrap());
        assert_eq!(parse_naive(text.trim_matches('"'), &s), Some(wall));

        let legacy = s.clone().with_date_format(DateFormat::Legacy);
        let text = written(|out| write_utc(out, &value, &legacy).unwrap());
        let inner = text.trim_matches('"').replace("\\/", "/");
        assert_eq!(parse_utc(&inner, &legacy), Some(value));
    }

    #[test]
    fn epoch_is_bare() {
        let s = Settings::default().with_date_format(DateFormat::EpochMilliseconds);
        let text = written(|out| write_utc(out, &sample(), &s).unwrap());
        assert_eq!(text, "1614834367890");
        assert_eq!(parse_utc(&text, &s), Some(sample()));
    }

    #[test]
    fn custom_format() {
        let s = Settings::default().with_date_format(DateFormat::Custom("%d/%m/%Y %H:%M".into()));
        let naive = NaiveDate::from_ymd_opt(2022, 7, 9)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap();
        let text = written(|out| write_naive(out, &naive, &s).unwrap());
        assert_eq!(text, r#""09/07/2022 08:15""#);
        assert_eq!(parse_naive("09/07/2022 08:15", &s), Some(naive));
        // ISO input still parses under a custom format.
        assert_eq!(parse_naive("2022-07-09T08:15:00", &s), Some(naive));
    }

    #[test]
    fn date_only_and_garbage() {
        let s = Settings::default();
        assert_eq!(
            parse_naive("2022-07-09", &s),
            NaiveDate::from_ymd_opt(2022, 7, 9).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_utc("yesterday", &s), None);
        assert_eq!(parse_utc("/Date(abc)/", &s), None);
    }

    #[test]
    fn fraction_trimming() {
        let mut out = String::new();
        write_fraction(&mut out, 120_000_000);
        assert_eq!(out, ".12");
        out.clear();
        write_fraction(&mut out, 1);
        assert_eq!(out, ".000000001");
    }
}
