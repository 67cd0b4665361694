//! Call-scoped configuration.
//!
//! A [`Settings`] value is passed to every write and read. Codecs never bake
//! settings in, so one compiled codec serves any configuration.
//!
//! Each thread owns a "current" instance used when no explicit settings are
//! given. Passing an explicit instance never changes it.
//!
//! # Examples
//!
//! ```
//! use fj_codec::settings::{DateFormat, Settings};
//!
//! let settings = Settings::default()
//!     .with_date_format(DateFormat::EpochMilliseconds)
//!     .with_skip_defaults(true);
//!
//! assert_eq!(Settings::current(), Settings::default());
//! Settings::set_current(settings.clone());
//! assert!(Settings::with_current(|s| s.skip_defaults));
//! # Settings::set_current(Settings::default());
//! ```

use core::cell::RefCell;

// -----------------------------------------------------------------------------
// Options

/// How date-time values are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum DateFormat {
    /// `"\/Date(1700000000000)\/"`, optionally with a `+hhmm` offset.
    Legacy,
    /// ISO-8601, e.g. `"2024-05-01T12:30:00.25Z"`.
    #[default]
    Iso,
    /// A bare number of milliseconds since the Unix epoch.
    EpochMilliseconds,
    /// A `chrono` format string, e.g. `"%d/%m/%Y %H:%M"`.
    Custom(String),
}

/// Whether and how offsets are emitted and interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeZoneFormat {
    /// Values keep their own kind. Naive values carry no designator.
    #[default]
    Unspecified,
    /// Values are normalized to UTC and written with `Z`.
    Utc,
    /// Values are converted to the local offset and written with `±hh:mm`.
    Local,
}

/// The character delimiting strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum QuoteChar {
    #[default]
    Double,
    Single,
}

impl QuoteChar {
    #[inline]
    pub const fn as_char(self) -> char {
        match self {
            Self::Double => '"',
            Self::Single => '\'',
        }
    }
}

// -----------------------------------------------------------------------------
// Settings

/// Formatting and parsing options for one call.
///
/// See the [module documentation](self).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Settings {
    /// Date scheme used by the writer. The reader accepts every scheme.
    pub date_format: DateFormat,
    pub time_zone: TimeZoneFormat,
    /// `None` writes `"` and accepts either quote on read.
    /// `Some(q)` pins `q` for both directions.
    pub quote_char: Option<QuoteChar>,
    /// Exact or case-insensitive member matching on read.
    pub case_sensitive: bool,
    /// Lower-cases the first letter of emitted and matched member names.
    pub camel_case: bool,
    /// Omits members whose value equals the default of their type.
    pub skip_defaults: bool,
    /// Writes enums by name instead of by number.
    pub enum_as_string: bool,
    /// Writes `"$type"` as the first member of every object.
    pub include_type_discriminator: bool,
    /// Indents output with two spaces.
    pub pretty_print: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            date_format: DateFormat::Iso,
            time_zone: TimeZoneFormat::Unspecified,
            quote_char: None,
            case_sensitive: true,
            camel_case: false,
            skip_defaults: false,
            enum_as_string: false,
            include_type_discriminator: false,
            pretty_print: false,
        }
    }
}

std::thread_local! {
    static CURRENT: RefCell<Settings> = RefCell::new(Settings::default());
}

impl Settings {
    /// Returns a copy of this thread's current settings.
    pub fn current() -> Settings {
        CURRENT.with(|current| current.borrow().clone())
    }

    /// Replaces this thread's current settings.
    pub fn set_current(settings: Settings) {
        CURRENT.with(|current| *current.borrow_mut() = settings);
    }

    /// Runs `f` with a snapshot of this thread's current settings.
    ///
    /// `f` may replace the current settings; the snapshot it sees stays as
    /// it was when `f` started.
    pub fn with_current<R>(f: impl FnOnce(&Settings) -> R) -> R {
        f(&Self::current())
    }

    /// The quote used when writing.
    #[inline]
    pub fn write_quote(&self) -> char {
        self.quote_char.unwrap_or_default().as_char()
    }

    /// Whether `c` opens a string on read.
    #[inline]
    pub fn is_quote(&self, c: u8) -> bool {
        match self.quote_char {
            Some(q) => c == q.as_char() as u8,
            None => c == b'"' || c == b'\'',
        }
    }

    pub fn with_date_format(mut self, date_format: DateFormat) -> Self {
        self.date_format = date_format;
        self
    }

    pub fn with_time_zone(mut self, time_zone: TimeZoneFormat) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn with_quote_char(mut self, quote_char: QuoteChar) -> Self {
        self.quote_char = Some(quote_char);
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_camel_case(mut self, camel_case: bool) -> Self {
        self.camel_case = camel_case;
        self
    }

    pub fn with_skip_defaults(mut self, skip_defaults: bool) -> Self {
        self.skip_defaults = skip_defaults;
        self
    }

    pub fn with_enum_as_string(mut self, enum_as_string: bool) -> Self {
        self.enum_as_string = enum_as_string;
        self
    }

    pub fn with_type_discriminator(mut self, include: bool) -> Self {
        self.include_type_discriminator = include;
        self
    }

    pub fn with_pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = pretty_print;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{QuoteChar, Settings};

    #[test]
    fn explicit_settings_leave_current_untouched() {
        let custom = Settings::current().with_camel_case(true);
        assert!(custom.camel_case);
        assert!(!Settings::current().camel_case);
    }

    #[test]
    fn with_current_allows_replacing_current() {
        let seen = std::thread::spawn(|| {
            Settings::with_current(|settings| {
                Settings::set_current(settings.clone().with_pretty_print(true));
                settings.pretty_print
            })
        })
        .join()
        .unwrap();
        assert!(!seen);

        let nested = std::thread::spawn(|| {
            Settings::with_current(|_| {
                Settings::set_current(Settings::default().with_camel_case(true));
                Settings::with_current(|inner| inner.camel_case)
            })
        })
        .join()
        .unwrap();
        assert!(nested);
    }

    #[test]
    fn current_is_thread_local() {
        Settings::set_current(Settings::default().with_enum_as_string(true));
        let other = std::thread::spawn(|| Settings::current().enum_as_string)
            .join()
            .unwrap();
        assert!(!other);
        assert!(Settings::current().enum_as_string);
        Settings::set_current(Settings::default());
    }

    #[test]
    fn quote_detection() {
        let open = Settings::default();
        assert!(open.is_quote(b'"') && open.is_quote(b'\''));
        assert_eq!(open.write_quote(), '"');

        let pinned = Settings::default().with_quote_char(QuoteChar::Single);
        assert!(pinned.is_quote(b'\''));
        assert!(!pinned.is_quote(b'"'));
        assert_eq!(pinned.write_quote(), '\'');
    }
}
