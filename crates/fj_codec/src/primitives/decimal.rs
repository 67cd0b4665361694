use core::fmt;
use core::hash::{Hash, Hasher};
use core::str::FromStr;

use thiserror::Error;

// -----------------------------------------------------------------------------
// Decimal

/// The largest supported number of fractional digits.
pub const MAX_SCALE: u32 = 28;

/// A base-10 fixed point number: `mantissa * 10^-scale`.
///
/// Values are compared and hashed after removing trailing zeros, so `1.50`
/// equals `1.5`. Formatting keeps the scale as stored.
///
/// # Examples
///
/// ```
/// use fj_codec::primitives::Decimal;
///
/// let price: Decimal = "19.990".parse().unwrap();
/// assert_eq!(price.to_string(), "19.990");
/// assert_eq!(price, Decimal::new(1999, 2).unwrap());
/// assert_eq!(price.normalize().scale(), 2);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

/// Returned when text is not a decimal literal, or exceeds the supported range.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid decimal literal")]
pub struct ParseDecimalError;

impl Decimal {
    pub const ZERO: Decimal = Decimal {
        mantissa: 0,
        scale: 0,
    };

    /// Returns `None` when `scale` exceeds [`MAX_SCALE`].
    #[inline]
    pub const fn new(mantissa: i128, scale: u32) -> Option<Self> {
        if scale > MAX_SCALE {
            None
        } else {
            Some(Self { mantissa, scale })
        }
    }

    #[inline]
    pub const fn mantissa(self) -> i128 {
        self.mantissa
    }

    #[inline]
    pub const fn scale(self) -> u32 {
        self.scale
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.mantissa == 0
    }

    /// Removes trailing fractional zeros.
    pub const fn normalize(self) -> Self {
        let mut mantissa = self.mantissa;
        let mut scale = self.scale;
        while scale > 0 && mantissa % 10 == 0 {
            mantissa /= 10;
            scale -= 1;
        }
        Self { mantissa, scale }
    }

    /// Nearest `f64`. Lossy for long mantissas.
    pub fn to_f64(self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }
}

impl From<i64> for Decimal {
    #[inline]
    fn from(value: i64) -> Self {
        Self {
            mantissa: i128::from(value),
            scale: 0,
        }
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.normalize(), other.normalize());
        a.mantissa == b.mantissa && a.scale == b.scale
    }
}

impl Eq for Decimal {}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let n = self.normalize();
        n.mantissa.hash(state);
        n.scale.hash(state);
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mantissa < 0 {
            f.write_str("-")?;
        }
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            return f.write_str(&digits);
        }
        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{int}.{frac}")
        } else {
            f.write_str("0.")?;
            for _ in digits.len()..scale {
                f.write_str("0")?;
            }
            f.write_str(&digits)
        }
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    /// Accepts `[-+]digits[.digits][(e|E)[-+]digits]`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
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

        let mut mantissa: i128 = 0;
        let mut scale: i64 = 0;
        let mut any_digit = false;
        let mut in_fraction = false;

        while let Some(&b) = bytes.get(i) {
            match b {
                b'0'..=b'9' => {
                    mantissa = mantissa
                        .checked_mul(10)
                        .and_then(|m| m.checked_add(i128::from(b - b'0')))
                        .ok_or(ParseDecimalError)?;
                    any_digit = true;
                    if in_fraction {
                        scale += 1;
                    }
                }
                b'.' if !in_fraction && any_digit => in_fraction = true,
                b'e' | b'E' => break,
                _ => return Err(ParseDecimalError),
            }
            i += 1;
        }
        if !any_digit || bytes.get(i.wrapping_sub(1)) == Some(&b'.') {
            return Err(ParseDecimalError);
        }

        if i < bytes.len() {
            let exp_text = &text[i + 1..];
            let exp = super::integer::parse_i64(exp_text)
                .filter(|e| e.unsigned_abs() <= 64)
                .ok_or(ParseDecimalError)?;
            scale -= exp;
        }

        while scale < 0 {
            mantissa = mantissa.checked_mul(10).ok_or(ParseDecimalError)?;
            scale += 1;
        }
        while scale > i64::from(MAX_SCALE) && mantissa % 10 == 0 {
            mantissa /= 10;
            scale -= 1;
        }
        if scale > i64::from(MAX_SCALE) {
            return Err(ParseDecimalError);
        }

        Ok(Self {
            mantissa: if negative { -mantissa } else { mantissa },
            scale: scale as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Decimal, ParseDecimalError};

    fn dec(text: &str) -> Decimal {
        text.parse().unwrap()
    }

    #[test]
    fn display_keeps_scale() {
        assert_eq!(dec("0.050").to_string(), "0.050");
        assert_eq!(dec("-12.5").to_string(), "-12.5");
        assert_eq!(dec("42").to_string(), "42");
        assert_eq!(Decimal::new(-5, 3).unwrap().to_string(), "-0.005");
    }

    #[test]
    fn exponent_moves_scale() {
        assert_eq!(dec("1.5e2"), dec("150"));
        assert_eq!(dec("15E-3"), dec("0.015"));
    }

    #[test]
    fn equality_ignores_trailing_zeros() {
        assert_eq!(dec("1.500"), dec("1.5"));
        assert_ne!(dec("1.5"), dec("15"));
        assert!(dec("0.000").is_zero());
    }

    #[test]
    fn rejects() {
        for text in ["", "-", ".5", "5.", "1..2", "1e", "abc", "1.0.0"] {
            assert_eq!(text.parse::<Decimal>(), Err(ParseDecimalError), "{text}");
        }
        assert!(Decimal::new(1, 29).is_none());
    }

    #[test]
    fn to_f64() {
        assert_eq!(dec("2.25").to_f64(), 2.25);
    }
}
