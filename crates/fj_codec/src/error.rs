use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// Errors raised while compiling, writing or reading JSON.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JsonError {
    /// The text is not well-formed, or its outer envelope does not match the
    /// shape of the target type.
    #[error("invalid JSON at byte {position}: {reason}")]
    InvalidJson { position: usize, reason: String },

    /// A member name override breaks the naming rules.
    #[error("invalid member `{member}` on `{type_name}`: {reason}")]
    InvalidPropertyConfiguration {
        type_name: &'static str,
        member: String,
        reason: &'static str,
    },

    /// The classifier or compiler cannot handle the type.
    #[error("unsupported type `{type_name}`: {reason}")]
    UnsupportedType {
        type_name: &'static str,
        reason: String,
    },

    /// A primitive token cannot be converted into its expected type.
    #[error("cannot convert `{text}` into {expected} at byte {position}")]
    Conversion {
        expected: &'static str,
        text: String,
        position: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// `Result` alias used across the crate.
pub type JsonResult<T> = Result<T, JsonError>;

impl JsonError {
    #[inline(never)]
    pub(crate) fn invalid_json(position: usize, reason: impl Into<String>) -> Self {
        Self::InvalidJson {
            position,
            reason: reason.into(),
        }
    }

    #[inline(never)]
    pub(crate) fn unsupported(type_name: &'static str, reason: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name,
            reason: reason.into(),
        }
    }

    #[inline(never)]
    pub(crate) fn conversion(expected: &'static str, text: &str, position: usize) -> Self {
        Self::Conversion {
            expected,
            text: text.into(),
            position,
        }
    }

    /// Returns `true` for [`JsonError::InvalidJson`].
    #[inline]
    pub fn is_invalid_json(&self) -> bool {
        matches!(self, Self::InvalidJson { .. })
    }

    /// Returns `true` for [`JsonError::Conversion`].
    #[inline]
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::JsonError;

    #[test]
    fn display() {
        let err = JsonError::invalid_json(3, "expected `{`");
        assert_eq!(err.to_string(), "invalid JSON at byte 3: expected `{`");
        assert!(err.is_invalid_json());

        let err = JsonError::conversion("i32", "abc", 7);
        assert_eq!(err.to_string(), "cannot convert `abc` into i32 at byte 7");
        assert!(err.is_conversion());
    }
}
