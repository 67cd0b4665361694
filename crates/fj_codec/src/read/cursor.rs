use crate::error::{JsonError, JsonResult};
use crate::settings::Settings;

#[inline]
const fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[inline]
const fn ends_token(b: u8) -> bool {
    matches!(b, b',' | b']' | b'}' | b':') || is_whitespace(b)
}

// -----------------------------------------------------------------------------
// Cursor

/// A parse position in a text buffer.
///
/// # Examples
///
/// Reading two values from one buffer:
///
/// ```
/// use fj_codec::read::Cursor;
/// use fj_codec::registry::CodecRegistry;
/// use fj_codec::settings::Settings;
///
/// let registry = CodecRegistry::new();
/// let codec = registry.codec::<Vec<i32>>().unwrap();
/// let settings = Settings::default();
///
/// let mut cursor = Cursor::new("[1,2] [3]");
/// let mut a = Vec::<i32>::new();
/// let mut b = Vec::<i32>::new();
/// codec.read_from(&mut cursor, &mut a, &settings).unwrap();
/// codec.read_from(&mut cursor, &mut b, &settings).unwrap();
///
/// assert_eq!((a, b), (vec![1, 2], vec![3]));
/// assert!(cursor.is_at_end());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    #[inline]
    pub const fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    /// The byte offset of the next character.
    #[inline]
    pub const fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// Whether only whitespace remains.
    pub fn is_at_end(&self) -> bool {
        self.text.as_bytes()[self.pos..]
            .iter()
            .all(|&b| is_whitespace(b))
    }

    #[inline]
    pub fn skip_whitespace(&mut self) {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() && is_whitespace(bytes[self.pos]) {
            self.pos += 1;
        }
    }

    /// The next byte, without skipping whitespace.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    #[inline]
    pub(crate) fn bump(&mut self) {
        self.pos += 1;
    }

    pub(crate) fn error(&self, reason: impl Into<String>) -> JsonError {
        JsonError::invalid_json(self.pos, reason)
    }

    /// Skips whitespace and consumes `b` if it comes next.
    pub(crate) fn eat(&mut self, b: u8) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, b: u8) -> JsonResult<()> {
        if self.eat(b) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{}`", char::from(b))))
        }
    }

    /// Consumes a literal `null` token.
    pub(crate) fn eat_null(&mut self) -> bool {
        self.skip_whitespace();
        let rest = &self.text.as_bytes()[self.pos..];
        if rest.starts_with(b"null") && rest.get(4).is_none_or(|&b| ends_token(b)) {
            self.pos += 4;
            true
        } else {
            false
        }
    }

    /// Consumes a non-string scalar, up to the next delimiter or whitespace.
    pub(crate) fn bare_token(&mut self) -> JsonResult<&'a str> {
        let start = self.pos;
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() && !ends_token(bytes[self.pos]) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected a value"));
        }
        Ok(&self.text[start..self.pos])
    }

    /// Consumes a string and returns its decoded content.
    ///
    /// Content without escapes is borrowed from the text. Otherwise it is
    /// decoded into `scratch`.
    pub(crate) fn string<'s>(
        &mut self,
        settings: &Settings,
        scratch: &'s mut String,
    ) -> JsonResult<&'s str>
    where
        'a: 's,
    {
        let quote = match self.peek() {
            Some(q) if settings.is_quote(q) => q,
            _ => return Err(self.error("expected a string")),
        };
        self.pos += 1;

        let bytes = self.text.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b if b == quote => {
                    let content = &self.text[start..self.pos];
                    self.pos += 1;
                    return Ok(content);
                }
                b'\\' => {
                    scratch.clear();
                    scratch.push_str(&self.text[start..self.pos]);
                    self.decode_escaped(quote, scratch)?;
                    return Ok(scratch.as_str());
                }
                _ => self.pos += 1,
            }
        }
        Err(JsonError::invalid_json(start - 1, "unterminated string"))
    }

    fn decode_escaped(&mut self, quote: u8, out: &mut String) -> JsonResult<()> {
        let bytes = self.text.as_bytes();
        let mut start = self.pos;
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b if b == quote => {
                    out.push_str(&self.text[start..self.pos]);
                    self.pos += 1;
                    return Ok(());
                }
                b'\\' => {
                    out.push_str(&self.text[start..self.pos]);
                    self.pos += 1;
                    self.decode_escape(out)?;
                    start = self.pos;
                }
                _ => self.pos += 1,
            }
        }
        Err(self.error("unterminated string"))
    }

    /// Decodes the escape after a backslash.
    fn decode_escape(&mut self, out: &mut String) -> JsonResult<()> {
        let Some(b) = self.peek() else {
            return Err(self.error("unterminated escape"));
        };
        self.pos += 1;
        let c = match b {
            b'"' => '"',
            b'\'' => '\'',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => self.decode_unicode()?,
            _ => return Err(JsonError::invalid_json(self.pos - 1, "invalid escape")),
        };
        out.push(c);
        Ok(())
    }

    fn hex4(&mut self) -> JsonResult<u32> {
        let digits = self
            .text
            .get(self.pos..self.pos + 4)
            .ok_or_else(|| self.error("truncated unicode escape"))?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(self.error("invalid unicode escape"));
        }
        let code = u32::from_str_radix(digits, 16)
            .map_err(|_| self.error("invalid unicode escape"))?;
        self.pos += 4;
        Ok(code)
    }

    /// Decodes `XXXX` after `\u`, joining surrogate pairs.
    ///
    /// Unpaired surrogates decode to U+FFFD.
    fn decode_unicode(&mut self) -> JsonResult<char> {
        let high = self.hex4()?;
        if !(0xD800..0xDC00).contains(&high) {
            return Ok(char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER));
        }
        if !self.rest().starts_with("\\u") {
            return Ok(char::REPLACEMENT_CHARACTER);
        }
        let mark = self.pos;
        self.pos += 2;
        let low = self.hex4()?;
        if !(0xDC00..0xE000).contains(&low) {
            self.pos = mark;
            return Ok(char::REPLACEMENT_CHARACTER);
        }
        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    /// Advances past one value of any kind without interpreting it.
    pub(crate) fn skip_value(&mut self, settings: &Settings) -> JsonResult<()> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'{' | b'[') => self.skip_nested(settings),
            Some(q) if settings.is_quote(q) => self.skip_string(q),
            Some(_) => self.bare_token().map(drop),
            None => Err(self.error("expected a value")),
        }
    }

    fn skip_nested(&mut self, settings: &Settings) -> JsonResult<()> {
        let start = self.pos;
        let bytes = self.text.as_bytes();
        let mut depth = 0_usize;
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'{' | b'[' => {
                    depth += 1;
                    self.pos += 1;
                }
                b'}' | b']' => {
                    depth -= 1;
                    self.pos += 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                q if settings.is_quote(q) => self.skip_string(q)?,
                _ => self.pos += 1,
            }
        }
        Err(JsonError::invalid_json(start, "unbalanced brackets"))
    }

    fn skip_string(&mut self, quote: u8) -> JsonResult<()> {
        let start = self.pos;
        let bytes = self.text.as_bytes();
        self.pos += 1;
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\\' => self.pos += 2,
                b if b == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                _ => self.pos += 1,
            }
        }
        Err(JsonError::invalid_json(start, "unterminated string"))
    }
}

#[cfg(test)]
mod tests {
    use super::Cursor;
    use crate::settings::{QuoteChar, Settings};

    #[test]
    fn strings_borrow_or_decode() {
        let s = Settings::default();
        let mut scratch = String::new();

        let mut cursor = Cursor::new(r#""plain" "a\"bé😀\/""#);
        assert_eq!(cursor.string(&s, &mut scratch).unwrap(), "plain");
        cursor.skip_whitespace();
        assert_eq!(cursor.string(&s, &mut scratch).unwrap(), "a\"bé😀/");
        assert!(cursor.is_at_end());
    }

    #[test]
    fn quotes_follow_settings() {
        let mut scratch = String::new();
        let auto = Settings::default();
        let mut cursor = Cursor::new(r"'it\'s'");
        assert_eq!(cursor.string(&auto, &mut scratch).unwrap(), "it's");

        let pinned = Settings::default().with_quote_char(QuoteChar::Double);
        let mut cursor = Cursor::new("'x'");
        assert!(cursor.string(&pinned, &mut scratch).unwrap_err().is_invalid_json());
    }

    #[test]
    fn lone_surrogate_is_replaced() {
        let mut scratch = String::new();
        let mut cursor = Cursor::new(r#""\ud800x""#);
        let text = cursor.string(&Settings::default(), &mut scratch).unwrap();
        assert_eq!(text, "\u{fffd}x");
    }

    #[test]
    fn unicode_escapes_need_four_hex_digits() {
        let s = Settings::default();
        let mut scratch = String::new();

        let mut cursor = Cursor::new(r#""Aé""#);
        assert_eq!(cursor.string(&s, &mut scratch).unwrap(), "Aé");

        for text in [r#""\u+041""#, r#""\u-041""#, r#""\u 041""#, r#""\u04g1""#] {
            let mut cursor = Cursor::new(text);
            let err = cursor.string(&s, &mut scratch).unwrap_err();
            assert!(err.is_invalid_json(), "{text}: {err}");
        }
    }

    #[test]
    fn unterminated_string() {
        let mut scratch = String::new();
        let mut cursor = Cursor::new(r#""abc"#);
        assert!(cursor.string(&Settings::default(), &mut scratch).is_err());
    }

    #[test]
    fn skip_nested_values() {
        let s = Settings::default();
        let mut cursor = Cursor::new(r#"{"a":[1,{"b":"}]"}],"c":'x\''} ,"#);
        cursor.skip_value(&s).unwrap();
        assert_eq!(cursor.rest(), " ,");

        let mut cursor = Cursor::new("-12.5e3]");
        cursor.skip_value(&s).unwrap();
        assert_eq!(cursor.rest(), "]");

        let mut cursor = Cursor::new("[1,[2]");
        assert!(cursor.skip_value(&s).is_err());
    }

    #[test]
    fn null_literal() {
        let mut cursor = Cursor::new(" null,");
        assert!(cursor.eat_null());
        assert_eq!(cursor.rest(), ",");

        let mut cursor = Cursor::new("nullable");
        assert!(!cursor.eat_null());
    }
}
