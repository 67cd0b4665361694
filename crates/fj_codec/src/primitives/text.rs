//! JSON string escaping.

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Appends `text` wrapped in `quote`, escaping as needed.
///
/// `\n \t \r \b \f \\` and the active quote get short escapes. Other control
/// characters become `\u00XX`.
///
/// # Examples
///
/// ```
/// use fj_codec::primitives::text;
///
/// let mut out = String::new();
/// text::write_escaped(&mut out, "a\"b\n\u{1}", '"');
/// assert_eq!(out, r#""a\"b\n\u0001""#);
///
/// out.clear();
/// text::write_escaped(&mut out, "it's \"fine\"", '\'');
/// assert_eq!(out, r#"'it\'s "fine"'"#);
/// ```
pub fn write_escaped(out: &mut String, text: &str, quote: char) {
    out.push(quote);
    write_escaped_content(out, text, quote);
    out.push(quote);
}

/// Like [`write_escaped`], without the surrounding quotes.
pub fn write_escaped_content(out: &mut String, text: &str, quote: char) {
    let mut start = 0;
    for (i, c) in text.char_indices() {
        let escape = match c {
            '\n' => "\\n",
            '\t' => "\\t",
            '\r' => "\\r",
            '\u{8}' => "\\b",
            '\u{c}' => "\\f",
            '\\' => "\\\\",
            '"' if quote == '"' => "\\\"",
            '\'' if quote == '\'' => "\\'",
            c if (c as u32) < 0x20 => {
                out.push_str(&text[start..i]);
                let code = c as usize;
                out.push_str("\\u00");
                out.push(char::from(HEX[code >> 4]));
                out.push(char::from(HEX[code & 0xF]));
                start = i + 1;
                continue;
            }
            _ => continue,
        };
        out.push_str(&text[start..i]);
        out.push_str(escape);
        start = i + c.len_utf8();
    }
    out.push_str(&text[start..]);
}
