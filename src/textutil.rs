use std::borrow::Cow;

/// Canonicalizes line endings: every `"\r\n"` and every lone `'\r'` becomes `'\n'`.
///
/// Borrows when the input contains no carriage return, so the common case
/// allocates nothing.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Makes control characters visible for hand-editing a dictionary file.
///
/// Newlines are normalized first; `\` becomes `\\`, TAB becomes `\t`, LF becomes `\n`.
/// [`crate::csv_row::unescape`] reverses this.
pub fn escape_visible(text: &str) -> String {
    let text = normalize_newlines(text);
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain", "plain")]
    #[case("a\r\nb", "a\nb")]
    #[case("a\rb", "a\nb")]
    #[case("a\r\r\nb", "a\n\nb")]
    #[case("\r\n\r", "\n\n")]
    #[case("trailing\r", "trailing\n")]
    fn normalizes_line_endings(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_newlines(input), expected);
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_newlines("x\r\ny\rz\n").into_owned();
        assert_eq!(normalize_newlines(&once), once);
    }

    #[test]
    fn borrows_without_carriage_return() {
        assert!(matches!(normalize_newlines("a\nb"), Cow::Borrowed(_)));
    }

    #[test]
    fn escape_visible_encodes_controls() {
        assert_eq!(escape_visible("a\\b\tc\r\nd"), "a\\\\b\\tc\\nd");
    }
}
