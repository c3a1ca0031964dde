//! Single-row CSV codec for dictionary files.
//!
//! Rows are decoded in two stages: [`split_row`] handles quoting, then
//! [`unescape`] turns the backslash sequences written by
//! [`crate::textutil::escape_visible`] back into control characters.

use std::borrow::Cow;

/// Backslash sequences in match precedence. `\r\n` is tried before `\r`.
const ESCAPES: [(&str, &str); 6] = [
    ("\\\\", "\\"),
    ("\\r\\n", "\r\n"),
    ("\\n", "\n"),
    ("\\r", "\r"),
    ("\\t", "\t"),
    ("\\\"", "\""),
];

/// Splits one row into raw fields.
///
/// A `"` outside quotes opens a quoted section in which `,` is literal and `""`
/// stands for one `"`. An unterminated quote runs to the end of the line. The
/// last field is always emitted, so `"a,"` yields `["a", ""]`.
pub fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if quoted {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => quoted = false,
                _ => field.push(c),
            }
        } else {
            match c {
                ',' => fields.push(std::mem::take(&mut field)),
                '"' => quoted = true,
                _ => field.push(c),
            }
        }
    }
    fields.push(field);
    fields
}

/// Decodes backslash escapes in a single left-to-right pass.
///
/// Output of one escape is never re-read, so `\\n` decodes to a backslash
/// followed by `n`. Unknown sequences are kept verbatim.
pub fn unescape(field: &str) -> Cow<'_, str> {
    if !field.contains('\\') {
        return Cow::Borrowed(field);
    }

    let mut out = String::with_capacity(field.len());
    let mut rest = field;
    while let Some(idx) = rest.find('\\') {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx..];
        let (decoded, consumed) = ESCAPES
            .iter()
            .find(|(seq, _)| tail.starts_with(seq))
            .map_or(("\\", 1), |(seq, lit)| (*lit, seq.len()));
        out.push_str(decoded);
        rest = &tail[consumed..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Quotes a field when it contains a delimiter or a quote, or starts or ends
/// with whitespace.
pub fn encode_field(field: &str) -> Cow<'_, str> {
    let padded = field.starts_with(char::is_whitespace) || field.ends_with(char::is_whitespace);
    if !padded && !field.contains([',', '"']) {
        return Cow::Borrowed(field);
    }
    let mut out = String::with_capacity(field.len() + 2);
    out.push('"');
    for c in field.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    Cow::Owned(out)
}

/// Builds one dictionary row from literal field values.
///
/// Each value is made visible with [`crate::textutil::escape_visible`] and then
/// quoted as needed, so `split_row` + `unescape` reproduce the input.
pub fn encode_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|f| encode_field(&crate::textutil::escape_visible(f.as_ref())).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a,b", &["a", "b"])]
    #[case("a,", &["a", ""])]
    #[case("", &[""])]
    #[case("\"x,y\",z", &["x,y", "z"])]
    #[case("\"say \"\"hi\"\"\",ok", &["say \"hi\"", "ok"])]
    #[case("\"open,to,end", &["open,to,end"])]
    #[case("a,b,c,d", &["a", "b", "c", "d"])]
    #[case("mid\"dle\",x", &["middle", "x"])]
    fn splits_rows(#[case] line: &str, #[case] expected: &[&str]) {
        assert_eq!(split_row(line), expected);
    }

    #[rstest]
    #[case("no escapes", "no escapes")]
    #[case("a\\nb", "a\nb")]
    #[case("a\\r\\nb", "a\r\nb")]
    #[case("a\\rb", "a\rb")]
    #[case("a\\tb", "a\tb")]
    #[case("say \\\"hi\\\"", "say \"hi\"")]
    #[case("back\\\\slash", "back\\slash")]
    #[case("lit\\\\n", "lit\\n")]
    #[case("odd\\q", "odd\\q")]
    #[case("end\\", "end\\")]
    fn unescapes_fields(#[case] field: &str, #[case] expected: &str) {
        assert_eq!(unescape(field), expected);
    }

    #[test]
    fn encoded_row_decodes_to_original() {
        let source = "Hello, \"world\"\nsecond line\twith tab \\ and slash";
        let target = "plain";
        let line = encode_row([source, target]);

        assert!(!line.contains('\n'));
        let fields = split_row(&line);
        assert_eq!(fields.len(), 2);
        assert_eq!(unescape(&fields[0]), source);
        assert_eq!(unescape(&fields[1]), target);
    }

    #[test]
    fn plain_fields_are_not_quoted() {
        assert_eq!(encode_row(["a", "b"]), "a,b");
        assert_eq!(encode_field("x,y"), "\"x,y\"");
    }

    #[rstest]
    #[case(" lead", "\" lead\"")]
    #[case("trail ", "\"trail \"")]
    #[case("in side", "in side")]
    fn padded_fields_are_quoted(#[case] field: &str, #[case] expected: &str) {
        assert_eq!(encode_field(field), expected);
        assert_eq!(split_row(&encode_field(field)), [field]);
    }
}
