use tracing::warn;

use crate::csv_row::encode_field;

/// A `source,target` dictionary built from two line-aligned texts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergedDictionary {
    pub csv: String,
    pub rows: usize,
}

/// Pairs line `i` of `original` with line `i` of `translated`.
///
/// Lines are already in dictionary form (multi-line entries carry visible
/// `\n` escapes), so they are only quoted, never escaped again. When the
/// counts differ a warning is logged and the extra lines of the longer side
/// are dropped. The output starts with a `source,target` header
/// and ends with a newline.
pub fn merge_lines<A, B>(original: &[A], translated: &[B]) -> MergedDictionary
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    if original.len() != translated.len() {
        warn!(
            original = original.len(),
            translated = translated.len(),
            "line counts differ; extra lines are dropped"
        );
    }

    let mut csv = String::from("source,target\n");
    let mut rows = 0usize;
    for (src, tgt) in original.iter().zip(translated) {
        csv.push_str(&encode_field(src.as_ref()));
        csv.push(',');
        csv.push_str(&encode_field(tgt.as_ref()));
        csv.push('\n');
        rows += 1;
    }
    MergedDictionary { csv, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;

    #[test]
    fn merged_output_loads_back() {
        let merged = merge_lines(
            &["Hello, hero", "Say \"yes\"", "tab\there"],
            &["안녕, 용사", "\"네\"라고 말해", "탭\t여기"],
        );
        assert_eq!(merged.rows, 3);
        assert!(merged.csv.starts_with("source,target\n"));

        let (dict, stats) = Dictionary::from_lines(merged.csv.lines());
        assert_eq!(stats.rows, 3);
        assert_eq!(dict.get("Hello, hero"), Some("안녕, 용사"));
        assert_eq!(dict.get("Say \"yes\""), Some("\"네\"라고 말해"));
        assert_eq!(dict.get("tab\there"), Some("탭\t여기"));
    }

    #[test]
    fn visible_escapes_decode_once() {
        let merged = merge_lines(
            &["Hello\\nWorld", "C:\\\\save"],
            &["Bonjour\\nMonde", "C:\\\\sauvegarde"],
        );
        assert_eq!(
            merged.csv,
            "source,target\nHello\\nWorld,Bonjour\\nMonde\nC:\\\\save,C:\\\\sauvegarde\n"
        );

        let (dict, _) = Dictionary::from_lines(merged.csv.lines());
        assert_eq!(dict.get("Hello\nWorld"), Some("Bonjour\nMonde"));
        assert_eq!(dict.get("C:\\save"), Some("C:\\sauvegarde"));
        assert_eq!(dict.get("Hello\\nWorld"), None);
    }

    #[test]
    fn mismatched_counts_use_shorter_side() {
        let merged = merge_lines(&["a", "b", "c"], &["x"]);
        assert_eq!(merged.rows, 1);
        assert_eq!(merged.csv, "source,target\na,x\n");
    }
}
