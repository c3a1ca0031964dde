use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::TranslatorConfig;
use crate::container;
use crate::csv_row::{split_row, unescape};
use crate::error::LoadError;
use crate::key::ContainerKey;
use crate::matcher::{Candidate, SubstringMatcher};
use crate::storage::Storage;
use crate::textutil::normalize_newlines;

const HEADER_PREFIX: &[u8] = b"source,target";

/// Exact-match table plus the substring matcher derived from it.
/// Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct Dictionary {
    exact: HashMap<String, String>,
    matcher: SubstringMatcher,
}

impl Dictionary {
    /// Builds a dictionary from literal pairs. Sources and targets are
    /// normalized; the first occurrence of a source wins.
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut builder = DictionaryBuilder::default();
        for (source, target) in pairs {
            builder.insert(source.as_ref(), target.as_ref());
        }
        builder.build()
    }

    /// Builds a dictionary whose partial-match list is supplied separately
    /// instead of derived from the exact table.
    #[cfg(test)]
    pub(crate) fn from_tables<E, C>(exact: E, candidates: C) -> Self
    where
        E: IntoIterator<Item = (String, String)>,
        C: IntoIterator<Item = (String, String)>,
    {
        let mut builder = DictionaryBuilder::default();
        for (source, target) in exact {
            builder.insert(&source, &target);
        }
        let matcher = SubstringMatcher::new(candidates.into_iter().map(|(source, target)| {
            Candidate {
                source: normalize_newlines(&source).into_owned(),
                target: normalize_newlines(&target).into_owned(),
            }
        }));
        Self {
            exact: builder.exact,
            matcher,
        }
    }

    /// Parses dictionary lines (`source,target[,...]`).
    ///
    /// Blank lines and a `source,target` header (any case) are skipped, as are
    /// rows with fewer than two fields.
    pub fn from_lines<I, L>(lines: I) -> (Self, LoadStats)
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let mut builder = DictionaryBuilder::default();
        for line in lines {
            let line = line.as_ref();
            if line.trim().is_empty() || is_header(line) {
                continue;
            }
            builder.stats.rows += 1;
            let fields = split_row(line);
            let [source, target, ..] = fields.as_slice() else {
                builder.stats.malformed += 1;
                continue;
            };
            builder.insert(&unescape(source), &unescape(target));
        }
        let stats = builder.stats;
        (builder.build(), stats)
    }

    /// Looks up an already normalized key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.exact.get(key).map(String::as_str)
    }

    pub fn matcher(&self) -> &SubstringMatcher {
        &self.matcher
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exact.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}

fn is_header(line: &str) -> bool {
    line.as_bytes()
        .get(..HEADER_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(HEADER_PREFIX))
}

/// Counters from one parse, for the load summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Non-blank, non-header lines.
    pub rows: usize,
    /// Rows with fewer than two fields.
    pub malformed: usize,
    /// Rows whose source was already present.
    pub duplicates: usize,
}

#[derive(Default)]
struct DictionaryBuilder {
    exact: HashMap<String, String>,
    order: Vec<String>,
    stats: LoadStats,
}

impl DictionaryBuilder {
    fn insert(&mut self, source: &str, target: &str) {
        let source = normalize_newlines(source);
        if self.exact.contains_key(source.as_ref()) {
            self.stats.duplicates += 1;
            return;
        }
        let source = source.into_owned();
        self.order.push(source.clone());
        self.exact
            .insert(source, normalize_newlines(target).into_owned());
    }

    fn build(self) -> Dictionary {
        let candidates = self
            .order
            .iter()
            .filter_map(|source| {
                let target = self.exact.get(source)?;
                (!source.is_empty() && source != target).then(|| Candidate {
                    source: source.clone(),
                    target: target.clone(),
                })
            })
            .collect::<Vec<_>>();
        Dictionary {
            matcher: SubstringMatcher::new(candidates),
            exact: self.exact,
        }
    }
}

/// Loads the dictionary from the configured asset directory.
///
/// If the plaintext file is missing and a container is present, the container
/// is decrypted to the plaintext path first; a decrypt failure is logged and
/// loading continues without it. A missing plaintext file yields an empty
/// dictionary, not an error.
pub fn load(storage: &dyn Storage, config: &TranslatorConfig) -> Result<Dictionary, LoadError> {
    let plain_path = config.plain_path();
    let enc_path = config.encrypted_path();

    if !storage.exists(&plain_path) && storage.exists(&enc_path) {
        let key = match config.key.as_deref() {
            Some(encoded) => ContainerKey::from_base64(encoded)?,
            None => ContainerKey::default(),
        };
        if !container::decrypt_to_plaintext(storage, &enc_path, &plain_path, &key) {
            warn!(enc = %enc_path.display(), "continuing without decrypted dictionary");
        }
    }

    if !storage.exists(&plain_path) {
        debug!(plain = %plain_path.display(), "no dictionary file; translations pass through");
        return Ok(Dictionary::default());
    }

    let lines = storage
        .read_all_lines_utf8(&plain_path)
        .map_err(|source| LoadError::Read {
            path: plain_path.clone(),
            source,
        })?;
    let (dict, stats) = Dictionary::from_lines(&lines);
    info!(
        plain = %plain_path.display(),
        rows = stats.rows,
        entries = dict.len(),
        candidates = dict.matcher().len(),
        duplicates = stats.duplicates,
        malformed = stats.malformed,
        "dictionary loaded"
    );
    Ok(dict)
}
