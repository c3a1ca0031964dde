//! The translation engine: exact, substring and smart lookups over a lazily
//! loaded [`Dictionary`].
//!
//! Every operation returns `Cow<str>`. `Cow::Borrowed` always means "no
//! translation happened" and hands back the caller's own string, so hosts can
//! tell a miss apart from a translation that happens to equal the input.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;
use tracing::warn;

use crate::config::TranslatorConfig;
use crate::dictionary::{self, Dictionary};
use crate::storage::{FsStorage, MemoryStorage, Storage};
use crate::textutil::normalize_newlines;

/// Outcome of one substring scan, keyed by normalized input.
#[derive(Clone, Debug)]
enum Cached {
    Unchanged,
    Replaced(Arc<str>),
}

pub struct Translator {
    config: TranslatorConfig,
    storage: Box<dyn Storage>,
    dictionary: OnceCell<Dictionary>,
    partial_cache: Mutex<HashMap<String, Cached>>,
    scans: AtomicUsize,
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("config", &self.config)
            .field("loaded", &self.is_loaded())
            .field("scans", &self.scan_count())
            .finish_non_exhaustive()
    }
}

impl Translator {
    /// Engine reading from the local filesystem. Nothing is loaded until the first lookup.
    pub fn new(config: TranslatorConfig) -> Self {
        Self::with_storage(config, FsStorage)
    }

    pub fn with_storage(config: TranslatorConfig, storage: impl Storage + 'static) -> Self {
        Self {
            config,
            storage: Box::new(storage),
            dictionary: OnceCell::new(),
            partial_cache: Mutex::new(HashMap::new()),
            scans: AtomicUsize::new(0),
        }
    }

    /// Engine over an already built dictionary; no storage is touched.
    pub fn from_dictionary(dictionary: Dictionary) -> Self {
        let engine = Self::with_storage(TranslatorConfig::default(), MemoryStorage::new());
        // A fresh cell cannot already be set.
        let _ = engine.dictionary.set(dictionary);
        engine
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.dictionary.get().is_some()
    }

    /// Number of substring scans performed (cache misses).
    #[must_use]
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::Relaxed)
    }

    /// Loads the dictionary on first use. Concurrent first callers block until
    /// the single load finishes; a failed load leaves an empty dictionary.
    pub fn dictionary(&self) -> &Dictionary {
        self.dictionary.get_or_init(|| {
            dictionary::load(self.storage.as_ref(), &self.config).unwrap_or_else(|err| {
                warn!(error = %err, "dictionary unavailable; translations pass through");
                Dictionary::default()
            })
        })
    }

    /// Drops the loaded dictionary and the partial-result cache. The next
    /// lookup loads again.
    pub fn reset(&mut self) {
        self.dictionary.take();
        self.partial_cache
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Whole-string lookup. A miss returns `text` itself.
    pub fn translate<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if text.is_empty() {
            return Cow::Borrowed(text);
        }
        let key = normalize_newlines(text);
        match self.dictionary().get(&key) {
            Some(target) if !target.is_empty() => Cow::Owned(target.to_string()),
            _ => Cow::Borrowed(text),
        }
    }

    /// Longest-match-first replacement of dictionary sources inside `text`.
    ///
    /// Results are cached per normalized input, including "nothing matched".
    pub fn translate_with_substring<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if text.is_empty() {
            return Cow::Borrowed(text);
        }
        let dict = self.dictionary();
        let key = normalize_newlines(text);

        if let Some(hit) = self.cached(&key) {
            return match hit {
                Cached::Unchanged => Cow::Borrowed(text),
                Cached::Replaced(out) => Cow::Owned(out.to_string()),
            };
        }

        self.scans.fetch_add(1, Ordering::Relaxed);
        let outcome = match dict.matcher().replace(&key) {
            Some(out) => Cached::Replaced(Arc::from(out)),
            None => Cached::Unchanged,
        };
        let result = match &outcome {
            Cached::Unchanged => Cow::Borrowed(text),
            Cached::Replaced(out) => Cow::Owned(out.to_string()),
        };
        // Two threads racing on the same key both scan; the later insert wins
        // with an identical value.
        self.partial_cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into_owned(), outcome);
        result
    }

    /// Exact lookup first; substring replacement only when that misses.
    pub fn translate_smart<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self.translate(text) {
            Cow::Owned(exact) => Cow::Owned(exact),
            Cow::Borrowed(_) => self.translate_with_substring(text),
        }
    }

    fn cached(&self, key: &str) -> Option<Cached> {
        self.partial_cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }
}
