//! Runtime dictionary translation with an encrypted-at-rest data file.
//!
//! A [`Translator`] loads `translation.csv` from its asset directory on the
//! first lookup, decrypting `translation.csv.enc` into place if only the
//! container exists. Lookups never fail: any load problem leaves an empty
//! dictionary and every operation returns its input unchanged.
//!
//! ```no_run
//! use tcsv_translator::{Translator, TranslatorConfig};
//!
//! let translator = Translator::new(TranslatorConfig::with_assets_dir("StreamingAssets"));
//! let shown = translator.translate_smart("Hi-Potion x3");
//! println!("{shown}");
//! ```

pub mod config;
pub mod container;
pub mod csv_row;
pub mod dictionary;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod key;
pub mod matcher;
pub mod merge;
pub mod storage;
pub mod textutil;

pub use config::{load_config, TranslatorConfig};
pub use dictionary::Dictionary;
pub use engine::Translator;
pub use error::{ContainerError, LoadError};
pub use key::ContainerKey;
pub use storage::{FsStorage, MemoryStorage, Storage};
