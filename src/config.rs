use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "tcsv-translator.toml";
pub const DEFAULT_ASSETS_DIR: &str = "StreamingAssets";
pub const PLAIN_FILE_NAME: &str = "translation.csv";
pub const ENCRYPTED_FILE_NAME: &str = "translation.csv.enc";

const DEFAULT_CONFIG_TOML: &str = r#"# tcsv-translator configuration

# Directory holding the dictionary files. Relative paths resolve against the
# host's working directory.
assets_dir = "StreamingAssets"

# Plaintext dictionary (source,target rows). Created from the encrypted file on
# first load when missing.
plain_file = "translation.csv"

# Encrypted dictionary container.
encrypted_file = "translation.csv.enc"

# Base64 AES-256 key for the container. Omit to use the development key.
# key = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="
"#;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TranslatorConfig {
    pub assets_dir: PathBuf,
    pub plain_file: String,
    pub encrypted_file: String,
    /// Base64 container key. `None` means the built-in development key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            plain_file: PLAIN_FILE_NAME.to_string(),
            encrypted_file: ENCRYPTED_FILE_NAME.to_string(),
            key: None,
        }
    }
}

impl TranslatorConfig {
    /// Default file names under `assets_dir`.
    pub fn with_assets_dir(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            ..Self::default()
        }
    }

    pub fn plain_path(&self) -> PathBuf {
        self.assets_dir.join(&self.plain_file)
    }

    pub fn encrypted_path(&self) -> PathBuf {
        self.assets_dir.join(&self.encrypted_file)
    }

    /// Resolves a relative `assets_dir` against `base` (usually the config file's directory).
    #[must_use]
    pub fn relative_to(mut self, base: &Path) -> Self {
        if self.assets_dir.is_relative() {
            self.assets_dir = base.join(&self.assets_dir);
        }
        self
    }
}

pub fn find_file_upwards(start_dir: &Path, filename: &str, max_levels: usize) -> Option<PathBuf> {
    let mut dir = start_dir;
    for _ in 0..=max_levels {
        let candidate = dir.join(filename);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
    None
}

/// Looks for `tcsv-translator.toml` in `workdir` and up to eight parents.
pub fn find_default_config(workdir: &Path) -> Option<PathBuf> {
    find_file_upwards(workdir, CONFIG_FILE_NAME, 8)
}

/// Reads a config file. Relative `assets_dir` values resolve against the file's directory.
pub fn load_config(path: &Path) -> anyhow::Result<TranslatorConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: TranslatorConfig = toml::from_str(&text).context("parse config toml")?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(cfg.relative_to(base))
}

/// Writes the commented default config into `dir`. An existing file is kept unless `force`.
pub fn init_default_config(dir: &Path, force: bool) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create config dir: {}", dir.display()))?;
    let cfg_path = dir.join(CONFIG_FILE_NAME);
    if cfg_path.exists() && !force {
        return Ok(cfg_path);
    }
    std::fs::write(&cfg_path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("write config: {}", cfg_path.display()))?;
    Ok(cfg_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_parses_to_default() {
        let cfg: TranslatorConfig = toml::from_str(DEFAULT_CONFIG_TOML).expect("parse");
        assert_eq!(cfg, TranslatorConfig::default());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: TranslatorConfig = toml::from_str("plain_file = \"dict.csv\"").expect("parse");
        assert_eq!(cfg.plain_file, "dict.csv");
        assert_eq!(cfg.encrypted_file, ENCRYPTED_FILE_NAME);
        assert_eq!(cfg.plain_path(), Path::new("StreamingAssets/dict.csv"));
    }

    #[test]
    fn load_resolves_assets_against_config_dir() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = init_default_config(tmp.path(), false).expect("init");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.assets_dir, tmp.path().join("StreamingAssets"));
    }

    #[test]
    fn init_keeps_existing_file_unless_forced() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "assets_dir = \"custom\"\n").expect("write");

        init_default_config(tmp.path(), false).expect("init");
        assert!(std::fs::read_to_string(&path).expect("read").contains("custom"));

        init_default_config(tmp.path(), true).expect("init");
        assert!(!std::fs::read_to_string(&path).expect("read").contains("custom"));
    }

    #[test]
    fn finds_config_in_parent_dir() {
        let tmp = tempfile::tempdir().expect("tempdir");
        init_default_config(tmp.path(), false).expect("init");
        let nested = tmp.path().join("a/b");
        std::fs::create_dir_all(&nested).expect("mkdir");
        assert_eq!(
            find_default_config(&nested),
            Some(tmp.path().join(CONFIG_FILE_NAME))
        );
    }
}
