//! Byte- and line-level access to the asset directory.
//!
//! The loader only talks to [`Storage`], so hosts can back it with a real
//! directory ([`FsStorage`]) or with bundled bytes ([`MemoryStorage`]).

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait Storage: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn read_all_bytes(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn write_all_bytes(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;

    fn ensure_directory(&self, path: &Path) -> io::Result<()>;

    /// Reads a UTF-8 text file as lines.
    ///
    /// Invalid sequences become U+FFFD, so one bad byte only damages its own
    /// line. A leading byte-order mark is dropped. Lines end at `\n`, `\r\n`
    /// or a lone `\r`.
    fn read_all_lines_utf8(&self, path: &Path) -> io::Result<Vec<String>> {
        let bytes = self.read_all_bytes(path)?;
        Ok(split_lines(&String::from_utf8_lossy(&bytes)))
    }
}

fn split_lines(text: &str) -> Vec<String> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let mut lines = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        match rest.find(['\r', '\n']) {
            Some(idx) => {
                lines.push(rest[..idx].to_string());
                let skip = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[idx + skip..];
            }
            None => {
                lines.push(rest.to_string());
                break;
            }
        }
    }
    lines
}

/// Local filesystem storage.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsStorage;

impl Storage for FsStorage {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_all_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write_all_bytes(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        std::fs::write(path, bytes)
    }

    fn ensure_directory(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// In-memory storage keyed by path. Directories are implicit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        let mut files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        files.insert(path.into(), bytes.into());
    }

    #[must_use]
    pub fn get(&self, path: &Path) -> Option<Vec<u8>> {
        let files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        files.get(path).cloned()
    }
}

impl Storage for MemoryStorage {
    fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        files.contains_key(path)
    }

    fn read_all_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }

    fn write_all_bytes(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        self.insert(path, bytes);
        Ok(())
    }

    fn ensure_directory(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}
