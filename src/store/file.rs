//! Directory-backed lock store.
//!
//! Each key is one file in the store directory. Keys are percent-encoded into
//! file names (`locked:Job-[1]` becomes `locked%3AJob-%5B1%5D.lock`) so any
//! key string maps to a single flat file.
//!
//! Keys whose encoding would not fit in a file name are stored under a
//! digest name instead: an encoded prefix of the key, `~`, and the SHA-256
//! of the full key in hex. Such a file starts with the key as a JSON string
//! on its own line, followed by the value, so listings still recover the key.

use super::{LockStore, StoreError, StoreResult};
use crate::key::LockKey;
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File extension of lock files.
const LOCK_EXTENSION: &str = "lock";

/// Longest encoded file stem used as-is (most filesystems cap names at 255 bytes).
const MAX_ENCODED_LEN: usize = 240;

/// Length budget for the readable prefix of a digest name.
const DIGEST_PREFIX_LEN: usize = 160;

/// Separates prefix and digest; never produced by [`encode_key`].
const DIGEST_SEPARATOR: char = '~';

/// Lock store keeping one file per key in a directory.
///
/// `set_if_absent` creates the file with `create_new` (exclusive create), so
/// exactly one process wins when several race on the same key, as long as
/// they share the directory on a filesystem with atomic exclusive create.
///
/// `delete_if_value` reads the file and then removes it; those two steps are
/// not atomic together.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

/// Where a key lives on disk.
struct LockFile {
    path: PathBuf,
    /// Digest-named files carry the key in a header line.
    digest_named: bool,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first
    /// acquisition if it does not exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &LockKey) -> PathBuf {
        self.locate(key).path
    }

    fn locate(&self, key: &LockKey) -> LockFile {
        let encoded = encode_key(key.as_str());
        let (stem, digest_named) = if encoded.len() <= MAX_ENCODED_LEN {
            (encoded, false)
        } else {
            (digest_stem(key.as_str()), true)
        };
        LockFile {
            path: self.dir.join(format!("{}.{}", stem, LOCK_EXTENSION)),
            digest_named,
        }
    }

    fn ensure_dir(&self) -> StoreResult<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
                op: "create lock directory",
                path: self.dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Key stored in the header of a digest-named file; `None` if unreadable.
    fn header_key(path: &Path) -> Option<String> {
        let content = fs::read(path).ok()?;
        split_record(&content).map(|(key, _)| key)
    }
}

impl LockStore for FileStore {
    fn set_if_absent(&self, key: &LockKey, value: &[u8]) -> StoreResult<bool> {
        let LockFile { path, digest_named } = self.locate(key);
        let contents = if digest_named {
            encode_record(key, value)?
        } else {
            value.to_vec()
        };
        self.ensure_dir()?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::trace!(key = %key, path = %path.display(), "lock file already exists");
                return Ok(false);
            }
            Err(source) => {
                return Err(StoreError::Io {
                    op: "create lock file",
                    path,
                    source,
                });
            }
        };

        // The key exists from here on; a failed write must not leave it behind.
        if let Err(source) = file.write_all(&contents).and_then(|()| file.sync_all()) {
            drop(file);
            let cleanup = fs::remove_file(&path);
            return Err(write_failure(key, path, source, cleanup));
        }

        tracing::trace!(key = %key, path = %path.display(), "lock file created");
        Ok(true)
    }

    fn delete(&self, key: &LockKey) -> StoreResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                op: "remove lock file",
                path,
                source,
            }),
        }
    }

    fn delete_if_value(&self, key: &LockKey, expected: &[u8]) -> StoreResult<bool> {
        let path = self.path_for(key);
        match self.get(key)? {
            Some(current) if current == expected => {}
            _ => return Ok(false),
        }
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io {
                op: "remove lock file",
                path,
                source,
            }),
        }
    }

    fn exists(&self, key: &LockKey) -> StoreResult<bool> {
        let path = self.path_for(key);
        path.try_exists().map_err(|source| StoreError::Io {
            op: "check lock file",
            path,
            source,
        })
    }

    fn get(&self, key: &LockKey) -> StoreResult<Option<Vec<u8>>> {
        let LockFile { path, digest_named } = self.locate(key);
        match fs::read(&path) {
            // A header still being written reads as an empty value.
            Ok(content) if digest_named => Ok(Some(
                split_record(&content)
                    .map(|(_, value)| value.to_vec())
                    .unwrap_or_default(),
            )),
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                op: "read lock file",
                path,
                source,
            }),
        }
    }

    fn keys(&self, prefix: &str) -> StoreResult<Vec<LockKey>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    op: "read lock directory",
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                op: "read lock directory entry",
                path: self.dir.clone(),
                source,
            })?;

            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(LOCK_EXTENSION) {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            // Files that are not ours (bad encoding), or digest-named files
            // released or still being written, are skipped.
            let key = if stem.contains(DIGEST_SEPARATOR) {
                Self::header_key(&path)
            } else {
                decode_key(stem)
            };
            let Some(key) = key else {
                continue;
            };

            if key.starts_with(prefix) {
                keys.push(LockKey::new(key));
            }
        }

        keys.sort();
        Ok(keys)
    }
}

/// Error for a lock file whose write failed, given the outcome of removing it.
///
/// If the file could not be removed the key is still held, which is reported
/// as [`StoreError::Stranded`] and logged.
pub(crate) fn write_failure(
    key: &LockKey,
    path: PathBuf,
    source: io::Error,
    cleanup: io::Result<()>,
) -> StoreError {
    match cleanup {
        Ok(()) => StoreError::Io {
            op: "write lock file",
            path,
            source,
        },
        Err(e) if e.kind() == ErrorKind::NotFound => StoreError::Io {
            op: "write lock file",
            path,
            source,
        },
        Err(cleanup) => {
            tracing::error!(
                key = %key,
                path = %path.display(),
                error = %cleanup,
                "failed to remove half-written lock file; the lock is still held"
            );
            StoreError::Stranded {
                key: key.clone(),
                path,
                source,
                cleanup,
            }
        }
    }
}

/// File stem for a key too long to encode whole.
pub(crate) fn digest_stem(key: &str) -> String {
    let mut prefix = String::new();
    let mut buf = [0u8; 4];
    for ch in key.chars() {
        let piece = encode_key(ch.encode_utf8(&mut buf));
        if prefix.len() + piece.len() > DIGEST_PREFIX_LEN {
            break;
        }
        prefix.push_str(&piece);
    }
    format!(
        "{}{}{}",
        prefix,
        DIGEST_SEPARATOR,
        hex::encode(Sha256::digest(key.as_bytes()))
    )
}

/// Contents of a digest-named file: the key as a JSON string, a newline, the value.
fn encode_record(key: &LockKey, value: &[u8]) -> StoreResult<Vec<u8>> {
    let mut record = serde_json::to_vec(key.as_str())?;
    record.push(b'\n');
    record.extend_from_slice(value);
    Ok(record)
}

fn split_record(content: &[u8]) -> Option<(String, &[u8])> {
    let newline = content.iter().position(|&b| b == b'\n')?;
    let key = serde_json::from_slice(&content[..newline]).ok()?;
    Some((key, &content[newline + 1..]))
}

/// Percent-encode every byte outside `[A-Za-z0-9_-]`.
pub(crate) fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

/// Inverse of [`encode_key`]; `None` for malformed input.
pub(crate) fn decode_key(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = encoded.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}
