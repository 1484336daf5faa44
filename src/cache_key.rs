//! Configuration fingerprints.
//!
//! A [`CacheKey`] is a BLAKE3 digest over everything that influences the
//! contents of a class registry. Fields are streamed in a fixed order:
//!
//! 1. resolved stylesheet files (path + modification time), in resolution order
//! 2. list patterns: allowlist, blocklist, ignore
//! 3. catalogue configuration (JSON) plus the files the catalogue reads
//!    (path + modification time), or an explicit "absent" marker
//! 4. working directory
//!
//! Every variable-length value is length-prefixed and every section is
//! tagged, so two different inputs can never stream the same bytes.

use std::fmt;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::resolver::ResolvedFile;

/// 256-bit configuration fingerprint.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    pub fn builder() -> CacheKeyBuilder {
        CacheKeyBuilder::new()
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({})", self)
    }
}

/// Streaming builder for [`CacheKey`].
pub struct CacheKeyBuilder {
    hasher: blake3::Hasher,
}

impl Default for CacheKeyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheKeyBuilder {
    pub fn new() -> Self {
        Self {
            hasher: blake3::Hasher::new(),
        }
    }

    fn tag(&mut self, tag: &[u8]) {
        self.hasher.update(tag);
    }

    fn bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(&(bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
    }

    fn path(&mut self, path: &Path) {
        self.bytes(path.as_os_str().as_encoded_bytes());
    }

    fn time(&mut self, time: SystemTime) {
        // Pre-epoch times get their own sign byte
        let (sign, nanos) = match time.duration_since(UNIX_EPOCH) {
            Ok(d) => (0u8, d.as_nanos()),
            Err(e) => (1u8, e.duration().as_nanos()),
        };
        self.hasher.update(&[sign]);
        self.hasher.update(&nanos.to_le_bytes());
    }

    fn resolved(&mut self, files: &[ResolvedFile]) {
        self.hasher.update(&(files.len() as u64).to_le_bytes());
        for file in files {
            self.path(&file.path);
            self.time(file.mtime);
        }
    }

    pub fn files(mut self, files: &[ResolvedFile]) -> Self {
        self.tag(b"files");
        self.resolved(files);
        self
    }

    /// Stream one named list. Call once per list, in the documented order.
    pub fn list<S: AsRef<str>>(mut self, name: &str, patterns: &[S]) -> Self {
        self.tag(b"list");
        self.bytes(name.as_bytes());
        self.hasher.update(&(patterns.len() as u64).to_le_bytes());
        for pattern in patterns {
            self.bytes(pattern.as_ref().as_bytes());
        }
        self
    }

    /// Stream the catalogue configuration and the files it was generated
    /// from. `None` is distinct from any value.
    pub fn catalogue<T: Serialize>(mut self, settings: Option<&T>, inputs: &[ResolvedFile]) -> Self {
        self.tag(b"catalogue");
        let Some(settings) = settings else {
            self.hasher.update(&[0u8]);
            return self;
        };

        self.hasher.update(&[1u8]);
        // Struct fields serialize in declaration order, maps are BTreeMaps
        let json = serde_json::to_vec(settings).unwrap_or_default();
        self.bytes(&json);
        self.resolved(inputs);
        self
    }

    pub fn cwd(mut self, cwd: &Path) -> Self {
        self.tag(b"cwd");
        self.path(cwd);
        self
    }

    pub fn finish(self) -> CacheKey {
        CacheKey(*self.hasher.finalize().as_bytes())
    }
}
