use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use crate::errors::Result;

/// Directories never scanned for stylesheets.
pub const EXCLUDED_DIRS: &[&str] = &["node_modules", "dist", "build"];

/// How long a resolution is reused before the filesystem is consulted again.
pub const DEFAULT_RESOLUTION_TTL: Duration = Duration::from_secs(1);

/// A matched file together with its modification time
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedFile {
    pub path: PathBuf,
    pub mtime: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResolutionKey {
    patterns: Vec<String>,
    cwd: PathBuf,
}

#[derive(Debug)]
struct CachedResolution {
    resolved_at: Instant,
    files: Arc<Vec<ResolvedFile>>,
}

/// Memoizes glob resolution for a short time window.
///
/// Within the TTL, identical `(patterns, cwd)` requests return the previous
/// `Arc` without touching the filesystem.
#[derive(Debug)]
pub struct FileResolutionCache {
    ttl: Duration,
    entries: RefCell<HashMap<ResolutionKey, CachedResolution>>,
}

impl Default for FileResolutionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FileResolutionCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_RESOLUTION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RefCell::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Resolve glob patterns relative to `cwd`. Never fails: glob and stat
    /// errors are logged and degrade to fewer (or no) files.
    pub fn resolve(&self, patterns: &[String], cwd: &Path) -> Arc<Vec<ResolvedFile>> {
        if patterns.is_empty() {
            return Arc::new(Vec::new());
        }

        let key = ResolutionKey {
            patterns: patterns.to_vec(),
            cwd: cwd.to_path_buf(),
        };

        if let Some(cached) = self.entries.borrow().get(&key) {
            if cached.resolved_at.elapsed() < self.ttl {
                tracing::debug!(patterns = ?patterns, "file resolution cache hit");
                return Arc::clone(&cached.files);
            }
        }

        let files = match resolve_files(patterns, cwd) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!("Failed to expand stylesheet patterns {:?}: {}", patterns, e);
                Vec::new()
            }
        };
        let files = Arc::new(files);

        self.entries.borrow_mut().insert(
            key,
            CachedResolution {
                resolved_at: Instant::now(),
                files: Arc::clone(&files),
            },
        );
        files
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

/// Expand the patterns and stat every match, uncached.
pub fn resolve_files(patterns: &[String], cwd: &Path) -> Result<Vec<ResolvedFile>> {
    let anchored = patterns.iter().any(|p| Path::new(p).is_absolute());
    let mut files = Vec::new();
    let mut seen = HashSet::new();

    for pattern in patterns {
        let (full_pattern, root) = if anchored {
            (pattern.clone(), literal_root(pattern))
        } else {
            let relative = pattern.strip_prefix("./").unwrap_or(pattern);
            let base = glob::Pattern::escape(&cwd.to_string_lossy());
            (format!("{}/{}", base.trim_end_matches('/'), relative), cwd.to_path_buf())
        };

        for entry in glob::glob(&full_pattern)? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!("Skipping unreadable path while globbing: {}", e);
                    continue;
                }
            };

            if is_excluded(&path, cwd, &root) || !seen.insert(path.clone()) {
                continue;
            }

            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!("Cannot stat '{}': {}", path.display(), e);
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }
            let mtime = match metadata.modified() {
                Ok(mtime) => mtime,
                Err(e) => {
                    tracing::warn!("Cannot read modification time of '{}': {}", path.display(), e);
                    continue;
                }
            };

            files.push(ResolvedFile { path, mtime });
        }
    }

    Ok(files)
}

/// Leading components of a pattern that contain no glob syntax
fn literal_root(pattern: &str) -> PathBuf {
    Path::new(pattern)
        .components()
        .take_while(|component| match component {
            Component::Normal(name) => !name
                .to_string_lossy()
                .contains(|c| matches!(c, '*' | '?' | '[' | ']')),
            _ => true,
        })
        .collect()
}

/// True if any directory on the way to `path` is excluded. Only the part
/// below `cwd` (or, outside it, below the pattern's literal root) counts.
fn is_excluded(path: &Path, cwd: &Path, root: &Path) -> bool {
    let relative = path
        .strip_prefix(cwd)
        .or_else(|_| path.strip_prefix(root))
        .unwrap_or(path);
    relative.components().any(|component| match component {
        Component::Normal(name) => EXCLUDED_DIRS.iter().any(|dir| name == *dir),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_empty_patterns_resolve_to_nothing() {
        let cache = FileResolutionCache::new();
        let temp_dir = TempDir::new().unwrap();
        assert!(cache.resolve(&[], temp_dir.path()).is_empty());
        assert!(cache.entries.borrow().is_empty());
    }

    #[test]
    fn test_relative_patterns_and_exclusions() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let kept = write(root, "src/styles/app.css", ".app{}");
        write(root, "node_modules/lib/lib.css", ".lib{}");
        write(root, "dist/out.css", ".out{}");
        write(root, "src/build/gen.css", ".gen{}");

        let files = resolve_files(&["./**/*.css".to_string()], root).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, vec![kept]);
    }

    #[test]
    fn test_absolute_patterns_are_used_as_is() {
        let temp_dir = TempDir::new().unwrap();
        let css = write(temp_dir.path(), "a.css", ".a{}");
        let other = TempDir::new().unwrap();

        let pattern = format!("{}/*.css", temp_dir.path().display());
        let files = resolve_files(&[pattern], other.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, css);
    }

    #[test]
    fn test_absolute_patterns_under_excluded_ancestor() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join("build").join("project");
        let css = write(&project, "src/a.css", ".a{}");
        write(&project, "node_modules/lib/lib.css", ".lib{}");
        let other = TempDir::new().unwrap();

        let pattern = format!("{}/**/*.css", project.display());
        let files = resolve_files(&[pattern], other.path()).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, vec![css]);
    }

    #[test]
    fn test_literal_root_stops_at_glob_syntax() {
        assert_eq!(literal_root("/srv/dist/app/**/*.css"), PathBuf::from("/srv/dist/app"));
        assert_eq!(literal_root("/srv/a[bc]/x.css"), PathBuf::from("/srv"));
    }

    #[test]
    fn test_duplicate_matches_are_collapsed() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a.css", ".a{}");
        let files = resolve_files(
            &["*.css".to_string(), "a.*".to_string()],
            temp_dir.path(),
        )
        .unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_invalid_glob_degrades_to_empty() {
        let temp_dir = TempDir::new().unwrap();
        assert!(resolve_files(&["[invalid".to_string()], temp_dir.path()).is_err());

        let cache = FileResolutionCache::new();
        assert!(cache.resolve(&["[invalid".to_string()], temp_dir.path()).is_empty());
    }

    #[test]
    fn test_cache_reuses_within_ttl() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a.css", ".a{}");
        let patterns = vec!["*.css".to_string()];

        let cache = FileResolutionCache::with_ttl(Duration::from_secs(60));
        let first = cache.resolve(&patterns, temp_dir.path());
        write(temp_dir.path(), "b.css", ".b{}");
        let second = cache.resolve(&patterns, temp_dir.path());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);

        cache.clear();
        let third = cache.resolve(&patterns, temp_dir.path());
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.len(), 2);
    }

    #[test]
    fn test_cache_refreshes_after_ttl() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a.css", ".a{}");
        let patterns = vec!["*.css".to_string()];

        let cache = FileResolutionCache::with_ttl(Duration::ZERO);
        let first = cache.resolve(&patterns, temp_dir.path());
        write(temp_dir.path(), "b.css", ".b{}");
        let second = cache.resolve(&patterns, temp_dir.path());
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 2);
    }
}
