use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::trace;

use crate::error::RecastError;
use crate::result::Result;
use crate::tree::CompilationUnit;

type Entry = Arc<OnceLock<std::result::Result<Arc<CompilationUnit>, String>>>;

static GLOBAL: Lazy<Arc<TemplateCache>> = Lazy::new(|| Arc::new(TemplateCache::new()));

/// Parsed scaffolds keyed by their generated source text.
///
/// Each key is parsed at most once, even when several threads ask for it at
/// the same time. Parse failures are cached too.
#[derive(Debug)]
pub struct TemplateCache {
    entries: DashMap<String, Entry>,
    enabled: bool,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateCache {
    pub fn new() -> Self {
        TemplateCache {
            entries: DashMap::new(),
            enabled: true,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// A cache that parses on every request
    pub fn disabled() -> Self {
        TemplateCache {
            enabled: false,
            ..Self::new()
        }
    }

    /// Process-wide default
    pub fn global() -> Arc<TemplateCache> {
        GLOBAL.clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get_or_parse(
        &self,
        source: &str,
        parse: impl FnOnce(&str) -> Result<Arc<CompilationUnit>>,
    ) -> Result<Arc<CompilationUnit>> {
        if !self.enabled {
            return parse(source);
        }

        // Clone the cell out so the shard lock is not held while parsing
        let cell = self
            .entries
            .entry(source.to_string())
            .or_insert_with(|| Arc::new(OnceLock::new()))
            .clone();

        let mut parsed_here = false;
        let result = cell.get_or_init(|| {
            parsed_here = true;
            parse(source).map_err(|e| e.to_string())
        });
        if parsed_here {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(bytes = source.len(), "template scaffold parsed");
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }

        result
            .clone()
            .map_err(|message| RecastError::template_definition(source, message))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Markers, Space, TreeId};
    use std::path::PathBuf;

    fn parsed(_: &str) -> Result<Arc<CompilationUnit>> {
        Ok(Arc::new(CompilationUnit {
            id: TreeId::fresh(),
            prefix: Space::EMPTY,
            markers: Markers::EMPTY,
            source_path: PathBuf::from("Template.java"),
            package: None,
            imports: Vec::new(),
            types: Vec::new(),
            eof: Space::EMPTY,
        }))
    }

    #[test]
    fn test_parses_each_source_once() {
        let cache = TemplateCache::new();
        let first = cache.get_or_parse("class A {}", parsed).unwrap();
        let second = cache
            .get_or_parse("class A {}", |_| panic!("should be cached"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!((cache.hits(), cache.misses()), (1, 1));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_failures_are_cached() {
        let cache = TemplateCache::new();
        let fail = |_: &str| Err(RecastError::internal_error("unexpected token"));
        assert!(cache.get_or_parse("class {", fail).is_err());
        let err = cache.get_or_parse("class {", parsed).unwrap_err();
        assert!(matches!(err, RecastError::TemplateDefinition { .. }));
    }

    #[test]
    fn test_concurrent_first_access_parses_once() {
        let cache = TemplateCache::new();
        let calls = AtomicUsize::new(0);
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    cache
                        .get_or_parse("class B {}", |s| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            parsed(s)
                        })
                        .unwrap();
                });
            }
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disabled_cache_always_parses() {
        let cache = TemplateCache::disabled();
        let a = cache.get_or_parse("class C {}", parsed).unwrap();
        let b = cache.get_or_parse("class C {}", parsed).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(cache.is_empty());
    }
}
