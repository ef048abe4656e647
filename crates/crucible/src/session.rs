use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::parse::apkbuild::Apkbuild;

/// Variables an APKBUILD may reference without defining them. They belong to
/// the build environment; outside a real build they stay empty.
pub const BUILD_ENV_KEYS: &[&str] = &["CARCH", "srcdir", "CBUILD_ARCH", "_kernver", "CROSS_COMPILE"];

/// Per-path memoized parse results, scoped to one session. There is no
/// invalidation: the underlying files must not change while the session
/// lives. Hit/miss counters let tests tell a cached record from a recompute.
#[derive(Debug)]
pub struct ParseCache<T> {
    entries: HashMap<PathBuf, T>,
    hits: u64,
    misses: u64,
}

impl<T> Default for ParseCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<T: Clone> ParseCache<T> {
    pub fn get(&mut self, path: &Path) -> Option<T> {
        match self.entries.get(path) {
            Some(value) => {
                self.hits += 1;
                Some(value.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, path: PathBuf, value: T) {
        self.entries.insert(path, value);
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One build session: user configuration, the native architecture, the seed
/// environment for recipe parsing, and the per-session parse cache. Not
/// synchronized; parallel callers need a cache of their own.
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub arch_native: String,
    env_overrides: BTreeMap<String, String>,
    pub apkbuild_cache: ParseCache<Apkbuild>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            arch_native: arch_native().to_string(),
            env_overrides: BTreeMap::new(),
            apkbuild_cache: ParseCache::default(),
        }
    }

    /// Override one seed-environment variable for subsequent parses, for
    /// example `CARCH` when resolving dependencies for a target arch.
    pub fn set_env<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.env_overrides.insert(key.into(), value.into());
    }

    /// Seed environment handed to the shell parser: every build-env key
    /// defaults to the empty string unless overridden.
    pub fn build_env(&self) -> BTreeMap<String, String> {
        let mut env: BTreeMap<String, String> = BUILD_ENV_KEYS
            .iter()
            .map(|key| (key.to_string(), String::new()))
            .collect();
        for (key, value) in &self.env_overrides {
            env.insert(key.clone(), value.clone());
        }
        env
    }
}

/// Alpine's name for the architecture this binary runs on.
pub fn arch_native() -> &'static str {
    match std::env::consts::ARCH {
        "arm" => "armhf",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_env_defaults_to_empty_strings() {
        let session = Session::new(Config::default());
        let env = session.build_env();
        for key in BUILD_ENV_KEYS {
            assert_eq!(env.get(*key).map(String::as_str), Some(""));
        }
    }

    #[test]
    fn build_env_overrides_replace_defaults() {
        let mut session = Session::new(Config::default());
        session.set_env("CARCH", "armhf");
        assert_eq!(session.build_env()["CARCH"], "armhf");
        assert_eq!(session.build_env()["srcdir"], "");
    }

    #[test]
    fn cache_counts_hits_and_misses() {
        let mut cache = ParseCache::<String>::default();
        assert!(cache.get(Path::new("/a")).is_none());
        cache.insert(PathBuf::from("/a"), "x".into());
        assert_eq!(cache.get(Path::new("/a")).as_deref(), Some("x"));
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.len(), 1);
    }
}
