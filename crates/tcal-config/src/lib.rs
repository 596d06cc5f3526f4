//! Runtime configuration for the trajectory cache (spec §6): the
//! `FRAME_CACHE_SIZE_MB` knob and the `[4 MiB, physical_ram/4]` clamp from
//! §3, plus an optional `tcal.toml` override file so a host application
//! doesn't need to recompile to change the cache budget.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_FRAME_CACHE_SIZE_MB: u64 = 512;
const MIN_AVAILABLE_BYTES: u64 = 4 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CacheConfig {
    #[serde(default)]
    pub frame_cache_size_mb: Option<u64>,
    /// `"clock"` (default) or `"lru"`. Kept as a raw string here rather than
    /// `tcal_cache::EvictionPolicy` so this crate stays dependency-free of
    /// the rest of the workspace, matching the teacher's `core-config`,
    /// which never depends on another `core-*` crate; callers map the
    /// string to their own policy type (see `tcal-cli`'s `main.rs`).
    #[serde(default)]
    pub eviction_policy: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Effective configuration: the raw file contents (if any), the parsed
/// table, and the frame-cache size to use.
#[derive(Debug, Clone)]
pub struct Config {
    pub raw: Option<String>,
    pub file: ConfigFile,
    pub frame_cache_size_mb: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            raw: None,
            file: ConfigFile::default(),
            frame_cache_size_mb: DEFAULT_FRAME_CACHE_SIZE_MB,
        }
    }
}

impl Config {
    /// Loads `path` if it exists, otherwise returns the default
    /// configuration. Unknown TOML fields are ignored (forward
    /// compatibility), matching the teacher's config-loading stance.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file found, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let frame_cache_size_mb = file.cache.frame_cache_size_mb.unwrap_or(DEFAULT_FRAME_CACHE_SIZE_MB);
        tracing::info!(path = %path.display(), frame_cache_size_mb, "loaded cache config");
        Ok(Self {
            raw: Some(raw),
            file,
            frame_cache_size_mb,
        })
    }

    /// `available_bytes = clamp(configured_size_bytes, 4 MiB, physical_ram / 4)`
    /// (spec §3).
    pub fn available_bytes(&self, physical_ram_bytes: u64) -> u64 {
        let configured = self.frame_cache_size_mb.saturating_mul(1024 * 1024);
        let upper = physical_ram_bytes / 4;
        configured.clamp(MIN_AVAILABLE_BYTES, upper.max(MIN_AVAILABLE_BYTES))
    }

    /// The configured eviction policy name, defaulting to `"clock"` (spec §9
    /// open question: eviction policy is a project-level choice). Unknown
    /// values are treated as the default by the caller, not rejected here —
    /// this crate only carries the string through.
    pub fn eviction_policy_name(&self) -> &str {
        self.file.cache.eviction_policy.as_deref().unwrap_or("clock")
    }
}

/// Best-effort physical RAM probe. Reads `/proc/meminfo` on Linux; falls
/// back to a conservative constant elsewhere. This is not an environment
/// variable, so it does not run afoul of spec §6's "no environment
/// variables consumed" rule — it is the one piece of host introspection
/// needed to compute the §3 clamp.
pub fn physical_ram_bytes() -> u64 {
    const FALLBACK_BYTES: u64 = 8 * 1024 * 1024 * 1024;
    read_proc_meminfo().unwrap_or(FALLBACK_BYTES)
}

fn read_proc_meminfo() -> Option<u64> {
    let contents = fs::read_to_string("/proc/meminfo").ok()?;
    let line = contents.lines().find(|l| l.starts_with("MemTotal:"))?;
    let kb: u64 = line
        .split_whitespace()
        .nth(1)?
        .parse()
        .ok()?;
    Some(kb.saturating_mul(1024))
}
