//! Runtime configuration I/O operations.
//!
//! This module contains system directory detection and config loading utilities
//! that require runtime dependencies (dirs, tracing).
//! These are separated from config.rs to allow schema-only builds.

use crate::config::IndentConfig;
use std::path::{Path, PathBuf};

impl IndentConfig {
    /// Get all config search paths, checking local (working directory) first.
    ///
    /// Search order:
    /// 1. `{working_dir}/indent.json` (project-local config)
    /// 2. `{config_dir}/indent.json`
    ///
    /// Only returns paths that exist on disk.
    fn config_search_paths(working_dir: &Path, dirs: &DirectoryContext) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(2);

        let local = working_dir.join(Self::FILENAME);
        if local.exists() {
            paths.push(local);
        }

        let system = dirs.config_dir.join(Self::FILENAME);
        if !paths.contains(&system) && system.exists() {
            paths.push(system);
        }

        paths
    }

    /// Load configuration, checking working directory first, then the config directory.
    ///
    /// Falls back to defaults if no config file is found or all fail to load.
    pub fn load_for_working_dir(working_dir: &Path, dirs: &DirectoryContext) -> Self {
        for path in Self::config_search_paths(working_dir, dirs) {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded indent config from {}", path.display());
                    return config;
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to load indent config from {}: {}, trying next option",
                        path.display(),
                        e
                    );
                }
            }
        }
        tracing::debug!("No indent config file found, using defaults");
        Self::default()
    }
}

/// Directory paths for configuration and user query overrides
///
/// Only the top-level `main` function should use `dirs::*` to construct this;
/// all other code should receive it by construction/parameter passing, so
/// tests can use isolated temp directories.
#[derive(Debug, Clone)]
pub struct DirectoryContext {
    /// Config directory for user configuration
    /// e.g., ~/.config/fresh on Linux, ~/Library/Application Support/fresh on macOS
    pub config_dir: PathBuf,
}

impl DirectoryContext {
    /// Build from the platform's standard directories
    pub fn from_system() -> Option<Self> {
        dirs::config_dir().map(|dir| Self {
            config_dir: dir.join("fresh"),
        })
    }

    /// Build rooted at an explicit directory (used by tests)
    pub fn for_testing(root: &Path) -> Self {
        Self {
            config_dir: root.join("config"),
        }
    }

    /// Directory holding user query overrides: `{config_dir}/queries/<lang>/indents.scm`
    pub fn queries_dir(&self) -> PathBuf {
        self.config_dir.join("queries")
    }
}
