//! Options store implementations
//!
//! - [`JsonOptionsStore`]: one pretty-printed JSON file per skill scope
//! - [`MemoryOptionsStore`]: volatile map, for tests and dry runs

use crate::error::{CoreError, Result};
use crate::traits::OptionsStore;
use crate::types::SkillOptions;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Stores each scope as `<dir>/<scope>.json`
#[derive(Debug, Clone)]
pub struct JsonOptionsStore {
    dir: PathBuf,
}

impl JsonOptionsStore {
    /// Create a store rooted at `dir` (created on first save)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the option files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, scope: &str) -> Result<PathBuf> {
        let valid = !scope.is_empty()
            && scope
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CoreError::invalid_options(scope, "scope is not a valid file name"));
        }
        Ok(self.dir.join(format!("{scope}.json")))
    }
}

impl OptionsStore for JsonOptionsStore {
    fn load(&self, scope: &str) -> Result<Option<SkillOptions>> {
        let path = self.path_for(scope)?;
        if !path.exists() {
            debug!(scope, path = %path.display(), "No stored options");
            return Ok(None);
        }

        let raw = fs::read_to_string(&path)?;
        let options: SkillOptions = serde_json::from_str(&raw)?;
        options.validate(scope)?;
        Ok(Some(options))
    }

    fn save(&self, scope: &str, options: &SkillOptions) -> Result<()> {
        let path = self.path_for(scope)?;
        fs::create_dir_all(&self.dir)?;

        // Write-then-rename so a crash never leaves a truncated file behind
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(options)?)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            warn!(scope, error = %e, "Failed to replace options file");
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        debug!(scope, path = %path.display(), "Saved options");
        Ok(())
    }
}

/// In-memory options store
#[derive(Debug, Default)]
pub struct MemoryOptionsStore {
    scopes: Mutex<HashMap<String, SkillOptions>>,
}

impl MemoryOptionsStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one scope
    pub fn with(scope: impl Into<String>, options: SkillOptions) -> Self {
        let store = Self::new();
        store
            .scopes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(scope.into(), options);
        store
    }
}

impl OptionsStore for MemoryOptionsStore {
    fn load(&self, scope: &str) -> Result<Option<SkillOptions>> {
        let scopes = self.scopes.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(scopes.get(scope).cloned())
    }

    fn save(&self, scope: &str, options: &SkillOptions) -> Result<()> {
        self.scopes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(scope.to_string(), options.clone());
        Ok(())
    }
}
