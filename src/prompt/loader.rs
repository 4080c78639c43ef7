//! Prompt Loader - Load and cache prompt templates
//!
//! Templates are `.md` files in an optional override directory. A name with
//! no file on disk falls back to the template compiled into the binary, so a
//! directory only needs to hold the templates it changes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{PddlsmithError, Result};
use crate::prompt::builtin;

/// Loads and caches prompt templates
pub struct PromptLoader {
    /// Directory holding override templates
    templates_dir: Option<PathBuf>,
    /// In-memory cache of loaded templates
    cache: RwLock<HashMap<String, String>>,
}

impl Default for PromptLoader {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptLoader {
    /// Create a loader that prefers templates in `templates_dir`
    pub fn new(templates_dir: impl AsRef<Path>) -> Self {
        Self {
            templates_dir: Some(templates_dir.as_ref().to_path_buf()),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Create a loader serving only the compiled-in templates
    pub fn builtin() -> Self {
        Self {
            templates_dir: None,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Load a template and cache it
    ///
    /// # Arguments
    /// * `name` - The template name (without .md extension)
    pub fn load(&self, name: &str) -> Result<String> {
        {
            let cache = self
                .cache
                .read()
                .map_err(|e| PddlsmithError::Template(format!("Failed to acquire read lock: {}", e)))?;
            if let Some(content) = cache.get(name) {
                return Ok(content.clone());
            }
        }

        let content = match self.template_path(name).filter(|p| p.exists()) {
            Some(path) => {
                log::debug!("Loading template '{}' from {:?}", name, path);
                std::fs::read_to_string(&path).map_err(|e| {
                    PddlsmithError::Io(std::io::Error::new(
                        e.kind(),
                        format!("Failed to load template '{}' from {:?}: {}", name, path, e),
                    ))
                })?
            }
            None => builtin(name)
                .map(str::to_string)
                .ok_or_else(|| PddlsmithError::Template(format!("Unknown template '{}'", name)))?,
        };

        {
            let mut cache = self
                .cache
                .write()
                .map_err(|e| PddlsmithError::Template(format!("Failed to acquire write lock: {}", e)))?;
            cache.insert(name.to_string(), content.clone());
        }

        Ok(content)
    }

    /// Get a cached template without loading it
    pub fn get(&self, name: &str) -> Option<String> {
        let cache = self.cache.read().ok()?;
        cache.get(name).cloned()
    }

    /// Check if a template is available on disk or compiled in
    pub fn exists(&self, name: &str) -> bool {
        self.template_path(name).is_some_and(|p| p.exists()) || builtin(name).is_some()
    }

    fn template_path(&self, name: &str) -> Option<PathBuf> {
        self.templates_dir.as_ref().map(|dir| dir.join(format!("{}.md", name)))
    }

    /// List the override templates present in the directory
    pub fn list_overrides(&self) -> Result<Vec<String>> {
        let Some(dir) = &self.templates_dir else {
            return Ok(Vec::new());
        };
        let entries = std::fs::read_dir(dir).map_err(|e| {
            PddlsmithError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read templates directory {:?}: {}", dir, e),
            ))
        })?;

        let mut templates = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md")
                && let Some(stem) = path.file_stem()
                && let Some(name) = stem.to_str()
            {
                templates.push(name.to_string());
            }
        }

        templates.sort();
        Ok(templates)
    }

    pub fn clear_cache(&self) -> Result<()> {
        let mut cache = self
            .cache
            .write()
            .map_err(|e| PddlsmithError::Template(format!("Failed to acquire write lock: {}", e)))?;
        cache.clear();
        Ok(())
    }

    pub fn templates_dir(&self) -> Option<&Path> {
        self.templates_dir.as_deref()
    }
}
