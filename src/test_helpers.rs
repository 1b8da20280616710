//! Shared test utilities for the sitepress test suite.
//!
//! Provides an in-memory [`MockRenderer`], temp-dir setup, and helpers that
//! read back the generated output tree.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = test_project();
//! let renderer = MockRenderer::new().with_template("post", "<h1>{{ slug }}</h1>");
//! // ... generate into tmp.path().join("public") ...
//! assert_eq!(list_files(&tmp.path().join("public")), vec!["index.html"]);
//! ```

use crate::view::{RenderError, ViewRenderer, template_engine};
use handlebars::Handlebars;
use serde_json::Value;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

// =========================================================================
// Renderer
// =========================================================================

/// Renderer backed by templates registered in memory.
///
/// Uses the same Handlebars engine as the directory renderer and records the
/// name of every template it renders. `template_path` points into a
/// directory that never exists, so error pages always fall back to the
/// built-in markup.
pub struct MockRenderer {
    handlebars: Handlebars<'static>,
    rendered: RefCell<Vec<String>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            handlebars: template_engine(),
            rendered: RefCell::new(Vec::new()),
        }
    }

    pub fn with_template(mut self, name: &str, source: &str) -> Self {
        self.handlebars
            .register_template_string(name, source)
            .unwrap_or_else(|e| panic!("invalid test template {name}: {e}"));
        self
    }

    /// Names of rendered templates, in call order.
    pub fn rendered(&self) -> Vec<String> {
        self.rendered.borrow().clone()
    }
}

impl ViewRenderer for MockRenderer {
    fn render(&self, template: &str, data: &Value) -> Result<String, RenderError> {
        if !self.handlebars.has_template(template) {
            return Err(RenderError::TemplateNotFound(self.template_path(template)));
        }
        self.rendered.borrow_mut().push(template.to_string());
        Ok(self.handlebars.render(template, data)?)
    }

    fn template_path(&self, template: &str) -> PathBuf {
        PathBuf::from("/nonexistent/sitepress-templates").join(format!("{template}.html"))
    }
}

// =========================================================================
// Filesystem
// =========================================================================

/// A fresh temp directory to use as a project root.
pub fn test_project() -> TempDir {
    TempDir::new().unwrap()
}

/// All files under `dir`, relative and `/`-separated, sorted.
///
/// Returns an empty list when `dir` does not exist.
pub fn list_files(dir: &Path) -> Vec<String> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut files: Vec<String> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(dir)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    files.sort();
    files
}

/// Read a file to a string. Panics with the path on failure.
pub fn read_file(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}
