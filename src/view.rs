//! View rendering.
//!
//! Page generation never formats HTML itself: handlers produce a [`View`]
//! by calling into a [`ViewRenderer`], and the generator only writes the
//! resulting body to disk. The renderer is passed explicitly to everything
//! that needs it.
//!
//! [`TemplateDirRenderer`] is the renderer shipped with the binary. It loads
//! `<templates_dir>/<name>.<ext>` and renders it as a Handlebars template:
//!
//! ```text
//! {{ post.title }}      HTML-escaped value (dotted paths walk objects)
//! {{ post.tags.[0] }}   array element
//! {{{ post.body }}}     raw value, inserted as-is
//! ```
//!
//! Missing values render as the empty string.

use handlebars::Handlebars;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),
}

/// Renders named templates into page bodies.
pub trait ViewRenderer {
    /// Render `template` with `data` into a page body.
    fn render(&self, template: &str, data: &Value) -> Result<String, RenderError>;

    /// Location a template named `template` would be loaded from.
    ///
    /// Callers check this path to decide whether a custom template exists.
    fn template_path(&self, template: &str) -> PathBuf;
}

/// The rendered result of a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    body: String,
}

impl View {
    /// Render `template` through `renderer`.
    pub fn render(
        renderer: &dyn ViewRenderer,
        template: &str,
        data: &Value,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            body: renderer.render(template, data)?,
        })
    }

    /// A view with a pre-rendered body.
    pub fn from_body(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }
}

/// Handlebars engine configured the way every renderer in this crate uses it.
///
/// Non-strict: a missing value renders as the empty string.
pub fn template_engine() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(false);
    handlebars
}

/// Loads templates from a directory and renders them with Handlebars.
#[derive(Debug)]
pub struct TemplateDirRenderer {
    dir: PathBuf,
    extension: String,
    handlebars: Handlebars<'static>,
}

impl TemplateDirRenderer {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
            handlebars: template_engine(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ViewRenderer for TemplateDirRenderer {
    fn render(&self, template: &str, data: &Value) -> Result<String, RenderError> {
        let path = self.template_path(template);
        let source = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RenderError::TemplateNotFound(path));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(self.handlebars.render_template(&source, data)?)
    }

    fn template_path(&self, template: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", template, self.extension))
    }
}
