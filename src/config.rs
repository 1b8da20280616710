//! Site configuration module.
//!
//! Handles loading, validating, and merging `site.toml`. Stock defaults are
//! serialized to a TOML table and the user file is merged on top, so a config
//! file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! public_dir = "public"        # Output directory, relative to the project root
//! templates_dir = "templates"  # Template directory, relative to the project root
//! template_extension = "html"  # Templates are <templates_dir>/<name>.<ext>
//!
//! [[error_pages]]
//! code = 404
//! message = "Not Found"
//!
//! [[error_pages]]
//! code = 500
//! message = "Internal Server Error"
//!
//! # No routes by default
//! [[routes]]
//! path = "/posts/{slug}"       # Path template
//! template = "post"            # Template rendered for each page
//! data = "data/posts.json"     # Optional JSON repository driving fan-out
//! fields = ["slug"]            # Optional: fields exposed to the path template
//! ```
//!
//! Arrays (`error_pages`, `routes`) replace the defaults wholesale rather than
//! merging element by element. Unknown keys are rejected to catch typos early.

use crate::template::{PathPattern, placeholders};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Output directory for the generated site.
    pub public_dir: String,
    /// Directory the template renderer loads from.
    pub templates_dir: String,
    /// File extension of template files, without the dot.
    pub template_extension: String,
    /// Error pages generated on every build, in order.
    pub error_pages: Vec<ErrorPage>,
    /// Declared routes, in generation order.
    pub routes: Vec<RouteConfig>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            public_dir: "public".to_string(),
            templates_dir: "templates".to_string(),
            template_extension: "html".to_string(),
            error_pages: vec![
                ErrorPage::new(404, "Not Found"),
                ErrorPage::new(500, "Internal Server Error"),
            ],
            routes: Vec::new(),
        }
    }
}

/// An HTTP error page written as `<public_dir>/<code>.html`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorPage {
    pub code: u16,
    pub message: String,
}

impl ErrorPage {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Template name checked for a custom page, e.g. `"404"`.
    pub fn template_name(&self) -> String {
        self.code.to_string()
    }

    /// Output file name, e.g. `"404.html"`.
    pub fn file_name(&self) -> String {
        format!("{}.html", self.code)
    }
}

/// A declarative route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    /// Path template, e.g. `/posts/{slug}`.
    pub path: String,
    /// Template rendered for every page of the route.
    pub template: String,
    /// JSON repository (relative to the project root) yielding one page per record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Restrict each record's parameter mapping to these fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.public_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "public_dir must not be empty".into(),
            ));
        }
        if self.templates_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "templates_dir must not be empty".into(),
            ));
        }

        let mut codes = HashSet::new();
        for page in &self.error_pages {
            if !(100..=599).contains(&page.code) {
                return Err(ConfigError::Validation(format!(
                    "error_pages.code {} is not an HTTP status code",
                    page.code
                )));
            }
            if !codes.insert(page.code) {
                return Err(ConfigError::Validation(format!(
                    "error_pages.code {} is listed twice",
                    page.code
                )));
            }
        }

        for route in &self.routes {
            if !route.path.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "route path '{}' must start with '/'",
                    route.path
                )));
            }
            if route.template.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "route '{}' has an empty template",
                    route.path
                )));
            }
            PathPattern::compile(&route.path).map_err(|e| {
                ConfigError::Validation(format!("route '{}': {}", route.path, e))
            })?;
            let missing = route.fields.as_ref().and_then(|fields| {
                placeholders(&route.path)
                    .into_iter()
                    .find(|name| !fields.contains(name))
            });
            if let Some(name) = missing {
                return Err(ConfigError::Validation(format!(
                    "route '{}': fields do not include placeholder '{}'",
                    route.path, name
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// The built-in `site.toml` values as a TOML table, the base layer every
/// user file is merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Lay a user `site.toml` over the stock defaults.
///
/// Tables merge key by key, so a file containing only `public_dir = "dist"`
/// keeps every other default. Any other value, including the `error_pages`
/// and `routes` arrays, replaces the default outright.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut defaults), toml::Value::Table(user)) => {
            for (key, value) in user {
                let merged = match defaults.remove(&key) {
                    Some(default) => merge_toml(default, value),
                    None => value,
                };
                defaults.insert(key, merged);
            }
            toml::Value::Table(defaults)
        }
        (_, user) => user,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Turn the defaults plus an optional user `site.toml` into a checked
/// [`SiteConfig`].
///
/// Unknown keys fail deserialization; bad routes and error pages fail
/// [`SiteConfig::validate`].
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(user) => merge_toml(base, user),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`, falling back to stock defaults when it
/// does not exist.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `site.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# sitepress configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Output directory, relative to the project root.
# `sitepress cleanup` deletes this directory recursively.
public_dir = "public"

# Template directory, relative to the project root.
templates_dir = "templates"

# Templates are loaded from <templates_dir>/<name>.<template_extension>.
template_extension = "html"

# ---------------------------------------------------------------------------
# Error pages
# ---------------------------------------------------------------------------
# Each entry writes <public_dir>/<code>.html and an ErrorDocument line in
# <public_dir>/.htaccess. A template named after the code (e.g. 404.html)
# replaces the built-in page.
[[error_pages]]
code = 404
message = "Not Found"

[[error_pages]]
code = 500
message = "Internal Server Error"

# ---------------------------------------------------------------------------
# Routes
# ---------------------------------------------------------------------------
# Routes are generated in the order they are declared. `{name}` segments in
# a path are filled from the route's data file, one page per record.
# Templates receive `params` (the path parameters) and `record` (the
# matching data record, if any).
#
# [[routes]]
# path = "/"
# template = "home"
#
# [[routes]]
# path = "/posts/{slug}"
# template = "post"
# data = "data/posts.json"
# fields = ["slug"]
"##
}
