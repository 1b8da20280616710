//! Path templates: `/posts/{slug}` style route paths.
//!
//! Two independent operations run over the same template string:
//!
//! - [`expand`] runs forward, substituting provider values into the
//!   placeholders to produce a concrete URI.
//! - [`PathPattern`] runs backward, matching a concrete URI and recovering
//!   the named placeholder values from it.
//!
//! The generator expands a URI and then immediately matches it again, so
//! handlers receive parameters parsed exactly the way a request for that URI
//! would be parsed, rather than the raw provider mapping (which may carry
//! keys the template never mentions).
//!
//! ## Placeholder syntax
//!
//! A placeholder is `{name}` where `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
//! In a compiled pattern each placeholder matches one or more characters
//! other than `/`, so a placeholder never spans path segments. Everything
//! outside placeholders is matched literally.

use crate::types::{ParamMap, RouteParams};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern must compile")
});

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("placeholder {{{0}}} appears more than once in the path template")]
    DuplicatePlaceholder(String),
    #[error("invalid path pattern: {0}")]
    Regex(#[from] regex::Error),
}

/// Substitute provider values into a path template.
///
/// Every `{key}` whose key is present in `params` is replaced by the
/// stringified value. Placeholders without a matching key are left in place.
/// Substitution is a single pass over the template, so inserted values are
/// never scanned for placeholders themselves.
///
/// ```
/// use sitepress::template::expand;
/// use sitepress::types::params;
///
/// assert_eq!(expand("/posts/{slug}", &params([("slug", "hello")])), "/posts/hello");
/// assert_eq!(expand("/a/{missing}", &Default::default()), "/a/{missing}");
/// ```
pub fn expand(template: &str, params: &ParamMap) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match params.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Placeholder names of a template, in order of appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(template)
        .map(|c| c[1].to_string())
        .collect()
}

/// A path template compiled into an anchored regular expression.
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    regex: Regex,
    names: Vec<String>,
}

impl PathPattern {
    /// Compile a template into a matcher.
    ///
    /// Each `{name}` becomes `(?P<name>[^/]+)`, literal text is escaped, and
    /// the whole pattern is anchored to the full URI.
    pub fn compile(template: &str) -> Result<Self, TemplateError> {
        let mut pattern = String::from("^");
        let mut names: Vec<String> = Vec::new();
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(template) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let name = name.as_str();
            if names.iter().any(|n| n == name) {
                return Err(TemplateError::DuplicatePlaceholder(name.to_string()));
            }
            pattern.push_str(&regex::escape(&template[last..whole.start()]));
            pattern.push_str(&format!("(?P<{name}>[^/]+)"));
            names.push(name.to_string());
            last = whole.end();
        }
        pattern.push_str(&regex::escape(&template[last..]));
        pattern.push('$');

        Ok(Self {
            template: template.to_string(),
            regex: Regex::new(&pattern)?,
            names,
        })
    }

    /// Match a concrete URI, returning the named captures in template order.
    ///
    /// Returns `None` when the URI does not match the template.
    pub fn captures(&self, uri: &str) -> Option<RouteParams> {
        let caps = self.regex.captures(uri)?;
        let pairs = self
            .names
            .iter()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.clone(), m.as_str().to_string()))
            })
            .collect();
        Some(RouteParams::new(pairs))
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Placeholder names in template order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Compiled patterns keyed by template, shared across one build.
#[derive(Debug, Default)]
pub struct PatternCache {
    patterns: HashMap<String, PathPattern>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached pattern for `template`, compiling it on first use.
    ///
    /// Compilation failures are not cached.
    pub fn get_or_compile(&mut self, template: &str) -> Result<&PathPattern, TemplateError> {
        if !self.patterns.contains_key(template) {
            let pattern = PathPattern::compile(template)?;
            self.patterns.insert(template.to_string(), pattern);
        }
        Ok(&self.patterns[template])
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
