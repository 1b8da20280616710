//! Routes declared in `site.toml`.
//!
//! The generator itself only consumes an ordered list of [`Route`]s. This
//! module is how the command-line tool produces that list: every
//! `[[routes]]` entry becomes a route bound to a [`TemplatePage`] controller,
//! and every `data` file becomes a [`RepositoryProvider`] registered under
//! its own identifier.
//!
//! | Registry id      | Service |
//! |------------------|---------|
//! | `route:<n>`      | [`TemplatePage`] for the n-th route (0-based) |
//! | `route:<n>:data` | [`RepositoryProvider`] over the route's data file |
//!
//! Templates are rendered with:
//!
//! ```json
//! { "params": { "slug": "hello" }, "record": { "slug": "hello", "title": "..." } }
//! ```
//!
//! where `record` is the data record whose fields match every path
//! parameter, or `null` when the route has no data file or nothing matches.

use crate::config::SiteConfig;
use crate::provider::RepositoryProvider;
use crate::registry::{Controller, Registry};
use crate::repository::{JsonRepository, RepositoryError};
use crate::route::{HandlerError, Route};
use crate::types::RouteParams;
use crate::view::{View, ViewRenderer};
use serde_json::{Value, json};
use std::path::Path;
use thiserror::Error;

/// Method name the generated routes bind to.
pub const RENDER_METHOD: &str = "render";

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("route {path}: {source}")]
    Repository {
        path: String,
        #[source]
        source: RepositoryError,
    },
}

/// Materialized routes plus the registry their references resolve against.
#[derive(Debug)]
pub struct Site {
    pub routes: Vec<Route>,
    pub registry: Registry,
}

/// Renders a route's template with its path parameters and matching record.
#[derive(Debug, Clone)]
pub struct TemplatePage {
    template: String,
    repository: Option<JsonRepository>,
}

impl TemplatePage {
    pub fn new(template: impl Into<String>, repository: Option<JsonRepository>) -> Self {
        Self {
            template: template.into(),
            repository,
        }
    }

    fn template_data(&self, params: &RouteParams) -> Value {
        let record = self
            .repository
            .as_ref()
            .and_then(|repo| repo.find_matching(params))
            .map(|r| r.to_json())
            .unwrap_or(Value::Null);
        json!({ "params": params.to_json(), "record": record })
    }
}

impl Controller for TemplatePage {
    fn call(
        &self,
        method: &str,
        renderer: &dyn ViewRenderer,
        params: &RouteParams,
    ) -> Result<View, HandlerError> {
        if method != RENDER_METHOD {
            return Err(HandlerError::UnknownMethod(method.to_string()));
        }
        Ok(View::render(
            renderer,
            &self.template,
            &self.template_data(params),
        )?)
    }
}

/// Build routes and their registry from the `[[routes]]` entries.
///
/// Data files are resolved relative to `root` and loaded up front; a data
/// file that fails to parse aborts before any page is generated.
pub fn load_site(root: &Path, config: &SiteConfig) -> Result<Site, SiteError> {
    let mut registry = Registry::new();
    let mut routes = Vec::with_capacity(config.routes.len());

    for (index, entry) in config.routes.iter().enumerate() {
        let controller_id = format!("route:{}", index);

        let repository = entry
            .data
            .as_ref()
            .map(|file| JsonRepository::open(root.join(file)))
            .transpose()
            .map_err(|source| SiteError::Repository {
                path: entry.path.clone(),
                source,
            })?;

        let mut route = Route::new(entry.path.clone()).bind(&controller_id, RENDER_METHOD);

        if let Some(repo) = &repository {
            let provider_id = format!("{}:data", controller_id);
            let mut provider = RepositoryProvider::new(repo.clone());
            if let Some(fields) = &entry.fields {
                provider = provider.with_fields(fields.clone());
            }
            registry.register_provider(&provider_id, provider);
            route = route.provider_named(provider_id);
        }

        registry.register_controller(
            controller_id,
            TemplatePage::new(entry.template.clone(), repository),
        );
        routes.push(route);
    }

    Ok(Site { routes, registry })
}
