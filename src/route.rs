//! Route descriptors.
//!
//! A [`Route`] pairs a path template with the data provider that drives its
//! fan-out and the handler that renders each page. Routes are built with
//! consuming builder methods and are immutable once handed to the generator.
//!
//! ```
//! use sitepress::route::Route;
//! use sitepress::view::View;
//!
//! let home = Route::new("/").handler(|_renderer, _params| Ok(View::from_body("<h1>Home</h1>")));
//! let post = Route::new("/posts/{slug}")
//!     .provider_named("route:1:data")
//!     .bind("route:1", "render");
//! assert_eq!(post.path(), "/posts/{slug}");
//! # let _ = home;
//! ```

use crate::provider::{DataProvider, EmptyProvider};
use crate::types::RouteParams;
use crate::view::{RenderError, View, ViewRenderer};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("unknown handler method '{0}'")]
    UnknownMethod(String),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("{0}")]
    Failed(String),
}

/// A handler invoked directly with the renderer and the route parameters.
pub type HandlerFn = dyn Fn(&dyn ViewRenderer, &RouteParams) -> Result<View, HandlerError>;

/// Where a route's data comes from.
pub enum ProviderRef {
    Instance(Box<dyn DataProvider>),
    /// Resolved through the registry at generation time.
    Named(String),
}

/// How a route's handler is reached.
pub enum HandlerRef {
    Direct(Box<HandlerFn>),
    /// A method on a controller resolved through the registry.
    Bound { controller: String, method: String },
}

impl fmt::Debug for ProviderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderRef::Instance(_) => f.write_str("Instance(..)"),
            ProviderRef::Named(id) => f.debug_tuple("Named").field(id).finish(),
        }
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerRef::Direct(_) => f.write_str("Direct(..)"),
            HandlerRef::Bound { controller, method } => f
                .debug_struct("Bound")
                .field("controller", controller)
                .field("method", method)
                .finish(),
        }
    }
}

#[derive(Debug)]
pub struct Route {
    path: String,
    provider: ProviderRef,
    handler: Option<HandlerRef>,
}

impl Route {
    /// A route with the default empty provider and no handler yet.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            provider: ProviderRef::Instance(Box::new(EmptyProvider)),
            handler: None,
        }
    }

    pub fn provider(mut self, provider: impl DataProvider + 'static) -> Self {
        self.provider = ProviderRef::Instance(Box::new(provider));
        self
    }

    /// Use the registry service named `id` as the data provider.
    pub fn provider_named(mut self, id: impl Into<String>) -> Self {
        self.provider = ProviderRef::Named(id.into());
        self
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&dyn ViewRenderer, &RouteParams) -> Result<View, HandlerError> + 'static,
    {
        self.handler = Some(HandlerRef::Direct(Box::new(handler)));
        self
    }

    /// Handle pages with `method` on the registry controller `controller`.
    pub fn bind(mut self, controller: impl Into<String>, method: impl Into<String>) -> Self {
        self.handler = Some(HandlerRef::Bound {
            controller: controller.into(),
            method: method.into(),
        });
        self
    }

    /// The path template (default `/`).
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn provider_ref(&self) -> &ProviderRef {
        &self.provider
    }

    pub fn handler_ref(&self) -> Option<&HandlerRef> {
        self.handler.as_ref()
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::new("/")
    }
}
