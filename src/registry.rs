//! Named services looked up during generation.
//!
//! Routes may refer to their data provider or their controller by identifier
//! instead of holding the object directly. The registry is the single place
//! those identifiers resolve. It is built before generation starts and handed
//! to the generator by reference; nothing looks it up ambiently.

use crate::provider::DataProvider;
use crate::route::HandlerError;
use crate::types::RouteParams;
use crate::view::{View, ViewRenderer};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("no service registered as '{0}'")]
    NotFound(String),
    #[error("service '{id}' is a {kind}, not a controller")]
    NotAController { id: String, kind: &'static str },
}

/// An object with named handler methods, bound by `(controller, method)`.
pub trait Controller {
    /// Invoke `method` with the route parameters.
    ///
    /// Unknown methods should fail with [`HandlerError::UnknownMethod`].
    fn call(
        &self,
        method: &str,
        renderer: &dyn ViewRenderer,
        params: &RouteParams,
    ) -> Result<View, HandlerError>;
}

/// A registered service.
pub enum Service {
    Provider(Box<dyn DataProvider>),
    Controller(Box<dyn Controller>),
}

impl Service {
    pub fn kind(&self) -> &'static str {
        match self {
            Service::Provider(_) => "data provider",
            Service::Controller(_) => "controller",
        }
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service({})", self.kind())
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    services: HashMap<String, Service>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a data provider. Replaces any service with the same id.
    pub fn register_provider(
        &mut self,
        id: impl Into<String>,
        provider: impl DataProvider + 'static,
    ) -> &mut Self {
        self.services
            .insert(id.into(), Service::Provider(Box::new(provider)));
        self
    }

    /// Register a controller. Replaces any service with the same id.
    pub fn register_controller(
        &mut self,
        id: impl Into<String>,
        controller: impl Controller + 'static,
    ) -> &mut Self {
        self.services
            .insert(id.into(), Service::Controller(Box::new(controller)));
        self
    }

    pub fn get(&self, id: &str) -> Result<&Service, RegistryError> {
        self.services
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    pub fn controller(&self, id: &str) -> Result<&dyn Controller, RegistryError> {
        match self.get(id)? {
            Service::Controller(c) => Ok(c.as_ref()),
            other => Err(RegistryError::NotAController {
                id: id.to_string(),
                kind: other.kind(),
            }),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.services.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
