//! Data providers drive page fan-out.
//!
//! Each route owns one provider. The generator renders one page per
//! [`ParamMap`] the provider yields, substituting the mapping into the
//! route's path template. A static route uses [`EmptyProvider`], which yields
//! a single empty mapping so the page still runs through the full pipeline
//! exactly once.

use crate::repository::JsonRepository;
use crate::types::ParamMap;

/// Produces the parameter mappings for one route.
///
/// The sequence must be finite. It is consumed once per build, so providers
/// do not need to be restartable.
pub trait DataProvider {
    fn provide(&self) -> Box<dyn Iterator<Item = ParamMap> + '_>;
}

/// Yields exactly one empty mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyProvider;

impl DataProvider for EmptyProvider {
    fn provide(&self) -> Box<dyn Iterator<Item = ParamMap> + '_> {
        Box::new(std::iter::once(ParamMap::new()))
    }
}

/// Yields a fixed list of mappings, in order.
#[derive(Debug, Clone, Default)]
pub struct ListProvider {
    items: Vec<ParamMap>,
}

impl ListProvider {
    pub fn new(items: Vec<ParamMap>) -> Self {
        Self { items }
    }
}

impl DataProvider for ListProvider {
    fn provide(&self) -> Box<dyn Iterator<Item = ParamMap> + '_> {
        Box::new(self.items.iter().cloned())
    }
}

/// Yields one mapping per repository record, built from its scalar fields.
#[derive(Debug, Clone)]
pub struct RepositoryProvider {
    repository: JsonRepository,
    fields: Option<Vec<String>>,
}

impl RepositoryProvider {
    pub fn new(repository: JsonRepository) -> Self {
        Self {
            repository,
            fields: None,
        }
    }

    /// Only expose the named fields in each mapping.
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn repository(&self) -> &JsonRepository {
        &self.repository
    }
}

impl DataProvider for RepositoryProvider {
    fn provide(&self) -> Box<dyn Iterator<Item = ParamMap> + '_> {
        Box::new(self.repository.all().iter().map(move |record| {
            let mut mapping = record.scalars();
            if let Some(fields) = &self.fields {
                mapping.retain(|key, _| fields.contains(key));
            }
            mapping
        }))
    }
}
