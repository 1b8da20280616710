//! JSON-backed record repositories.
//!
//! A repository is a JSON file holding an array of objects:
//!
//! ```json
//! [
//!   { "slug": "hello", "title": "Hello", "body": "<p>First post</p>" },
//!   { "slug": "world", "title": "World", "body": "<p>Second post</p>" }
//! ]
//! ```
//!
//! Records are parsed once, at construction. A repository whose file
//! reference was never configured is a startup error; a configured file that
//! does not exist yet loads as an empty repository, so a site can declare a
//! data source before any content exists.

use crate::types::{ParamMap, RouteParams, Scalar};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Repository file not defined")]
    FileNotDefined,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid repository data in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One object from a repository file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// A field as a scalar, if it exists and is one.
    pub fn scalar(&self, name: &str) -> Option<Scalar> {
        self.field(name).and_then(Scalar::from_json)
    }

    /// All scalar fields, suitable as a parameter mapping.
    pub fn scalars(&self) -> ParamMap {
        self.0
            .iter()
            .filter_map(|(k, v)| Scalar::from_json(v).map(|s| (k.clone(), s)))
            .collect()
    }

    /// True when every route parameter equals the stringified field of the
    /// same name.
    pub fn matches(&self, params: &RouteParams) -> bool {
        params.iter().all(|(name, value)| {
            self.scalar(name)
                .is_some_and(|field| field.to_string() == value)
        })
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Records loaded from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonRepository {
    path: PathBuf,
    records: Vec<Record>,
}

impl JsonRepository {
    /// Load the repository backing `file`.
    ///
    /// Fails with [`RepositoryError::FileNotDefined`] when no file is given.
    pub fn new(file: Option<PathBuf>) -> Result<Self, RepositoryError> {
        let path = file.ok_or(RepositoryError::FileNotDefined)?;
        let records = load_records(&path)?;
        Ok(Self { path, records })
    }

    /// Shorthand for [`JsonRepository::new`] with a known path.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        Self::new(Some(path.into()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn all(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record whose `field` equals `value`.
    pub fn find_by(&self, field: &str, value: impl Into<Scalar>) -> Option<&Record> {
        let value = value.into();
        self.records
            .iter()
            .find(|r| r.scalar(field).as_ref() == Some(&value))
    }

    /// First record matching every route parameter.
    pub fn find_matching(&self, params: &RouteParams) -> Option<&Record> {
        self.records.iter().find(|r| r.matches(params))
    }
}

fn load_records(path: &Path) -> Result<Vec<Record>, RepositoryError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&content).map_err(|source| RepositoryError::Json {
        path: path.to_path_buf(),
        source,
    })
}
