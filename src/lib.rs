//! # sitepress
//!
//! A static site builder that pre-renders parameterized routes into plain
//! HTML files. A route is a path template such as `/posts/{slug}`, a data
//! provider that yields one parameter mapping per page, and a handler that
//! renders each page.
//!
//! # Pipeline
//!
//! ```text
//! site.toml ──▶ routes + registry ──▶ Generator ──▶ public/
//!                                        │
//!          for each route, for each mapping from its provider:
//!            expand template → uri
//!            match uri against the compiled template → params
//!            handler(params) → view body
//!            write public<uri>/index.html
//! ```
//!
//! Alongside the routes every build writes one page per configured HTTP
//! error code (`404.html`, `500.html`) and an `.htaccess` file pointing the
//! web server at them.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`generate`] | The generator: per-page pipeline, failure isolation, error pages, cleanup |
//! | [`template`] | Path template expansion and compiled matching patterns |
//! | [`route`] | Route descriptors with provider and handler references |
//! | [`provider`] | The [`provider::DataProvider`] trait and stock providers |
//! | [`repository`] | JSON record files with typed lookups |
//! | [`registry`] | Named providers and controllers resolved at generation time |
//! | [`view`] | The [`view::ViewRenderer`] trait and the template-directory renderer |
//! | [`site`] | Turns `[[routes]]` from `site.toml` into routes and a registry |
//! | [`config`] | `site.toml` loading, merging, and validation |
//! | [`types`] | Parameter values shared between providers and handlers |
//! | [`output`] | CLI output formatting for build events and summaries |
//!
//! # Design Decisions
//!
//! ## Expand, Then Match Again
//!
//! A page's URI is produced by substituting provider values into the
//! template, and the handler's parameters are then recovered by matching
//! that URI against the template. The handler sees exactly what a request
//! for the URI would carry, never stray keys from the provider.
//!
//! ## One Bad Page Never Stops the Build
//!
//! Each page runs as its own `Result`. A failed match, handler, render, or
//! write is reported with the page's URI and the generator moves on. Only
//! problems that make a whole route meaningless (an unresolvable provider, a
//! missing handler) skip the route, and even then the next route runs.
//!
//! ## Explicit Context
//!
//! The registry and renderer are passed into the [`generate::Generator`] by
//! reference. Nothing is resolved through global state.
//!
//! ## Sequential by Construction
//!
//! Pages are generated one at a time, in route order and provider order. The
//! output directory has a single writer; pages are written to a temporary
//! file and renamed into place.

pub mod config;
pub mod generate;
pub mod output;
pub mod provider;
pub mod registry;
pub mod repository;
pub mod route;
pub mod site;
pub mod template;
pub mod types;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;
