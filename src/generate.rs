//! Page generation.
//!
//! Turns an ordered list of [`Route`]s into files under the public
//! directory. For every route the generator asks its data provider for
//! parameter mappings and renders one page per mapping:
//!
//! ```text
//! mapping ──expand──▶ uri ──match──▶ params ──handler──▶ body ──write──▶ public<uri>/index.html
//! ```
//!
//! ## Failure isolation
//!
//! Pages are independent. Anything that goes wrong while matching, handling,
//! or writing a single page becomes a [`PageError`], is reported as
//! [`BuildEvent::PageFailed`], and the generator moves on to the next
//! mapping. Route-level problems (a provider reference that resolves to
//! something that is not a provider, a route without a handler) are detected
//! before the route's first page, reported as [`BuildEvent::RouteFailed`],
//! and the next route proceeds.
//!
//! ## Output Structure
//!
//! ```text
//! public/
//! ├── .htaccess              # ErrorDocument lines for every error page
//! ├── 404.html               # Error pages (custom template or built-in)
//! ├── 500.html
//! ├── index.html             # Route "/"
//! └── posts/
//!     ├── hello/index.html   # Route "/posts/{slug}", slug = hello
//!     └── world/index.html
//! ```
//!
//! Pages are written to a temporary sibling file and renamed into place, so
//! a failed write never leaves a truncated page behind.

use crate::config::ErrorPage;
use crate::provider::DataProvider;
use crate::registry::{Registry, RegistryError, Service};
use crate::route::{HandlerError, HandlerRef, ProviderRef, Route};
use crate::template::{PatternCache, TemplateError, expand};
use crate::types::RouteParams;
use crate::view::{RenderError, View, ViewRenderer};
use maud::{DOCTYPE, Markup, html};
use serde_json::json;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

/// Name of the rewrite hint file written into the public directory.
pub const REWRITE_FILE: &str = ".htaccess";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("data provider '{id}' is a {kind}, not a data provider")]
    InvalidDataProvider { id: String, kind: &'static str },
    #[error("route has no handler")]
    MissingHandler,
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Why a single page could not be generated.
#[derive(Error, Debug)]
pub enum PageError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("URI {0} does not match its route path")]
    NoMatch(String),
    #[error("URI {0} escapes the public directory")]
    UnsafePath(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Handler(#[from] HandlerError),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Progress events emitted while building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    PageGenerated { uri: String, path: PathBuf },
    PageFailed { uri: String, message: String },
    RouteFailed { route: String, message: String },
    ErrorPageWritten { code: u16, custom: bool },
    RewriteFileWritten { path: PathBuf },
}

/// A page that was written successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPage {
    pub uri: String,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPage {
    pub uri: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedRoute {
    pub route: String,
    pub message: String,
}

/// Outcome of generating every route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteReport {
    pub generated: Vec<GeneratedPage>,
    pub failed: Vec<FailedPage>,
    pub failed_routes: Vec<FailedRoute>,
}

impl SiteReport {
    /// True when no page or route failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.failed_routes.is_empty()
    }
}

/// Generates pages for a set of routes into one public directory.
///
/// Holds everything generation needs (output location, service registry,
/// renderer) explicitly; nothing is looked up globally.
pub struct Generator<'a> {
    public_dir: PathBuf,
    registry: &'a Registry,
    renderer: &'a dyn ViewRenderer,
    events: Option<Sender<BuildEvent>>,
}

impl<'a> Generator<'a> {
    pub fn new(
        public_dir: impl Into<PathBuf>,
        registry: &'a Registry,
        renderer: &'a dyn ViewRenderer,
    ) -> Self {
        Self {
            public_dir: public_dir.into(),
            registry,
            renderer,
            events: None,
        }
    }

    /// Send progress events to `events`.
    pub fn with_events(mut self, events: Sender<BuildEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    fn emit(&self, event: BuildEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is listening.
            let _ = tx.send(event);
        }
    }

    /// Run the full build: public directory, rewrite file, error pages, then
    /// every route.
    ///
    /// Errors returned here are fatal (I/O on the public directory, error
    /// page rendering). Page and route failures are collected in the report.
    pub fn build(
        &self,
        error_pages: &[ErrorPage],
        routes: &[Route],
    ) -> Result<SiteReport, GenerateError> {
        fs::create_dir_all(&self.public_dir)?;
        self.write_rewrite_file(error_pages)?;
        self.generate_error_pages(error_pages)?;
        Ok(self.generate_site(routes))
    }

    /// Write `.htaccess` mapping each error code to its generated page.
    pub fn write_rewrite_file(&self, error_pages: &[ErrorPage]) -> Result<(), GenerateError> {
        let path = self.public_dir.join(REWRITE_FILE);
        write_atomic(&path, &rewrite_rules(error_pages))?;
        self.emit(BuildEvent::RewriteFileWritten { path });
        Ok(())
    }

    /// Write `<code>.html` for every error page.
    ///
    /// A template named after the code (e.g. `404`) is rendered when the
    /// renderer has one; otherwise the built-in page is used.
    pub fn generate_error_pages(&self, error_pages: &[ErrorPage]) -> Result<(), GenerateError> {
        for page in error_pages {
            let name = page.template_name();
            let custom = self.renderer.template_path(&name).exists();
            let body = if custom {
                self.renderer.render(
                    &name,
                    &json!({ "code": page.code, "message": page.message }),
                )?
            } else {
                fallback_error_page(page.code, &page.message).into_string()
            };

            write_atomic(&self.public_dir.join(page.file_name()), &body)?;
            self.emit(BuildEvent::ErrorPageWritten {
                code: page.code,
                custom,
            });
        }
        Ok(())
    }

    /// Generate every route in order, isolating route and page failures.
    pub fn generate_site(&self, routes: &[Route]) -> SiteReport {
        let mut report = SiteReport::default();
        let mut cache = PatternCache::new();

        for route in routes {
            if let Err(e) = self.generate_route(route, &mut cache, &mut report) {
                self.emit(BuildEvent::RouteFailed {
                    route: route.path().to_string(),
                    message: e.to_string(),
                });
                report.failed_routes.push(FailedRoute {
                    route: route.path().to_string(),
                    message: e.to_string(),
                });
            }
        }
        report
    }

    /// Generate one page per mapping yielded by the route's provider.
    ///
    /// Fails before any page is attempted when the provider cannot be
    /// resolved or the route has no handler.
    pub fn generate_route(
        &self,
        route: &Route,
        cache: &mut PatternCache,
        report: &mut SiteReport,
    ) -> Result<(), GenerateError> {
        let provider = self.resolve_provider(route.provider_ref())?;
        let handler = route.handler_ref().ok_or(GenerateError::MissingHandler)?;

        for mapping in provider.provide() {
            let uri = expand(route.path(), &mapping);
            match self.generate_page(route.path(), handler, &uri, cache) {
                Ok(page) => {
                    self.emit(BuildEvent::PageGenerated {
                        uri: page.uri.clone(),
                        path: page.output_path.clone(),
                    });
                    report.generated.push(page);
                }
                Err(e) => {
                    self.emit(BuildEvent::PageFailed {
                        uri: uri.clone(),
                        message: e.to_string(),
                    });
                    report.failed.push(FailedPage {
                        uri,
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Match, render, and write a single already-expanded URI.
    pub fn generate_page(
        &self,
        template: &str,
        handler: &HandlerRef,
        uri: &str,
        cache: &mut PatternCache,
    ) -> Result<GeneratedPage, PageError> {
        let output_path = self.output_path(uri)?;

        let params = cache
            .get_or_compile(template)?
            .captures(uri)
            .ok_or_else(|| PageError::NoMatch(uri.to_string()))?;

        let view = self.invoke(handler, &params)?;

        write_atomic(&output_path, view.body()).map_err(|source| PageError::Write {
            path: output_path.clone(),
            source,
        })?;

        Ok(GeneratedPage {
            uri: uri.to_string(),
            output_path,
        })
    }

    /// `public/index.html` for `/`, otherwise `public<uri>/index.html`.
    ///
    /// `.` and `..` segments are rejected as written; `Path::components`
    /// would silently drop an interior `.`.
    pub fn output_path(&self, uri: &str) -> Result<PathBuf, PageError> {
        let trimmed = uri.trim_matches('/');
        let relative = Path::new(trimmed);
        if trimmed.split('/').any(|segment| segment == "." || segment == "..")
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(PageError::UnsafePath(uri.to_string()));
        }
        Ok(self.public_dir.join(relative).join("index.html"))
    }

    fn resolve_provider<'r>(
        &'r self,
        provider: &'r ProviderRef,
    ) -> Result<&'r dyn DataProvider, GenerateError> {
        match provider {
            ProviderRef::Instance(p) => Ok(p.as_ref()),
            ProviderRef::Named(id) => match self.registry.get(id)? {
                Service::Provider(p) => Ok(p.as_ref()),
                other => Err(GenerateError::InvalidDataProvider {
                    id: id.clone(),
                    kind: other.kind(),
                }),
            },
        }
    }

    fn invoke(&self, handler: &HandlerRef, params: &RouteParams) -> Result<View, PageError> {
        let view = match handler {
            HandlerRef::Direct(f) => f(self.renderer, params)?,
            HandlerRef::Bound { controller, method } => self
                .registry
                .controller(controller)?
                .call(method, self.renderer, params)?,
        };
        Ok(view)
    }
}

/// `.htaccess` body: one `ErrorDocument` line per error page.
pub fn rewrite_rules(error_pages: &[ErrorPage]) -> String {
    error_pages
        .iter()
        .map(|p| format!("ErrorDocument {} /{}\n", p.code, p.file_name()))
        .collect()
}

/// Built-in error page used when no custom template exists.
pub fn fallback_error_page(code: u16, message: &str) -> Markup {
    let heading = format!("{} {}", code, message);
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta http-equiv="X-UA-Compatible" content="IE=edge";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (heading) }
            }
            body {
                h1 { (heading) }
            }
        }
    }
}

/// Delete the public directory recursively.
///
/// Returns the number of files removed. A missing directory is not an error.
pub fn cleanup(public_dir: &Path) -> Result<usize, GenerateError> {
    if !public_dir.exists() {
        return Ok(0);
    }
    let removed = WalkDir::new(public_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .count();
    fs::remove_dir_all(public_dir)?;
    Ok(removed)
}

/// Replace `path` with `contents`, creating parent directories as needed.
///
/// Writes a hidden sibling file first and renames it into place.
fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = parent.join(format!(".{}.tmp", file_name));

    fs::write(&tmp, contents)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ListProvider;
    use crate::registry::Controller;
    use crate::test_helpers::*;
    use crate::types::params;
    use crate::view::TemplateDirRenderer;
    use std::sync::mpsc;

    fn posts_route() -> Route {
        Route::new("/posts/{slug}")
            .provider(ListProvider::new(vec![
                params([("slug", "hello")]),
                params([("slug", "world")]),
            ]))
            .handler(|_, p| match p.get("slug") {
                Some("world") => Err(HandlerError::Failed("boom".to_string())),
                Some(slug) => Ok(View::from_body(format!("<h1>{slug}</h1>"))),
                None => Err(HandlerError::Failed("no slug".to_string())),
            })
    }

    fn static_route(path: &str, body: &'static str) -> Route {
        Route::new(path).handler(move |_, _| Ok(View::from_body(body)))
    }

    // =========================================================================
    // Site generation
    // =========================================================================

    #[test]
    fn root_route_writes_single_index() {
        let tmp = test_project();
        let registry = Registry::new();
        let renderer = MockRenderer::new();
        let generator = Generator::new(tmp.path().join("public"), &registry, &renderer);

        let report = generator.generate_site(&[static_route("/", "home")]);

        assert!(report.is_success());
        assert_eq!(list_files(&tmp.path().join("public")), vec!["index.html"]);
        assert_eq!(read_file(&tmp.path().join("public/index.html")), "home");
    }

    #[test]
    fn failing_page_does_not_stop_siblings() {
        let tmp = test_project();
        let registry = Registry::new();
        let renderer = MockRenderer::new();
        let public = tmp.path().join("public");
        let generator = Generator::new(&public, &registry, &renderer);

        let report = generator.generate_site(&[posts_route(), static_route("/about", "about")]);

        assert_eq!(
            list_files(&public),
            vec!["about/index.html", "posts/hello/index.html"]
        );
        assert_eq!(read_file(&public.join("posts/hello/index.html")), "<h1>hello</h1>");
        assert_eq!(
            report.failed,
            vec![FailedPage {
                uri: "/posts/world".to_string(),
                message: "boom".to_string(),
            }]
        );
        assert_eq!(report.generated.len(), 2);
        assert!(!report.is_success());
    }

    #[test]
    fn handler_receives_matched_params_not_raw_mapping() {
        let tmp = test_project();
        let registry = Registry::new();
        let renderer = MockRenderer::new();
        let generator = Generator::new(tmp.path().join("public"), &registry, &renderer);

        let route = Route::new("/blog/{year}/{slug}")
            .provider(ListProvider::new(vec![params([
                ("slug", "hi"),
                ("year", "2024"),
                ("title", "Extra"),
            ])]))
            .handler(|_, p| {
                let pairs: Vec<String> = p.iter().map(|(k, v)| format!("{k}={v}")).collect();
                Ok(View::from_body(pairs.join("&")))
            });

        let report = generator.generate_site(&[route]);
        assert!(report.is_success());
        assert_eq!(
            read_file(&tmp.path().join("public/blog/2024/hi/index.html")),
            "year=2024&slug=hi"
        );
    }

    #[test]
    fn value_with_slash_fails_to_match() {
        let tmp = test_project();
        let registry = Registry::new();
        let renderer = MockRenderer::new();
        let generator = Generator::new(tmp.path().join("public"), &registry, &renderer);

        let route = Route::new("/posts/{slug}")
            .provider(ListProvider::new(vec![params([("slug", "a/b")])]))
            .handler(|_, _| Ok(View::from_body("x")));

        let report = generator.generate_site(&[route]);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].message.contains("does not match"));
        assert!(list_files(&tmp.path().join("public")).is_empty());
    }

    #[test]
    fn parent_segments_are_rejected() {
        let tmp = test_project();
        let registry = Registry::new();
        let renderer = MockRenderer::new();
        let generator = Generator::new(tmp.path().join("public"), &registry, &renderer);

        let route = Route::new("/{slug}")
            .provider(ListProvider::new(vec![params([("slug", "..")])]))
            .handler(|_, _| Ok(View::from_body("x")));

        let report = generator.generate_site(&[route]);
        assert_eq!(report.failed.len(), 1);
        assert!(!tmp.path().join("index.html").exists());
    }

    #[test]
    fn empty_provider_generates_nothing() {
        let tmp = test_project();
        let registry = Registry::new();
        let renderer = MockRenderer::new();
        let generator = Generator::new(tmp.path().join("public"), &registry, &renderer);

        let route = Route::new("/posts/{slug}")
            .provider(ListProvider::default())
            .handler(|_, _| Ok(View::from_body("x")));

        let report = generator.generate_site(&[route]);
        assert!(report.is_success());
        assert!(report.generated.is_empty());
    }

    #[test]
    fn rewrite_overwrites_existing_page() {
        let tmp = test_project();
        let public = tmp.path().join("public");
        fs::create_dir_all(&public).unwrap();
        fs::write(public.join("index.html"), "old content that is longer").unwrap();

        let registry = Registry::new();
        let renderer = MockRenderer::new();
        let generator = Generator::new(&public, &registry, &renderer);
        generator.generate_site(&[static_route("/", "new")]);

        assert_eq!(read_file(&public.join("index.html")), "new");
        assert_eq!(list_files(&public), vec!["index.html"]);
    }

    #[test]
    fn handler_renders_through_renderer() {
        let tmp = test_project();
        let registry = Registry::new();
        let renderer = MockRenderer::new().with_template("post", "<h1>{{ slug }}</h1>");
        let generator = Generator::new(tmp.path().join("public"), &registry, &renderer);

        let route = Route::new("/posts/{slug}")
            .provider(ListProvider::new(vec![params([("slug", "hello")])]))
            .handler(|r, p| View::render(r, "post", &p.to_json()).map_err(Into::into));

        generator.generate_site(&[route]);
        assert_eq!(
            read_file(&tmp.path().join("public/posts/hello/index.html")),
            "<h1>hello</h1>"
        );
        assert_eq!(renderer.rendered(), vec!["post".to_string()]);
    }

    #[test]
    fn render_failure_is_page_failure() {
        let tmp = test_project();
        let registry = Registry::new();
        let renderer = MockRenderer::new();
        let generator = Generator::new(tmp.path().join("public"), &registry, &renderer);

        let route =
            Route::new("/").handler(|r, _| View::render(r, "missing", &json!({})).map_err(Into::into));

        let report = generator.generate_site(&[route]);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].message.contains("template not found"));
    }

    #[test]
    fn write_failure_is_page_failure() {
        let tmp = test_project();
        let public = tmp.path().join("public");
        // A file where the page directory should go blocks directory creation.
        fs::create_dir_all(&public).unwrap();
        fs::write(public.join("about"), "not a directory").unwrap();

        let registry = Registry::new();
        let renderer = MockRenderer::new();
        let generator = Generator::new(&public, &registry, &renderer);

        let report = generator.generate_site(&[static_route("/about", "about")]);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].message.starts_with("failed to write"));
    }

    // =========================================================================
    // Registry resolution
    // =========================================================================

    struct Pages;

    impl Controller for Pages {
        fn call(
            &self,
            method: &str,
            _renderer: &dyn ViewRenderer,
            params: &RouteParams,
        ) -> Result<View, HandlerError> {
            match method {
                "show" => Ok(View::from_body(format!(
                    "show {}",
                    params.values().collect::<Vec<_>>().join("/")
                ))),
                _ => Err(HandlerError::UnknownMethod(method.to_string())),
            }
        }
    }

    #[test]
    fn named_provider_and_bound_handler_resolve() {
        let tmp = test_project();
        let mut registry = Registry::new();
        registry
            .register_provider(
                "tags",
                ListProvider::new(vec![params([("tag", "rust")]), params([("tag", "web")])]),
            )
            .register_controller("pages", Pages);
        let renderer = MockRenderer::new();
        let public = tmp.path().join("public");
        let generator = Generator::new(&public, &registry, &renderer);

        let route = Route::new("/tags/{tag}")
            .provider_named("tags")
            .bind("pages", "show");
        let report = generator.generate_site(&[route]);

        assert!(report.is_success());
        assert_eq!(read_file(&public.join("tags/rust/index.html")), "show rust");
        assert_eq!(read_file(&public.join("tags/web/index.html")), "show web");
    }

    #[test]
    fn named_provider_that_is_not_a_provider_fails_route() {
        let tmp = test_project();
        let mut registry = Registry::new();
        registry.register_controller("pages", Pages);
        let renderer = MockRenderer::new();
        let public = tmp.path().join("public");
        let generator = Generator::new(&public, &registry, &renderer);

        let routes = [
            Route::new("/tags/{tag}")
                .provider_named("pages")
                .bind("pages", "show"),
            static_route("/", "home"),
        ];
        let report = generator.generate_site(&routes);

        assert_eq!(report.failed_routes.len(), 1);
        assert_eq!(report.failed_routes[0].route, "/tags/{tag}");
        assert!(report.failed_routes[0].message.contains("not a data provider"));
        // The next route still runs
        assert_eq!(list_files(&public), vec!["index.html"]);
    }

    #[test]
    fn unknown_provider_id_fails_route() {
        let tmp = test_project();
        let registry = Registry::new();
        let renderer = MockRenderer::new();
        let generator = Generator::new(tmp.path().join("public"), &registry, &renderer);

        let route = Route::new("/").provider_named("nope").bind("pages", "show");
        let report = generator.generate_site(&[route]);
        assert_eq!(report.failed_routes.len(), 1);
        assert!(report.failed_routes[0].message.contains("'nope'"));
    }

    #[test]
    fn route_without_handler_fails_route() {
        let tmp = test_project();
        let registry = Registry::new();
        let renderer = MockRenderer::new();
        let generator = Generator::new(tmp.path().join("public"), &registry, &renderer);

        let report = generator.generate_site(&[Route::new("/")]);
        assert_eq!(report.failed_routes.len(), 1);
        assert!(report.generated.is_empty());
    }

    #[test]
    fn unknown_controller_or_method_fails_page() {
        let tmp = test_project();
        let mut registry = Registry::new();
        registry.register_controller("pages", Pages);
        let renderer = MockRenderer::new();
        let generator = Generator::new(tmp.path().join("public"), &registry, &renderer);

        let report = generator.generate_site(&[
            Route::new("/a").bind("missing", "show"),
            Route::new("/b").bind("pages", "nope"),
        ]);
        assert!(report.failed_routes.is_empty());
        assert_eq!(report.failed.len(), 2);
        assert!(report.failed[1].message.contains("unknown handler method 'nope'"));
    }

    #[test]
    fn duplicate_placeholder_fails_each_page() {
        let tmp = test_project();
        let registry = Registry::new();
        let renderer = MockRenderer::new();
        let generator = Generator::new(tmp.path().join("public"), &registry, &renderer);

        let route = Route::new("/{tag}/{tag}")
            .provider(ListProvider::new(vec![params([("tag", "a")])]))
            .handler(|_, _| Ok(View::from_body("x")));
        let report = generator.generate_site(&[route]);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].message.contains("more than once"));
    }

    // =========================================================================
    // Events
    // =========================================================================

    #[test]
    fn events_follow_generation_order() {
        let tmp = test_project();
        let registry = Registry::new();
        let renderer = MockRenderer::new();
        let public = tmp.path().join("public");
        let (tx, rx) = mpsc::channel();
        let generator = Generator::new(&public, &registry, &renderer).with_events(tx);

        generator.generate_site(&[posts_route()]);
        let events: Vec<BuildEvent> = rx.try_iter().collect();

        assert_eq!(
            events,
            vec![
                BuildEvent::PageGenerated {
                    uri: "/posts/hello".to_string(),
                    path: public.join("posts/hello/index.html"),
                },
                BuildEvent::PageFailed {
                    uri: "/posts/world".to_string(),
                    message: "boom".to_string(),
                },
            ]
        );
    }

    // =========================================================================
    // Output paths
    // =========================================================================

    #[test]
    fn output_path_for_root_and_nested() {
        let registry = Registry::new();
        let renderer = MockRenderer::new();
        let generator = Generator::new("/site/public", &registry, &renderer);

        assert_eq!(
            generator.output_path("/").unwrap(),
            PathBuf::from("/site/public/index.html")
        );
        assert_eq!(
            generator.output_path("/posts/hello").unwrap(),
            PathBuf::from("/site/public/posts/hello/index.html")
        );
        assert!(generator.output_path("/a/../b").is_err());
    }

    #[test]
    fn output_path_rejects_dot_segments() {
        let registry = Registry::new();
        let renderer = MockRenderer::new();
        let generator = Generator::new("/site/public", &registry, &renderer);

        for uri in ["/a/./b", "/./", "/a/.", "/a/..", "/.."] {
            assert!(
                matches!(generator.output_path(uri), Err(PageError::UnsafePath(u)) if u == uri),
                "{uri} should be rejected"
            );
        }
        assert!(generator.output_path("/a/.well-known").is_ok());
    }

    #[test]
    fn dot_segment_page_fails_without_writing() {
        let tmp = test_project();
        let registry = Registry::new();
        let renderer = MockRenderer::new();
        let public = tmp.path().join("public");
        let generator = Generator::new(&public, &registry, &renderer);

        let route = Route::new("/a/{dir}/b")
            .provider(ListProvider::new(vec![params([("dir", ".")])]))
            .handler(|_, _| Ok(View::from_body("x")));

        let report = generator.generate_site(&[route]);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].message.contains("escapes the public directory"));
        assert!(list_files(&public).is_empty());
    }

    // =========================================================================
    // Error pages and rewrite file
    // =========================================================================

    fn default_error_pages() -> Vec<ErrorPage> {
        crate::config::SiteConfig::default().error_pages
    }

    #[test]
    fn fallback_error_page_contains_code_and_message() {
        let tmp = test_project();
        let registry = Registry::new();
        let renderer = TemplateDirRenderer::new(tmp.path().join("templates"), "html");
        let public = tmp.path().join("public");
        let generator = Generator::new(&public, &registry, &renderer);

        generator.generate_error_pages(&default_error_pages()).unwrap();

        let html = read_file(&public.join("404.html"));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>404 Not Found</title>"));
        assert!(html.contains("<h1>404 Not Found</h1>"));
        assert!(read_file(&public.join("500.html")).contains("500 Internal Server Error"));
    }

    #[test]
    fn custom_error_template_is_used_verbatim() {
        let tmp = test_project();
        let templates = tmp.path().join("templates");
        fs::create_dir_all(&templates).unwrap();
        fs::write(templates.join("404.html"), "<p>Lost? {{ message }}</p>").unwrap();

        let registry = Registry::new();
        let renderer = TemplateDirRenderer::new(&templates, "html");
        let public = tmp.path().join("public");
        let (tx, rx) = mpsc::channel();
        let generator = Generator::new(&public, &registry, &renderer).with_events(tx);

        generator.generate_error_pages(&default_error_pages()).unwrap();

        assert_eq!(read_file(&public.join("404.html")), "<p>Lost? Not Found</p>");
        assert!(read_file(&public.join("500.html")).contains("<h1>500 Internal Server Error</h1>"));
        let events: Vec<BuildEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                BuildEvent::ErrorPageWritten { code: 404, custom: true },
                BuildEvent::ErrorPageWritten { code: 500, custom: false },
            ]
        );
    }

    #[test]
    fn rewrite_rules_list_every_error_page() {
        assert_eq!(
            rewrite_rules(&default_error_pages()),
            "ErrorDocument 404 /404.html\nErrorDocument 500 /500.html\n"
        );
        assert_eq!(rewrite_rules(&[]), "");
    }

    #[test]
    fn build_writes_rewrite_file_error_pages_and_routes() {
        let tmp = test_project();
        let registry = Registry::new();
        let renderer = MockRenderer::new();
        let public = tmp.path().join("public");
        let generator = Generator::new(&public, &registry, &renderer);

        let report = generator
            .build(&default_error_pages(), &[static_route("/", "home")])
            .unwrap();

        assert!(report.is_success());
        assert_eq!(
            list_files(&public),
            vec![".htaccess", "404.html", "500.html", "index.html"]
        );
    }

    // =========================================================================
    // Cleanup
    // =========================================================================

    #[test]
    fn cleanup_removes_public_dir() {
        let tmp = test_project();
        let public = tmp.path().join("public");
        fs::create_dir_all(public.join("posts/a")).unwrap();
        fs::write(public.join("index.html"), "x").unwrap();
        fs::write(public.join("posts/a/index.html"), "x").unwrap();

        assert_eq!(cleanup(&public).unwrap(), 2);
        assert!(!public.exists());
    }

    #[test]
    fn cleanup_missing_dir_is_noop() {
        let tmp = test_project();
        assert_eq!(cleanup(&tmp.path().join("public")).unwrap(), 0);
    }
}
