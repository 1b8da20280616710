//! CLI output formatting for the build and cleanup commands.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Rewrite rules → .htaccess
//! 404 → 404.html (built-in)
//! 500 → 500.html (template)
//! ✓ Generated /
//! ✓ Generated /posts/hello
//! ✕ Error generating /posts/world: boom
//! ✕ Skipped route /tags/{tag}: data provider 'pages' is a controller, not a data provider
//!
//! Generated 2 pages, 1 failed, 1 route skipped
//! ```
//!
//! ## Cleanup
//!
//! ```text
//! ✓ Cleanup completed: removed 4 files from public
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::generate::{BuildEvent, SiteReport};
use std::path::Path;

const OK: &str = "\u{2713}";
const FAIL: &str = "\u{2715}";
const ARROW: &str = "\u{2192}";

/// `1 page`, `2 pages`.
fn count_label(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

/// Final path component for display, falling back to the whole path.
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Build
// ============================================================================

/// Format a single build event as display lines.
pub fn format_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::PageGenerated { uri, .. } => vec![format!("{} Generated {}", OK, uri)],
        BuildEvent::PageFailed { uri, message } => {
            vec![format!("{} Error generating {}: {}", FAIL, uri, message)]
        }
        BuildEvent::RouteFailed { route, message } => {
            vec![format!("{} Skipped route {}: {}", FAIL, route, message)]
        }
        BuildEvent::ErrorPageWritten { code, custom } => {
            let source = if *custom { "template" } else { "built-in" };
            vec![format!("{} {} {}.html ({})", code, ARROW, code, source)]
        }
        BuildEvent::RewriteFileWritten { path } => {
            vec![format!("Rewrite rules {} {}", ARROW, file_label(path))]
        }
    }
}

/// Print a build event to stdout.
pub fn print_event(event: &BuildEvent) {
    for line in format_event(event) {
        println!("{}", line);
    }
}

/// Format the closing summary of a build.
pub fn format_build_summary(report: &SiteReport) -> Vec<String> {
    let mut summary = format!(
        "Generated {}, {} failed",
        count_label(report.generated.len(), "page"),
        report.failed.len()
    );
    if !report.failed_routes.is_empty() {
        summary.push_str(&format!(
            ", {} skipped",
            count_label(report.failed_routes.len(), "route")
        ));
    }
    vec![String::new(), summary]
}

/// Print the build summary to stdout.
pub fn print_build_summary(report: &SiteReport) {
    for line in format_build_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Cleanup
// ============================================================================

/// Format the result of `cleanup`.
pub fn format_cleanup_output(removed: usize, public_dir: &Path) -> String {
    if removed == 0 && !public_dir.exists() {
        format!(
            "{} Cleanup completed: nothing to remove at {}",
            OK,
            public_dir.display()
        )
    } else {
        format!(
            "{} Cleanup completed: removed {} from {}",
            OK,
            count_label(removed, "file"),
            public_dir.display()
        )
    }
}

/// Print the result of `cleanup` to stdout.
pub fn print_cleanup_output(removed: usize, public_dir: &Path) {
    println!("{}", format_cleanup_output(removed, public_dir));
}

// ============================================================================
// Tests
// ============================================================================
