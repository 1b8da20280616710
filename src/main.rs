use clap::{CommandFactory, Parser, Subcommand};
use sitepress::generate::{self, Generator};
use sitepress::view::TemplateDirRenderer;
use sitepress::{config, output, site};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sitepress")]
#[command(about = "Pre-render parameterized routes into a static site")]
#[command(long_about = "\
Pre-render parameterized routes into a static site

Routes are declared in site.toml. Each route has a path template, a template
to render, and optionally a JSON data file that yields one page per record.

Project structure:

  site.toml                        # Routes, error pages, directories
  templates/
  ├── home.html                    # {{ params.x }} / {{ record.title }} tags
  ├── post.html
  └── 404.html                     # Optional: replaces the built-in 404 page
  data/
  └── posts.json                   # [{\"slug\": \"hello\", \"title\": \"Hello\"}, ...]
  public/                          # Generated output (deleted by cleanup)
  ├── .htaccess
  ├── 404.html
  ├── index.html
  └── posts/hello/index.html

Run 'sitepress gen-config' to print a documented site.toml.")]
#[command(version)]
struct Cli {
    /// Project directory containing the config, templates and data
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file, relative to the project directory
    #[arg(long, default_value = "site.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate error pages, the rewrite file and every route
    Build,
    /// Delete the public directory
    Cleanup,
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            Cli::command().print_help()?;
            println!();
        }
        Some(Command::Build) => {
            let config = config::load_config(&cli.root.join(&cli.config))?;
            let site = site::load_site(&cli.root, &config)?;
            let renderer = TemplateDirRenderer::new(
                cli.root.join(&config.templates_dir),
                config.template_extension.clone(),
            );
            let public_dir = cli.root.join(&config.public_dir);

            println!("==> Building {} routes \u{2192} {}", site.routes.len(), public_dir.display());
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_event(&event);
                }
            });
            let generator = Generator::new(&public_dir, &site.registry, &renderer).with_events(tx);
            let result = generator.build(&config.error_pages, &site.routes);
            // Dropping the generator closes the channel so the printer can finish.
            drop(generator);
            printer.join().map_err(|_| "output thread panicked")?;

            let report = result?;
            output::print_build_summary(&report);
            if !report.is_success() {
                return Err(format!(
                    "build finished with {} failed pages and {} skipped routes",
                    report.failed.len(),
                    report.failed_routes.len()
                )
                .into());
            }
        }
        Some(Command::Cleanup) => {
            let config = config::load_config(&cli.root.join(&cli.config))?;
            let public_dir = cli.root.join(&config.public_dir);
            let removed = generate::cleanup(&public_dir)?;
            output::print_cleanup_output(removed, &public_dir);
        }
        Some(Command::GenConfig) => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
