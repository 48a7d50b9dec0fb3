use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use npme::config::Config;
use npme::manifest::{DependencyKind, Manifest};
use npme::npm::PackageManager;
use npme::registry::RegistryClient;
use npme::watcher::{WatchConfig, WatchOutcome};
use npme::{actions, tree};

#[derive(Parser)]
#[command(name = "npme")]
#[command(about = "Search npm packages, read their READMEs and manage project dependencies")]
struct Cli {
    /// Project root containing package.json
    #[arg(long, global = true, default_value = ".")]
    dir: PathBuf,

    /// Registry base URL (overrides config and NPME_REGISTRY_URL)
    #[arg(long, global = true)]
    registry: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the registry
    Search {
        /// Free-text query
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Print a package README rendered to HTML
    Readme {
        name: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a full HTML details page for a package
    Show {
        name: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List dependencies declared in package.json
    List,
    /// Install a package and wait for package.json to list it
    Install {
        name: String,

        /// Save as a development dependency
        #[arg(short = 'D', long)]
        dev: bool,
    },
    /// Uninstall a package and wait for package.json to drop it
    Uninstall {
        name: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Initialize tracing on stderr so stdout only carries command output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "npme=warn".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn write_output(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", content),
    }
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Wait for the watcher, or stop watching on Ctrl-C. The package manager
/// keeps running either way. Returns `false` when the change could not be
/// confirmed.
async fn await_outcome(
    name: &str,
    action: &str,
    watch: impl std::future::Future<Output = anyhow::Result<WatchOutcome>>,
) -> anyhow::Result<bool> {
    tokio::select! {
        outcome = watch => match outcome? {
            WatchOutcome::Satisfied { .. } => {
                println!("{} {} successfully", name, action);
                Ok(true)
            }
            WatchOutcome::TimedOut { .. } => {
                eprintln!(
                    "warning: could not confirm that {} was {}. Check the package manager output.",
                    name, action
                );
                Ok(false)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Stopped watching package.json; the package manager may still be running.");
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::load();
    if let Some(registry) = cli.registry {
        config.registry_url = registry;
    }
    tracing::debug!(?config, "Configuration loaded");

    let client = RegistryClient::new(&config.registry_url).with_search_size(config.search_size);
    let pm = PackageManager::new(&config.npm_program);
    let root = cli.dir;

    match cli.command {
        Commands::Search { query } => {
            let packages = actions::search(&client, &root, &query.join(" ")).await?;
            if packages.is_empty() {
                println!("No packages found");
            }
            for package in packages {
                let marker = if package.installed { " [installed]" } else { "" };
                let date = package
                    .date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                println!("{}@{}{}", package.name, package.version, marker);
                println!("  {}", package.description);
                println!("  by {} {}", package.author, date);
            }
        }
        Commands::Readme { name, output } => {
            let html = actions::readme_html(&client, &name).await?;
            write_output(&html, output.as_deref())?;
        }
        Commands::Show { name, output } => {
            let html = actions::details_page(&client, &root, &name).await?;
            write_output(&html, output.as_deref())?;
        }
        Commands::List => {
            let manifest = Manifest::load(&root)?;
            print!("{}", tree::render_dependencies(&manifest));
        }
        Commands::Install { name, dev } => {
            let kind = if dev {
                DependencyKind::Development
            } else {
                DependencyKind::Production
            };
            println!("Installing {}...", name);
            let confirmed = await_outcome(
                &name,
                "installed",
                actions::install(&pm, &root, &name, kind, WatchConfig::default()),
            )
            .await?;
            if !confirmed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Uninstall { name, yes } => {
            if !yes && !confirm(&format!("Uninstall {}?", name))? {
                return Ok(ExitCode::SUCCESS);
            }
            println!("Uninstalling {}...", name);
            let confirmed = await_outcome(
                &name,
                "uninstalled",
                actions::uninstall(&pm, &root, &name, WatchConfig::default()),
            )
            .await?;
            if !confirmed {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
