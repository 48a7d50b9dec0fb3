//! User-facing operations built from the registry client, the renderer, the
//! manifest and the completion watcher.

use std::path::Path;

use anyhow::{Context, Result};

use crate::manifest::{manifest_path, DependencyKind, Manifest};
use crate::npm::PackageManager;
use crate::page::{self, PackageDetails};
use crate::registry::{PackageSummary, RegistryClient};
use crate::render;
use crate::watcher::{Expectation, ManifestFile, WatchConfig, WatchOutcome, WatchSession};

const NO_README: &str = "No README available for this package.";
const LOAD_FAILED: &str = "Failed to load package information.";

/// Manifest of `root`, or an empty one when it is missing or unreadable.
fn manifest_or_empty(root: &Path) -> Manifest {
    Manifest::load(root).unwrap_or_else(|e| {
        tracing::warn!("Treating project as having no dependencies: {}", e);
        Manifest::default()
    })
}

/// Search the registry and flag hits the project already declares.
pub async fn search(
    client: &RegistryClient,
    root: &Path,
    query: &str,
) -> Result<Vec<PackageSummary>> {
    let mut packages = client
        .search(query)
        .await
        .context("Failed to search packages")?;

    let manifest = manifest_or_empty(root);
    let installed = manifest.installed();
    for package in &mut packages {
        package.installed = installed.contains(package.name.as_str());
    }

    Ok(packages)
}

/// Fetch and render a package README.
pub async fn readme_html(client: &RegistryClient, name: &str) -> Result<String> {
    let metadata = client
        .package(name)
        .await
        .with_context(|| format!("Failed to fetch README for {}", name))?;
    Ok(render::render(metadata.readme().unwrap_or(NO_README)))
}

/// Build the details page for a package. Version and kind come from the
/// manifest when the package is declared there, otherwise from the registry.
///
/// A declared package still gets a page when the registry cannot be reached,
/// with a notice in place of the README. For an undeclared package the fetch
/// error is returned.
pub async fn details_page(client: &RegistryClient, root: &Path, name: &str) -> Result<String> {
    let manifest = manifest_or_empty(root);
    let declared = manifest.version_of(name);

    let metadata = match client.package(name).await {
        Ok(metadata) => metadata,
        Err(e) => match declared {
            Some((version, kind)) => {
                tracing::warn!("Failed to fetch package information for {}: {}", name, e);
                return Ok(page::details_page(&PackageDetails {
                    name: name.to_string(),
                    version: version.to_string(),
                    kind: Some(kind),
                    metadata: None,
                    readme_html: format!("<p>{}</p>", LOAD_FAILED),
                }));
            }
            None => {
                return Err(e)
                    .with_context(|| format!("Failed to fetch package information for {}", name))
            }
        },
    };

    let (version, kind) = match declared {
        Some((version, kind)) => (version.to_string(), Some(kind)),
        None => (metadata.latest_version().unwrap_or("latest").to_string(), None),
    };

    let readme_html = render::render(metadata.readme().unwrap_or(NO_README));
    Ok(page::details_page(&PackageDetails {
        name: name.to_string(),
        version,
        kind,
        metadata: Some(metadata),
        readme_html,
    }))
}

/// Install `name` and wait until the manifest declares it.
pub async fn install(
    pm: &PackageManager,
    root: &Path,
    name: &str,
    kind: DependencyKind,
    watch: WatchConfig,
) -> Result<WatchOutcome> {
    let args = PackageManager::install_args(name, kind)?;
    run_and_watch(pm, root, &args, Expectation::Present(name.to_string()), watch).await
}

/// Uninstall `name` and wait until the manifest no longer mentions it.
pub async fn uninstall(
    pm: &PackageManager,
    root: &Path,
    name: &str,
    watch: WatchConfig,
) -> Result<WatchOutcome> {
    let args = PackageManager::uninstall_args(name)?;
    run_and_watch(pm, root, &args, Expectation::Absent(name.to_string()), watch).await
}

/// The baseline is recorded before the package manager starts so that its
/// own writes count as changes.
async fn run_and_watch(
    pm: &PackageManager,
    root: &Path,
    args: &[String],
    expectation: Expectation,
    watch: WatchConfig,
) -> Result<WatchOutcome> {
    let session = WatchSession::start(ManifestFile::new(manifest_path(root)), expectation, watch);
    let _child = pm.dispatch(root, args)?;
    Ok(session.run().await)
}
