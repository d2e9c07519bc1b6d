use anyhow::{Result, anyhow};
use log::debug;
use std::sync::Arc;

use crate::Error;
use crate::manager::UpdatePackagesAction;
use crate::resolver::UpdatePackageSettings;
use crate::runtime::Runtime;

use super::config::Config;
use super::package_spec::PackageSpec;
use super::services::build_services;

/// Update installed packages to the newest version in the feed
#[tracing::instrument(skip(runtime, config))]
pub fn update<R: Runtime + 'static>(
    runtime: Arc<R>,
    ids: &[String],
    no_dependencies: bool,
    pre: bool,
    config: &Config,
) -> Result<()> {
    let services = build_services(runtime, config)?;
    let local = services.manager.local_repository();

    let settings = UpdatePackageSettings {
        update_dependencies: !no_dependencies,
        allow_prerelease_versions: pre,
    };
    let mut action = UpdatePackagesAction::new(settings);

    for id in ids {
        let installed = local
            .find_latest(id)?
            .ok_or_else(|| anyhow!(Error::PackageNotInstalled(id.clone())))?;

        let spec = PackageSpec {
            id: id.clone(),
            version: None,
        };
        let latest = spec
            .find_in(services.feed.as_ref(), pre)?
            .ok_or_else(|| anyhow!(Error::PackageNotFound(id.clone())))?;

        if latest.version() <= installed.version() {
            println!("{} is up to date", installed);
            continue;
        }
        debug!("Updating {} to {}", installed, latest.version());
        action.add_packages([latest]);
    }

    if !action.has_packages() {
        return Ok(());
    }

    let operations = services
        .manager
        .get_update_package_operations(&action.packages, settings)?;
    action.add_operations(operations);
    services.manager.update_packages(&action)?;

    for package in &action.packages {
        println!("Updated {}", package);
    }
    Ok(())
}
