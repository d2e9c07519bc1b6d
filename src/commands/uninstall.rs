use anyhow::{Result, anyhow};
use log::debug;
use std::sync::Arc;

use crate::Error;
use crate::runtime::Runtime;

use super::config::Config;
use super::services::build_services;

/// Remove a package from the project
#[tracing::instrument(skip(runtime, config))]
pub fn uninstall<R: Runtime + 'static>(
    runtime: Arc<R>,
    id: &str,
    force: bool,
    remove_dependencies: bool,
    config: &Config,
) -> Result<()> {
    let services = build_services(runtime, config)?;

    let package = services
        .manager
        .local_repository()
        .find_latest(id)?
        .ok_or_else(|| anyhow!(Error::PackageNotInstalled(id.to_string())))?;
    debug!(
        "Uninstalling {} (force: {}, remove dependencies: {})",
        package, force, remove_dependencies
    );

    services
        .manager
        .uninstall_package(&package, force, remove_dependencies)?;
    println!("Uninstalled {}", package);
    Ok(())
}
