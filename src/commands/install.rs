use anyhow::{Result, anyhow};
use log::debug;
use std::sync::Arc;

use crate::Error;
use crate::runtime::Runtime;

use super::config::Config;
use super::package_spec::PackageSpec;
use super::services::build_services;

#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    pub ignore_dependencies: bool,
    /// Allow prerelease versions for the package and its dependencies
    pub pre: bool,
    /// Print the plan without applying it
    pub dry_run: bool,
}

/// Install a package from the feed into the project
#[tracing::instrument(skip(runtime, config))]
pub fn install<R: Runtime + 'static>(
    runtime: Arc<R>,
    spec_str: &str,
    options: InstallOptions,
    config: &Config,
) -> Result<()> {
    let spec = spec_str.parse::<PackageSpec>()?;
    let services = build_services(runtime, config)?;

    let package = spec
        .find_in(services.feed.as_ref(), options.pre)?
        .ok_or_else(|| anyhow!(Error::PackageNotFound(spec.to_string())))?;
    debug!("Resolved {} to {}", spec, package);

    let operations = services.manager.get_install_package_operations(
        &package,
        options.ignore_dependencies,
        options.pre,
    )?;

    if options.dry_run {
        if operations.is_empty() {
            println!("{} is already installed.", package);
        }
        for operation in &operations {
            println!("{}", operation);
        }
        return Ok(());
    }

    let action = crate::manager::InstallAction {
        operations: Some(operations),
        ignore_dependencies: options.ignore_dependencies,
        allow_prerelease_versions: options.pre,
    };
    services.manager.install_package_with_action(&package, &action)?;
    println!("Installed {}", package);
    Ok(())
}
