//! Builds the package manager and its collaborators from configuration.

use anyhow::Result;
use log::{debug, warn};
use std::sync::Arc;

use crate::manager::PackageManager;
use crate::project::DirectoryProject;
use crate::repository::{
    DefaultPathResolver, MemoryRepository, PathResolver, SolutionSharedRepository,
};
use crate::resolver::DefaultResolverFactory;
use crate::runtime::Runtime;

use super::config::Config;

pub struct Services {
    pub feed: Arc<MemoryRepository>,
    pub manager: PackageManager,
}

/// Load the package feed. A missing feed is treated as empty.
pub fn load_feed<R: Runtime + ?Sized>(runtime: &R, config: &Config) -> Result<MemoryRepository> {
    if !runtime.exists(&config.feed) {
        warn!("Package feed {:?} does not exist", config.feed);
        return Ok(MemoryRepository::new());
    }
    MemoryRepository::from_feed(runtime, &config.feed)
}

pub fn build_services<R: Runtime + 'static>(runtime: Arc<R>, config: &Config) -> Result<Services> {
    let feed = Arc::new(load_feed(runtime.as_ref(), config)?);

    let packages_root = config.packages_root();
    debug!("Shared repository at {:?}", packages_root);
    let path_resolver: Arc<dyn PathResolver> = Arc::new(DefaultPathResolver::new(&packages_root));
    let shared = Arc::new(SolutionSharedRepository::new(
        runtime.clone(),
        packages_root,
        path_resolver.clone(),
    ));
    let project = Arc::new(DirectoryProject::new(
        runtime.clone(),
        config.project_dir.clone(),
        config.solution_dir.clone(),
    ));

    let manager = PackageManager::new(
        runtime,
        feed.clone(),
        project,
        shared,
        path_resolver,
        Box::new(DefaultResolverFactory),
    )?;

    Ok(Services { feed, manager })
}
