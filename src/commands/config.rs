use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;

use crate::runtime::Runtime;

pub const DEFAULT_PACKAGES_DIR: &str = "packages";

/// Values supplied on the command line (or through clap's env fallbacks).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub solution: Option<PathBuf>,
    pub project: Option<PathBuf>,
    pub packages_dir: Option<String>,
    pub feed: Option<PathBuf>,
}

/// Resolved locations for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub solution_dir: PathBuf,
    pub project_dir: PathBuf,
    pub packages_dir: String,
    pub feed: PathBuf,
}

impl Config {
    pub fn load<R: Runtime + ?Sized>(runtime: &R, overrides: ConfigOverrides) -> Result<Self> {
        let current_dir = runtime.current_dir()?;

        let solution = overrides.solution.unwrap_or_else(|| current_dir.clone());
        let solution_dir = absolutize(&current_dir, solution);
        let project = overrides.project.unwrap_or_else(|| current_dir.clone());
        let project_dir = absolutize(&current_dir, project);
        let packages_dir = overrides
            .packages_dir
            .unwrap_or_else(|| DEFAULT_PACKAGES_DIR.to_string());
        let feed = match overrides.feed {
            Some(feed) => absolutize(&current_dir, feed),
            None => default_feed(runtime)?,
        };

        let config = Self {
            solution_dir,
            project_dir,
            packages_dir,
            feed,
        };
        debug!("Using {:?}", config);
        Ok(config)
    }

    /// `<solution>/<packages-dir>`
    pub fn packages_root(&self) -> PathBuf {
        self.solution_dir.join(&self.packages_dir)
    }
}

fn absolutize(base: &std::path::Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() { path } else { base.join(path) }
}

fn default_feed<R: Runtime + ?Sized>(runtime: &R) -> Result<PathBuf> {
    let config_dir = runtime
        .config_dir()
        .context("Unable to determine the configuration directory; set SOLPACK_FEED")?;
    Ok(config_dir.join("solpack").join("feed.json"))
}
