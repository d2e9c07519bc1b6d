use anyhow::Result;
use log::debug;

use crate::runtime::Runtime;

use super::config::Config;
use super::services::load_feed;

/// Search the feed for packages whose id matches a glob pattern
#[tracing::instrument(skip(runtime, config))]
pub fn search<R: Runtime>(runtime: R, pattern: Option<&str>, config: &Config) -> Result<()> {
    let pattern = pattern.unwrap_or("*");
    let feed = load_feed(&runtime, config)?;

    let packages = feed.search(pattern)?;
    debug!("{} package(s) match '{}'", packages.len(), pattern);
    if packages.is_empty() {
        println!("No packages found.");
        return Ok(());
    }

    for package in &packages {
        match package.description() {
            Some(description) => println!("{}  {}", package, description),
            None => println!("{}", package),
        }
    }
    Ok(())
}
