//! Command-line commands. Each one loads what it needs from [`Config`],
//! runs one package manager operation and reports the outcome on stdout.

pub mod config;
mod install;
mod list;
mod package_spec;
mod search;
mod services;
mod uninstall;
mod update;

pub use config::{Config, ConfigOverrides};
pub use install::{InstallOptions, install};
pub use list::list;
pub use package_spec::PackageSpec;
pub use search::search;
pub use services::{Services, build_services, load_feed};
pub use uninstall::uninstall;
pub use update::update;
