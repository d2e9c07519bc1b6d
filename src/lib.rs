pub mod commands;
pub mod error;
pub mod logger;
pub mod manager;
pub mod package;
pub mod project;
pub mod repository;
pub mod resolver;
pub mod runtime;

pub use error::{Error, Result};

#[cfg(test)]
pub mod test_utils;
