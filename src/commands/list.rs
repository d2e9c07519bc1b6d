use anyhow::Result;
use log::debug;

use crate::project::REFERENCE_FILE;
use crate::repository::ReferenceFile;
use crate::runtime::Runtime;

use super::config::Config;

/// List the packages the project references
#[tracing::instrument(skip(runtime, config))]
pub fn list<R: Runtime>(runtime: R, config: &Config) -> Result<()> {
    let path = config.project_dir.join(REFERENCE_FILE);
    debug!("Listing packages from {:?}", path);

    let references = ReferenceFile::load(&runtime, &path)?;
    if references.packages.is_empty() {
        println!("No packages installed.");
        return Ok(());
    }

    for reference in &references.packages {
        if reference.explicit {
            println!("{} {}", reference.id, reference.version);
        } else {
            println!("{} {} (dependency)", reference.id, reference.version);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use std::path::PathBuf;

    fn config() -> Config {
        Config {
            solution_dir: PathBuf::from("/work"),
            project_dir: PathBuf::from("/work/App"),
            packages_dir: "packages".to_string(),
            feed: PathBuf::from("/work/feed.json"),
        }
    }

    #[test]
    fn test_list_empty() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .withf(|p| p == std::path::Path::new("/work/App/packages.json"))
            .returning(|_| false);

        list(runtime, &config()).unwrap();
    }

    #[test]
    fn test_list_reads_reference_file() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime.expect_read_to_string().returning(|_| {
            Ok(r#"{"packages": [{"id": "Lib", "version": "1.0", "explicit": false}]}"#.into())
        });

        list(runtime, &config()).unwrap();
    }

    #[test]
    fn test_list_corrupt_reference_file() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_read_to_string()
            .returning(|_| Ok("not json".into()));

        assert!(list(runtime, &config()).is_err());
    }
}
