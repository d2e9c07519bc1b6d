use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::package::Package;
use crate::runtime::{Runtime, relative_path_from_dir, write_with_parent};

use super::{ProjectReference, ProjectSystem};

const PROJECT_FILE: &str = "project.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProjectFile {
    #[serde(default)]
    references: Vec<ProjectReference>,
}

/// A project rooted at a directory, keeping references in `project.json`.
pub struct DirectoryProject<R: Runtime> {
    runtime: Arc<R>,
    directory: PathBuf,
    solution_directory: PathBuf,
}

impl<R: Runtime> DirectoryProject<R> {
    pub fn new(runtime: Arc<R>, directory: PathBuf, solution_directory: PathBuf) -> Self {
        Self {
            runtime,
            directory,
            solution_directory,
        }
    }

    fn project_file(&self) -> PathBuf {
        self.directory.join(PROJECT_FILE)
    }

    fn load(&self) -> Result<ProjectFile> {
        let path = self.project_file();
        if !self.runtime.exists(&path) {
            return Ok(ProjectFile::default());
        }
        let content = self.runtime.read_to_string(&path)?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    fn save(&self, file: &ProjectFile) -> Result<()> {
        let path = self.project_file();
        let content = serde_json::to_string_pretty(file)?;
        write_with_parent(self.runtime.as_ref(), &path, content.as_bytes())
            .with_context(|| format!("Failed to save {:?}", path))
    }
}

impl<R: Runtime> ProjectSystem for DirectoryProject<R> {
    fn name(&self) -> String {
        self.directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn directory(&self) -> PathBuf {
        self.directory.clone()
    }

    fn solution_directory(&self) -> PathBuf {
        self.solution_directory.clone()
    }

    fn full_path(&self, relative: &Path) -> PathBuf {
        self.directory.join(relative)
    }

    fn references(&self) -> Result<Vec<ProjectReference>> {
        Ok(self.load()?.references)
    }

    fn add_reference(&self, package: &Package, install_path: &Path) -> Result<()> {
        let mut file = self.load()?;
        let hint_path = relative_path_from_dir(&self.directory, install_path)
            .unwrap_or_else(|| install_path.to_path_buf());
        let reference = ProjectReference {
            id: package.id().to_string(),
            version: package.version().clone(),
            hint_path,
        };

        match file
            .references
            .iter_mut()
            .find(|r| r.id.eq_ignore_ascii_case(package.id()))
        {
            Some(existing) => *existing = reference,
            None => file.references.push(reference),
        }
        self.save(&file)
    }

    fn remove_reference(&self, package_id: &str) -> Result<()> {
        let mut file = self.load()?;
        let before = file.references.len();
        file.references
            .retain(|r| !r.id.eq_ignore_ascii_case(package_id));
        if file.references.len() == before {
            log::debug!("Project {} has no reference to {}", self.name(), package_id);
            return Ok(());
        }
        self.save(&file)
    }
}
