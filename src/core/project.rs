//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Represents an LPT project: a directory with an `.lpt/` folder
/// containing the configuration and the production database.
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .lpt/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            let lpt_dir = current.join(".lpt");
            if lpt_dir.is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Open the project rooted at the given directory, or discover one
    /// when no explicit root is supplied.
    pub fn locate(explicit_root: Option<&Path>) -> Result<Self, ProjectError> {
        match explicit_root {
            Some(path) => Self::discover_from(path),
            None => Self::discover(),
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let lpt_dir = root.join(".lpt");
        if lpt_dir.exists() {
            return Err(ProjectError::AlreadyExists(root.clone()));
        }

        std::fs::create_dir_all(&lpt_dir)
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        let config_path = lpt_dir.join("config.yaml");
        std::fs::write(&config_path, Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    /// Force initialization even if .lpt/ exists
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let lpt_dir = root.join(".lpt");
        std::fs::create_dir_all(&lpt_dir)
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        let config_path = lpt_dir.join("config.yaml");
        std::fs::write(&config_path, Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# LPT Project Configuration

# Currency symbol used when printing material costs (default: $)
# currency: "$"

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .lpt configuration directory
    pub fn lpt_dir(&self) -> PathBuf {
        self.root.join(".lpt")
    }

    /// Get the path of the production database
    pub fn db_path(&self) -> PathBuf {
        self.lpt_dir().join("factory.db")
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not an LPT project (searched from {searched_from:?}). Run 'lpt init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("LPT project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.lpt_dir().exists());
        assert!(project.lpt_dir().join("config.yaml").exists());
        assert!(project.db_path().starts_with(project.lpt_dir()));
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_discover_finds_lpt_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_lpt_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }
}
