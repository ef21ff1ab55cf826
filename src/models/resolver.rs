//! Weights artifact resolution
//!
//! Candidates are checked in order on every call. The artifact may be
//! replaced while the process runs, so nothing is cached.

use crate::config::Config;
use crate::errors::{NeuroError, Result};
use std::path::{Path, PathBuf};

/// Conventional subdirectory holding model artifacts
pub const MODELS_SUBDIR: &str = "models";

/// Ordered list of candidate weight locations
#[derive(Debug, Clone)]
pub struct ModelResolver {
    candidates: Vec<PathBuf>,
}

impl ModelResolver {
    /// Standard candidates: relative paths first, then their install-anchored equivalents
    pub fn new(weights_file: &str, install_dir: &Path) -> Self {
        let relative = PathBuf::from(weights_file);
        let in_models = Path::new(MODELS_SUBDIR).join(weights_file);

        Self {
            candidates: vec![
                relative.clone(),
                in_models.clone(),
                install_dir.join(&relative),
                install_dir.join(&in_models),
            ],
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.model.weights_file, &config.install_dir())
    }

    /// Explicit candidate list
    pub fn with_candidates(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First candidate that exists as a file
    pub fn resolve(&self) -> Result<PathBuf> {
        self.candidates
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .ok_or_else(|| NeuroError::ResourceNotFound {
                tried: self.candidates.clone(),
            })
    }

    /// Where a newly supplied artifact should be written
    pub fn install_target(&self) -> PathBuf {
        self.resolve().unwrap_or_else(|_| {
            self.candidates
                .get(1)
                .or_else(|| self.candidates.first())
                .cloned()
                .unwrap_or_else(|| PathBuf::from(MODELS_SUBDIR))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_candidate_order() {
        let resolver = ModelResolver::new("w.pth", Path::new("/opt/app"));
        let candidates = resolver.candidates();
        assert_eq!(candidates[0], PathBuf::from("w.pth"));
        assert_eq!(candidates[1], PathBuf::from("models/w.pth"));
        assert_eq!(candidates[2], PathBuf::from("/opt/app/w.pth"));
        assert_eq!(candidates[3], PathBuf::from("/opt/app/models/w.pth"));
    }

    #[test]
    fn test_missing_everywhere() {
        let dir = TempDir::new().unwrap();
        let resolver = ModelResolver::with_candidates(vec![
            dir.path().join("a.pth"),
            dir.path().join("models").join("a.pth"),
        ]);

        match resolver.resolve() {
            Err(NeuroError::ResourceNotFound { tried }) => assert_eq!(tried.len(), 2),
            other => panic!("Expected ResourceNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_first_existing_wins_and_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("a.pth");
        let second = dir.path().join("models").join("a.pth");
        fs::create_dir_all(second.parent().unwrap()).unwrap();
        fs::write(&second, b"weights").unwrap();

        let resolver = ModelResolver::with_candidates(vec![first.clone(), second.clone()]);
        assert_eq!(resolver.resolve().unwrap(), second);

        fs::write(&first, b"weights").unwrap();
        assert_eq!(resolver.resolve().unwrap(), first);
    }

    #[test]
    fn test_directories_are_not_artifacts() {
        let dir = TempDir::new().unwrap();
        let fake = dir.path().join("a.pth");
        fs::create_dir_all(&fake).unwrap();

        let resolver = ModelResolver::with_candidates(vec![fake.clone()]);
        assert!(resolver.resolve().is_err());
        assert_eq!(resolver.install_target(), fake);
    }
}
