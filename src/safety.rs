use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Keeps edit targets inside a workspace and away from tool-owned directories.
#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    /// Canonical workspace root
    workspace_root: PathBuf,
    /// Canonical directories no edit may touch
    forbidden_paths: Vec<PathBuf>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("Path is outside workspace: {path} (workspace: {workspace})")]
    OutsideWorkspace { path: PathBuf, workspace: PathBuf },

    #[error("Path is in forbidden directory: {path} (forbidden: {forbidden})")]
    ForbiddenPath { path: PathBuf, forbidden: PathBuf },

    #[error("Path does not name a file: {0}")]
    NotAFile(PathBuf),

    #[error("Failed to canonicalize path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

impl WorkspaceGuard {
    /// Create a guard rooted at `workspace_root`.
    ///
    /// Forbids the workspace's `.git/` and `target/` directories plus the
    /// cargo and rustup homes.
    pub fn new(workspace_root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let workspace_root = workspace_root.as_ref().canonicalize()?;

        let mut candidates = vec![workspace_root.join(".git"), workspace_root.join("target")];
        if let Some(home) = home::home_dir() {
            candidates.push(home.join(".cargo/registry"));
            candidates.push(home.join(".cargo/git"));
            candidates.push(home.join(".rustup"));
        }

        // Directories that don't exist can't be escaped into.
        let forbidden_paths = candidates
            .into_iter()
            .filter_map(|path| path.canonicalize().ok())
            .collect();

        Ok(Self {
            workspace_root,
            forbidden_paths,
        })
    }

    /// Create a guard with explicit forbidden paths.
    #[cfg(test)]
    pub fn with_forbidden(
        workspace_root: impl AsRef<Path>,
        forbidden: Vec<PathBuf>,
    ) -> Result<Self, SafetyError> {
        let workspace_root = workspace_root.as_ref().canonicalize()?;
        let forbidden_paths = forbidden
            .into_iter()
            .map(|path| path.canonicalize().unwrap_or(path))
            .collect();
        Ok(Self {
            workspace_root,
            forbidden_paths,
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Resolve an edit target to a canonical path inside the workspace.
    ///
    /// Relative paths are taken from the workspace root. A file that does not
    /// exist yet (file creation) is resolved through its parent directory,
    /// which must exist.
    pub fn resolve_target(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        };

        let canonical = if absolute.exists() {
            absolute.canonicalize()?
        } else {
            let file_name = match absolute.components().next_back() {
                Some(Component::Normal(name)) => name.to_owned(),
                _ => return Err(SafetyError::NotAFile(absolute)),
            };
            let parent = absolute
                .parent()
                .ok_or_else(|| SafetyError::NotAFile(absolute.clone()))?;
            parent.canonicalize()?.join(file_name)
        };

        if canonical.is_dir() {
            return Err(SafetyError::NotAFile(canonical));
        }

        self.check_canonical(&canonical)?;
        Ok(canonical)
    }

    /// Re-check a resolved path right before writing.
    pub fn revalidate(&self, path: &Path) -> Result<PathBuf, SafetyError> {
        self.resolve_target(path)
    }

    fn check_canonical(&self, canonical: &Path) -> Result<(), SafetyError> {
        if !canonical.starts_with(&self.workspace_root) {
            return Err(SafetyError::OutsideWorkspace {
                path: canonical.to_path_buf(),
                workspace: self.workspace_root.clone(),
            });
        }

        if let Some(forbidden) = self
            .forbidden_paths
            .iter()
            .find(|forbidden| canonical.starts_with(forbidden))
        {
            return Err(SafetyError::ForbiddenPath {
                path: canonical.to_path_buf(),
                forbidden: forbidden.clone(),
            });
        }

        Ok(())
    }
}
