use crate::error::FsError;
use std::path::{Component, Path, PathBuf};

pub fn normalize_path(path: &Path) -> PathBuf {
    let mut ret = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(..) => ret.push(component.as_os_str()),
            Component::RootDir => ret.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                ret.pop();
            }
            Component::Normal(c) => ret.push(c),
        }
    }
    ret
}

/// Root that relative command paths resolve against.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute paths come back verbatim so that `realPath` echoes the
    /// caller's path. Relative paths are joined onto the root and normalized.
    pub fn resolve(&self, user_path: &str) -> Result<String, FsError> {
        if user_path.is_empty() {
            return Err(FsError::invalid_input("Empty path provided"));
        }

        let p = Path::new(user_path);
        if p.is_absolute() {
            return Ok(user_path.to_string());
        }

        let normalized = normalize_path(&self.root.join(p));
        Ok(if normalized.as_os_str().is_empty() {
            ".".to_string()
        } else {
            normalized.to_string_lossy().into_owned()
        })
    }
}

/// Joins a directory path and an entry name with exactly one `/` between them.
pub fn join_child(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}
