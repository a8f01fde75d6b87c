use std::fmt;
use std::path::{Path, PathBuf};

/// Which binary an engine handle refers to.
///
/// The short name is the basename of the path as configured and doubles as
/// the rating key and winner label, so two identities compare equal by
/// name alone. A symlinked engine keeps the symlink's name even though the
/// stored path resolves to the target.
#[derive(Debug, Clone)]
pub struct EngineIdentity {
    path: PathBuf,
    name: String,
}

impl EngineIdentity {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        Self {
            path: resolved,
            name,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for EngineIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for EngineIdentity {}

impl fmt::Display for EngineIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
