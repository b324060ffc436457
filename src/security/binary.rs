use crate::allowlist::AllowlistError;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Longest accepted parser identifier
const MAX_ID_LEN: usize = 64;

/// Parser identifiers are lowercase ASCII slugs: `[a-z0-9][a-z0-9_-]*`
pub fn validate_parser_id(id: &str) -> Result<(), AllowlistError> {
    if id.is_empty() {
        return Err(AllowlistError::InvalidId("Empty identifier".to_string()));
    }
    if id.len() > MAX_ID_LEN {
        return Err(AllowlistError::InvalidId(format!(
            "Identifier longer than {} characters: {}",
            MAX_ID_LEN, id
        )));
    }

    let mut chars = id.chars();
    let first_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    let rest_ok =
        chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');

    if !first_ok || !rest_ok {
        return Err(AllowlistError::InvalidId(format!(
            "Identifier must match [a-z0-9][a-z0-9_-]*: {}",
            id
        )));
    }

    Ok(())
}

/// Resolves an administrator-supplied binary to an executable file.
///
/// Accepts either an absolute path without `..` components or a bare
/// command name searched on a fixed list of directories. Relative paths
/// are rejected since they depend on the working directory.
#[derive(Debug, Clone, Default)]
pub struct BinaryResolver {
    search_path: Vec<PathBuf>,
}

impl BinaryResolver {
    /// Search the directories listed in `PATH` at construction time
    pub fn from_env() -> Self {
        let path = std::env::var_os("PATH").unwrap_or_else(OsString::new);
        Self {
            search_path: std::env::split_paths(&path).collect(),
        }
    }

    pub fn with_search_path(search_path: Vec<PathBuf>) -> Self {
        Self { search_path }
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// Resolve `binary`, returning the reason on failure
    pub fn resolve(&self, binary: &str) -> Result<PathBuf, String> {
        if binary.trim().is_empty() {
            return Err("Empty binary".to_string());
        }
        if binary.contains('\0') {
            return Err(format!("Binary contains NUL: {:?}", binary));
        }

        let path = Path::new(binary);
        if binary.contains(std::path::MAIN_SEPARATOR) || binary.contains('/') {
            return Self::resolve_path(path);
        }

        self.search_path
            .iter()
            .map(|dir| dir.join(binary))
            .find(|candidate| is_executable(candidate))
            .ok_or_else(|| format!("'{}' not found on search path", binary))
    }

    fn resolve_path(path: &Path) -> Result<PathBuf, String> {
        let mut absolute = false;
        for component in path.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => absolute = true,
                Component::ParentDir => {
                    return Err(format!(
                        "Parent directory traversal not allowed: {}",
                        path.display()
                    ));
                }
                Component::CurDir | Component::Normal(_) => {}
            }
        }

        if !absolute {
            return Err(format!("Relative path not allowed: {}", path.display()));
        }
        if !path.exists() {
            return Err(format!("Binary does not exist: {}", path.display()));
        }
        if !is_executable(path) {
            return Err(format!("Binary is not executable: {}", path.display()));
        }

        Ok(path.to_path_buf())
    }
}

/// Regular file with at least one execute bit (any regular file off unix)
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}
