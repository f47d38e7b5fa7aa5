//! Path resolution for helmwright
//!
//! # Environment Variables
//!
//! - `HELMWRIGHT_SPEC` - Spec file to use when `--spec` is not given
//!
//! # Path Resolution Priority
//!
//! For spec_file():
//! 1. `--spec` flag
//! 2. `HELMWRIGHT_SPEC` environment variable
//! 3. `./helmwright.toml`
//!
//! Relative paths inside the spec file (working directory, values files,
//! content file) resolve against the directory containing the spec file.

use std::path::{Path, PathBuf};

/// Environment variable for spec file override
pub const ENV_SPEC: &str = "HELMWRIGHT_SPEC";

/// Spec file looked up in the current directory
pub const DEFAULT_SPEC_FILE: &str = "helmwright.toml";

/// Recorded state, kept in the working directory
pub const STATE_FILE: &str = ".helmwright-state.toml";

/// Get the spec file path
pub fn spec_file(flag: Option<&Path>) -> PathBuf {
    if let Some(path) = flag {
        return expand(&path.to_string_lossy());
    }

    if let Ok(path) = std::env::var(ENV_SPEC)
        && !path.is_empty()
    {
        let path = expand(&path);
        log::debug!("Using spec file from {}: {}", ENV_SPEC, path.display());
        return path;
    }

    PathBuf::from(DEFAULT_SPEC_FILE)
}

/// Directory relative spec paths resolve against
pub fn spec_dir(spec_file: &Path) -> PathBuf {
    match spec_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Expand a configured path and anchor it at `base` when relative
///
/// An empty path resolves to `base` itself.
pub fn resolve(base: &Path, path: &str) -> PathBuf {
    if path.is_empty() {
        return base.to_path_buf();
    }
    let expanded = expand(path);
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

/// State file for a working directory
pub fn state_file(working_dir: &Path) -> PathBuf {
    working_dir.join(STATE_FILE)
}

/// Expand ~ and environment variables in a path string.
///
/// Unknown variables leave the string unchanged.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use helmkit::EnvScope;
    use std::collections::BTreeMap;

    fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let vars = BTreeMap::from([(key.to_string(), value.to_string())]);
        let _scope = EnvScope::enter(&vars);
        f()
    }

    #[test]
    fn test_spec_flag_wins() {
        with_env_var(ENV_SPEC, "/from/env.toml", || {
            let path = spec_file(Some(Path::new("/from/flag.toml")));
            assert_eq!(path, PathBuf::from("/from/flag.toml"));
        });
    }

    #[test]
    fn test_spec_from_env() {
        with_env_var(ENV_SPEC, "/from/env.toml", || {
            assert_eq!(spec_file(None), PathBuf::from("/from/env.toml"));
        });
    }

    #[test]
    fn test_spec_default() {
        with_env_var(ENV_SPEC, "", || {
            assert_eq!(spec_file(None), PathBuf::from("helmwright.toml"));
        });
    }

    #[test]
    fn test_spec_dir() {
        assert_eq!(spec_dir(Path::new("helmwright.toml")), PathBuf::from("."));
        assert_eq!(
            spec_dir(Path::new("/srv/stack/helmwright.toml")),
            PathBuf::from("/srv/stack")
        );
    }

    #[test]
    fn test_resolve() {
        let base = Path::new("/srv/stack");
        assert_eq!(resolve(base, ""), PathBuf::from("/srv/stack"));
        assert_eq!(resolve(base, ".work"), PathBuf::from("/srv/stack/.work"));
        assert_eq!(resolve(base, "/abs/values.yaml"), PathBuf::from("/abs/values.yaml"));
    }

    #[test]
    fn test_resolve_with_env_var() {
        with_env_var("HELMWRIGHT_TEST_DIR", "/opt/values", || {
            assert_eq!(
                resolve(Path::new("/srv"), "$HELMWRIGHT_TEST_DIR/prod.yaml"),
                PathBuf::from("/opt/values/prod.yaml")
            );
        });
    }

    #[test]
    fn test_expand_unknown_env_var_unchanged() {
        let result = expand("/path/$NONEXISTENT_VAR_12345/file");
        assert_eq!(result, PathBuf::from("/path/$NONEXISTENT_VAR_12345/file"));
    }

    #[test]
    fn test_state_file() {
        assert_eq!(
            state_file(Path::new("/work")),
            PathBuf::from("/work/.helmwright-state.toml")
        );
    }
}
