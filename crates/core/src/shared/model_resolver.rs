use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("model {name} not found (searched: {})", join_paths(.searched))]
    NotFound { name: String, searched: Vec<PathBuf> },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve a model file by name.
///
/// Resolution order:
/// 1. Explicit path (must exist)
/// 2. User cache directory (platform-specific)
/// 3. Bundled directory (for development / pre-packaged installs)
pub fn resolve(
    name: &str,
    explicit: Option<&Path>,
    bundled_dir: Option<&Path>,
) -> Result<PathBuf, ModelResolveError> {
    let mut searched = Vec::new();

    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        // an explicit path that is missing is never silently replaced
        return Err(ModelResolveError::NotFound {
            name: name.to_string(),
            searched: vec![path.to_path_buf()],
        });
    }

    match model_cache_dir() {
        Ok(dir) => {
            let cached = dir.join(name);
            if cached.is_file() {
                return Ok(cached);
            }
            searched.push(cached);
        }
        Err(e) => log::debug!("skipping model cache: {e}"),
    }

    if let Some(dir) = bundled_dir {
        let bundled = dir.join(name);
        if bundled.is_file() {
            return Ok(bundled);
        }
        searched.push(bundled);
    }

    Err(ModelResolveError::NotFound {
        name: name.to_string(),
        searched,
    })
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/CatPattern/models/`
/// - Linux: `$XDG_CACHE_HOME/CatPattern/models/` or `~/.cache/CatPattern/models/`
/// - Windows: `%LOCALAPPDATA%/CatPattern/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("CatPattern").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("CatPattern").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}
