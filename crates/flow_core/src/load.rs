//! Scene file loading, dispatched on the file extension.
//!
//! | Extension | Format               | Loader                          |
//! |-----------|----------------------|---------------------------------|
//! | `.pbrt`   | pbrt-v4 text         | [`crate::pbrt::load_pbrt`]      |
//! | `.xml`    | Mitsuba 3 XML        | [`crate::mitsuba::load_mitsuba`] |

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::mitsuba::{load_mitsuba, MitsubaError};
use crate::pbrt::{load_pbrt, ParseError};
use crate::scene::{SceneDescription, SceneError};

/// Errors that can occur while loading a scene file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Mitsuba error: {0}")]
    Mitsuba(#[from] MitsubaError),

    #[error("Invalid scene: {0}")]
    Scene(#[from] SceneError),

    #[error("Unsupported scene format '{}' (expected .pbrt or .xml)", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Scene file formats Flow can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneFormat {
    Pbrt,
    Mitsuba,
}

impl SceneFormat {
    /// Guess the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "pbrt" => Some(SceneFormat::Pbrt),
            "xml" => Some(SceneFormat::Mitsuba),
            _ => None,
        }
    }
}

/// Load and validate a scene file of any supported format.
pub fn load_scene<P: AsRef<Path>>(path: P) -> LoadResult<SceneDescription> {
    let path = path.as_ref();
    match SceneFormat::from_path(path) {
        Some(SceneFormat::Pbrt) => load_pbrt(path),
        Some(SceneFormat::Mitsuba) => load_mitsuba(path),
        None => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Scene name for a file: its stem.
pub(crate) fn scene_name(path: &Path) -> &str {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed")
}
