//! Error types for asset loading, map files, and image rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while scanning an asset folder.
#[derive(Error, Debug)]
pub enum AssetLoadError {
    /// The root folder could not be listed
    #[error("cannot read asset folder {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No subfolder held any classifiable tile or overlay images
    #[error("no tiles or overlays found in {path:?}")]
    NothingFound { path: PathBuf },
}

/// Errors raised while reading or writing a map file.
#[derive(Error, Debug)]
pub enum MapFileError {
    #[error("cannot access map file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid map document
    #[error("malformed map file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode map: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised while producing a render of a single asset.
#[derive(Error, Debug)]
pub enum ImageRenderError {
    #[error("cannot decode image {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl ImageRenderError {
    /// Path of the asset that failed
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Decode { path, .. } => path,
        }
    }
}
