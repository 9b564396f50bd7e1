//! Collaborator interfaces: media info, thumbnails, export.
//!
//! The slider never decodes or encodes media itself. Hosts plug in
//! implementations backed by whatever media stack they use; the slider
//! only needs a duration, a strip of thumbnails and a trim call.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Reference to a loaded media asset.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef(PathBuf);

impl AssetRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// RGBA8 thumbnail pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct ThumbnailImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl fmt::Debug for ThumbnailImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThumbnailImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// One frame of the strip shown behind the track.
#[derive(Clone, Debug, PartialEq)]
pub struct Thumbnail {
    /// Position in the asset, seconds.
    pub time_offset: f64,
    pub image: ThumbnailImage,
}

/// Total duration lookup.
pub trait MediaInfoProvider {
    /// Duration in seconds. Failure is `TrimError::UnknownDuration`.
    fn duration_seconds(&self, asset: &AssetRef) -> Result<f64>;
}

/// Thumbnail strip generation. Called from a worker thread.
pub trait ThumbnailProvider: Send + Sync {
    fn generate_strip(
        &self,
        asset: &AssetRef,
        duration_seconds: f64,
        track_width_px: f64,
    ) -> anyhow::Result<Vec<Thumbnail>>;
}

/// Cuts `[start, end]` out of an asset. Called from a dedicated thread.
pub trait ExportService: Send + Sync {
    /// Returns the location of the trimmed output.
    fn trim(&self, asset: &AssetRef, start_seconds: f64, end_seconds: f64) -> anyhow::Result<PathBuf>;
}
