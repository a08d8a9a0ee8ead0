use std::path::PathBuf;

use thiserror::Error;

use crate::core_modules::palette::PaletteBucket;

/// Everything the mirror pipeline can refuse to do.
///
/// Sampling itself has no error states: the grid is clamped to the capture size
/// when it is derived, so an out-of-range buffer read is a bug rather than a
/// runtime condition.
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("video frame has a zero dimension")]
    EmptyFrame,
    #[error("video frame buffer holds {actual} bytes, expected {expected} (width * height * 4)")]
    FrameSizeMismatch { expected: usize, actual: usize },
    #[error("capture size changed mid-session: expected {expected:?}, got {actual:?}")]
    CaptureSizeChanged {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("cell size must be positive")]
    ZeroCellSize,
    #[error("palette asset for {bucket:?} could not be loaded from {path:?}")]
    MissingAsset {
        bucket: PaletteBucket,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
