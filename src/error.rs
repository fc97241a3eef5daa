//! Error types for the export pipeline.

use thiserror::Error;

/// Failure to turn an encoded-image handle into raw bytes.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The handle has no comma-delimited payload segment.
    #[error("invalid data URL: missing payload after ','")]
    MissingPayload,

    /// The payload segment is not valid base64.
    #[error("invalid data URL payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Failure to build an icon container.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// More images than the container's count field can declare.
    #[error("{count} images exceed the container limit of {max}")]
    TooManyImages { count: usize, max: usize },

    /// A payload length or offset does not fit a 32-bit field.
    #[error("container exceeds the 4 GiB size limit")]
    TooLarge,
}

/// Any failure while building or writing an export.
///
/// Nothing in this crate retries; every error is surfaced to the caller and
/// aborts the export it belongs to.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("failed to encode container: {0}")]
    Encode(EncodeError),

    /// The archive writer failed while writing or finalizing.
    #[error("failed to write archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to serialize manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    /// Two parallel lists that must correspond index-for-index differ in length.
    #[error("{items} output items but {images} rendered images")]
    OutputMismatch { items: usize, images: usize },

    /// The same archive path was submitted twice.
    #[error("duplicate archive entry: {0}")]
    DuplicateEntry(String),

    /// A file name or archive path would escape its destination.
    #[error("unsafe output path: {0}")]
    UnsafePath(String),

    /// A renderer could not produce an image.
    #[error("render failed: {0}")]
    Render(String),
}

impl From<EncodeError> for ExportError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::Decode(err) => ExportError::Decode(err),
            err => ExportError::Encode(err),
        }
    }
}
