//! Rendered raster images and the data-URL byte decoder.
//!
//! Renderers hand over either raw PNG bytes or a data URL (the form a
//! browser canvas produces). Both are carried as a [`Raster`] and resolved to
//! bytes only when a container or archive entry is built.

use std::borrow::Cow;
use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbaImage};

use crate::error::{DecodeError, ExportError};

// ============================================================================
// Byte Decoder
// ============================================================================

/// Decodes a data URL (`data:<mime>;base64,<payload>`) into raw bytes.
///
/// Everything after the first comma is the payload and the media type is
/// ignored. A further comma is not valid base64, so such handles fail with
/// [`DecodeError::InvalidBase64`] instead of being cut short.
///
/// # Example
///
/// ```
/// use iconset_export::decode_data_url;
///
/// let bytes = decode_data_url("data:image/png;base64,aWNvbg==").unwrap();
/// assert_eq!(bytes, b"icon");
/// assert!(decode_data_url("no payload here").is_err());
/// ```
pub fn decode_data_url(handle: &str) -> Result<Vec<u8>, DecodeError> {
    let payload = match handle.split_once(',') {
        Some((_, payload)) if !payload.is_empty() => payload,
        _ => return Err(DecodeError::MissingPayload),
    };
    Ok(STANDARD.decode(payload)?)
}

/// Builds a base64 data URL for the given bytes and media type.
pub fn encode_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

// ============================================================================
// Raster
// ============================================================================

/// Encoded raster data, either already decoded or still behind a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Raster {
    /// Raw bytes in a standard raster encoding (PNG).
    Bytes(Vec<u8>),
    /// A data URL embedding the bytes as base64.
    DataUrl(String),
}

impl Raster {
    /// Resolves the raster to its bytes, decoding a data URL if needed.
    pub fn bytes(&self) -> Result<Cow<'_, [u8]>, DecodeError> {
        match self {
            Self::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
            Self::DataUrl(url) => decode_data_url(url).map(Cow::Owned),
        }
    }
}

impl From<Vec<u8>> for Raster {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

// ============================================================================
// RenderedImage
// ============================================================================

/// A rendered image at a given pixel size.
///
/// The size is the logical size that was requested from the renderer. The
/// encoders trust it and never inspect the raster's own header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    /// The encoded raster.
    pub raster: Raster,
    /// Edge length in pixels.
    pub size: u32,
}

impl RenderedImage {
    pub fn new(raster: impl Into<Raster>, size: u32) -> Self {
        Self {
            raster: raster.into(),
            size,
        }
    }

    /// Creates an image backed by a data URL.
    pub fn from_data_url(url: impl Into<String>, size: u32) -> Self {
        Self::new(Raster::DataUrl(url.into()), size)
    }

    /// PNG-encodes an RGBA buffer. The size is taken from the buffer width.
    pub fn from_rgba(image: &RgbaImage) -> Result<Self, ExportError> {
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(Self::new(png, image.width()))
    }

    /// Resolves the raster bytes.
    pub fn bytes(&self) -> Result<Cow<'_, [u8]>, DecodeError> {
        self.raster.bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_payload_after_comma() {
        let url = encode_data_url(&[0, 1, 2, 255], "octet/stream");
        assert!(url.starts_with("data:octet/stream;base64,"));
        assert_eq!(decode_data_url(&url).unwrap(), vec![0, 1, 2, 255]);
    }

    #[test]
    fn missing_payload_is_rejected() {
        assert!(matches!(
            decode_data_url("data:image/png;base64"),
            Err(DecodeError::MissingPayload)
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,"),
            Err(DecodeError::MissingPayload)
        ));
    }

    #[test]
    fn invalid_base64_is_rejected() {
        assert!(matches!(
            decode_data_url("data:image/png;base64,!!!"),
            Err(DecodeError::InvalidBase64(_))
        ));
    }

    #[test]
    fn extra_comma_segments_are_rejected() {
        assert!(matches!(
            decode_data_url("data:image/png;base64,aWNvbg==,trailing"),
            Err(DecodeError::InvalidBase64(_))
        ));
    }

    #[test]
    fn raster_bytes_borrow_when_decoded() {
        let raster = Raster::Bytes(b"png".to_vec());
        assert!(matches!(raster.bytes().unwrap(), Cow::Borrowed(_)));

        let raster = Raster::DataUrl("data:x;base64,cG5n".into());
        assert_eq!(&*raster.bytes().unwrap(), b"png");
    }

    #[test]
    fn from_rgba_writes_png() {
        let mut img = RgbaImage::new(16, 16);
        for pixel in img.pixels_mut() {
            pixel.0 = [255, 0, 0, 255];
        }
        let rendered = RenderedImage::from_rgba(&img).unwrap();
        assert_eq!(rendered.size, 16);

        let bytes = rendered.bytes().unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (16, 16));
        assert_eq!(decoded.get_pixel(3, 3).0, [255, 0, 0, 255]);
    }
}
