//! Apple icon image (.icns) container encoding.
//!
//! An ICNS file is an 8-byte header (`icns` + big-endian file length)
//! followed by chunks of `type code (4) + big-endian chunk length (4) +
//! payload`. Payloads here are PNG files and are copied verbatim.

use std::fmt;

use crate::binary::ByteWriter;
use crate::error::EncodeError;
use crate::raster::RenderedImage;

/// The first four bytes of an ICNS file.
const ICNS_MAGIC_LITERAL: &[u8; 4] = b"icns";

/// Length of the file header, in bytes.
pub const ICNS_HEADER_LENGTH: u32 = 8;

/// Length of a chunk header, in bytes.
pub const ICNS_CHUNK_HEADER_LENGTH: u32 = 8;

// ============================================================================
// OSType
// ============================================================================

/// A four-character chunk type code (e.g. `ic07`).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct OSType(pub [u8; 4]);

impl fmt::Display for OSType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            write!(f, "{}", char::from(byte))?;
        }
        Ok(())
    }
}

// ============================================================================
// IcnsType
// ============================================================================

/// PNG-backed icon types, keyed by pixel size.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IcnsType {
    /// 16x16 (`icp4`).
    Png16,
    /// 32x32 (`icp5`).
    Png32,
    /// 48x48 (`icp6`).
    Png48,
    /// 64x64 (`ic12`).
    Png64,
    /// 96x96 and 128x128 (`ic07`).
    Png128,
    /// 256x256 (`ic08`).
    Png256,
    /// 512x512 (`ic09`).
    Png512,
    /// 1024x1024 (`ic10`).
    Png1024,
    /// Any size missing from the table. Written with the 128x128 code, so
    /// the resulting chunk may duplicate a real `ic07` chunk or be read back
    /// at the wrong size.
    Fallback(u32),
}

impl IcnsType {
    /// Looks up the icon type for a pixel size. Never fails: unmapped sizes
    /// yield [`IcnsType::Fallback`].
    ///
    /// # Examples
    /// ```
    /// use iconset_export::IcnsType;
    /// assert_eq!(IcnsType::from_pixel_size(16), IcnsType::Png16);
    /// assert_eq!(IcnsType::from_pixel_size(96), IcnsType::Png128);
    /// assert_eq!(IcnsType::from_pixel_size(200), IcnsType::Fallback(200));
    /// ```
    pub fn from_pixel_size(size: u32) -> IcnsType {
        match size {
            16 => IcnsType::Png16,
            32 => IcnsType::Png32,
            48 => IcnsType::Png48,
            64 => IcnsType::Png64,
            96 | 128 => IcnsType::Png128,
            256 => IcnsType::Png256,
            512 => IcnsType::Png512,
            1024 => IcnsType::Png1024,
            other => IcnsType::Fallback(other),
        }
    }

    /// Get the OSType written for this icon type.
    pub fn ostype(self) -> OSType {
        match self {
            IcnsType::Png16 => OSType(*b"icp4"),
            IcnsType::Png32 => OSType(*b"icp5"),
            IcnsType::Png48 => OSType(*b"icp6"),
            IcnsType::Png64 => OSType(*b"ic12"),
            IcnsType::Png128 | IcnsType::Fallback(_) => OSType(*b"ic07"),
            IcnsType::Png256 => OSType(*b"ic08"),
            IcnsType::Png512 => OSType(*b"ic09"),
            IcnsType::Png1024 => OSType(*b"ic10"),
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, IcnsType::Fallback(_))
    }
}

// ============================================================================
// Encoder
// ============================================================================

/// Encodes the images into a single ICNS file, one chunk per image in input
/// order.
///
/// Sizes that share a type code (96 and 128, or any unmapped size) produce
/// repeated chunks; they are written as given.
pub fn encode_icns<'a>(
    images: impl IntoIterator<Item = &'a RenderedImage>,
) -> Result<Vec<u8>, EncodeError> {
    let mut chunks = Vec::new();
    for image in images {
        let icon_type = IcnsType::from_pixel_size(image.size);
        if icon_type.is_fallback() {
            log::warn!(
                "no ICNS type for {}px, writing it as {}",
                image.size,
                icon_type.ostype()
            );
        }
        chunks.push((icon_type.ostype(), image.bytes()?));
    }

    let total_length = total_length(chunks.iter().map(|(_, data)| data.len()))?;

    let mut w = ByteWriter::with_capacity(total_length as usize);
    w.bytes(ICNS_MAGIC_LITERAL).u32_be(total_length);
    for (OSType(code), data) in &chunks {
        w.bytes(code)
            .u32_be(ICNS_CHUNK_HEADER_LENGTH + data.len() as u32)
            .bytes(data);
    }

    log::debug!("encoded ICNS with {} chunks ({} bytes)", chunks.len(), total_length);
    Ok(w.finish())
}

/// File length for chunks with the given payload lengths. Every chunk length
/// is bounded by the total, so only the total needs checking.
fn total_length(payload_lengths: impl IntoIterator<Item = usize>) -> Result<u32, EncodeError> {
    payload_lengths
        .into_iter()
        .try_fold(ICNS_HEADER_LENGTH, |acc, len| {
            u32::try_from(len)
                .ok()
                .and_then(|len| len.checked_add(ICNS_CHUNK_HEADER_LENGTH))
                .and_then(|len| acc.checked_add(len))
        })
        .ok_or(EncodeError::TooLarge)
}
