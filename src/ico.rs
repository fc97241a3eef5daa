//! Windows icon (.ico) container encoding.
//!
//! Every image is stored as an embedded PNG (the Vista+ flavour of the
//! format), so payloads are copied verbatim and never re-encoded.
//!
//! # Layout
//!
//! ```text
//! ICONDIR         6 bytes   reserved=0, type=1, count
//! ICONDIRENTRY   16 bytes   repeated `count` times
//! payloads                  in directory order
//! ```

use crate::binary::ByteWriter;
use crate::error::EncodeError;
use crate::raster::RenderedImage;

/// Length of the file header, in bytes.
pub const ICO_HEADER_LENGTH: u32 = 6;

/// Length of one directory record, in bytes.
pub const ICO_DIR_ENTRY_LENGTH: u32 = 16;

/// Resource type tag for icons (cursors use 2).
const ICO_TYPE_ICON: u16 = 1;

/// Returns the width/height byte for a directory record. 256 and above are
/// written as 0, which the format reads as 256.
pub fn dimension_byte(size: u32) -> u8 {
    if size >= 256 { 0 } else { size as u8 }
}

/// Encodes the images into a single ICO file.
///
/// Every raster is resolved and every offset computed before anything is
/// written, so a malformed data URL or an oversized set yields an error
/// instead of a truncated container.
pub fn encode_ico<'a>(
    images: impl IntoIterator<Item = &'a RenderedImage>,
) -> Result<Vec<u8>, EncodeError> {
    let payloads = images
        .into_iter()
        .map(|image| Ok::<_, EncodeError>((image.size, image.bytes()?)))
        .collect::<Result<Vec<_>, _>>()?;

    let count = u16::try_from(payloads.len()).map_err(|_| EncodeError::TooManyImages {
        count: payloads.len(),
        max: usize::from(u16::MAX),
    })?;
    let data_start = ICO_HEADER_LENGTH + ICO_DIR_ENTRY_LENGTH * u32::from(count);

    let mut records = Vec::with_capacity(payloads.len());
    let mut offset = data_start;
    for (size, payload) in &payloads {
        let length = u32::try_from(payload.len()).map_err(|_| EncodeError::TooLarge)?;
        records.push((dimension_byte(*size), length, offset));
        offset = offset.checked_add(length).ok_or(EncodeError::TooLarge)?;
    }

    let mut w = ByteWriter::with_capacity(offset as usize);
    w.u16_le(0).u16_le(ICO_TYPE_ICON).u16_le(count);

    for &(side, length, offset) in &records {
        w.u8(side)
            .u8(side)
            .u8(0) // palette size
            .u8(0) // reserved
            .u16_le(1) // color planes
            .u16_le(32) // bits per pixel
            .u32_le(length)
            .u32_le(offset);
    }

    for (_, payload) in &payloads {
        w.bytes(payload);
    }

    log::debug!("encoded ICO with {} images ({} bytes)", count, w.offset());
    Ok(w.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use byteorder::{ByteOrder, LittleEndian};

    fn fake(size: u32, len: usize) -> RenderedImage {
        RenderedImage::new(vec![size as u8; len], size)
    }

    fn dir_entry(ico: &[u8], index: usize) -> &[u8] {
        let start = 6 + 16 * index;
        &ico[start..start + 16]
    }

    #[test]
    fn header_declares_icon_type_and_count() {
        let ico = encode_ico(&[fake(16, 3), fake(32, 5)]).unwrap();
        assert_eq!(&ico[..6], &[0, 0, 1, 0, 2, 0]);
        assert_eq!(ico.len(), 6 + 2 * 16 + 3 + 5);
    }

    #[test]
    fn dimension_byte_wraps_at_256() {
        for size in [1, 16, 48, 128, 255] {
            assert_eq!(dimension_byte(size), size as u8);
        }
        for size in [256, 512, 1024] {
            assert_eq!(dimension_byte(size), 0);
        }

        let ico = encode_ico(&[fake(255, 1), fake(256, 1), fake(512, 1)]).unwrap();
        assert_eq!(&dir_entry(&ico, 0)[..2], &[255, 255]);
        assert_eq!(&dir_entry(&ico, 1)[..2], &[0, 0]);
        assert_eq!(&dir_entry(&ico, 2)[..2], &[0, 0]);
    }

    #[test]
    fn directory_record_fields() {
        let ico = encode_ico(&[fake(48, 10)]).unwrap();
        let entry = dir_entry(&ico, 0);
        assert_eq!(&entry[..4], &[48, 48, 0, 0]);
        assert_eq!(LittleEndian::read_u16(&entry[4..6]), 1);
        assert_eq!(LittleEndian::read_u16(&entry[6..8]), 32);
        assert_eq!(LittleEndian::read_u32(&entry[8..12]), 10);
        assert_eq!(LittleEndian::read_u32(&entry[12..16]), 22);
    }

    #[test]
    fn offsets_accumulate_payload_lengths() {
        let lengths = [7usize, 0, 13, 2];
        let images: Vec<_> = lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| fake(16 << i, len))
            .collect();
        let ico = encode_ico(&images).unwrap();

        let mut expected = 6 + 16 * lengths.len() as u32;
        let mut previous = None;
        for (i, &len) in lengths.iter().enumerate() {
            let entry = dir_entry(&ico, i);
            let offset = LittleEndian::read_u32(&entry[12..16]);
            assert_eq!(offset, expected);
            if let Some(prev) = previous {
                assert!(offset >= prev);
            }
            previous = Some(offset);
            expected += len as u32;
        }
        assert_eq!(ico.len() as u32, expected);
    }

    #[test]
    fn payload_is_embedded_unmodified() {
        let png = crate::raster::encode_data_url(b"\x89PNG-64-pixels", "image/png");
        let images = [fake(16, 4), RenderedImage::from_data_url(png, 64)];
        let ico = encode_ico(&images).unwrap();

        let entry = dir_entry(&ico, 1);
        let length = LittleEndian::read_u32(&entry[8..12]) as usize;
        let offset = LittleEndian::read_u32(&entry[12..16]) as usize;
        assert_eq!(offset, 6 + 2 * 16 + 4);
        assert_eq!(&ico[offset..offset + length], b"\x89PNG-64-pixels");
    }

    #[test]
    fn encoding_is_idempotent() {
        let images = [fake(16, 9), fake(256, 33)];
        assert_eq!(encode_ico(&images).unwrap(), encode_ico(&images).unwrap());
    }

    #[test]
    fn empty_input_is_header_only() {
        assert_eq!(encode_ico(std::iter::empty()).unwrap(), vec![0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn bad_data_url_aborts() {
        let images = [fake(16, 1), RenderedImage::from_data_url("broken", 32)];
        assert!(matches!(
            encode_ico(&images),
            Err(EncodeError::Decode(DecodeError::MissingPayload))
        ));
    }

    #[test]
    fn count_at_directory_limit_is_accepted() {
        let images = vec![fake(16, 0); usize::from(u16::MAX)];
        let ico = encode_ico(&images).unwrap();
        assert_eq!(LittleEndian::read_u16(&ico[4..6]), u16::MAX);
        assert_eq!(ico.len(), 6 + 16 * usize::from(u16::MAX));
    }

    #[test]
    fn too_many_images_is_rejected() {
        let images = vec![fake(16, 0); usize::from(u16::MAX) + 1];
        assert!(matches!(
            encode_ico(&images),
            Err(EncodeError::TooManyImages { count: 65536, max: 65535 })
        ));
    }
}
