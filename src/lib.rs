//! iconset-export: Icon-set export pipeline
//!
//! This crate turns rendered images into downloadable artifacts: individual
//! PNG files, Windows `.ico` and macOS `.icns` containers, and a ZIP archive
//! bundling them with the folder layouts Android and iOS tooling expect.
//!
//! Rendering itself is left to the caller through the [`Renderer`] trait, and
//! saving through [`SaveTarget`].
//!
//! # Example
//!
//! ```
//! use iconset_export::{
//!     ExportProfile, IconExporter, ImageSettings, Platform, PlatformOptions, RenderedImage,
//!     SourceImage, ExportError,
//! };
//!
//! let profile = ExportProfile::new()
//!     .with_sizes([16, 32, 48])
//!     .with_platforms(PlatformOptions::none().with(Platform::Android))
//!     .with_image(ImageSettings::icon_set("app"));
//! let exporter = IconExporter::new(profile);
//!
//! // Any closure can act as a renderer.
//! let renderer = |_: &SourceImage, size: Option<u32>| -> Result<RenderedImage, ExportError> {
//!     let size = size.unwrap_or(128);
//!     RenderedImage::from_rgba(&image::RgbaImage::new(size, size))
//! };
//!
//! let outputs = exporter.render(&renderer).unwrap();
//! let blob = exporter.export_zip(&outputs).unwrap();
//! assert_eq!(blob.file_name, "export-icon-resources.zip");
//! ```
//!
//! # Containers
//!
//! The encoders can be used on their own:
//!
//! ```
//! use iconset_export::{encode_icns, encode_ico, RenderedImage};
//!
//! let images = [
//!     RenderedImage::new(b"16px png".to_vec(), 16),
//!     RenderedImage::new(b"256px png".to_vec(), 256),
//! ];
//! let ico = encode_ico(&images).unwrap();
//! assert_eq!(&ico[..6], &[0, 0, 1, 0, 2, 0]);
//!
//! let icns = encode_icns(&images).unwrap();
//! assert_eq!(&icns[..4], b"icns");
//! ```

mod archive;
mod binary;
mod error;
mod exporter;
mod icns;
mod ico;
mod output;
mod platform;
mod profile;
mod raster;

pub use archive::{
    ArchiveBlob, ArchiveBuilder, ArchiveEntry, BUNDLE_ARCHIVE_NAME, EntryContent,
    PLAIN_ARCHIVE_NAME, archive_name, assemble, group_entries, is_contained_path, platform_entries,
};
pub use binary::ByteWriter;
pub use error::{DecodeError, EncodeError, ExportError};
pub use exporter::{DirectorySaver, IconExporter, Renderer, SaveTarget};
pub use icns::{IcnsType, OSType, encode_icns};
pub use ico::{dimension_byte, encode_ico};
pub use output::{
    OutputItem, PlatformGroup, RenderedOutput, SourceImage, Variant, group_outputs, pair_outputs,
    plan_outputs, strip_size_suffix,
};
pub use platform::{
    Density, IosImage, IosManifest, IosManifestInfo, Platform, PlatformOptions, android_density,
    android_path, ios_appiconset_dir,
};
pub use profile::{DEFAULT_ICON_SET_SIZES, ExportProfile, ImageSettings};
pub use raster::{Raster, RenderedImage, decode_data_url, encode_data_url};
