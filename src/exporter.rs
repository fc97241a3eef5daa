//! Top-level export engine.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::archive::{ArchiveBlob, archive_name, assemble, is_contained_path};
use crate::error::ExportError;
use crate::output::{OutputItem, RenderedOutput, SourceImage, plan_outputs};
use crate::profile::ExportProfile;
use crate::raster::RenderedImage;

// ============================================================================
// Collaborator traits
// ============================================================================

/// Produces a rendered raster for a source image.
///
/// `size` is `None` when the image should be rendered at its native size.
/// Any `Fn(&SourceImage, Option<u32>) -> Result<RenderedImage, ExportError>`
/// closure is a renderer.
pub trait Renderer {
    fn render(&self, source: &SourceImage, size: Option<u32>) -> Result<RenderedImage, ExportError>;
}

impl<F> Renderer for F
where
    F: Fn(&SourceImage, Option<u32>) -> Result<RenderedImage, ExportError>,
{
    fn render(
        &self,
        source: &SourceImage,
        size: Option<u32>,
    ) -> Result<RenderedImage, ExportError> {
        self(source, size)
    }
}

/// Stores a named file produced by an export.
pub trait SaveTarget {
    fn save(&mut self, name: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Collects saved files in memory, keyed by name.
impl SaveTarget for BTreeMap<String, Vec<u8>> {
    fn save(&mut self, name: &str, bytes: &[u8]) -> io::Result<()> {
        self.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Writes saved files into a directory, creating it if needed.
///
/// Names that would resolve outside the directory (absolute paths, `..`
/// components) are refused with [`io::ErrorKind::InvalidInput`].
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    root: PathBuf,
}

impl DirectorySaver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SaveTarget for DirectorySaver {
    fn save(&mut self, name: &str, bytes: &[u8]) -> io::Result<()> {
        if !is_contained_path(name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to save {name:?} outside {}", self.root.display()),
            ));
        }
        let path = self.root.join(name);
        fs::create_dir_all(path.parent().unwrap_or(&self.root))?;
        fs::write(path, bytes)
    }
}

// ============================================================================
// IconExporter
// ============================================================================

/// Main export engine.
///
/// `IconExporter` holds an [`ExportProfile`] and drives the pipeline:
///
/// 1. **Plan** ([`output_items`](Self::output_items)) - one item per file to render
/// 2. **Render** ([`render`](Self::render)) - items paired with their images
/// 3. **Export** ([`export_zip`](Self::export_zip), [`export_pngs`](Self::export_pngs))
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use iconset_export::{
///     ExportError, ExportProfile, IconExporter, ImageSettings, PlatformOptions,
///     RenderedImage, SourceImage,
/// };
///
/// let profile = ExportProfile::new()
///     .with_sizes([16, 32])
///     .with_platforms(PlatformOptions::all())
///     .with_image(ImageSettings::icon_set("app"));
/// let exporter = IconExporter::new(profile);
///
/// let renderer = |_: &SourceImage, size: Option<u32>| -> Result<RenderedImage, ExportError> {
///     let size = size.unwrap_or(64);
///     RenderedImage::from_rgba(&image::RgbaImage::new(size, size))
/// };
/// let outputs = exporter.render(&renderer).unwrap();
///
/// let mut saved: BTreeMap<String, Vec<u8>> = BTreeMap::new();
/// exporter.save_zip(&outputs, &mut saved).unwrap();
/// assert!(saved.contains_key("export-icon-resources.zip"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct IconExporter {
    profile: ExportProfile,
}

impl IconExporter {
    pub fn new(profile: ExportProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ExportProfile {
        &self.profile
    }

    /// Replaces the profile. Outputs rendered under the old profile should be
    /// rendered again.
    pub fn set_profile(&mut self, profile: ExportProfile) {
        self.profile = profile;
    }

    /// The flat list of files the profile asks for, in output order.
    pub fn output_items(&self) -> Vec<OutputItem> {
        plan_outputs(&self.profile.sources(), &self.profile.icon_set_sizes)
    }

    /// Renders every planned output, in order.
    ///
    /// The first renderer failure aborts the whole run.
    pub fn render<R: Renderer + ?Sized>(
        &self,
        renderer: &R,
    ) -> Result<Vec<RenderedOutput>, ExportError> {
        let sources = self.profile.sources();
        plan_outputs(&sources, &self.profile.icon_set_sizes)
            .into_iter()
            .map(|item| {
                let image = renderer.render(&sources[item.source_index], item.size)?;
                Ok::<_, ExportError>(RenderedOutput { item, image })
            })
            .collect::<Result<Vec<_>, _>>()
    }

    /// Returns true if platform bundles will be added to the archive.
    pub fn bundling(&self) -> bool {
        self.profile.platforms.any()
    }

    /// Builds the archive: every output as a PNG, plus the requested platform
    /// bundles for icon-set images.
    pub fn export_zip(&self, outputs: &[RenderedOutput]) -> Result<ArchiveBlob, ExportError> {
        let builder = assemble(outputs, self.profile.platforms)?;
        builder.finish(archive_name(self.bundling()))
    }

    /// Builds the archive and hands it to `target`.
    pub fn save_zip<T: SaveTarget + ?Sized>(
        &self,
        outputs: &[RenderedOutput],
        target: &mut T,
    ) -> Result<ArchiveBlob, ExportError> {
        let blob = self.export_zip(outputs)?;
        target.save(&blob.file_name, &blob.bytes)?;
        Ok(blob)
    }

    /// Saves a single output as `<display name>.png`.
    pub fn export_png<T: SaveTarget + ?Sized>(
        &self,
        output: &RenderedOutput,
        target: &mut T,
    ) -> Result<(), ExportError> {
        let bytes = output.image.bytes()?;
        target.save(&output.item.file_name(), &bytes)?;
        Ok(())
    }

    /// Saves every output as an individual PNG.
    pub fn export_pngs<T: SaveTarget + ?Sized>(
        &self,
        outputs: &[RenderedOutput],
        target: &mut T,
    ) -> Result<(), ExportError> {
        for output in outputs {
            self.export_png(output, target)?;
        }
        log::debug!("saved {} individual PNGs", outputs.len());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
