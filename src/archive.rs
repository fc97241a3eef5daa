//! Archive assembly.
//!
//! Entry construction is synchronous and independent of the ZIP writer:
//! [`ArchiveBuilder`] collects [`ArchiveEntry`]s, and only
//! [`ArchiveBuilder::finish`] touches the archive machinery. Everything that
//! has format-correctness risk (paths, containers, manifests) can therefore
//! be tested by inspecting the entry list.

use std::collections::HashSet;
use std::io::{Cursor, Seek, Write};
use std::path::{Component, Path};

use rayon::prelude::*;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::ExportError;
use crate::icns::encode_icns;
use crate::ico::encode_ico;
use crate::output::{PlatformGroup, RenderedOutput, group_outputs};
use crate::platform::{
    IosImage, IosManifest, IosManifestInfo, Platform, PlatformOptions, android_path,
    ios_appiconset_dir,
};

/// Archive name when platform bundles were requested.
pub const BUNDLE_ARCHIVE_NAME: &str = "export-icon-resources.zip";

/// Archive name for a plain batch of PNGs.
pub const PLAIN_ARCHIVE_NAME: &str = "svg-to-png.zip";

/// Picks the archive file name.
pub fn archive_name(bundling: bool) -> &'static str {
    if bundling {
        BUNDLE_ARCHIVE_NAME
    } else {
        PLAIN_ARCHIVE_NAME
    }
}

// ============================================================================
// ArchiveEntry
// ============================================================================

/// Content of an archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryContent {
    Bytes(Vec<u8>),
    Text(String),
}

impl EntryContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Bytes(bytes) => bytes,
            Self::Text(text) => text.as_bytes(),
        }
    }
}

/// A single named file inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub content: EntryContent,
}

impl ArchiveEntry {
    pub fn bytes(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            content: EntryContent::Bytes(bytes),
        }
    }

    pub fn text(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: EntryContent::Text(text.into()),
        }
    }
}

// ============================================================================
// Platform entries
// ============================================================================

/// Builds the entries one platform contributes for one icon set.
pub fn platform_entries(
    group: &PlatformGroup<'_>,
    platform: Platform,
) -> Result<Vec<ArchiveEntry>, ExportError> {
    let base = &group.base_name;
    let entries = match platform {
        Platform::Android => group
            .variants
            .iter()
            .map(|v| {
                Ok::<_, ExportError>(ArchiveEntry::bytes(
                    android_path(base, v.size),
                    v.image.bytes()?.into_owned(),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Platform::Windows => vec![ArchiveEntry::bytes(
            format!("{}/{base}.ico", platform.folder()),
            encode_ico(group.images())?,
        )],
        Platform::Macos => vec![ArchiveEntry::bytes(
            format!("{}/{base}.icns", platform.folder()),
            encode_icns(group.images())?,
        )],
        Platform::Ios => {
            let dir = ios_appiconset_dir(base);
            let manifest = IosManifest {
                images: group
                    .variants
                    .iter()
                    .map(|v| IosImage::universal(v.size, format!("{}.png", v.display_name)))
                    .collect(),
                info: IosManifestInfo::default(),
            };
            let mut entries = vec![ArchiveEntry::text(
                format!("{dir}/Contents.json"),
                manifest.to_json_pretty()?,
            )];
            for v in &group.variants {
                entries.push(ArchiveEntry::bytes(
                    format!("{dir}/{}.png", v.display_name),
                    v.image.bytes()?.into_owned(),
                ));
            }
            entries
        }
    };
    Ok(entries)
}

/// Builds the entries of every active platform for one icon set.
pub fn group_entries(
    group: &PlatformGroup<'_>,
    platforms: PlatformOptions,
) -> Result<Vec<ArchiveEntry>, ExportError> {
    let mut entries = Vec::new();
    for platform in platforms.active() {
        entries.extend(platform_entries(group, platform)?);
    }
    Ok(entries)
}

// ============================================================================
// ArchiveBuilder
// ============================================================================

/// The finished archive, ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveBlob {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Collects entries and writes them into a ZIP archive in one step.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: Vec<ArchiveEntry>,
    paths: HashSet<String>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. Each path may only be added once, and must stay inside
    /// the archive root (see [`is_contained_path`]).
    pub fn push(&mut self, entry: ArchiveEntry) -> Result<(), ExportError> {
        if !is_contained_path(&entry.path) {
            return Err(ExportError::UnsafePath(entry.path));
        }
        if !self.paths.insert(entry.path.clone()) {
            return Err(ExportError::DuplicateEntry(entry.path));
        }
        log::trace!("archive entry {}", entry.path);
        self.entries.push(entry);
        Ok(())
    }

    pub fn extend(
        &mut self,
        entries: impl IntoIterator<Item = ArchiveEntry>,
    ) -> Result<(), ExportError> {
        entries.into_iter().try_for_each(|entry| self.push(entry))
    }

    /// Adds one `<display name>.png` entry per output.
    pub fn push_outputs(&mut self, outputs: &[RenderedOutput]) -> Result<(), ExportError> {
        for output in outputs {
            let bytes = output.image.bytes()?.into_owned();
            self.push(ArchiveEntry::bytes(output.item.file_name(), bytes))?;
        }
        Ok(())
    }

    /// Adds the platform bundles of every icon set among `outputs`.
    ///
    /// Icon sets are encoded in parallel; their entries are added in group
    /// order so the archive layout is deterministic.
    pub fn push_platform_bundles(
        &mut self,
        outputs: &[RenderedOutput],
        platforms: PlatformOptions,
    ) -> Result<(), ExportError> {
        if !platforms.any() {
            return Ok(());
        }
        let groups = group_outputs(outputs);
        let per_group = groups
            .par_iter()
            .map(|group| group_entries(group, platforms))
            .collect::<Result<Vec<_>, ExportError>>()?;
        self.extend(per_group.into_iter().flatten())
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes every entry and closes the archive.
    pub fn finish(self, file_name: impl Into<String>) -> Result<ArchiveBlob, ExportError> {
        let file_name = file_name.into();
        let bytes = self.write_to(Cursor::new(Vec::new()))?.into_inner();
        log::debug!(
            "wrote {} ({} entries, {} bytes)",
            file_name,
            self.entries.len(),
            bytes.len()
        );
        Ok(ArchiveBlob { file_name, bytes })
    }

    /// Streams every entry into `writer` as a ZIP archive and returns the
    /// writer. Any failure is reported as [`ExportError::Archive`].
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W, ExportError> {
        let mut zip = ZipWriter::new(writer);
        for entry in &self.entries {
            zip.start_file(entry.path.as_str(), entry_options())?;
            zip.write_all(entry.content.as_bytes())
                .map_err(|err| ExportError::Archive(err.into()))?;
        }
        Ok(zip.finish()?)
    }
}

/// Returns true if `path` is a relative file path built only from plain
/// `/`-separated names, so it cannot leave the directory it is joined to.
pub fn is_contained_path(path: &str) -> bool {
    !path.is_empty()
        && !path.ends_with('/')
        && !path.contains('\\')
        && Path::new(path)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Builds the complete archive for a set of rendered outputs.
///
/// Every output is included as an individual PNG; platform bundles are added
/// for icon-set images when any platform is enabled.
pub fn assemble(
    outputs: &[RenderedOutput],
    platforms: PlatformOptions,
) -> Result<ArchiveBuilder, ExportError> {
    let mut builder = ArchiveBuilder::new();
    builder.push_outputs(outputs)?;
    builder.push_platform_bundles(outputs, platforms)?;
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{SourceImage, plan_outputs};
    use crate::platform::Platform;
    use crate::raster::RenderedImage;
    use std::io::Read;

    fn outputs(sources: &[SourceImage], sizes: &[u32]) -> Vec<RenderedOutput> {
        plan_outputs(sources, sizes)
            .into_iter()
            .map(|item| {
                let data = format!("png:{}", item.display_name).into_bytes();
                let image = RenderedImage::new(data, item.size.unwrap_or(300));
                RenderedOutput { item, image }
            })
            .collect()
    }

    fn paths(builder: &ArchiveBuilder) -> Vec<&str> {
        builder.entries().iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn plain_outputs_only() {
        let outs = outputs(&[SourceImage::single("logo"), SourceImage::icon_set("app")], &[16]);
        let builder = assemble(&outs, PlatformOptions::none()).unwrap();
        assert_eq!(paths(&builder), ["logo.png", "app-16.png"]);
    }

    #[test]
    fn android_only_bundle() {
        let outs = outputs(&[SourceImage::icon_set("app")], &[48, 96]);
        let builder = assemble(&outs, PlatformOptions::none().with(Platform::Android)).unwrap();

        let bundled: Vec<_> = paths(&builder)
            .into_iter()
            .filter(|p| p.starts_with("android-set/"))
            .collect();
        assert_eq!(
            bundled,
            [
                "android-set/app/res/drawable-mdpi/ic_app_48.png",
                "android-set/app/res/drawable-hdpi/ic_app_96.png",
            ]
        );
        assert!(
            paths(&builder)
                .iter()
                .all(|p| !p.ends_with(".ico") && !p.ends_with(".icns"))
        );
        assert_eq!(builder.len(), 4);
    }

    #[test]
    fn every_platform() {
        let outs = outputs(&[SourceImage::icon_set("app")], &[32, 256]);
        let builder = assemble(&outs, PlatformOptions::all()).unwrap();
        assert_eq!(
            paths(&builder),
            [
                "app-32.png",
                "app-256.png",
                "android-set/app/res/drawable-mdpi/ic_app_32.png",
                "android-set/app/res/drawable-xxxhdpi/ic_app_256.png",
                "windows-set/app.ico",
                "macos-set/app.icns",
                "ios-set/app/AppIcon.appiconset/Contents.json",
                "ios-set/app/AppIcon.appiconset/app-32.png",
                "ios-set/app/AppIcon.appiconset/app-256.png",
            ]
        );

        let ico = &builder.entries()[4].content;
        assert_eq!(&ico.as_bytes()[..6], &[0, 0, 1, 0, 2, 0]);
        let icns = &builder.entries()[5].content;
        assert_eq!(&icns.as_bytes()[..4], b"icns");

        let EntryContent::Text(manifest) = &builder.entries()[6].content else {
            panic!("manifest should be text");
        };
        let manifest = IosManifest::from_json(manifest).unwrap();
        assert_eq!(manifest.images.len(), 2);
        assert_eq!(manifest.images[1].size, "256x256");
        assert_eq!(manifest.images[1].filename, "app-256.png");
        assert_eq!(manifest.images[1].idiom, "universal");
        assert_eq!(manifest.images[1].scale, "1x");
    }

    #[test]
    fn plain_images_are_not_bundled() {
        let outs = outputs(&[SourceImage::single("banner")], &[16, 32]);
        let builder = assemble(&outs, PlatformOptions::all()).unwrap();
        assert_eq!(paths(&builder), ["banner.png"]);
    }

    #[test]
    fn duplicate_paths_are_rejected() {
        let mut builder = ArchiveBuilder::new();
        builder.push(ArchiveEntry::text("a.txt", "one")).unwrap();
        let err = builder.push(ArchiveEntry::text("a.txt", "two")).unwrap_err();
        assert!(matches!(err, ExportError::DuplicateEntry(path) if path == "a.txt"));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn bad_raster_aborts_assembly() {
        let mut outs = outputs(&[SourceImage::icon_set("app")], &[16]);
        outs[0].image = RenderedImage::from_data_url("not-a-data-url", 16);
        assert!(matches!(
            assemble(&outs, PlatformOptions::none()),
            Err(ExportError::Decode(_))
        ));
    }

    #[test]
    fn finish_writes_readable_zip() {
        let outs = outputs(&[SourceImage::icon_set("app")], &[16, 32]);
        let builder = assemble(&outs, PlatformOptions::none().with(Platform::Windows)).unwrap();
        let expected: Vec<_> = builder.entries().to_vec();

        let blob = builder.finish(archive_name(true)).unwrap();
        assert_eq!(blob.file_name, "export-icon-resources.zip");

        let mut zip = zip::ZipArchive::new(Cursor::new(blob.bytes)).unwrap();
        assert_eq!(zip.len(), expected.len());
        for entry in &expected {
            let mut file = zip.by_name(&entry.path).unwrap();
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            assert_eq!(data, entry.content.as_bytes());
        }
    }

    #[test]
    fn archive_names() {
        assert_eq!(archive_name(false), "svg-to-png.zip");
        assert_eq!(archive_name(true), "export-icon-resources.zip");
    }

    #[test]
    fn contained_paths() {
        for path in [
            "app.png",
            "android-set/app/res/drawable-mdpi/ic_app_16.png",
            "ios/app.appiconset/Contents.json",
        ] {
            assert!(is_contained_path(path), "{path}");
        }
        for path in [
            "",
            "../app.png",
            "a/../../b.png",
            "/etc/app.png",
            "./app.png",
            "a\\b",
            "dir/",
        ] {
            assert!(!is_contained_path(path), "{path}");
        }
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let mut builder = ArchiveBuilder::new();
        let err = builder.push(ArchiveEntry::text("../evil.txt", "x")).unwrap_err();
        assert!(matches!(err, ExportError::UnsafePath(path) if path == "../evil.txt"));
        assert!(builder.is_empty());
    }

    #[test]
    fn escaping_android_path_is_rejected() {
        let mut outs = outputs(&[SourceImage::icon_set("app")], &[48]);
        outs[0].item.display_name = "../../app-48".into();
        let err = ArchiveBuilder::new()
            .push_platform_bundles(&outs, PlatformOptions::none().with(Platform::Android))
            .unwrap_err();
        assert!(matches!(err, ExportError::UnsafePath(_)));
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Seek for BrokenWriter {
        fn seek(&mut self, _: std::io::SeekFrom) -> std::io::Result<u64> {
            Ok(0)
        }
    }

    #[test]
    fn write_failure_is_an_archive_error() {
        let outs = outputs(&[SourceImage::single("banner")], &[]);
        let builder = assemble(&outs, PlatformOptions::none()).unwrap();
        assert!(matches!(
            builder.write_to(BrokenWriter),
            Err(ExportError::Archive(_))
        ));
    }
}
