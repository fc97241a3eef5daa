//! Output planning and per-source grouping.
//!
//! Each source image fans out into one or more [`OutputItem`]s. An item is
//! paired with its rendered image exactly once, into a [`RenderedOutput`], so
//! that the rest of the pipeline never correlates two lists by index.
//! [`group_outputs`] then rebuilds the per-source icon sets used for
//! platform bundles.

use std::collections::HashMap;

use crate::error::ExportError;
use crate::raster::RenderedImage;

// ============================================================================
// SourceImage / OutputItem
// ============================================================================

/// A source image as configured by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Base name used for every file derived from this image.
    pub name: String,
    /// Whether the image is exported at every configured icon-set size.
    pub icon_set: bool,
}

impl SourceImage {
    /// A freeform image exported once at its native size.
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon_set: false,
        }
    }

    /// An image exported at each configured icon-set size.
    pub fn icon_set(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon_set: true,
        }
    }
}

/// One requested output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputItem {
    /// Position of the source image in the configured list.
    pub source_index: usize,
    pub source_name: String,
    /// Whether the source is an icon-set image.
    pub icon_set: bool,
    /// Target size, or `None` for the image's native size.
    pub size: Option<u32>,
    /// File stem: `<name>` or `<name>-<size>`.
    pub display_name: String,
}

impl OutputItem {
    /// Name of the individual PNG file.
    pub fn file_name(&self) -> String {
        format!("{}.png", self.display_name)
    }

    /// Returns true if this item belongs in a platform bundle.
    pub fn is_groupable(&self) -> bool {
        self.icon_set && self.size.is_some()
    }
}

/// Flattens source images against the configured icon-set sizes.
///
/// A plain image yields one unsized item named after the image. An icon-set
/// image yields one item per size, in `sizes` order, named `<name>-<size>`.
pub fn plan_outputs(sources: &[SourceImage], sizes: &[u32]) -> Vec<OutputItem> {
    sources
        .iter()
        .enumerate()
        .flat_map(|(index, source)| {
            let item = move |size: Option<u32>| OutputItem {
                source_index: index,
                source_name: source.name.clone(),
                icon_set: source.icon_set,
                size,
                display_name: match size {
                    Some(size) => format!("{}-{}", source.name, size),
                    None => source.name.clone(),
                },
            };
            if source.icon_set {
                sizes.iter().map(|&size| item(Some(size))).collect::<Vec<_>>()
            } else {
                vec![item(None)]
            }
        })
        .collect()
}

// ============================================================================
// RenderedOutput
// ============================================================================

/// An output item together with its rendered image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    pub item: OutputItem,
    pub image: RenderedImage,
}

/// Pairs items with images that were rendered for them, position by position.
///
/// Fails if the lists differ in length rather than silently dropping the
/// tail of one of them.
pub fn pair_outputs(
    items: Vec<OutputItem>,
    images: Vec<RenderedImage>,
) -> Result<Vec<RenderedOutput>, ExportError> {
    if items.len() != images.len() {
        return Err(ExportError::OutputMismatch {
            items: items.len(),
            images: images.len(),
        });
    }
    Ok(items
        .into_iter()
        .zip(images)
        .map(|(item, image)| RenderedOutput { item, image })
        .collect())
}

// ============================================================================
// PlatformGroup
// ============================================================================

/// One size variant of an icon set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant<'a> {
    pub size: u32,
    pub image: &'a RenderedImage,
    pub display_name: &'a str,
}

/// All size variants of one icon-set source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformGroup<'a> {
    pub source_index: usize,
    pub source_name: &'a str,
    /// File stem shared by every platform file of this group.
    pub base_name: String,
    pub variants: Vec<Variant<'a>>,
}

impl<'a> PlatformGroup<'a> {
    /// The variant images, in group order.
    pub fn images(&self) -> impl Iterator<Item = &'a RenderedImage> + '_ {
        self.variants.iter().map(|v| v.image)
    }
}

/// Removes the trailing `-<token>` segment from a display name.
///
/// A name without any `-` strips to the empty string.
pub fn strip_size_suffix(name: &str) -> &str {
    name.rsplit_once('-').map_or("", |(base, _)| base)
}

/// Groups icon-set outputs by source image, in first-seen order.
///
/// Unsized outputs and outputs of plain images are skipped. The base name of
/// each group comes from its first member.
pub fn group_outputs(outputs: &[RenderedOutput]) -> Vec<PlatformGroup<'_>> {
    let mut groups: Vec<PlatformGroup<'_>> = Vec::new();
    let mut index: HashMap<(usize, &str), usize> = HashMap::new();

    for output in outputs {
        let item = &output.item;
        let Some(size) = item.size.filter(|_| item.is_groupable()) else {
            continue;
        };
        let key = (item.source_index, item.source_name.as_str());
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(PlatformGroup {
                source_index: item.source_index,
                source_name: &item.source_name,
                base_name: strip_size_suffix(&item.display_name).to_string(),
                variants: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].variants.push(Variant {
            size,
            image: &output.image,
            display_name: &item.display_name,
        });
    }

    log::trace!("grouped {} outputs into {} icon sets", outputs.len(), groups.len());
    groups
}
