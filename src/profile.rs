//! Serializable export configuration.
//!
//! An [`ExportProfile`] captures everything the export pipeline needs from
//! the user: the icon-set sizes, which platform bundles to build, and the
//! per-image flags. It round-trips through JSON so a frontend can hand it to
//! a backend unchanged.
//!
//! # Example
//!
//! ```
//! use iconset_export::{ExportProfile, ImageSettings, Platform, PlatformOptions};
//!
//! let profile = ExportProfile::new()
//!     .with_sizes([16, 32, 48])
//!     .with_platforms(PlatformOptions::none().with(Platform::Windows))
//!     .with_image(ImageSettings::icon_set("app"));
//!
//! let json = profile.to_json().unwrap();
//! let restored = ExportProfile::from_json(&json).unwrap();
//! assert_eq!(restored.icon_set_sizes, [16, 32, 48]);
//! ```

use serde::{Deserialize, Serialize};

use crate::output::SourceImage;
use crate::platform::PlatformOptions;

/// Icon-set sizes used when a profile does not list any.
pub const DEFAULT_ICON_SET_SIZES: [u32; 8] = [16, 32, 48, 64, 128, 256, 512, 1024];

fn default_sizes() -> Vec<u32> {
    DEFAULT_ICON_SET_SIZES.to_vec()
}

// ============================================================================
// ImageSettings
// ============================================================================

/// Per-image settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct ImageSettings {
    /// File stem for everything exported from this image.
    pub name: String,

    /// Export at every icon-set size instead of once at native size.
    #[serde(default)]
    pub icon_set: bool,

    /// Preview on a dark checkerboard. Only meaningful to a UI; never
    /// affects exported files.
    #[serde(default)]
    pub dark_checkers: bool,
}

impl ImageSettings {
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn icon_set(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon_set: true,
            ..Self::default()
        }
    }
}

impl From<&ImageSettings> for SourceImage {
    fn from(settings: &ImageSettings) -> Self {
        SourceImage {
            name: settings.name.clone(),
            icon_set: settings.icon_set,
        }
    }
}

// ============================================================================
// ExportProfile
// ============================================================================

/// A serializable profile containing all export settings.
///
/// # JSON Format
///
/// ```json
/// {
///   "iconSetSizes": [16, 32, 48],
///   "platforms": { "android": true, "windows": false, "macos": false, "ios": false },
///   "images": [
///     { "name": "app", "iconSet": true, "darkCheckers": false }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct ExportProfile {
    /// Sizes every icon-set image is exported at, in output order.
    #[serde(default = "default_sizes")]
    pub icon_set_sizes: Vec<u32>,

    /// Requested platform bundles.
    #[serde(default)]
    pub platforms: PlatformOptions,

    /// Source images, in output order.
    #[serde(default)]
    pub images: Vec<ImageSettings>,
}

impl Default for ExportProfile {
    fn default() -> Self {
        Self {
            icon_set_sizes: default_sizes(),
            platforms: PlatformOptions::default(),
            images: Vec::new(),
        }
    }
}

impl ExportProfile {
    /// Creates a profile with the default sizes, no platforms and no images.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sizes(mut self, sizes: impl IntoIterator<Item = u32>) -> Self {
        self.icon_set_sizes = sizes.into_iter().collect();
        self
    }

    pub fn with_platforms(mut self, platforms: PlatformOptions) -> Self {
        self.platforms = platforms;
        self
    }

    pub fn with_image(mut self, image: ImageSettings) -> Self {
        self.images.push(image);
        self
    }

    /// Returns true if any image is an icon-set image.
    pub fn icon_set_mode(&self) -> bool {
        self.images.iter().any(|image| image.icon_set)
    }

    /// The configured images as pipeline sources.
    pub fn sources(&self) -> Vec<SourceImage> {
        self.images.iter().map(SourceImage::from).collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
