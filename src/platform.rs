//! Platform bundle targets and their file-layout conventions.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Platform
// ============================================================================

/// A platform whose icon layout can be bundled into the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum Platform {
    /// Density-bucketed `res/drawable-*` folders.
    Android,
    /// One `.ico` per icon set.
    Windows,
    /// One `.icns` per icon set.
    Macos,
    /// An `AppIcon.appiconset` folder with a `Contents.json` manifest.
    Ios,
}

impl Platform {
    /// All platforms, in the order their entries are emitted.
    pub const ALL: [Platform; 4] = [
        Platform::Android,
        Platform::Windows,
        Platform::Macos,
        Platform::Ios,
    ];

    /// Top-level archive folder for this platform.
    pub fn folder(self) -> &'static str {
        match self {
            Platform::Android => "android-set",
            Platform::Windows => "windows-set",
            Platform::Macos => "macos-set",
            Platform::Ios => "ios-set",
        }
    }
}

// ============================================================================
// PlatformOptions
// ============================================================================

/// Which platform bundles were requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct PlatformOptions {
    pub android: bool,
    pub windows: bool,
    pub macos: bool,
    pub ios: bool,
}

impl PlatformOptions {
    /// No bundling.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every platform enabled.
    pub fn all() -> Self {
        Self {
            android: true,
            windows: true,
            macos: true,
            ios: true,
        }
    }

    /// Enables a single platform.
    pub fn with(mut self, platform: Platform) -> Self {
        match platform {
            Platform::Android => self.android = true,
            Platform::Windows => self.windows = true,
            Platform::Macos => self.macos = true,
            Platform::Ios => self.ios = true,
        }
        self
    }

    pub fn is_enabled(&self, platform: Platform) -> bool {
        match platform {
            Platform::Android => self.android,
            Platform::Windows => self.windows,
            Platform::Macos => self.macos,
            Platform::Ios => self.ios,
        }
    }

    /// Returns true if any bundling was requested.
    pub fn any(&self) -> bool {
        self.android || self.windows || self.macos || self.ios
    }

    /// Enabled platforms in emission order.
    pub fn active(&self) -> impl Iterator<Item = Platform> + '_ {
        Platform::ALL.into_iter().filter(move |p| self.is_enabled(*p))
    }
}

impl FromIterator<Platform> for PlatformOptions {
    fn from_iter<I: IntoIterator<Item = Platform>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), Self::with)
    }
}

// ============================================================================
// Android densities
// ============================================================================

/// Android display-density bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Density {
    Mdpi,
    Hdpi,
    Xhdpi,
    Xxhdpi,
    Xxxhdpi,
}

impl Density {
    pub fn as_str(self) -> &'static str {
        match self {
            Density::Mdpi => "mdpi",
            Density::Hdpi => "hdpi",
            Density::Xhdpi => "xhdpi",
            Density::Xxhdpi => "xxhdpi",
            Density::Xxxhdpi => "xxxhdpi",
        }
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a pixel size to the density folder it is placed in.
pub fn android_density(size: u32) -> Density {
    match size {
        0..=48 => Density::Mdpi,
        49..=96 => Density::Hdpi,
        97..=160 => Density::Xhdpi,
        161..=240 => Density::Xxhdpi,
        _ => Density::Xxxhdpi,
    }
}

/// Archive path of one Android variant.
pub fn android_path(base_name: &str, size: u32) -> String {
    format!(
        "{}/{base_name}/res/drawable-{}/ic_{base_name}_{size}.png",
        Platform::Android.folder(),
        android_density(size)
    )
}

// ============================================================================
// iOS manifest
// ============================================================================

/// One image record of an `AppIcon.appiconset/Contents.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IosImage {
    /// `"<w>x<h>"` in points.
    pub size: String,
    pub idiom: String,
    pub filename: String,
    pub scale: String,
}

impl IosImage {
    /// A universal 1x record for a square image.
    pub fn universal(size: u32, filename: impl Into<String>) -> Self {
        Self {
            size: format!("{size}x{size}"),
            idiom: "universal".into(),
            filename: filename.into(),
            scale: "1x".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IosManifestInfo {
    pub version: u32,
    pub author: String,
}

impl Default for IosManifestInfo {
    fn default() -> Self {
        Self {
            version: 1,
            author: "xcode".into(),
        }
    }
}

/// The `Contents.json` index of an asset catalog icon set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IosManifest {
    pub images: Vec<IosImage>,
    pub info: IosManifestInfo,
}

impl IosManifest {
    /// Serializes with two-space indentation, the way Xcode writes it.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Folder holding the manifest and images of one iOS icon set.
pub fn ios_appiconset_dir(base_name: &str) -> String {
    format!("{}/{base_name}/AppIcon.appiconset", Platform::Ios.folder())
}
