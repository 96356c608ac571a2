//! Raw Color Usage Detector
//!
//! Detects hardcoded colors (`#RRGGBB`, `@android:color/...`) in color-bearing
//! attributes of drawable, layout, color and values resources.
//!
//! ## Detection Algorithm
//!
//! 1. While files are visited, `res/values/colors.xml` fills the palette
//!    (`<color name="primary">#5C6BC0</color>`) and every raw color attribute
//!    of every resource file is recorded as a pending usage
//! 2. Once the whole project was visited, each pending usage is looked up in
//!    the complete palette; a match gets a fix pointing at `@color/<name>`
//!
//! Lookup waits for the end of the run because file visit order is not
//! guaranteed: a layout may be seen before colors.xml.

use super::ResourceDetector;
use crate::analysis::{Diagnostic, Fix, RuleId};
use crate::parser::xml::{ResourceDocument, ResourceFolderType, XmlAttribute};
use crate::tree::Location;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Default suffix of the canonical palette file
pub const DEFAULT_COLORS_FILE: &str = "res/values/colors.xml";

/// Attributes whose values are colors; the empty name is the default attribute
const COLOR_ATTRIBUTES: [&str; 5] = ["color", "fillColor", "tint", "background", ""];

const ANDROID_COLOR_PREFIX: &str = "@android:color/";

/// Normalize a color for palette comparison
///
/// Hex colors become uppercase `#AARRGGBB` (`#RGB`, `#ARGB` and `#RRGGBB`
/// are expanded with an opaque alpha). Anything else is only trimmed.
pub fn normalize_color(value: &str) -> String {
    let value = value.trim();
    let Some(hex) = value.strip_prefix('#') else {
        return value.to_string();
    };
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return value.to_string();
    }
    let hex = hex.to_ascii_uppercase();
    let doubled = |s: &str| s.chars().flat_map(|c| [c, c]).collect::<String>();
    match hex.len() {
        3 => format!("#FF{}", doubled(&hex)),
        4 => format!("#{}", doubled(&hex)),
        6 => format!("#FF{}", hex),
        8 => format!("#{}", hex),
        _ => value.to_string(),
    }
}

/// Project color palette in definition order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<(String, String)>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a color; redefining a name replaces its value in place
    pub fn insert(&mut self, name: &str, value: &str) {
        let value = value.trim().to_string();
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// First palette name whose normalized value equals `value`'s
    pub fn find_name(&self, value: &str) -> Option<&str> {
        let wanted = normalize_color(value);
        self.entries
            .iter()
            .find(|(_, v)| normalize_color(v) == wanted)
            .map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A raw color awaiting palette resolution
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RawColorUsage {
    pub location: Location,
    pub color: String,
}

/// Detector for hardcoded colors in resource files
pub struct RawColorUsageDetector {
    /// Path suffix of the palette file
    colors_file: String,
    palette: Mutex<Palette>,
    usages: Mutex<Vec<RawColorUsage>>,
}

impl RawColorUsageDetector {
    pub fn new() -> Self {
        Self::with_colors_file(DEFAULT_COLORS_FILE)
    }

    pub fn with_colors_file(colors_file: &str) -> Self {
        Self {
            colors_file: colors_file.trim_start_matches('/').to_string(),
            palette: Mutex::new(Palette::new()),
            usages: Mutex::new(Vec::new()),
        }
    }

    fn is_colors_file(&self, document: &ResourceDocument) -> bool {
        let path = document.path.to_string_lossy().replace('\\', "/");
        let suffix_matches = path == self.colors_file
            || path.ends_with(&format!("/{}", self.colors_file));
        suffix_matches && document.root_name() == Some("resources")
    }

    fn is_raw_color(value: &str) -> bool {
        value.starts_with('#') || value.starts_with(ANDROID_COLOR_PREFIX)
    }

    fn fix_for(usage: &RawColorUsage, name: &str) -> Fix {
        let replacement = format!("@color/{}", name);
        Fix::replace(
            format!("Replace with {}", replacement),
            usage.location.clone(),
            usage.color.clone(),
            replacement,
        )
    }

    fn resolve(palette: &Palette, usage: RawColorUsage) -> Diagnostic {
        let name = if usage.color.starts_with('#') {
            palette.find_name(&usage.color)
        } else {
            None
        };
        let fix = name.map(|name| Self::fix_for(&usage, name));
        Diagnostic::new(RuleId::RawColorUsage, usage.location).with_optional_fix(fix)
    }
}

impl Default for RawColorUsageDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceDetector for RawColorUsageDetector {
    fn rule(&self) -> RuleId {
        RuleId::RawColorUsage
    }

    fn applies_to(&self, folder_type: ResourceFolderType) -> bool {
        matches!(
            folder_type,
            ResourceFolderType::Drawable
                | ResourceFolderType::Layout
                | ResourceFolderType::Color
                | ResourceFolderType::Values
        )
    }

    fn visit_document(&self, document: &ResourceDocument) {
        if !self.is_colors_file(document) {
            return;
        }
        let mut palette = self.palette.lock().unwrap_or_else(PoisonError::into_inner);
        for element in document.top_level_elements().filter(|e| e.name == "color") {
            // Entries without a name or a value are skipped
            let Some(name) = element.attribute("name").map(|a| a.value.as_str()) else {
                continue;
            };
            let Some(value) = element.text.as_deref().filter(|t| !t.trim().is_empty()) else {
                continue;
            };
            palette.insert(name, value);
        }
        debug!(
            "Palette has {} colors after {}",
            palette.len(),
            document.path.display()
        );
    }

    fn visit_attribute(&self, _document: &ResourceDocument, attribute: &XmlAttribute) {
        if !COLOR_ATTRIBUTES.contains(&attribute.local_name.as_str()) {
            return;
        }
        if !Self::is_raw_color(&attribute.value) {
            return;
        }
        self.usages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RawColorUsage {
                location: attribute.location.clone(),
                color: attribute.value.clone(),
            });
    }

    fn finalize(self: Box<Self>) -> Vec<Diagnostic> {
        let palette = self
            .palette
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let mut usages = self
            .usages
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        usages.sort();
        usages.dedup();

        debug!(
            "Resolving {} raw color usages against {} palette entries",
            usages.len(),
            palette.len()
        );

        usages
            .into_iter()
            .map(|usage| Self::resolve(&palette, usage))
            .collect()
    }
}
