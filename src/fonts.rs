// ============================================================================
// FONT DIRECTORY: family listing and face loading
// ============================================================================

use std::path::PathBuf;

use ab_glyph::FontArc;
use font_kit::source::{Source, SystemSource};
use serde::Deserialize;

use crate::error::{IwtError, Result};
use crate::style::FontWeight;

/// A source of font family names for the family picker.
pub trait FontDirectory {
    /// Family names in the order the source provides them.
    fn families(&self) -> Result<Vec<String>>;
}

/// Families installed on this machine, via font-kit.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemFonts;

impl FontDirectory for SystemFonts {
    /// Sorted, de-duplicated family names. Only queries names, no font data
    /// is loaded.
    fn families(&self) -> Result<Vec<String>> {
        let mut families = SystemSource::new()
            .all_families()
            .map_err(|e| IwtError::Font(format!("cannot enumerate system fonts: {:?}", e)))?;
        families.sort();
        families.dedup();
        Ok(families)
    }
}

/// Families listed in a local copy of a web-fonts catalog, i.e. the JSON
/// shape `{"items": [{"family": "Roboto", ...}, ...]}`.
#[derive(Clone, Debug)]
pub struct WebfontsCatalog {
    path: PathBuf,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    items: Vec<CatalogItem>,
}

#[derive(Deserialize)]
struct CatalogItem {
    family: String,
}

impl WebfontsCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FontDirectory for WebfontsCatalog {
    fn families(&self) -> Result<Vec<String>> {
        let raw = std::fs::read_to_string(&self.path)?;
        parse_catalog(&raw)
    }
}

/// Family names from catalog JSON, keeping file order.
pub fn parse_catalog(json: &str) -> Result<Vec<String>> {
    let file: CatalogFile = serde_json::from_str(json)?;
    Ok(file.items.into_iter().map(|item| item.family).collect())
}

/// Family list for the picker. Failures are logged and replaced by a short
/// platform fallback list so the picker is never empty.
pub fn list_families(directory: &dyn FontDirectory) -> Vec<String> {
    match directory.families() {
        Ok(families) if !families.is_empty() => families,
        Ok(_) => fallback_families(),
        Err(e) => {
            crate::log_err!("Error fetching font list: {}", e);
            fallback_families()
        }
    }
}

fn fallback_families() -> Vec<String> {
    #[cfg(target_os = "linux")]
    {
        vec!["Liberation Sans".to_string(), "DejaVu Sans".to_string(), "Liberation Mono".to_string()]
    }
    #[cfg(not(target_os = "linux"))]
    {
        vec!["Arial".to_string(), "Times New Roman".to_string(), "Courier New".to_string()]
    }
}

/// A loaded face plus whether it really has the requested weight.
#[derive(Clone)]
pub struct LoadedFont {
    pub font: FontArc,
    pub family: String,
    /// `true` when bold was asked for but only a lighter face was found,
    /// so the rasterizer has to embolden it.
    pub synthetic_bold: bool,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("family", &self.family)
            .field("synthetic_bold", &self.synthetic_bold)
            .finish()
    }
}

/// Load `family` at `weight` from the system, falling back to the generic
/// sans-serif face and then to the face bundled with egui. `None` only when
/// even the bundled face cannot be parsed.
pub fn load_font(family: &str, weight: FontWeight) -> Option<LoadedFont> {
    use font_kit::family_name::FamilyName;

    let requested = [FamilyName::Title(family.to_string())];
    if let Some(loaded) = load_best_match(&requested, weight) {
        return Some(loaded);
    }
    crate::log_warn!("font '{}' not found, falling back to sans-serif", family);
    if let Some(loaded) = load_best_match(&[FamilyName::SansSerif], weight) {
        return Some(loaded);
    }
    crate::log_warn!("no system sans-serif face, using the bundled font");
    bundled_font(weight)
}

/// egui's default proportional face. Always available, independent of the
/// fonts installed on the machine. It has no bold variant.
pub fn bundled_font(weight: FontWeight) -> Option<LoadedFont> {
    let defs = egui::FontDefinitions::default();
    let name = defs.families.get(&egui::FontFamily::Proportional)?.first()?;
    let data = defs.font_data.get(name)?;
    let font = FontArc::try_from_vec(data.font.to_vec()).ok()?;

    Some(LoadedFont {
        font,
        family: name.clone(),
        synthetic_bold: weight == FontWeight::Bold,
    })
}

fn load_best_match(families: &[font_kit::family_name::FamilyName], weight: FontWeight) -> Option<LoadedFont> {
    use font_kit::properties::{Properties, Weight};

    let mut props = Properties::new();
    props.weight = Weight(weight.css_value() as f32);

    let handle = SystemSource::new().select_best_match(families, &props).ok()?;
    let face = handle.load().ok()?;
    let actual_weight = face.properties().weight.0;
    let family = face.family_name();
    let bytes: Vec<u8> = (*face.copy_font_data()?).clone();
    let font = FontArc::try_from_vec(bytes).ok()?;

    Some(LoadedFont {
        font,
        family,
        synthetic_bold: weight == FontWeight::Bold && actual_weight < 600.0,
    })
}
