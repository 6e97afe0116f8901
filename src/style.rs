// ============================================================================
// TEXT STYLE: the overlay's style record and input parsing
// ============================================================================

/// Largest font size (px) the size field accepts.
pub const MAX_FONT_SIZE: f32 = 32.0;

/// Font weight choices offered for the overlay text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

impl FontWeight {
    /// CSS-style numeric weight, as used by font matching.
    pub fn css_value(&self) -> u16 {
        match self {
            FontWeight::Regular => 400,
            FontWeight::Bold => 700,
        }
    }

    /// Nearest choice for a numeric weight (600 and up counts as bold).
    pub fn from_css_value(weight: u16) -> Self {
        if weight >= 600 { FontWeight::Bold } else { FontWeight::Regular }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FontWeight::Regular => "Regular",
            FontWeight::Bold => "Bold",
        }
    }
}

/// Style of the overlay text. Treated as an immutable value: edits build a
/// new record with the `with_*` methods and replace the old one.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub text: String,
    /// Straight (non-premultiplied) RGBA.
    pub color: [u8; 4],
    pub font_size: f32,
    pub weight: FontWeight,
    pub family: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text: "Hello".to_string(),
            color: [0, 0, 0, 255],
            font_size: 16.0,
            weight: FontWeight::Regular,
            family: "Arial".to_string(),
        }
    }
}

impl TextStyle {
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self { text: text.into(), ..self.clone() }
    }

    pub fn with_color(&self, color: [u8; 4]) -> Self {
        Self { color, ..self.clone() }
    }

    /// Sizes are clamped to `(0, MAX_FONT_SIZE]`; anything else keeps the
    /// current size.
    pub fn with_font_size(&self, size: f32) -> Self {
        let font_size = if size.is_finite() && size > 0.0 {
            size.min(MAX_FONT_SIZE)
        } else {
            self.font_size
        };
        Self { font_size, ..self.clone() }
    }

    pub fn with_weight(&self, weight: FontWeight) -> Self {
        Self { weight, ..self.clone() }
    }

    pub fn with_family(&self, family: impl Into<String>) -> Self {
        Self { family: family.into(), ..self.clone() }
    }
}

/// Parse the font size field.
///
/// Returns `None` for empty, non-numeric, non-finite or non-positive input
/// so the caller keeps its previous size. Values above [`MAX_FONT_SIZE`] are
/// clamped to it.
pub fn parse_font_size(input: &str) -> Option<f32> {
    let value: f32 = input.trim().parse().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Some(value.min(MAX_FONT_SIZE))
}

/// Parse a colour as `#rgb`, `#rrggbb`, `#rrggbbaa` or `r,g,b[,a]`.
pub fn parse_color(input: &str) -> Option<[u8; 4]> {
    let s = input.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex);
    }

    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let mut rgba = [0, 0, 0, 255];
    for (slot, part) in rgba.iter_mut().zip(&parts) {
        *slot = part.parse::<u8>().ok()?;
    }
    Some(rgba)
}

fn parse_hex_color(hex: &str) -> Option<[u8; 4]> {
    if !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let mut rgba = [0, 0, 0, 255];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgba[i] = v * 17;
            }
            Some(rgba)
        }
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => None,
    }
}

/// Format a colour the way the settings file stores it.
pub fn color_to_str(c: [u8; 4]) -> String {
    format!("{},{},{},{}", c[0], c[1], c[2], c[3])
}

/// The two session toggles. Reset wholesale on "start over".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SessionFlags {
    /// An image has been picked.
    pub selected: bool,
    /// The text element is being dragged.
    pub dragging: bool,
}
