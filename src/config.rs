use std::path::PathBuf;

use crate::style::{FontWeight, TextStyle, color_to_str, parse_color, parse_font_size};

pub const DEFAULT_EXPORT_NAME: &str = "iwt-image.png";

/// User preferences that seed each new session. Stored as `key=value` lines.
#[derive(Clone, Debug, PartialEq)]
pub struct Preferences {
    pub default_text: String,
    pub default_font_size: f32,
    pub default_family: String,
    pub default_color: [u8; 4],
    pub default_weight: FontWeight,
    /// Filename offered by the export dialog.
    pub export_file_name: String,
    /// Horizontal window chrome subtracted from the preview area.
    pub window_margin_x: f32,
    /// Vertical window chrome (heading + control bar) subtracted from the preview area.
    pub window_margin_y: f32,
    /// Optional web-fonts JSON catalog used instead of the system font list.
    pub fonts_catalog: Option<PathBuf>,
}

impl Default for Preferences {
    fn default() -> Self {
        let style = TextStyle::default();
        Self {
            default_text: style.text,
            default_font_size: style.font_size,
            default_family: style.family,
            default_color: style.color,
            default_weight: style.weight,
            export_file_name: DEFAULT_EXPORT_NAME.to_string(),
            window_margin_x: 64.0,
            window_margin_y: 176.0,
            fonts_catalog: None,
        }
    }
}

impl Preferences {
    /// Path to the settings file.
    /// On Linux:   ~/.config/iwt/iwt_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\ImageWithText\iwt_settings.cfg
    /// On macOS:   ~/Library/Application Support/ImageWithText/iwt_settings.cfg
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
                .ok()?
                .join("iwt");
            Some(config_dir.join("iwt_settings.cfg"))
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA").or_else(|_| std::env::var("USERPROFILE")).ok()?;
            Some(PathBuf::from(appdata).join("ImageWithText").join("iwt_settings.cfg"))
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").ok()?;
            Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("ImageWithText")
                    .join("iwt_settings.cfg"),
            )
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe().ok().and_then(|p| p.parent().map(|d| d.join("iwt_settings.cfg")))
        }
    }

    /// The style a fresh session starts with.
    pub fn initial_style(&self) -> TextStyle {
        TextStyle {
            text: self.default_text.clone(),
            color: self.default_color,
            font_size: self.default_font_size,
            weight: self.default_weight,
            family: self.default_family.clone(),
        }
    }

    /// Load settings from disk (defaults if the file is missing).
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else { return Self::default() };
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to disk. Failures are logged and otherwise ignored.
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Err(e) = std::fs::write(&path, self.to_config_string()) {
            crate::log_warn!("could not save settings to {}: {}", path.display(), e);
        }
    }

    /// Parse `key=value` lines. Unknown keys, blank lines, `#` comments and
    /// unparsable values are skipped, leaving that field at its default.
    pub fn parse(content: &str) -> Self {
        let mut prefs = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else { continue };
            let value = value.trim();
            match key.trim() {
                "default_text" => prefs.default_text = value.to_string(),
                "default_font_size" => {
                    if let Some(v) = parse_font_size(value) {
                        prefs.default_font_size = v;
                    }
                }
                "default_family" => {
                    if !value.is_empty() {
                        prefs.default_family = value.to_string();
                    }
                }
                "default_color" => {
                    if let Some(c) = parse_color(value) {
                        prefs.default_color = c;
                    }
                }
                "default_weight" => {
                    if let Ok(w) = value.parse::<u16>() {
                        prefs.default_weight = FontWeight::from_css_value(w);
                    }
                }
                "export_file_name" => {
                    if !value.is_empty() {
                        prefs.export_file_name = value.to_string();
                    }
                }
                "window_margin_x" => {
                    if let Some(v) = parse_margin(value) {
                        prefs.window_margin_x = v;
                    }
                }
                "window_margin_y" => {
                    if let Some(v) = parse_margin(value) {
                        prefs.window_margin_y = v;
                    }
                }
                "fonts_catalog" => {
                    prefs.fonts_catalog = (!value.is_empty()).then(|| PathBuf::from(value));
                }
                _ => {}
            }
        }
        prefs
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "default_text={}\n\
             default_font_size={}\n\
             default_family={}\n\
             default_color={}\n\
             default_weight={}\n\
             export_file_name={}\n\
             window_margin_x={}\n\
             window_margin_y={}\n\
             fonts_catalog={}\n",
            self.default_text,
            self.default_font_size,
            self.default_family,
            color_to_str(self.default_color),
            self.default_weight.css_value(),
            self.export_file_name,
            self.window_margin_x,
            self.window_margin_y,
            self.fonts_catalog
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        )
    }
}

fn parse_margin(value: &str) -> Option<f32> {
    value.parse::<f32>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}
