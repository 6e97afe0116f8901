use eframe::egui;
use egui::{Color32, ColorImage, CursorIcon, Pos2, Rect, Sense, TextureHandle, TextureOptions, Vec2};

use iwt::compose::{rasterize_overlay, render_view};
use iwt::config::Preferences;
use iwt::fonts::{FontDirectory, LoadedFont, SystemFonts, WebfontsCatalog, list_families, load_font};
use iwt::geometry::{AvailableArea, Bounds};
use iwt::io::{SaveFormat, encode_and_write};
use iwt::style::{FontWeight, TextStyle, parse_font_size};
use iwt::{EditorSession, log_err, log_info};

const FULL_UV: Rect = Rect { min: Pos2 { x: 0.0, y: 0.0 }, max: Pos2 { x: 1.0, y: 1.0 } };

/// Rasterized overlay text and the style it was built from.
struct TextTexture {
    style: TextStyle,
    texture: Option<TextureHandle>,
    size: Vec2,
}

pub struct IwtApp {
    session: EditorSession,
    prefs: Preferences,
    families: Vec<String>,

    /// Face for the current family/weight; `None` draws no text at all.
    font: Option<LoadedFont>,
    font_key: Option<(String, FontWeight)>,

    image_texture: Option<TextureHandle>,
    text_texture: Option<TextTexture>,

    /// Raw contents of the editable fields.
    text_input: String,
    size_input: String,

    /// Last area the image was fitted to, for spotting window resizes.
    last_area: Option<AvailableArea>,
}

impl IwtApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let prefs = Preferences::load();
        let directory: Box<dyn FontDirectory> = match &prefs.fonts_catalog {
            Some(path) => Box::new(WebfontsCatalog::new(path)),
            None => Box::new(SystemFonts),
        };
        let families = list_families(directory.as_ref());
        log_info!("{} font families available", families.len());

        let style = prefs.initial_style();
        Self {
            text_input: style.text.clone(),
            size_input: style.font_size.to_string(),
            session: EditorSession::new(style),
            prefs,
            families,
            font: None,
            font_key: None,
            image_texture: None,
            text_texture: None,
            last_area: None,
        }
    }

    fn available_area(&self, ctx: &egui::Context) -> Option<AvailableArea> {
        let screen = ctx.screen_rect().size();
        AvailableArea::from_window(screen.x, screen.y, self.prefs.window_margin_x, self.prefs.window_margin_y)
    }

    fn upload_image(&mut self, ctx: &egui::Context) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "webp", "bmp", "gif", "tga", "tiff", "tif", "ico"])
            .pick_file()
        else {
            return;
        };

        let area = self.available_area(ctx);
        // Errors are already logged; the start screen simply stays up.
        if self.session.open_image(&path, area).is_ok()
            && let Some(image) = &self.session.image
        {
            let (w, h) = image.natural_size();
            let color_image = ColorImage::from_rgba_unmultiplied([w as usize, h as usize], image.pixels.as_raw());
            self.image_texture = Some(ctx.load_texture("source_image", color_image, TextureOptions::LINEAR));
            self.last_area = area;
        }
    }

    fn start_over(&mut self) {
        self.session.reset();
        self.image_texture = None;
        self.text_texture = None;
        self.last_area = None;
    }

    fn download_image(&mut self) {
        let Some(image) = &self.session.image else { return };
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(self.prefs.export_file_name.as_str())
            .add_filter("PNG", &["png"])
            .add_filter("JPEG", &["jpg", "jpeg"])
            .add_filter("BMP", &["bmp"])
            .add_filter("TGA", &["tga"])
            .save_file()
        else {
            return;
        };

        let composed = render_view(
            image,
            &self.session.fit,
            &self.session.style,
            self.session.position,
            self.font.as_ref(),
        );
        match encode_and_write(&composed, &path, SaveFormat::from_path(&path), 90) {
            Ok(()) => log_info!("exported {}", path.display()),
            Err(e) => log_err!("export to {} failed: {}", path.display(), e),
        }
    }

    /// Reload the face when family or weight changed.
    fn ensure_font(&mut self) {
        let key = (self.session.style.family.clone(), self.session.style.weight);
        if self.font_key.as_ref() == Some(&key) {
            return;
        }
        self.font = load_font(&key.0, key.1);
        if self.font.is_none() {
            log_err!("no usable font for '{}'", key.0);
        }
        self.font_key = Some(key);
        self.text_texture = None;
    }

    /// Re-rasterize the overlay when the style changed.
    fn ensure_text_texture(&mut self, ctx: &egui::Context) {
        if self.text_texture.as_ref().is_some_and(|t| t.style == self.session.style) {
            return;
        }
        let style = self.session.style.clone();

        // The export composites this same raster.
        let Some(font) = &self.font else {
            self.text_texture = None;
            return;
        };
        let raster = rasterize_overlay(&style, font, 1.0);
        let texture = (!raster.is_empty()).then(|| {
            let img = ColorImage::from_rgba_unmultiplied(
                [raster.width as usize, raster.height as usize],
                &raster.buf,
            );
            ctx.load_texture("overlay_text", img, TextureOptions::LINEAR)
        });
        let size = Vec2::new(raster.width as f32, raster.height as f32);
        self.session.set_element_size(size.x, size.y);
        self.text_texture = Some(TextTexture { style, texture, size });
    }

    fn show_upload_prompt(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.3);
            let button = egui::Button::new(egui::RichText::new("Click here to upload your image").size(20.0))
                .min_size(Vec2::new(400.0, 120.0));
            if ui.add(button).clicked() {
                self.upload_image(ctx);
            }
        });
    }

    fn show_preview(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.heading("Image Preview");

        let fit = self.session.fit;
        let (container, _) = ui.allocate_exact_size(Vec2::new(fit.render_width, fit.render_height), Sense::hover());
        let painter = ui.painter_at(container);
        painter.rect_filled(container, 2.0, Color32::WHITE);
        if let Some(texture) = &self.image_texture {
            painter.image(texture.id(), container, FULL_UV, Color32::WHITE);
        }

        self.ensure_font();
        self.ensure_text_texture(ctx);
        let Some(text) = &self.text_texture else { return };

        let pos = self.session.position;
        let element = Rect::from_min_size(container.min + Vec2::new(pos.x, pos.y), text.size);
        let response = ui
            .interact(element, ui.id().with("overlay_text"), Sense::drag())
            .on_hover_cursor(CursorIcon::Grab);

        if response.drag_started() {
            self.session.begin_drag();
        }

        // While dragging, the text follows the pointer like a drag ghost.
        let mut draw_rect = element;
        if self.session.flags.dragging {
            ctx.output_mut(|o| o.cursor_icon = CursorIcon::Grabbing);
            if let Some(p) = ctx.input(|i| i.pointer.latest_pos()) {
                draw_rect = Rect::from_center_size(p, text.size);
            }
        }

        if let Some(texture) = &text.texture {
            painter.image(texture.id(), draw_rect, FULL_UV, Color32::WHITE);
        }

        if response.drag_released() {
            let pointer = ctx
                .input(|i| i.pointer.latest_pos())
                .unwrap_or_else(|| element.center());
            self.session.end_drag(
                (pointer.x, pointer.y),
                Bounds::new(element.min.x, element.min.y, element.width(), element.height()),
                Bounds::new(container.min.x, container.min.y, container.width(), container.height()),
            );
        }
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.add(egui::Button::new("Start Over").fill(Color32::from_rgb(220, 38, 38))).clicked() {
                self.start_over();
                return;
            }
            ui.separator();

            ui.vertical(|ui| {
                ui.label("Enter text to display");
                if ui.text_edit_singleline(&mut self.text_input).changed() {
                    let style = self.session.style.with_text(self.text_input.as_str());
                    self.session.set_style(style);
                }
            });

            ui.vertical(|ui| {
                ui.label("Font Size");
                let response = ui.add(egui::TextEdit::singleline(&mut self.size_input).desired_width(60.0));
                if response.changed()
                    && let Some(size) = parse_font_size(&self.size_input)
                {
                    let style = self.session.style.with_font_size(size);
                    self.session.set_style(style);
                }
                if response.lost_focus() {
                    self.size_input = self.session.style.font_size.to_string();
                }
            });

            ui.vertical(|ui| {
                ui.label("Color");
                let c = self.session.style.color;
                let mut rgb = [c[0], c[1], c[2]];
                if ui.color_edit_button_srgb(&mut rgb).changed() {
                    let style = self.session.style.with_color([rgb[0], rgb[1], rgb[2], c[3]]);
                    self.session.set_style(style);
                }
            });

            ui.vertical(|ui| {
                ui.label("Weight");
                let mut bold = self.session.style.weight == FontWeight::Bold;
                if ui.checkbox(&mut bold, FontWeight::Bold.label()).changed() {
                    let weight = if bold { FontWeight::Bold } else { FontWeight::Regular };
                    let style = self.session.style.with_weight(weight);
                    self.session.set_style(style);
                }
            });

            ui.vertical(|ui| {
                ui.label("Font Family");
                let mut chosen: Option<String> = None;
                egui::ComboBox::from_id_source("font_family")
                    .selected_text(self.session.style.family.as_str())
                    .width(180.0)
                    .show_ui(ui, |ui| {
                        for family in &self.families {
                            let selected = *family == self.session.style.family;
                            if ui.selectable_label(selected, family.as_str()).clicked() {
                                chosen = Some(family.clone());
                            }
                        }
                    });
                if let Some(family) = chosen {
                    let style = self.session.style.with_family(family);
                    self.session.set_style(style);
                }
            });

            ui.separator();
            if ui.add(egui::Button::new("Download Image").fill(Color32::from_rgb(22, 163, 74))).clicked() {
                self.download_image();
            }
        });
    }
}

impl eframe::App for IwtApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Refit when the window size changes.
        if self.session.has_image() {
            let area = self.available_area(ctx);
            if area != self.last_area {
                self.session.relayout(area);
                self.last_area = area;
            }
        }

        if self.session.flags.selected {
            egui::TopBottomPanel::bottom("controls")
                .min_height(72.0)
                .show(ctx, |ui| self.show_controls(ui));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).fill(Color32::from_rgb(224, 242, 254)))
            .show(ctx, |ui| {
                if self.session.flags.selected {
                    self.show_preview(ui, ctx);
                } else {
                    self.show_upload_prompt(ui, ctx);
                }
            });
    }
}
