// ============================================================================
// HOST UI — egui card: drop zone, threshold sliders, source/edge panels
// ============================================================================

use std::sync::Arc;

use eframe::egui;
use egui::{ColorImage, TextureHandle, TextureOptions};

use crate::canny::CannyEngine;
use crate::pipeline::{Bitmap, EdgeCard, EngineState, FileInput, ImageOrigin};
use crate::settings::AppSettings;

/// Image extensions offered by the Browse dialog.  Drops are not filtered;
/// anything undecodable is reported through the error slot.
const PICKER_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "webp", "bmp", "tga", "gif", "ico", "tiff", "tif",
];

/// Texture mirror of one presentation surface.  Re-uploaded only when the
/// surface revision moves.
struct SurfaceView {
    name: &'static str,
    texture: Option<TextureHandle>,
    seen_revision: u64,
}

impl SurfaceView {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            texture: None,
            seen_revision: 0,
        }
    }

    fn sync(&mut self, ctx: &egui::Context, bitmap: &Bitmap) {
        if bitmap.revision() == self.seen_revision {
            return;
        }
        self.seen_revision = bitmap.revision();
        if bitmap.is_empty() {
            self.texture = None;
            return;
        }
        let size = [bitmap.width() as usize, bitmap.height() as usize];
        let image = ColorImage::from_rgba_unmultiplied(size, bitmap.pixels());
        match &mut self.texture {
            Some(handle) => handle.set(image, TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture(self.name, image, TextureOptions::LINEAR));
            }
        }
    }

    fn show(&self, ui: &mut egui::Ui, caption: &str) {
        ui.vertical_centered(|ui| {
            match &self.texture {
                Some(tex) => {
                    let sized = egui::load::SizedTexture::from_handle(tex);
                    ui.add(egui::Image::from_texture(sized).shrink_to_fit());
                }
                None => {
                    let (rect, _) = ui.allocate_exact_size(
                        egui::vec2(ui.available_width(), 160.0),
                        egui::Sense::hover(),
                    );
                    ui.painter().rect_stroke(
                        rect,
                        12.0,
                        ui.visuals().widgets.noninteractive.bg_stroke,
                    );
                }
            }
            ui.label(egui::RichText::new(caption).small().weak());
        });
    }
}

pub struct CannyPlaygroundApp {
    card: EdgeCard,
    source_view: SurfaceView,
    result_view: SurfaceView,
    show_log: bool,
}

impl CannyPlaygroundApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: AppSettings) -> Self {
        let engine = Arc::new(CannyEngine::new(settings.pre_blur_sigma));
        let mut card = EdgeCard::new(engine, settings.initial_params());
        card.start();
        Self {
            card,
            source_view: SurfaceView::new("source_surface"),
            result_view: SurfaceView::new("result_surface"),
            show_log: settings.show_log,
        }
    }

    /// Files dropped onto the window this frame, first one wins.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<egui::DroppedFile> = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }
        let files: Vec<FileInput> = dropped
            .into_iter()
            .filter_map(|file| match (file.bytes, file.path) {
                (Some(bytes), _) => Some(FileInput::Bytes {
                    name: file.name,
                    bytes,
                }),
                (None, Some(path)) => Some(FileInput::Path(path)),
                (None, None) => None,
            })
            .collect();
        // Failures are already in the card's error slot.
        let _ = self.card.load_files(ImageOrigin::Dropped, files);
    }

    fn browse(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Images", PICKER_EXTENSIONS)
            .add_filter("All Files", &["*"])
            .pick_files();
        if let Some(paths) = picked {
            let files = paths.into_iter().map(FileInput::Path).collect();
            let _ = self.card.load_files(ImageOrigin::Picked, files);
        }
    }

    fn drop_zone(&mut self, ui: &mut egui::Ui, hovering: bool) {
        let stroke = if hovering {
            ui.visuals().selection.stroke
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke
        };
        let frame = egui::Frame::none()
            .stroke(stroke)
            .rounding(16.0)
            .inner_margin(egui::Margin::same(24.0));
        let response = frame
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label("Drag & drop an image here, or click to choose a file");
                    ui.add_space(8.0);
                    ui.button("Browse…").clicked()
                })
                .inner
            });
        let zone_clicked = response
            .response
            .interact(egui::Sense::click())
            .clicked();
        if response.inner || zone_clicked {
            self.browse();
        }
    }

    fn threshold_sliders(&mut self, ui: &mut egui::Ui) {
        let params = self.card.params();
        ui.columns(2, |cols| {
            let mut low = params.low();
            cols[0].label(format!("Low threshold ({})", low));
            let r = cols[0].add(egui::Slider::new(&mut low, params.low_range()).show_value(false));
            if r.changed() {
                self.card.set_low(low as i32);
            }

            let mut high = params.high();
            cols[1].label(format!("High threshold ({})", high));
            let r = cols[1].add(egui::Slider::new(&mut high, params.high_range()).show_value(false));
            if r.changed() {
                self.card.set_high(high as i32);
            }
        });
    }

    fn status_line(&self, ui: &mut egui::Ui) {
        let (text, busy) = match self.card.engine_state() {
            EngineState::Uninitialized | EngineState::Loading => ("Loading edge engine…", true),
            EngineState::Ready => ("Engine ready", self.card.is_busy()),
            EngineState::Failed => ("Engine unavailable", false),
        };
        ui.horizontal(|ui| {
            if busy {
                ui.spinner();
            }
            ui.label(egui::RichText::new(text).weak());
            if let Some(session) = self.card.session() {
                let (w, h) = session.dimensions();
                ui.label(egui::RichText::new(format!("· {} ({}×{})", session.name, w, h)).weak());
            }
        });
        if let Some(msg) = self.card.error_message() {
            ui.colored_label(ui.visuals().error_fg_color, msg);
        }
    }

    fn log_drawer(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("log_drawer")
            .resizable(true)
            .show_animated(ctx, self.show_log, |ui| {
                if let Some(path) = crate::logger::log_path() {
                    ui.label(
                        egui::RichText::new(format!("Session log: {}", path.display()))
                            .small()
                            .weak(),
                    );
                }
                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for line in crate::logger::recent_lines() {
                            ui.monospace(line);
                        }
                    });
            });
    }
}

impl eframe::App for CannyPlaygroundApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // --- Poll engine load and recompute jobs ---
        self.card.poll();
        self.handle_dropped_files(ctx);

        self.source_view.sync(ctx, &self.card.surfaces().source);
        self.result_view.sync(ctx, &self.card.surfaces().result);

        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());

        self.log_drawer(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Canny Edge Detection Playground");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.toggle_value(&mut self.show_log, "Log");
                    });
                });
                ui.add_space(12.0);

                self.drop_zone(ui, hovering);
                ui.add_space(16.0);
                self.threshold_sliders(ui);
                ui.add_space(8.0);
                self.status_line(ui);
                ui.add_space(16.0);

                ui.columns(2, |cols| {
                    self.source_view.show(&mut cols[0], "Original");
                    self.result_view.show(&mut cols[1], "Edges");
                });
            });
        });

        // Keep polling while the engine loads or a job is running
        if self.card.is_busy() {
            ctx.request_repaint();
        }
    }
}
