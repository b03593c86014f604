//! Swan - Main Application
//! Quote generator with an animated constellation background, egui GUI

mod background;
mod config;
mod display;
mod nav;
mod particles;
mod quote;
mod request;

use anyhow::Context;
use background::AnimatedBackground;
use config::AppConfig;
use display::{install_arabic_font, QuoteDisplay};
use eframe::egui;
use nav::{NavBar, NavTarget};
use quote::{Category, HttpQuoteBackend, Language, QuoteBackend, QuoteForm};
use request::{apply_completion, QuoteRequester};
use std::sync::Arc;

/// Two columns above this width, stacked (controls first) below it
const WIDE_LAYOUT: f32 = 900.0;

const MONO: egui::FontFamily = egui::FontFamily::Monospace;

/// Main application state
struct SwanApp {
    config: AppConfig,
    background: AnimatedBackground,
    requester: QuoteRequester,
    display: QuoteDisplay,
    nav: NavBar,

    // UI state
    form: QuoteForm,
    arabic_font: bool,
    pending_nav: Option<NavTarget>,
}

impl SwanApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        backend: Arc<dyn QuoteBackend>,
    ) -> Self {
        // Panels stay transparent so the background layer shows through
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = egui::Color32::TRANSPARENT;
        visuals.window_fill = egui::Color32::from_rgba_unmultiplied(15, 23, 42, 245);
        visuals.extreme_bg_color = egui::Color32::from_rgba_unmultiplied(0, 0, 0, 77);
        cc.egui_ctx.set_visuals(visuals);

        let arabic_font = match &config.display.arabic_font_path {
            Some(path) => match install_arabic_font(&cc.egui_ctx, path) {
                Ok(()) => {
                    log::info!("Arabic font loaded from {path}");
                    true
                }
                Err(e) => {
                    log::warn!("Arabic font unavailable: {e:#}");
                    false
                }
            },
            None => false,
        };

        Self {
            background: AnimatedBackground::new(config.background.clone()),
            requester: QuoteRequester::new(backend),
            display: QuoteDisplay::new(),
            nav: NavBar::new(),
            form: QuoteForm::default(),
            arabic_font,
            pending_nav: None,
            config,
        }
    }

    fn generate_quote(&mut self) {
        let request = self.form.to_request();
        let seq = self.requester.submit(request);
        log::info!(
            "Requesting quote #{seq} ({}, {:?})",
            self.form.category.tag(),
            self.form.language
        );
    }
}

impl eframe::App for SwanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply the newest finished request (non-blocking)
        apply_completion(&mut self.requester, &mut self.display, &self.config.api);

        // Background layer spans the whole window, behind every panel
        let painter = ctx.layer_painter(egui::LayerId::background());
        self.background.frame(ctx, &painter, ctx.screen_rect());

        // The copy acknowledgement is modal for the whole window
        let blocked = self.display.is_blocked();
        if let Some(target) = self.nav.show(ctx, !blocked) {
            self.pending_nav = Some(target);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let mut area = egui::ScrollArea::vertical().auto_shrink([false, false]);
                if self.pending_nav == Some(NavTarget::Home) {
                    area = area.vertical_scroll_offset(0.0);
                    self.pending_nav = None;
                }

                let output = area.show(ui, |ui| {
                    ui.add_enabled_ui(!blocked, |ui| {
                        self.render_header(ui);
                        self.render_hero(ui);
                        self.render_body(ui);
                        self.render_footer(ui);
                    });
                });
                self.nav.on_scroll(output.state.offset.y);
            });

        self.display.show_copy_ack(ctx);
    }
}

impl SwanApp {
    fn render_header(&mut self, ui: &mut egui::Ui) {
        ui.add_space(12.0);
        ui.horizontal(|ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.add_space(24.0);
                ui.hyperlink_to(
                    egui::RichText::new("GitHub").color(egui::Color32::from_white_alpha(153)),
                    &self.config.display.repository_url,
                );
            });
        });
    }

    fn render_hero(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(8.0);
            ui.label(
                egui::RichText::new("Swan")
                    .family(MONO)
                    .size(72.0)
                    .color(egui::Color32::WHITE),
            );
            ui.label(
                egui::RichText::new(
                    "Because sometimes, the right words can light the stars inside you",
                )
                .family(MONO)
                .size(15.0)
                .color(egui::Color32::from_white_alpha(153)),
            );
            ui.add_space(28.0);
        });
    }

    fn render_body(&mut self, ui: &mut egui::Ui) {
        let wide = ui.available_width() >= WIDE_LAYOUT;

        egui::Frame::none()
            .inner_margin(egui::Margin::symmetric(32.0, 0.0))
            .show(ui, |ui| {
                if wide {
                    ui.columns(2, |cols| {
                        self.render_display(&mut cols[0]);
                        self.render_controls(&mut cols[1]);
                    });
                } else {
                    self.render_controls(ui);
                    ui.add_space(16.0);
                    self.render_display(ui);
                }
            });
    }

    fn render_display(&mut self, ui: &mut egui::Ui) {
        let response = ui
            .vertical(|ui| {
                self.display
                    .show(ui, self.form.language, &self.config.display, self.arabic_font);
            })
            .response;

        if self.pending_nav == Some(NavTarget::Experience) {
            response.scroll_to_me(Some(egui::Align::TOP));
            self.pending_nav = None;
        }
    }

    fn render_controls(&mut self, ui: &mut egui::Ui) {
        let label_color = egui::Color32::from_white_alpha(179);
        let field_width = ui.available_width().min(420.0);

        let response = ui
            .vertical(|ui| {
                ui.label(egui::RichText::new("Category").color(label_color));
                egui::ComboBox::from_id_source("category_combo")
                    .width(field_width)
                    .selected_text(self.form.category.label())
                    .show_ui(ui, |ui| {
                        for category in Category::ALL {
                            ui.selectable_value(&mut self.form.category, category, category.label());
                        }
                    });
                ui.add_space(10.0);

                ui.label(egui::RichText::new("Language").color(label_color));
                egui::ComboBox::from_id_source("language_combo")
                    .width(field_width)
                    .selected_text(self.form.language.label())
                    .show_ui(ui, |ui| {
                        for language in Language::ALL {
                            ui.selectable_value(&mut self.form.language, language, language.label());
                        }
                    });
                ui.add_space(10.0);

                ui.label(egui::RichText::new("Topic (optional)").color(label_color));
                ui.add(
                    egui::TextEdit::singleline(&mut self.form.topic)
                        .hint_text("e.g., perseverance, courage...")
                        .desired_width(field_width),
                );
                ui.add_space(10.0);

                ui.label(egui::RichText::new("Style (optional)").color(label_color));
                ui.add(
                    egui::TextEdit::singleline(&mut self.form.style)
                        .hint_text("e.g., Shakespeare, modern...")
                        .desired_width(field_width),
                );
                ui.add_space(18.0);

                let loading = self.requester.is_loading();
                let text = if loading { "Generating..." } else { "Generate Quote" };
                let button = egui::Button::new(
                    egui::RichText::new(text).color(egui::Color32::WHITE),
                )
                .fill(egui::Color32::from_rgb(124, 58, 237))
                .min_size(egui::vec2(field_width, 38.0));

                if ui.add_enabled(!loading, button).clicked() {
                    self.generate_quote();
                }
            })
            .response;

        if self.pending_nav == Some(NavTarget::GetStarted) {
            response.scroll_to_me(Some(egui::Align::TOP));
            self.pending_nav = None;
        }
    }

    fn render_footer(&mut self, ui: &mut egui::Ui) {
        ui.add_space(32.0);
        ui.vertical_centered(|ui| {
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new("Built by").color(egui::Color32::from_white_alpha(153)),
                );
                ui.hyperlink_to(
                    egui::RichText::new("AyaNexus").color(egui::Color32::from_rgb(196, 181, 253)),
                    &self.config.display.author_site_url,
                );
                ui.label("🦢");
            });
        });
        ui.add_space(20.0);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    let backend = HttpQuoteBackend::new(&config.api).context("building HTTP client")?;
    log::info!("Quote endpoint: {}", backend.endpoint());
    let backend: Arc<dyn QuoteBackend> = Arc::new(backend);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Swan")
            .with_min_inner_size([480.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Swan",
        options,
        Box::new(move |cc| Box::new(SwanApp::new(cc, config, backend))),
    )
    .map_err(|e| anyhow::anyhow!("eframe failed: {e}"))?;

    Ok(())
}
