//! Navigation bar
//! Brand plus section links; tints itself once the content has scrolled

use egui::{Color32, RichText, Stroke};

/// Scroll offset past which the bar switches to its tinted style
pub const SCROLL_THRESHOLD: f32 = 20.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NavTarget {
    Home,
    Experience,
    GetStarted,
}

#[derive(Debug, Default)]
pub struct NavBar {
    scrolled: bool,
}

impl NavBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the content scroll offset observed this frame
    pub fn on_scroll(&mut self, offset_y: f32) {
        self.scrolled = offset_y > SCROLL_THRESHOLD;
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }

    fn frame(&self) -> egui::Frame {
        let frame = egui::Frame::none().inner_margin(egui::Margin::symmetric(32.0, 14.0));
        if self.is_scrolled() {
            frame
                .fill(Color32::from_rgba_unmultiplied(124, 58, 237, 51))
                .stroke(Stroke::new(
                    1.0,
                    Color32::from_rgba_unmultiplied(124, 58, 237, 77),
                ))
        } else {
            frame.fill(Color32::TRANSPARENT)
        }
    }

    /// Returns the section the user asked to jump to, if any.
    /// A disabled bar still draws but ignores clicks.
    pub fn show(&self, ctx: &egui::Context, enabled: bool) -> Option<NavTarget> {
        let mut target = None;

        egui::TopBottomPanel::top("nav_bar")
            .frame(self.frame())
            .show_separator_line(false)
            .show(ctx, |ui| {
                ui.add_enabled_ui(enabled, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new("AI Quote Generator")
                                .size(22.0)
                                .strong()
                                .color(Color32::WHITE),
                        );

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let cta = egui::Button::new(
                                RichText::new("Get Started").color(Color32::WHITE),
                            )
                            .fill(Color32::from_rgb(124, 58, 237));
                            if ui.add(cta).clicked() {
                                target = Some(NavTarget::GetStarted);
                            }
                            ui.add_space(16.0);
                            if ui.link("Experience").clicked() {
                                target = Some(NavTarget::Experience);
                            }
                            ui.add_space(16.0);
                            if ui.link("Home").clicked() {
                                target = Some(NavTarget::Home);
                            }
                        });
                    });
                });
            });

        target
    }
}
