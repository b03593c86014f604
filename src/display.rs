//! Quote display surface
//! Renders the current quote, switches layout for Arabic and handles copy

use crate::config::DisplayConfig;
use crate::quote::{Language, Quote};
use anyhow::Context;
use egui::{Align, Align2, Color32, FontFamily, Layout, RichText, Stroke};

/// Font family registered by `install_arabic_font`
pub const ARABIC_FAMILY: &str = "arabic";

/// Layout decisions that depend only on the language
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayStyle {
    pub rtl: bool,
    pub italic: bool,
    /// Multiple of the font size
    pub line_height: f32,
    pub family: FontFamily,
    pub author_align: Align,
}

impl DisplayStyle {
    pub fn for_language(language: Language, arabic_font: bool) -> Self {
        match language {
            Language::Ar => Self {
                rtl: true,
                italic: false,
                line_height: 2.0,
                family: if arabic_font {
                    FontFamily::Name(ARABIC_FAMILY.into())
                } else {
                    FontFamily::Proportional
                },
                author_align: Align::Min,
            },
            Language::En => Self {
                rtl: false,
                italic: true,
                line_height: 1.6,
                family: FontFamily::Proportional,
                author_align: Align::Max,
            },
        }
    }

    fn text_align(&self) -> Align {
        if self.rtl {
            Align::Max
        } else {
            Align::Min
        }
    }
}

pub fn placeholder(language: Language) -> &'static str {
    match language {
        Language::En => "Your quote will appear here...",
        Language::Ar => "سيظهر اقتباسك هنا...",
    }
}

pub fn copy_label(language: Language) -> &'static str {
    match language {
        Language::En => "Copy Quote",
        Language::Ar => "نسخ الاقتباس",
    }
}

/// Register a font with Arabic glyphs as its own family and as a fallback
pub fn install_arabic_font(ctx: &egui::Context, path: &str) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading font {path}"))?;

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert(ARABIC_FAMILY.to_owned(), egui::FontData::from_owned(bytes));
    fonts.families.insert(
        FontFamily::Name(ARABIC_FAMILY.into()),
        vec![ARABIC_FAMILY.to_owned()],
    );
    fonts
        .families
        .entry(FontFamily::Proportional)
        .or_default()
        .push(ARABIC_FAMILY.to_owned());

    ctx.set_fonts(fonts);
    Ok(())
}

#[derive(Default)]
pub struct QuoteDisplay {
    current: Option<Quote>,
    copy_ack_open: bool,
}

impl QuoteDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is shown
    pub fn set(&mut self, quote: Quote) {
        self.current = Some(quote);
    }

    /// The quote, if there is one worth showing
    pub fn visible(&self) -> Option<&Quote> {
        self.current.as_ref().filter(|q| !q.text.is_empty())
    }

    /// Clipboard text for the shown quote; raises the acknowledgement
    pub fn copy(&mut self) -> Option<String> {
        let text = self.visible()?.clipboard_text();
        self.copy_ack_open = true;
        Some(text)
    }

    pub fn acknowledge(&mut self) {
        self.copy_ack_open = false;
    }

    /// True while the copy acknowledgement awaits dismissal
    pub fn is_blocked(&self) -> bool {
        self.copy_ack_open
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        language: Language,
        config: &DisplayConfig,
        arabic_font: bool,
    ) {
        let style = DisplayStyle::for_language(language, arabic_font);
        let current = self.visible().cloned();

        egui::Frame::none()
            .fill(Color32::from_rgba_unmultiplied(124, 58, 237, 28))
            .stroke(Stroke::new(
                1.0,
                Color32::from_rgba_unmultiplied(124, 58, 237, 52),
            ))
            .inner_margin(egui::Margin::same(28.0))
            .show(ui, |ui| {
                ui.set_min_height(220.0);
                ui.set_width(ui.available_width());

                ui.with_layout(Layout::top_down(style.text_align()), |ui| match current {
                    Some(quote) => self.show_quote(ui, &quote, language, &style, config),
                    None => {
                        let mut text = RichText::new(placeholder(language))
                            .size(config.quote_size * 0.8)
                            .family(style.family.clone())
                            .color(Color32::from_white_alpha(77));
                        if style.italic {
                            text = text.italics();
                        }
                        ui.add_space(70.0);
                        ui.label(text);
                    }
                });
            });
    }

    fn show_quote(
        &mut self,
        ui: &mut egui::Ui,
        quote: &Quote,
        language: Language,
        style: &DisplayStyle,
        config: &DisplayConfig,
    ) {
        let mut text = RichText::new(format!("\"{}\"", quote.text))
            .size(config.quote_size)
            .family(style.family.clone())
            .line_height(Some(config.quote_size * style.line_height))
            .color(Color32::from_white_alpha(230));
        if style.italic {
            text = text.italics();
        }
        ui.add(egui::Label::new(text).wrap(true));

        ui.add_space(16.0);
        ui.with_layout(Layout::top_down(style.author_align), |ui| {
            ui.label(
                RichText::new(format!("— {}", quote.author))
                    .size(config.author_size)
                    .family(style.family.clone())
                    .color(Color32::from_rgba_unmultiplied(196, 181, 253, 204)),
            );
        });

        ui.add_space(16.0);
        let label = RichText::new(copy_label(language)).family(style.family.clone());
        let button = egui::Button::new(label)
            .fill(Color32::from_rgba_unmultiplied(124, 58, 237, 51))
            .stroke(Stroke::new(
                1.0,
                Color32::from_rgba_unmultiplied(124, 58, 237, 102),
            ));
        if ui.add(button).clicked() {
            if let Some(text) = self.copy() {
                ui.ctx().output_mut(|o| o.copied_text = text);
            }
        }
    }

    /// Modal acknowledgement after a copy; must be dismissed
    pub fn show_copy_ack(&mut self, ctx: &egui::Context) {
        if !self.copy_ack_open {
            return;
        }

        egui::Window::new("Copied")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Quote copied to clipboard!");
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    self.acknowledge();
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(text: &str, author: &str) -> Quote {
        Quote {
            text: text.to_string(),
            author: author.to_string(),
        }
    }

    #[test]
    fn test_copy_formats_and_blocks() {
        let mut display = QuoteDisplay::new();
        display.set(quote("Be bold.", "X"));

        assert_eq!(display.copy().as_deref(), Some("\"Be bold.\" - X"));
        assert!(display.is_blocked());

        display.acknowledge();
        assert!(!display.is_blocked());
    }

    #[test]
    fn test_copy_without_quote_does_nothing() {
        let mut display = QuoteDisplay::new();
        assert!(display.copy().is_none());
        assert!(!display.is_blocked());

        display.set(quote("", "Swan"));
        assert!(display.visible().is_none());
        assert!(display.copy().is_none());
        assert!(!display.is_blocked());
    }

    #[test]
    fn test_newer_quote_overwrites() {
        let mut display = QuoteDisplay::new();
        display.set(quote("one", "A"));
        display.set(quote("two", "B"));
        assert_eq!(display.visible(), Some(&quote("two", "B")));
    }

    #[test]
    fn test_arabic_layout() {
        let style = DisplayStyle::for_language(Language::Ar, true);
        assert!(style.rtl);
        assert!(!style.italic);
        assert_eq!(style.author_align, Align::Min);
        assert_eq!(style.family, FontFamily::Name(ARABIC_FAMILY.into()));
        assert_eq!(style.line_height, 2.0);

        // Unregistered families panic in egui, so fall back without the font
        let style = DisplayStyle::for_language(Language::Ar, false);
        assert_eq!(style.family, FontFamily::Proportional);
    }

    #[test]
    fn test_english_layout() {
        let style = DisplayStyle::for_language(Language::En, true);
        assert!(!style.rtl);
        assert!(style.italic);
        assert_eq!(style.author_align, Align::Max);
        assert_eq!(style.family, FontFamily::Proportional);
    }

    #[test]
    fn test_localized_strings() {
        assert_eq!(placeholder(Language::En), "Your quote will appear here...");
        assert_eq!(copy_label(Language::En), "Copy Quote");
        assert_ne!(copy_label(Language::Ar), copy_label(Language::En));
    }
}
