//! Animated background component
//!
//! Owns the particle field plus the two resources it holds while alive: the
//! frame loop (a repaint request issued after every frame) and the viewport
//! watch that stands in for a resize listener. `teardown` releases both and
//! runs on drop.

use crate::config::BackgroundConfig;
use crate::particles::ParticleField;
use egui::{Color32, Mesh, Painter, Rect, Shape, Vec2};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Last seen viewport size; reports changes
#[derive(Debug, Default)]
pub struct ViewportWatch {
    last: Option<Vec2>,
}

impl ViewportWatch {
    /// `Some(size)` the first time and whenever the size differs
    pub fn observe(&mut self, size: Vec2) -> Option<Vec2> {
        if self.last == Some(size) {
            return None;
        }
        self.last = Some(size);
        Some(size)
    }
}

pub struct AnimatedBackground {
    config: BackgroundConfig,
    field: ParticleField,
    rng: StdRng,
    viewport: Option<ViewportWatch>,
    running: bool,
    mounted: bool,
}

impl AnimatedBackground {
    pub fn new(config: BackgroundConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_rng(config: BackgroundConfig, rng: StdRng) -> Self {
        Self {
            config,
            field: ParticleField::new(),
            rng,
            viewport: Some(ViewportWatch::default()),
            running: true,
            mounted: false,
        }
    }

    #[cfg(test)]
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Simulate one frame for the given surface size.
    ///
    /// Returns whether another frame should be scheduled.
    pub fn advance(&mut self, size: Vec2) -> bool {
        if !self.running {
            return false;
        }
        // No drawable surface yet: nothing to simulate, keep polling
        if size.x <= 0.0 || size.y <= 0.0 {
            return true;
        }

        let changed = self.viewport.as_mut().and_then(|v| v.observe(size));
        if let Some(size) = changed {
            if self.mounted {
                log::debug!("Viewport resized to {}x{}", size.x, size.y);
                self.field.resize(size.x, size.y, &self.config, &mut self.rng);
            } else {
                self.field.populate(size.x, size.y, &self.config, &mut self.rng);
                self.mounted = true;
                log::debug!(
                    "Background mounted at {}x{} with {} particles",
                    size.x,
                    size.y,
                    self.field.particles.len()
                );
            }
        }

        self.field.update(&self.config);
        true
    }

    pub fn paint(&self, painter: &Painter, rect: Rect) {
        paint_backdrop(painter, rect, &self.config);
        if self.running {
            self.field.render(painter, rect, &self.config);
        }
    }

    /// Frame-loop entry: simulate, draw and schedule the next frame
    pub fn frame(&mut self, ctx: &egui::Context, painter: &Painter, rect: Rect) {
        let keep_going = self.advance(rect.size());
        self.paint(painter, rect);
        if keep_going {
            ctx.request_repaint();
        }
    }

    /// Stop the loop and drop the viewport watch
    pub fn teardown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.viewport = None;
        self.field.clear();
        log::debug!("Background torn down");
    }
}

impl Drop for AnimatedBackground {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Diagonal gradient: edge colour in two corners, mid colour across the diagonal
fn paint_backdrop(painter: &Painter, rect: Rect, config: &BackgroundConfig) {
    let edge = rgb(config.background_edge);
    let mid = rgb(config.background_mid);

    let mut mesh = Mesh::default();
    mesh.colored_vertex(rect.left_top(), edge);
    mesh.colored_vertex(rect.right_top(), mid);
    mesh.colored_vertex(rect.left_bottom(), mid);
    mesh.colored_vertex(rect.right_bottom(), edge);
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(1, 3, 2);
    painter.add(Shape::mesh(mesh));
}

fn rgb(c: [u8; 3]) -> Color32 {
    Color32::from_rgb(c[0], c[1], c[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn background() -> AnimatedBackground {
        AnimatedBackground::with_rng(BackgroundConfig::default(), StdRng::seed_from_u64(9))
    }

    #[test]
    fn test_mount_populates_once() {
        let mut bg = background();
        assert!(bg.field().particles.is_empty());

        assert!(bg.advance(Vec2::new(800.0, 600.0)));
        assert_eq!(bg.field().particles.len(), 60);

        let first: Vec<f32> = bg.field().particles.iter().map(|p| p.opacity).collect();
        assert!(bg.advance(Vec2::new(800.0, 600.0)));
        let second: Vec<f32> = bg.field().particles.iter().map(|p| p.opacity).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unavailable_surface_is_noop() {
        let mut bg = background();
        assert!(bg.advance(Vec2::new(0.0, 600.0)));
        assert!(bg.field().particles.is_empty());
        assert_eq!(bg.field().width, 0.0);
    }

    #[test]
    fn test_resize_updates_bounds_only() {
        let mut bg = background();
        bg.advance(Vec2::new(800.0, 600.0));
        let count = bg.field().particles.len();

        bg.advance(Vec2::new(1600.0, 1200.0));
        assert_eq!(bg.field().particles.len(), count);
        assert_eq!(bg.field().width, 1600.0);
        assert_eq!(bg.field().height, 1200.0);
    }

    #[test]
    fn test_resize_regenerates_when_configured() {
        let config = BackgroundConfig {
            regenerate_on_resize: true,
            ..Default::default()
        };
        let mut bg = AnimatedBackground::with_rng(config, StdRng::seed_from_u64(9));
        bg.advance(Vec2::new(800.0, 600.0));
        bg.advance(Vec2::new(1600.0, 1200.0));
        assert_eq!(bg.field().particles.len(), 240);
    }

    #[test]
    fn test_teardown_stops_loop() {
        let mut bg = background();
        bg.advance(Vec2::new(800.0, 600.0));
        assert!(bg.is_running());

        bg.teardown();
        assert!(!bg.is_running());
        assert!(bg.viewport.is_none());
        assert!(!bg.advance(Vec2::new(800.0, 600.0)));
        assert!(bg.field().particles.is_empty());

        // Idempotent
        bg.teardown();
        assert!(!bg.is_running());
    }

    #[test]
    fn test_viewport_watch_reports_changes() {
        let mut watch = ViewportWatch::default();
        assert_eq!(watch.observe(Vec2::new(10.0, 10.0)), Some(Vec2::new(10.0, 10.0)));
        assert_eq!(watch.observe(Vec2::new(10.0, 10.0)), None);
        assert_eq!(watch.observe(Vec2::new(20.0, 10.0)), Some(Vec2::new(20.0, 10.0)));
    }
}
