//! Particle Field for Swan
//! Ambient constellation backdrop: drifting points, breathing radii and proximity lines

use crate::config::BackgroundConfig;
use egui::{Color32, Mesh, Painter, Pos2, Rect, Shape, Stroke, Vec2};
use rand::Rng;
use rayon::prelude::*;
use std::collections::HashMap;
use std::f32::consts::TAU;

/// Individual particle data
#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Base radius
    pub size: f32,
    /// Radius after the pulse is applied, refreshed every update
    pub current_size: f32,
    /// Fixed for the particle's lifetime
    pub opacity: f32,
    pub pulse_phase: f32,
    pub pulse_speed: f32,
}

impl Particle {
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        width: f32,
        height: f32,
        config: &BackgroundConfig,
    ) -> Self {
        let size = sample(rng, config.min_size, config.max_size);
        Self {
            pos: Vec2::new(sample(rng, 0.0, width), sample(rng, 0.0, height)),
            vel: Vec2::new(
                sample(rng, -config.max_speed, config.max_speed),
                sample(rng, -config.max_speed, config.max_speed),
            ),
            size,
            current_size: size,
            opacity: sample(rng, config.min_opacity, config.max_opacity),
            pulse_phase: sample(rng, 0.0, TAU),
            pulse_speed: sample(rng, config.min_pulse_speed, config.max_pulse_speed),
        }
    }

    /// One animation tick: drift, wrap, breathe
    pub fn update(&mut self, width: f32, height: f32, pulse_amplitude: f32) {
        self.pos += self.vel;
        self.pos.x = wrap(self.pos.x, width);
        self.pos.y = wrap(self.pos.y, height);

        self.pulse_phase = (self.pulse_phase + self.pulse_speed) % TAU;
        self.current_size = self.size + self.pulse_phase.sin() * pulse_amplitude;
    }
}

/// Uniform sample in `[lo, hi)`, or `lo` for an empty range
fn sample<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// Toroidal wrap into `[0, bound)`.
///
/// Crossing the far edge resets to exactly 0; falling below 0 re-enters
/// from the far edge.
pub fn wrap(coord: f32, bound: f32) -> f32 {
    if bound <= 0.0 {
        return 0.0;
    }
    let mut c = coord;
    if c < 0.0 {
        c = c.rem_euclid(bound);
    }
    if c >= bound {
        c = 0.0;
    }
    c
}

/// Line alpha for a pair at `distance`: linear falloff reaching 0 at `max_distance`
pub fn connection_opacity(distance: f32, max_distance: f32, base_opacity: f32) -> f32 {
    if max_distance <= 0.0 || distance >= max_distance {
        return 0.0;
    }
    base_opacity * (1.0 - distance.max(0.0) / max_distance)
}

/// Connection between two particles (`a < b`)
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub distance: f32,
    pub opacity: f32,
}

fn link(a: usize, b: usize, pa: Vec2, pb: Vec2, config: &BackgroundConfig) -> Option<Connection> {
    let distance = (pa - pb).length();
    if distance < config.connection_distance {
        Some(Connection {
            a,
            b,
            distance,
            opacity: connection_opacity(
                distance,
                config.connection_distance,
                config.connection_opacity,
            ),
        })
    } else {
        None
    }
}

pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn clear(&mut self) {
        for cells in self.cells.values_mut() {
            cells.clear();
        }
    }

    pub fn insert(&mut self, index: usize, pos: Vec2) {
        let cell = (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        );
        self.cells.entry(cell).or_default().push(index);
    }

    pub fn query_radius(&self, pos: Vec2, radius: f32) -> Vec<usize> {
        let mut neighbors = Vec::new();
        let cell_x = (pos.x / self.cell_size).floor() as i32;
        let cell_y = (pos.y / self.cell_size).floor() as i32;
        let search_range = (radius / self.cell_size).ceil() as i32;

        for dx in -search_range..=search_range {
            for dy in -search_range..=search_range {
                if let Some(indices) = self.cells.get(&(cell_x + dx, cell_y + dy)) {
                    neighbors.extend_from_slice(indices);
                }
            }
        }
        neighbors
    }
}

/// Owns every particle of the backdrop plus the per-frame connection cache
pub struct ParticleField {
    pub particles: Vec<Particle>,
    pub width: f32,
    pub height: f32,

    spatial_grid: SpatialGrid,

    // Connections cache
    pub connections: Vec<Connection>,
}

impl Default for ParticleField {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleField {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            width: 0.0,
            height: 0.0,
            spatial_grid: SpatialGrid::new(120.0),
            connections: Vec::new(),
        }
    }

    /// Discard everything and fill the surface at the configured density
    pub fn populate<R: Rng + ?Sized>(
        &mut self,
        width: f32,
        height: f32,
        config: &BackgroundConfig,
        rng: &mut R,
    ) {
        self.width = width;
        self.height = height;

        let count = config.particle_count(width, height);
        self.particles = (0..count)
            .map(|_| Particle::random(rng, width, height, config))
            .collect();
        self.connections.clear();
    }

    /// New wrap bounds; the set itself is only rebuilt when configured to
    pub fn resize<R: Rng + ?Sized>(
        &mut self,
        width: f32,
        height: f32,
        config: &BackgroundConfig,
        rng: &mut R,
    ) {
        if config.regenerate_on_resize {
            self.populate(width, height, config, rng);
            return;
        }

        self.width = width;
        self.height = height;
        for p in &mut self.particles {
            p.pos.x = wrap(p.pos.x, width);
            p.pos.y = wrap(p.pos.y, height);
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.connections.clear();
        self.spatial_grid.clear();
    }

    pub fn update(&mut self, config: &BackgroundConfig) {
        let width = self.width;
        let height = self.height;
        let amplitude = config.pulse_amplitude;

        self.particles
            .par_iter_mut()
            .for_each(|p| p.update(width, height, amplitude));

        self.connections = self.find_connections(config);
    }

    pub fn find_connections(&mut self, config: &BackgroundConfig) -> Vec<Connection> {
        if config.connection_distance <= 0.0 {
            return Vec::new();
        }
        if self.particles.len() > config.grid_threshold {
            self.find_connections_grid(config)
        } else {
            self.find_connections_pairwise(config)
        }
    }

    /// Every unordered pair, O(n²)
    pub fn find_connections_pairwise(&self, config: &BackgroundConfig) -> Vec<Connection> {
        let particles = &self.particles;
        let n = particles.len();

        (0..n)
            .into_par_iter()
            .flat_map_iter(move |i| {
                let pa = particles[i].pos;
                ((i + 1)..n).filter_map(move |j| link(i, j, pa, particles[j].pos, config))
            })
            .collect()
    }

    /// Same pairs as the pairwise scan, bucketed by a grid sized to the threshold
    pub fn find_connections_grid(&mut self, config: &BackgroundConfig) -> Vec<Connection> {
        let max_distance = config.connection_distance;
        if max_distance <= 0.0 {
            return Vec::new();
        }

        if (self.spatial_grid.cell_size - max_distance).abs() > f32::EPSILON {
            self.spatial_grid = SpatialGrid::new(max_distance);
        }
        self.spatial_grid.clear();
        for (i, p) in self.particles.iter().enumerate() {
            self.spatial_grid.insert(i, p.pos);
        }

        let grid = &self.spatial_grid;
        let particles = &self.particles;

        (0..particles.len())
            .into_par_iter()
            .flat_map_iter(move |i| {
                let pa = particles[i].pos;
                let mut candidates: Vec<usize> = grid
                    .query_radius(pa, max_distance)
                    .into_iter()
                    .filter(|&j| j > i)
                    .collect();
                candidates.sort_unstable();
                candidates
                    .into_iter()
                    .filter_map(move |j| link(i, j, pa, particles[j].pos, config))
            })
            .collect()
    }

    pub fn render(&self, painter: &Painter, rect: Rect, config: &BackgroundConfig) {
        for p in &self.particles {
            let radius = p.current_size.max(0.0);
            if radius <= 0.0 {
                continue;
            }
            let pos = rect.min + p.pos;

            painter.circle_filled(
                pos,
                radius,
                with_alpha(config.particle_color, p.opacity * config.fill_alpha),
            );
            painter.add(Shape::mesh(halo_mesh(pos, radius, p.opacity, config)));
        }

        self.render_connections(painter, rect, config);
    }

    fn render_connections(&self, painter: &Painter, rect: Rect, config: &BackgroundConfig) {
        for conn in &self.connections {
            let (Some(p_a), Some(p_b)) = (self.particles.get(conn.a), self.particles.get(conn.b))
            else {
                continue;
            };

            painter.line_segment(
                [rect.min + p_a.pos, rect.min + p_b.pos],
                Stroke::new(
                    config.connection_width,
                    with_alpha(config.particle_color, conn.opacity),
                ),
            );
        }
    }
}

/// Glow as a triangle fan: tinted centre vertex, transparent rim vertices.
/// Vertex colours interpolate into a radial gradient.
pub fn halo_mesh(center: Pos2, radius: f32, opacity: f32, config: &BackgroundConfig) -> Mesh {
    let outer = radius * config.halo_scale;
    let segments = config.halo_segments.max(3);
    let inner = with_alpha(config.glow_color, opacity * config.halo_alpha);
    let rim = with_alpha(config.glow_color, 0.0);

    let mut mesh = Mesh::default();
    mesh.colored_vertex(center, inner);
    for i in 0..segments {
        let angle = TAU * i as f32 / segments as f32;
        mesh.colored_vertex(center + outer * Vec2::angled(angle), rim);
    }
    for i in 0..segments as u32 {
        mesh.add_triangle(0, 1 + i, 1 + (i + 1) % segments as u32);
    }
    mesh
}

pub fn with_alpha(rgb: [u8; 3], alpha: f32) -> Color32 {
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(rgb[0], rgb[1], rgb[2], a)
}
