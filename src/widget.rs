use crate::graphics::{draw_line, Camera, Canvas};
use crate::layout::ParticleKind;
use crate::math::{apply_lighting, calculate_light_intensity, Rgb};
use crate::scene::Scene;
use crate::state::{AppState, Mode};
use crate::topper::TOPPER_COLOR;
use crate::vertex::Vertex;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use glam::Vec3;
use std::time::Instant;

const HUD_COLOR: Rgb = Rgb::new(220, 220, 220);
const TITLE_COLOR: Rgb = Rgb::from_hex(0xFCD34D);
const CONNECTED_COLOR: Rgb = Rgb::from_hex(0x4ADE80);
const DISCONNECTED_COLOR: Rgb = Rgb::from_hex(0xF87171);

/// Terminal view of the tree
pub struct TreeView {
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
    /// Is the user currently dragging to orbit?
    dragging: bool,
    /// Last mouse position
    last_mouse_pos: (u16, u16),
    camera: Camera,
}

impl Default for TreeView {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeView {
    pub fn new() -> Self {
        TreeView {
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
            dragging: false,
            last_mouse_pos: (0, 0),
            camera: Camera::new(Vec3::new(0.0, 2.0, 25.0), 50.0),
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Handle terminal events
    pub fn handle_event(&mut self, event: &Event, state: &mut AppState, scene: &mut Scene) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => match code {
                KeyCode::Char(' ') | KeyCode::Char('e') | KeyCode::Char('E') => {
                    if !state.paused {
                        scene.toggle_mode();
                    }
                }
                KeyCode::Char('d') | KeyCode::Char('D') => {
                    state.debug = !state.debug;
                }
                KeyCode::Char('p') | KeyCode::Char('P') => {
                    state.paused = !state.paused;
                    // Reset any mouse events that were captured
                    self.dragging = false;
                }
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    if !state.paused {
                        scene.orientation_mut().reset();
                    }
                }
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    state.quit = true;
                }
                _ => {}
            },
            Event::Mouse(MouseEvent {
                kind, column, row, ..
            }) => {
                if state.paused {
                    return;
                }
                match kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        self.dragging = true;
                        self.last_mouse_pos = (*column, *row);
                    }
                    MouseEventKind::Drag(MouseButton::Left) if self.dragging => {
                        let dx = *column as f32 - self.last_mouse_pos.0 as f32;
                        let dy = *row as f32 - self.last_mouse_pos.1 as f32;
                        // Rows are about twice as tall as columns are wide
                        scene.orientation_mut().drag(dx, dy * 2.0);
                        self.last_mouse_pos = (*column, *row);
                    }
                    MouseEventKind::Up(MouseButton::Left) => {
                        self.dragging = false;
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    /// Draw the scene and HUD into the canvas
    pub fn render(&mut self, canvas: &mut Canvas, scene: &Scene, state: &AppState) {
        // Update FPS calculation
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }

        canvas.clear();
        let width = canvas.width();
        let height = canvas.height();
        let view = scene.orientation().view();

        // Light source position in view space
        let light_pos_view = self.camera.to_view(state.light_position);

        for group in scene.groups() {
            let material = group.style().material;
            // Rough surfaces look darker in a terminal, so they get more gain
            let gain = 1.5 + 3.0 * material.roughness;

            for instance in group.instances() {
                let local = instance.transform.w_axis.truncate();
                let scale = instance.transform.x_axis.truncate().length();
                let world = view * local;
                let normal = Vec3::new(world.x, 0.0, world.z).normalize_or_zero();

                let Some(vertex) = self.camera.project(world, normal, width, height) else {
                    continue;
                };
                let size = self.camera.projected_size(scale, vertex.depth(), height);
                let glyph = glyph_for(group.kind(), size);

                let color = if material.emissive_intensity > 0.0 {
                    instance.color
                } else {
                    let intensity =
                        calculate_light_intensity(vertex.normal, vertex.position, light_pos_view);
                    apply_lighting(instance.color, intensity * gain)
                };

                canvas.plot(
                    vertex.screen_position[0].floor() as isize,
                    vertex.screen_position[1].floor() as isize,
                    vertex.depth(),
                    glyph,
                    color,
                );
            }
        }

        self.render_topper(canvas, scene);
        self.render_hud(canvas, scene, state);
    }

    /// Draws the star as a wireframe of its ring layers
    fn render_topper(&self, canvas: &mut Canvas, scene: &Scene) {
        let width = canvas.width();
        let height = canvas.height();
        let topper = scene.topper();
        let model = topper.transform();
        let view = scene.orientation().view();

        let rings: Vec<Vec<Option<Vertex>>> = topper
            .geometry()
            .rings()
            .iter()
            .map(|ring| {
                ring.points
                    .iter()
                    .map(|&p| {
                        let world = view * model.transform_point3(p);
                        self.camera.project(world, Vec3::Z, width, height)
                    })
                    .collect()
            })
            .collect();

        for ring in &rings {
            for (i, start) in ring.iter().enumerate() {
                let end = &ring[(i + 1) % ring.len()];
                if let (Some(a), Some(b)) = (start, end) {
                    draw_line(canvas, a, b, '*', TOPPER_COLOR);
                }
            }
        }
        // Connect consecutive layers at the star tips
        for pair in rings.windows(2) {
            for i in (0..pair[0].len()).step_by(2) {
                if let (Some(a), Some(b)) = (&pair[0][i], &pair[1][i]) {
                    draw_line(canvas, a, b, '*', TOPPER_COLOR);
                }
            }
        }
    }

    fn render_hud(&self, canvas: &mut Canvas, scene: &Scene, state: &AppState) {
        let width = canvas.width();
        let height = canvas.height();

        canvas.overlay(1, 0, "Cyber Christmas Tree", TITLE_COLOR);
        let action = match scene.mode() {
            Mode::Assembled => "explode",
            Mode::Dispersed => "restore",
        };
        let help = format!("[space] {action}  [p] pause  [d] debug  [r] reset  [q] quit");
        canvas.overlay(1, height.saturating_sub(1), &help, HUD_COLOR);

        let (indicator, color) = match scene.hand() {
            Some(_) => ("● HAND DETECTED", CONNECTED_COLOR),
            None => ("○ NO HAND", DISCONNECTED_COLOR),
        };
        let x = width.saturating_sub(indicator.chars().count() + 1);
        canvas.overlay(x, 0, indicator, color);

        // Add debug info if debug mode is enabled
        if state.debug {
            let orientation = scene.orientation();
            let lines = [
                format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
                format!("Mode: {}", scene.mode().label()),
                format!(
                    "Yaw: {:.2}, Pitch: {:.2}",
                    orientation.yaw(),
                    orientation.pitch()
                ),
                format!(
                    "Orbit: {:.2}, {:.2}{}",
                    orientation.orbit().azimuth,
                    orientation.orbit().polar,
                    if orientation.orbit().enabled { "" } else { " (locked)" }
                ),
                format!(
                    "Particles: {} ({} / {} / {})",
                    scene.particle_count(),
                    scene.group(ParticleKind::Foliage).len(),
                    scene.group(ParticleKind::Ornament).len(),
                    scene.group(ParticleKind::Light).len()
                ),
                match scene.hand() {
                    Some(hand) => format!(
                        "Hand: {:.2}, {:.2}{}",
                        hand.x,
                        hand.y,
                        if hand.pinching { " pinch" } else { "" }
                    ),
                    None => "Hand: -".to_string(),
                },
                format!("FPS: {:.2}", self.fps),
            ];
            for (i, line) in lines.iter().enumerate() {
                canvas.overlay(1, 2 + i, line, HUD_COLOR);
            }
        }

        // Display 'Paused' if the simulation is paused
        if state.paused {
            let text = "Paused";
            let x = width.saturating_sub(text.len()) / 2;
            canvas.overlay(x, height / 2, text, Rgb::WHITE);
        }
    }
}

/// Glyph for a particle of the given category covering `size` cells
fn glyph_for(kind: ParticleKind, size: f32) -> char {
    match kind {
        ParticleKind::Foliage if size < 0.6 => '.',
        ParticleKind::Foliage if size < 1.2 => '^',
        ParticleKind::Foliage => 'A',
        ParticleKind::Ornament if size < 0.9 => 'o',
        ParticleKind::Ornament => 'O',
        ParticleKind::Light if size < 0.6 => '+',
        ParticleKind::Light => '*',
    }
}
