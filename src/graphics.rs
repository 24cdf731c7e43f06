//! Character-cell raster target
//!
//! A [`Canvas`] is a grid of colored glyphs with a depth buffer. The
//! [`Camera`] projects view-space points onto it.

use std::io::Write;

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::{cursor, queue};
use glam::{Mat4, Vec3};

use crate::math::Rgb;
use crate::vertex::Vertex;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 0.5;

/// One drawn cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub glyph: char,
    pub color: Rgb,
}

/// Glyph grid with a depth buffer
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<Option<Cell>>,
    z_buffer: Vec<f32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas {
            width,
            height,
            cells: vec![None; width * height],
            z_buffer: vec![f32::INFINITY; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Resizes and clears the canvas
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells = vec![None; width * height];
        self.z_buffer = vec![f32::INFINITY; width * height];
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
        self.z_buffer.fill(f32::INFINITY);
    }

    /// Writes a glyph if the cell is on screen and nothing nearer has been drawn there
    pub fn plot(&mut self, x: isize, y: isize, depth: f32, glyph: char, color: Rgb) -> bool {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            return false;
        }
        let offset = y as usize * self.width + x as usize;
        if depth < self.z_buffer[offset] {
            self.z_buffer[offset] = depth;
            self.cells[offset] = Some(Cell { glyph, color });
            true
        } else {
            false
        }
    }

    /// Writes text on top of everything, ignoring depth
    pub fn overlay(&mut self, x: usize, y: usize, text: &str, color: Rgb) {
        if y >= self.height {
            return;
        }
        for (i, glyph) in text.chars().enumerate() {
            let cx = x + i;
            if cx >= self.width {
                break;
            }
            let offset = y * self.width + cx;
            self.z_buffer[offset] = f32::NEG_INFINITY;
            self.cells[offset] = Some(Cell { glyph, color });
        }
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[y * self.width + x]
    }

    /// Queues the whole canvas to a terminal
    pub fn present(&self, out: &mut impl Write) -> std::io::Result<()> {
        let mut current: Option<Rgb> = None;
        for y in 0..self.height {
            queue!(out, cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                match self.cells[y * self.width + x] {
                    Some(cell) => {
                        if current != Some(cell.color) {
                            let Rgb { r, g, b } = cell.color;
                            queue!(out, SetForegroundColor(Color::Rgb { r, g, b }))?;
                            current = Some(cell.color);
                        }
                        queue!(out, Print(cell.glyph))?;
                    }
                    None => queue!(out, Print(' '))?,
                }
            }
        }
        queue!(out, ResetColor)?;
        out.flush()
    }
}

/// Perspective camera looking at the origin
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    view: Mat4,
    /// Focal length, `1 / tan(fov / 2)`
    focal: f32,
    near: f32,
}

impl Camera {
    /// Camera at `eye` with a vertical field of view in degrees
    pub fn new(eye: Vec3, fov_degrees: f32) -> Self {
        Camera {
            view: Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y),
            focal: 1.0 / (fov_degrees.to_radians() / 2.0).tan(),
            near: 0.1,
        }
    }

    /// World to view space
    pub fn to_view(&self, world: Vec3) -> Vec3 {
        self.view.transform_point3(world)
    }

    /// Projects a world-space point onto a `width`×`height` cell grid
    pub fn project(&self, world: Vec3, normal: Vec3, width: usize, height: usize) -> Option<Vertex> {
        let position = self.to_view(world);
        let depth = -position.z;
        if depth < self.near {
            return None;
        }
        let aspect = width as f32 * CELL_ASPECT / height.max(1) as f32;
        let ndc_x = self.focal * position.x / depth / aspect;
        let ndc_y = self.focal * position.y / depth;
        let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;
        Some(Vertex {
            position,
            screen_position: [screen_x, screen_y],
            normal: self.view.transform_vector3(normal),
        })
    }

    /// On-screen height in cells of a world-space length at the given depth
    pub fn projected_size(&self, size: f32, depth: f32, height: usize) -> f32 {
        self.focal * size / depth.max(self.near) * 0.5 * height as f32
    }
}

/// Draws a line between two vertices using Bresenham's algorithm
pub fn draw_line(canvas: &mut Canvas, v0: &Vertex, v1: &Vertex, glyph: char, color: Rgb) {
    let (mut x0, mut y0, x1, y1) = (
        v0.screen_position[0].round() as isize,
        v0.screen_position[1].round() as isize,
        v1.screen_position[0].round() as isize,
        v1.screen_position[1].round() as isize,
    );
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy; // error value e_xy

    let steps = dx.max(-dy).max(1) as f32;
    let mut travelled = 0.0;

    loop {
        let depth = v0.depth() + (v1.depth() - v0.depth()) * (travelled / steps);
        canvas.plot(x0, y0, depth, glyph, color);

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
        travelled += 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f32, y: f32, depth: f32) -> Vertex {
        Vertex {
            position: Vec3::new(0.0, 0.0, -depth),
            screen_position: [x, y],
            normal: Vec3::Z,
        }
    }

    #[test]
    fn test_depth_test_keeps_nearest() {
        let mut canvas = Canvas::new(4, 4);
        assert!(canvas.plot(1, 1, 5.0, 'a', Rgb::WHITE));
        assert!(!canvas.plot(1, 1, 6.0, 'b', Rgb::WHITE));
        assert!(canvas.plot(1, 1, 4.0, 'c', Rgb::WHITE));
        assert_eq!(canvas.cell(1, 1).unwrap().glyph, 'c');
    }

    #[test]
    fn test_plot_ignores_offscreen() {
        let mut canvas = Canvas::new(4, 4);
        assert!(!canvas.plot(-1, 0, 1.0, 'a', Rgb::WHITE));
        assert!(!canvas.plot(0, 4, 1.0, 'a', Rgb::WHITE));
    }

    #[test]
    fn test_draw_line_covers_endpoints() {
        let mut canvas = Canvas::new(10, 10);
        draw_line(&mut canvas, &vertex(1.0, 1.0, 1.0), &vertex(8.0, 5.0, 2.0), '*', Rgb::WHITE);
        assert!(canvas.cell(1, 1).is_some());
        assert!(canvas.cell(8, 5).is_some());
        let drawn = (0..10)
            .flat_map(|y| (0..10).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.cell(x, y).is_some())
            .count();
        assert_eq!(drawn, 8);
    }

    #[test]
    fn test_overlay_wins_over_geometry() {
        let mut canvas = Canvas::new(8, 2);
        canvas.plot(2, 0, 0.5, 'x', Rgb::WHITE);
        canvas.overlay(0, 0, "hello", Rgb::new(1, 1, 1));
        assert_eq!(canvas.cell(2, 0).unwrap().glyph, 'l');
        assert!(!canvas.plot(2, 0, 0.1, 'x', Rgb::WHITE));
    }

    #[test]
    fn test_camera_projects_origin_to_center() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 25.0), 50.0);
        let v = camera.project(Vec3::ZERO, Vec3::Z, 80, 24).unwrap();
        assert!((v.screen_position[0] - 40.0).abs() < 1e-3);
        assert!((v.screen_position[1] - 12.0).abs() < 1e-3);
        assert!((v.depth() - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_camera_culls_points_behind() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 25.0), 50.0);
        assert!(camera.project(Vec3::new(0.0, 0.0, 30.0), Vec3::Z, 80, 24).is_none());
    }

    #[test]
    fn test_up_is_up_on_screen() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 25.0), 50.0);
        let top = camera.project(Vec3::new(0.0, 5.0, 0.0), Vec3::Z, 80, 24).unwrap();
        assert!(top.screen_position[1] < 12.0);
    }
}
