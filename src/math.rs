use glam::Vec3;

/// An 8-bit RGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Builds a color from a `0xRRGGBB` literal
    pub const fn from_hex(hex: u32) -> Self {
        Rgb {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }
}

/// Linear interpolation between two scalars
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolation fraction for one frame, capped so a long stall cannot teleport
pub fn clamped_step(dt: f32, speed: f32, max_step: f32) -> f32 {
    (dt * speed).min(max_step)
}

/// Calculates the light intensity based on the normal vector and light position
pub fn calculate_light_intensity(normal: Vec3, position: Vec3, light_pos: Vec3) -> f32 {
    let light_dir = (light_pos - position).normalize_or_zero();
    normal.dot(light_dir).max(0.1) // Ensure a minimum ambient light
}

/// Applies lighting to a color
pub fn apply_lighting(color: Rgb, intensity: f32) -> Rgb {
    let r = (color.r as f32 * intensity).min(255.0) as u8;
    let g = (color.g as f32 * intensity).min(255.0) as u8;
    let b = (color.b as f32 * intensity).min(255.0) as u8;
    Rgb::new(r, g, b)
}
