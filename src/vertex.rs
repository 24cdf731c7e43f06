use glam::Vec3;

/// Vertex structure with view-space position, screen position, and normal
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub screen_position: [f32; 2],
    pub normal: Vec3,
}

impl Vertex {
    /// Distance in front of the camera
    pub fn depth(&self) -> f32 {
        -self.position.z
    }
}
