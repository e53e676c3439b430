//! The vertex layout shared by imported models and the GPU mesh.

use glam::{Vec2, Vec3};

/// A model vertex, uploaded verbatim to the GPU.
///
/// The field order fixes the attribute offsets: position, normal, texture coordinate, tangent,
/// bitangent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
    pub tangent: Vec3,
    pub bitangent: Vec3,
}

impl Vertex {
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
    pub const POSITION_OFFSET: usize = std::mem::offset_of!(Vertex, position);
    pub const NORMAL_OFFSET: usize = std::mem::offset_of!(Vertex, normal);
    pub const TEX_COORDS_OFFSET: usize = std::mem::offset_of!(Vertex, tex_coords);
    pub const TANGENT_OFFSET: usize = std::mem::offset_of!(Vertex, tangent);
    pub const BITANGENT_OFFSET: usize = std::mem::offset_of!(Vertex, bitangent);
}
