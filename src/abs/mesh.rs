//! Mesh management module.
//!
//! This module defines [`Geometry`], vertex and index data stored on the GPU side, and [`Mesh`],
//! a model mesh that draws its geometry with its material textures bound. Vertices uploaded
//! through [`Geometry`] implement the [`VertexLayout`] trait.

use std::sync::Arc;

use glam::Vec3;
use glclock_core::vertex::Vertex;

use crate::abs::{
    Backend, BufferTarget, GpuHandle, IndexBuffer, ShaderProgram, TextureKind, TextureRef,
    VertexArray, VertexBuffer,
};

/// Trait that defines the attribute layout of a vertex type.
pub trait VertexLayout {
    /// Sets up the vertex attribute pointers for the vertex while its vertex array is bound.
    fn vertex_attribs(gl: &dyn Backend);
}

impl VertexLayout for Vertex {
    fn vertex_attribs(gl: &dyn Backend) {
        let stride = Vertex::STRIDE as i32;
        gl.vertex_attrib_f32(0, 3, stride, Vertex::POSITION_OFFSET as i32);
        gl.vertex_attrib_f32(1, 3, stride, Vertex::NORMAL_OFFSET as i32);
        gl.vertex_attrib_f32(2, 2, stride, Vertex::TEX_COORDS_OFFSET as i32);
    }
}

/// Bare positions, used by flat 2D geometry.
impl VertexLayout for Vec3 {
    fn vertex_attribs(gl: &dyn Backend) {
        gl.vertex_attrib_f32(0, 3, std::mem::size_of::<Vec3>() as i32, 0);
    }
}

fn as_bytes<T>(data: &[T]) -> &[u8] {
    // SAFETY: callers pass `#[repr(C)]` vertex types and `u32` indices, which are plain data
    // without padding.
    unsafe { std::slice::from_raw_parts(data.as_ptr() as *const u8, std::mem::size_of_val(data)) }
}

/// Vertex and index buffers plus the vertex array describing them. Uploaded once.
pub struct Geometry {
    gl: Arc<dyn Backend>,
    vao: GpuHandle<VertexArray>,
    vbo: GpuHandle<VertexBuffer>,
    ebo: GpuHandle<IndexBuffer>,
    index_count: usize,
}

impl Geometry {
    /// Creates new geometry from the given vertex and index data.
    pub fn new<V: VertexLayout>(gl: &Arc<dyn Backend>, vertices: &[V], indices: &[u32]) -> Self {
        let vao = GpuHandle::<VertexArray>::new(gl);
        let vbo = GpuHandle::<VertexBuffer>::new(gl);
        let ebo = GpuHandle::<IndexBuffer>::new(gl);

        gl.bind_vertex_array(vao.raw());
        gl.bind_buffer(BufferTarget::Array, vbo.raw());
        gl.buffer_data(BufferTarget::Array, as_bytes(vertices));

        gl.bind_buffer(BufferTarget::ElementArray, ebo.raw());
        gl.buffer_data(BufferTarget::ElementArray, as_bytes(indices));

        V::vertex_attribs(gl.as_ref());

        gl.bind_vertex_array(0);
        gl.bind_buffer(BufferTarget::Array, 0);
        gl.bind_buffer(BufferTarget::ElementArray, 0);

        Self {
            gl: Arc::clone(gl),
            vao,
            vbo,
            ebo,
            index_count: indices.len(),
        }
    }

    /// Draws every index as triangles.
    pub fn draw(&self) {
        self.draw_range(0, self.index_count);
    }

    /// Draws `count` indices starting at index `first`.
    pub fn draw_range(&self, first: usize, count: usize) {
        self.gl.bind_vertex_array(self.vao.raw());
        self.gl.draw_triangles(count as i32, first);
        self.gl.bind_vertex_array(0);
    }

    pub fn index_count(&self) -> usize {
        self.index_count
    }

    pub fn vertex_array(&self) -> &GpuHandle<VertexArray> {
        &self.vao
    }

    pub fn vertex_buffer(&self) -> &GpuHandle<VertexBuffer> {
        &self.vbo
    }

    pub fn index_buffer(&self) -> &GpuHandle<IndexBuffer> {
        &self.ebo
    }
}

/// A triangle list with the textures its material samples.
///
/// The mesh owns its vertex data and GPU buffers. Textures are borrowed by raw id from the cache
/// of the [`crate::model::Model`] that built the mesh.
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    textures: Vec<TextureRef>,
    geometry: Geometry,
}

impl Mesh {
    pub fn new(
        gl: &Arc<dyn Backend>,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        textures: Vec<TextureRef>,
    ) -> Self {
        let geometry = Geometry::new(gl, &vertices, &indices);
        Self {
            vertices,
            indices,
            textures,
            geometry,
        }
    }

    /// Binds every texture to its own unit, publishes the unit numbers to `material.<kind>[n]`
    /// and the per-kind counts to `material.num_<kind>`, then draws.
    pub fn draw(&self, shader: &ShaderProgram) {
        let gl = &self.geometry.gl;
        let mut diffuse = 0;
        let mut specular = 0;
        let mut normal = 0;
        let mut height = 0;

        for (unit, texture) in self.textures.iter().enumerate() {
            gl.active_texture_unit(unit as u32);

            let number = match texture.kind {
                TextureKind::Diffuse => next(&mut diffuse),
                TextureKind::Specular => next(&mut specular),
                TextureKind::Normal => next(&mut normal),
                TextureKind::Height => next(&mut height),
                TextureKind::Other(_) => "unknown".to_string(),
            };

            shader.set_uniform(
                &format!("material.{}[{}]", texture.kind, number),
                unit as i32,
            );
            gl.bind_texture_2d(texture.raw);
        }

        shader.set_uniform("material.num_diffuse", diffuse);
        shader.set_uniform("material.num_specular", specular);
        shader.set_uniform("material.num_normal", normal);
        shader.set_uniform("material.num_height", height);

        self.geometry.draw();

        gl.active_texture_unit(0);
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn textures(&self) -> &[TextureRef] {
        &self.textures
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }
}

fn next(counter: &mut i32) -> String {
    let number = counter.to_string();
    *counter += 1;
    number
}
