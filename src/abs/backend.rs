//! The graphics backend seam.
//!
//! Every GPU call made by the wrappers in [`crate::abs`] goes through the [`Backend`] trait.
//! The real implementation forwards to [`glow::Context`]. Object names cross the seam as raw
//! `u32` ids where `0` means "no object", the same convention OpenGL itself uses.

use std::num::NonZeroU32;

use glam::Vec3;
use glow::HasContext;

/// A raw backend object id. `0` is the null object.
pub type RawHandle = u32;

/// The kinds of GPU resource owned through [`crate::abs::GpuHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    VertexArray,
    VertexBuffer,
    IndexBuffer,
    Texture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

impl BufferTarget {
    fn gl_enum(self) -> u32 {
        match self {
            BufferTarget::Array => glow::ARRAY_BUFFER,
            BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
        }
    }
}

/// Channel layout of uploaded pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Red,
    Rgb,
    Rgba,
}

impl PixelFormat {
    fn gl_enum(self) -> u32 {
        match self {
            PixelFormat::Red => glow::RED,
            PixelFormat::Rgb => glow::RGB,
            PixelFormat::Rgba => glow::RGBA,
        }
    }

    fn internal_format(self, srgb: bool) -> u32 {
        match (self, srgb) {
            (PixelFormat::Rgb, true) => glow::SRGB8,
            (PixelFormat::Rgba, true) => glow::SRGB8_ALPHA8,
            (format, _) => format.gl_enum(),
        }
    }
}

/// Pixel data for a 2D texture upload.
#[derive(Debug, Clone, Copy)]
pub struct TextureImage<'a> {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub srgb: bool,
    pub data: &'a [u8],
}

/// A resolved uniform location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// The set of graphics calls the wrappers need.
pub trait Backend {
    fn create_resource(&self, kind: HandleKind) -> Result<RawHandle, String>;
    fn delete_resource(&self, kind: HandleKind, handle: RawHandle);

    fn bind_vertex_array(&self, vertex_array: RawHandle);
    fn bind_buffer(&self, target: BufferTarget, buffer: RawHandle);
    fn buffer_data(&self, target: BufferTarget, data: &[u8]);
    /// Describes float attribute `index` of the bound vertex array and enables it. `stride` and
    /// `offset` are in bytes.
    fn vertex_attrib_f32(&self, index: u32, size: i32, stride: i32, offset: i32);
    /// Draws `count` `u32` indices as triangles starting at index `first`.
    fn draw_triangles(&self, count: i32, first: usize);

    fn active_texture_unit(&self, unit: u32);
    fn bind_texture_2d(&self, texture: RawHandle);
    /// Uploads level 0 of the bound 2D texture and generates its mipmaps.
    fn upload_texture_2d(&self, image: &TextureImage);
    fn texture_parameter(&self, parameter: u32, value: i32);

    fn create_shader(&self, stage: ShaderStage) -> Result<RawHandle, String>;
    fn shader_source(&self, shader: RawHandle, source: &str);
    fn compile_shader(&self, shader: RawHandle);
    fn shader_compile_status(&self, shader: RawHandle) -> bool;
    fn shader_info_log(&self, shader: RawHandle) -> String;
    fn delete_shader(&self, shader: RawHandle);

    fn create_program(&self) -> Result<RawHandle, String>;
    fn attach_shader(&self, program: RawHandle, shader: RawHandle);
    fn detach_shader(&self, program: RawHandle, shader: RawHandle);
    fn link_program(&self, program: RawHandle);
    fn program_link_status(&self, program: RawHandle) -> bool;
    fn program_info_log(&self, program: RawHandle) -> String;
    fn use_program(&self, program: RawHandle);
    fn delete_program(&self, program: RawHandle);

    fn uniform_location(&self, program: RawHandle, name: &str) -> Option<UniformLocation>;
    fn uniform_i32(&self, location: UniformLocation, value: i32);
    fn uniform_f32(&self, location: UniformLocation, value: f32);
    /// Writes a float vector uniform with `components` (1 to 4) components.
    fn uniform_vec_f32(&self, location: UniformLocation, components: u8, data: &[f32]);
    /// Writes a column-major square matrix uniform of `dimension` (2 to 4).
    fn uniform_matrix_f32(&self, location: UniformLocation, dimension: u8, data: &[f32]);

    fn clear(&self, color: Vec3);
    fn enable(&self, capability: u32);
    fn viewport(&self, width: i32, height: i32);
}

fn nonzero(handle: RawHandle) -> Option<NonZeroU32> {
    NonZeroU32::new(handle)
}

impl Backend for glow::Context {
    fn create_resource(&self, kind: HandleKind) -> Result<RawHandle, String> {
        unsafe {
            match kind {
                HandleKind::VertexArray => self.create_vertex_array().map(|v| v.0.get()),
                HandleKind::VertexBuffer | HandleKind::IndexBuffer => {
                    self.create_buffer().map(|b| b.0.get())
                }
                HandleKind::Texture => self.create_texture().map(|t| t.0.get()),
            }
        }
    }

    fn delete_resource(&self, kind: HandleKind, handle: RawHandle) {
        let Some(id) = nonzero(handle) else {
            return;
        };
        unsafe {
            match kind {
                HandleKind::VertexArray => self.delete_vertex_array(glow::NativeVertexArray(id)),
                HandleKind::VertexBuffer | HandleKind::IndexBuffer => {
                    self.delete_buffer(glow::NativeBuffer(id))
                }
                HandleKind::Texture => self.delete_texture(glow::NativeTexture(id)),
            }
        }
    }

    fn bind_vertex_array(&self, vertex_array: RawHandle) {
        unsafe {
            let vertex_array = nonzero(vertex_array).map(glow::NativeVertexArray);
            HasContext::bind_vertex_array(self, vertex_array);
        }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: RawHandle) {
        unsafe {
            let buffer = nonzero(buffer).map(glow::NativeBuffer);
            HasContext::bind_buffer(self, target.gl_enum(), buffer);
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        unsafe {
            self.buffer_data_u8_slice(target.gl_enum(), data, glow::STATIC_DRAW);
        }
    }

    fn vertex_attrib_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        unsafe {
            self.vertex_attrib_pointer_f32(index, size, glow::FLOAT, false, stride, offset);
            self.enable_vertex_attrib_array(index);
        }
    }

    fn draw_triangles(&self, count: i32, first: usize) {
        unsafe {
            self.draw_elements(
                glow::TRIANGLES,
                count,
                glow::UNSIGNED_INT,
                (first * std::mem::size_of::<u32>()) as i32,
            );
        }
    }

    fn active_texture_unit(&self, unit: u32) {
        unsafe {
            self.active_texture(glow::TEXTURE0 + unit);
        }
    }

    fn bind_texture_2d(&self, texture: RawHandle) {
        unsafe {
            self.bind_texture(glow::TEXTURE_2D, nonzero(texture).map(glow::NativeTexture));
        }
    }

    fn upload_texture_2d(&self, image: &TextureImage) {
        unsafe {
            self.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                image.format.internal_format(image.srgb) as i32,
                image.width as i32,
                image.height as i32,
                0,
                image.format.gl_enum(),
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(image.data)),
            );
            self.generate_mipmap(glow::TEXTURE_2D);
        }
    }

    fn texture_parameter(&self, parameter: u32, value: i32) {
        unsafe {
            self.tex_parameter_i32(glow::TEXTURE_2D, parameter, value);
        }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<RawHandle, String> {
        unsafe { HasContext::create_shader(self, stage.gl_enum()).map(|s| s.0.get()) }
    }

    fn shader_source(&self, shader: RawHandle, source: &str) {
        if let Some(id) = nonzero(shader) {
            unsafe { HasContext::shader_source(self, glow::NativeShader(id), source) }
        }
    }

    fn compile_shader(&self, shader: RawHandle) {
        if let Some(id) = nonzero(shader) {
            unsafe { HasContext::compile_shader(self, glow::NativeShader(id)) }
        }
    }

    fn shader_compile_status(&self, shader: RawHandle) -> bool {
        nonzero(shader)
            .is_some_and(|id| unsafe { self.get_shader_compile_status(glow::NativeShader(id)) })
    }

    fn shader_info_log(&self, shader: RawHandle) -> String {
        nonzero(shader)
            .map(|id| unsafe { self.get_shader_info_log(glow::NativeShader(id)) })
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: RawHandle) {
        if let Some(id) = nonzero(shader) {
            unsafe { HasContext::delete_shader(self, glow::NativeShader(id)) }
        }
    }

    fn create_program(&self) -> Result<RawHandle, String> {
        unsafe { HasContext::create_program(self).map(|p| p.0.get()) }
    }

    fn attach_shader(&self, program: RawHandle, shader: RawHandle) {
        if let (Some(p), Some(s)) = (nonzero(program), nonzero(shader)) {
            unsafe {
                HasContext::attach_shader(self, glow::NativeProgram(p), glow::NativeShader(s))
            }
        }
    }

    fn detach_shader(&self, program: RawHandle, shader: RawHandle) {
        if let (Some(p), Some(s)) = (nonzero(program), nonzero(shader)) {
            unsafe {
                HasContext::detach_shader(self, glow::NativeProgram(p), glow::NativeShader(s))
            }
        }
    }

    fn link_program(&self, program: RawHandle) {
        if let Some(id) = nonzero(program) {
            unsafe { HasContext::link_program(self, glow::NativeProgram(id)) }
        }
    }

    fn program_link_status(&self, program: RawHandle) -> bool {
        nonzero(program)
            .is_some_and(|id| unsafe { self.get_program_link_status(glow::NativeProgram(id)) })
    }

    fn program_info_log(&self, program: RawHandle) -> String {
        nonzero(program)
            .map(|id| unsafe { self.get_program_info_log(glow::NativeProgram(id)) })
            .unwrap_or_default()
    }

    fn use_program(&self, program: RawHandle) {
        unsafe {
            HasContext::use_program(self, nonzero(program).map(glow::NativeProgram));
        }
    }

    fn delete_program(&self, program: RawHandle) {
        if let Some(id) = nonzero(program) {
            unsafe { HasContext::delete_program(self, glow::NativeProgram(id)) }
        }
    }

    fn uniform_location(&self, program: RawHandle, name: &str) -> Option<UniformLocation> {
        let id = nonzero(program)?;
        unsafe {
            self.get_uniform_location(glow::NativeProgram(id), name)
                .map(|location| UniformLocation(location.0))
        }
    }

    fn uniform_i32(&self, location: UniformLocation, value: i32) {
        unsafe {
            self.uniform_1_i32(Some(&glow::NativeUniformLocation(location.0)), value);
        }
    }

    fn uniform_f32(&self, location: UniformLocation, value: f32) {
        unsafe {
            self.uniform_1_f32(Some(&glow::NativeUniformLocation(location.0)), value);
        }
    }

    fn uniform_vec_f32(&self, location: UniformLocation, components: u8, data: &[f32]) {
        let location = glow::NativeUniformLocation(location.0);
        unsafe {
            match components {
                1 => self.uniform_1_f32_slice(Some(&location), data),
                2 => self.uniform_2_f32_slice(Some(&location), data),
                3 => self.uniform_3_f32_slice(Some(&location), data),
                4 => self.uniform_4_f32_slice(Some(&location), data),
                _ => log::warn!("Unsupported uniform vector size {}", components),
            }
        }
    }

    fn uniform_matrix_f32(&self, location: UniformLocation, dimension: u8, data: &[f32]) {
        let location = glow::NativeUniformLocation(location.0);
        unsafe {
            match dimension {
                2 => self.uniform_matrix_2_f32_slice(Some(&location), false, data),
                3 => self.uniform_matrix_3_f32_slice(Some(&location), false, data),
                4 => self.uniform_matrix_4_f32_slice(Some(&location), false, data),
                _ => log::warn!("Unsupported uniform matrix size {}", dimension),
            }
        }
    }

    fn clear(&self, color: Vec3) {
        unsafe {
            self.clear_color(color.x, color.y, color.z, 0.0);
            HasContext::clear(self, glow::COLOR_BUFFER_BIT);
        }
    }

    fn enable(&self, capability: u32) {
        unsafe {
            HasContext::enable(self, capability);
        }
    }

    fn viewport(&self, width: i32, height: i32) {
        unsafe {
            HasContext::viewport(self, 0, 0, width, height);
        }
    }
}
