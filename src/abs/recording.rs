//! A [`Backend`] that hands out fake ids and records every call, for tests.

use std::cell::{Cell, RefCell};

use fxhash::{FxHashMap, FxHashSet};
use glam::Vec3;

use super::backend::{
    Backend, BufferTarget, HandleKind, PixelFormat, RawHandle, ShaderStage, TextureImage,
    UniformLocation,
};

/// A value written to a uniform.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vector(Vec<f32>),
    Matrix(u8, Vec<f32>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(HandleKind, RawHandle),
    Delete(HandleKind, RawHandle),
    BindVertexArray(RawHandle),
    BindBuffer(BufferTarget, RawHandle),
    BufferData(BufferTarget, usize),
    VertexAttrib {
        index: u32,
        size: i32,
        stride: i32,
        offset: i32,
    },
    DrawTriangles {
        count: i32,
        first: usize,
    },
    ActiveTexture(u32),
    BindTexture(RawHandle),
    UploadTexture {
        width: u32,
        height: u32,
        format: PixelFormat,
        srgb: bool,
    },
    TextureParameter(u32, i32),
    CreateShader(ShaderStage, RawHandle),
    CompileShader(RawHandle),
    DeleteShader(RawHandle),
    CreateProgram(RawHandle),
    AttachShader(RawHandle, RawHandle),
    DetachShader(RawHandle, RawHandle),
    LinkProgram(RawHandle),
    UseProgram(RawHandle),
    DeleteProgram(RawHandle),
    Uniform(String, UniformValue),
    Clear(Vec3),
    Enable(u32),
    Viewport(i32, i32),
}

/// Shader sources containing this marker fail to compile.
pub const COMPILE_ERROR_MARKER: &str = "#error";

#[derive(Default)]
pub struct RecordingBackend {
    calls: RefCell<Vec<Call>>,
    next_id: Cell<RawHandle>,
    fail_allocations: Cell<bool>,
    sources: RefCell<FxHashMap<RawHandle, String>>,
    attached: RefCell<FxHashMap<RawHandle, Vec<RawHandle>>>,
    linked: RefCell<FxHashSet<RawHandle>>,
    locations: RefCell<Vec<String>>,
    missing_uniforms: RefCell<FxHashSet<String>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following allocation fail.
    pub fn fail_allocations(&self, fail: bool) {
        self.fail_allocations.set(fail);
    }

    /// Makes `name` unresolvable in every program.
    pub fn hide_uniform(&self, name: &str) {
        self.missing_uniforms.borrow_mut().insert(name.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn creates(&self, kind: HandleKind) -> usize {
        self.count(|call| matches!(call, Call::Create(k, _) if *k == kind))
    }

    pub fn deletes(&self, kind: HandleKind) -> usize {
        self.count(|call| matches!(call, Call::Delete(k, _) if *k == kind))
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| predicate(call)).count()
    }

    /// Every uniform write in call order.
    pub fn uniforms(&self) -> Vec<(String, UniformValue)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Uniform(name, value) => Some((name.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    /// The last value written to `name`.
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms()
            .into_iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn allocate(&self) -> Result<RawHandle, String> {
        if self.fail_allocations.get() {
            return Err("out of memory".to_string());
        }
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        Ok(id)
    }

    fn record_uniform(&self, location: UniformLocation, value: UniformValue) {
        let name = self
            .locations
            .borrow()
            .get(location.0 as usize)
            .cloned()
            .unwrap_or_default();
        self.record(Call::Uniform(name, value));
    }
}

impl Backend for RecordingBackend {
    fn create_resource(&self, kind: HandleKind) -> Result<RawHandle, String> {
        let id = self.allocate()?;
        self.record(Call::Create(kind, id));
        Ok(id)
    }

    fn delete_resource(&self, kind: HandleKind, handle: RawHandle) {
        self.record(Call::Delete(kind, handle));
    }

    fn bind_vertex_array(&self, vertex_array: RawHandle) {
        self.record(Call::BindVertexArray(vertex_array));
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: RawHandle) {
        self.record(Call::BindBuffer(target, buffer));
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        self.record(Call::BufferData(target, data.len()));
    }

    fn vertex_attrib_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        self.record(Call::VertexAttrib {
            index,
            size,
            stride,
            offset,
        });
    }

    fn draw_triangles(&self, count: i32, first: usize) {
        self.record(Call::DrawTriangles { count, first });
    }

    fn active_texture_unit(&self, unit: u32) {
        self.record(Call::ActiveTexture(unit));
    }

    fn bind_texture_2d(&self, texture: RawHandle) {
        self.record(Call::BindTexture(texture));
    }

    fn upload_texture_2d(&self, image: &TextureImage) {
        self.record(Call::UploadTexture {
            width: image.width,
            height: image.height,
            format: image.format,
            srgb: image.srgb,
        });
    }

    fn texture_parameter(&self, parameter: u32, value: i32) {
        self.record(Call::TextureParameter(parameter, value));
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<RawHandle, String> {
        let id = self.allocate()?;
        self.record(Call::CreateShader(stage, id));
        Ok(id)
    }

    fn shader_source(&self, shader: RawHandle, source: &str) {
        self.sources.borrow_mut().insert(shader, source.to_string());
    }

    fn compile_shader(&self, shader: RawHandle) {
        self.record(Call::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: RawHandle) -> bool {
        let sources = self.sources.borrow();
        match sources.get(&shader) {
            Some(source) => !source.trim().is_empty() && !source.contains(COMPILE_ERROR_MARKER),
            None => false,
        }
    }

    fn shader_info_log(&self, shader: RawHandle) -> String {
        let padding = "x".repeat(600);
        format!("0:1(1): error: shader {} rejected: {}", shader, padding)
    }

    fn delete_shader(&self, shader: RawHandle) {
        self.record(Call::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<RawHandle, String> {
        let id = self.allocate()?;
        self.record(Call::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&self, program: RawHandle, shader: RawHandle) {
        self.attached.borrow_mut().entry(program).or_default().push(shader);
        self.record(Call::AttachShader(program, shader));
    }

    fn detach_shader(&self, program: RawHandle, shader: RawHandle) {
        if let Some(shaders) = self.attached.borrow_mut().get_mut(&program) {
            shaders.retain(|&s| s != shader);
        }
        self.record(Call::DetachShader(program, shader));
    }

    fn link_program(&self, program: RawHandle) {
        let ok = self.attached.borrow().get(&program).is_some_and(|shaders| {
            !shaders.is_empty() && shaders.iter().all(|&s| self.shader_compile_status(s))
        });
        if ok {
            self.linked.borrow_mut().insert(program);
        }
        self.record(Call::LinkProgram(program));
    }

    fn program_link_status(&self, program: RawHandle) -> bool {
        self.linked.borrow().contains(&program)
    }

    fn program_info_log(&self, program: RawHandle) -> String {
        format!("error: program {} has unresolved stages", program)
    }

    fn use_program(&self, program: RawHandle) {
        self.record(Call::UseProgram(program));
    }

    fn delete_program(&self, program: RawHandle) {
        self.record(Call::DeleteProgram(program));
    }

    fn uniform_location(&self, program: RawHandle, name: &str) -> Option<UniformLocation> {
        if program == 0 || self.missing_uniforms.borrow().contains(name) {
            return None;
        }
        let mut locations = self.locations.borrow_mut();
        let index = match locations.iter().position(|n| n == name) {
            Some(index) => index,
            None => {
                locations.push(name.to_string());
                locations.len() - 1
            }
        };
        Some(UniformLocation(index as u32))
    }

    fn uniform_i32(&self, location: UniformLocation, value: i32) {
        self.record_uniform(location, UniformValue::Int(value));
    }

    fn uniform_f32(&self, location: UniformLocation, value: f32) {
        self.record_uniform(location, UniformValue::Float(value));
    }

    fn uniform_vec_f32(&self, location: UniformLocation, components: u8, data: &[f32]) {
        debug_assert_eq!(data.len(), components as usize);
        self.record_uniform(location, UniformValue::Vector(data.to_vec()));
    }

    fn uniform_matrix_f32(&self, location: UniformLocation, dimension: u8, data: &[f32]) {
        self.record_uniform(location, UniformValue::Matrix(dimension, data.to_vec()));
    }

    fn clear(&self, color: Vec3) {
        self.record(Call::Clear(color));
    }

    fn enable(&self, capability: u32) {
        self.record(Call::Enable(capability));
    }

    fn viewport(&self, width: i32, height: i32) {
        self.record(Call::Viewport(width, height));
    }
}
