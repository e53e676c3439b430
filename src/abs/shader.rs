//! Shader programs
//!
//! This module defines the [`ShaderProgram`] struct which compiles a vertex and a fragment stage,
//! links them and sets uniforms by name. It also provides the [`Uniform`] trait for the values
//! that can be written to a uniform.

use std::{path::Path, sync::Arc};

use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::abs::{Backend, RawHandle, ShaderStage, UniformLocation};

/// Compile and link diagnostics are cut to this many bytes before logging.
pub const DIAGNOSTIC_LIMIT: usize = 512;

/// Cuts `log` to at most [`DIAGNOSTIC_LIMIT`] bytes without splitting a character.
pub fn truncate_diagnostic(log: &str) -> &str {
    if log.len() <= DIAGNOSTIC_LIMIT {
        return log;
    }
    let mut end = DIAGNOSTIC_LIMIT;
    while !log.is_char_boundary(end) {
        end -= 1;
    }
    &log[..end]
}

/// One compiled stage. Released on drop, which happens right after linking.
struct Stage {
    gl: Arc<dyn Backend>,
    id: RawHandle,
}

impl Stage {
    fn compile(gl: &Arc<dyn Backend>, stage: ShaderStage, source: &str) -> Self {
        let id = match gl.create_shader(stage) {
            Ok(id) => id,
            Err(e) => {
                log::error!("Failed to create {:?} shader: {}", stage, e);
                0
            }
        };

        gl.shader_source(id, source);
        gl.compile_shader(id);
        if !gl.shader_compile_status(id) {
            let diagnostic = gl.shader_info_log(id);
            log::error!(
                "{:?} shader compilation failed: {}",
                stage,
                truncate_diagnostic(&diagnostic)
            );
        }

        Self {
            gl: Arc::clone(gl),
            id,
        }
    }
}

impl Drop for Stage {
    fn drop(&mut self) {
        if self.id != 0 {
            self.gl.delete_shader(self.id);
        }
    }
}

/// A value that can be written to a shader uniform.
pub trait Uniform {
    /// Writes the value to the uniform at `location` of the current program.
    fn set_uniform(&self, gl: &dyn Backend, location: UniformLocation);
}

impl Uniform for bool {
    fn set_uniform(&self, gl: &dyn Backend, location: UniformLocation) {
        gl.uniform_i32(location, *self as i32);
    }
}

impl Uniform for i32 {
    fn set_uniform(&self, gl: &dyn Backend, location: UniformLocation) {
        gl.uniform_i32(location, *self);
    }
}

impl Uniform for f32 {
    fn set_uniform(&self, gl: &dyn Backend, location: UniformLocation) {
        gl.uniform_f32(location, *self);
    }
}

impl Uniform for [f32; 1] {
    fn set_uniform(&self, gl: &dyn Backend, location: UniformLocation) {
        gl.uniform_vec_f32(location, 1, self);
    }
}

impl Uniform for Vec2 {
    fn set_uniform(&self, gl: &dyn Backend, location: UniformLocation) {
        gl.uniform_vec_f32(location, 2, &self.to_array());
    }
}

impl Uniform for Vec3 {
    fn set_uniform(&self, gl: &dyn Backend, location: UniformLocation) {
        gl.uniform_vec_f32(location, 3, &self.to_array());
    }
}

impl Uniform for Vec4 {
    fn set_uniform(&self, gl: &dyn Backend, location: UniformLocation) {
        gl.uniform_vec_f32(location, 4, &self.to_array());
    }
}

impl Uniform for Mat2 {
    fn set_uniform(&self, gl: &dyn Backend, location: UniformLocation) {
        gl.uniform_matrix_f32(location, 2, &self.to_cols_array());
    }
}

impl Uniform for Mat3 {
    fn set_uniform(&self, gl: &dyn Backend, location: UniformLocation) {
        gl.uniform_matrix_f32(location, 3, &self.to_cols_array());
    }
}

impl Uniform for Mat4 {
    fn set_uniform(&self, gl: &dyn Backend, location: UniformLocation) {
        gl.uniform_matrix_f32(location, 4, &self.to_cols_array());
    }
}

impl<T: Uniform> Uniform for &T {
    fn set_uniform(&self, gl: &dyn Backend, location: UniformLocation) {
        (*self).set_uniform(gl, location);
    }
}

/// A linked vertex + fragment program.
pub struct ShaderProgram {
    gl: Arc<dyn Backend>,
    id: RawHandle,
    linked: bool,
}

impl ShaderProgram {
    /// Reads both stages from disk and builds the program. An unreadable file is logged and
    /// compiled as empty source, which fails compilation and leaves the program unlinked.
    pub fn from_files(
        gl: &Arc<dyn Backend>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Self {
        let vertex_source = read_source(vertex_path.as_ref());
        let fragment_source = read_source(fragment_path.as_ref());
        Self::from_sources(gl, &vertex_source, &fragment_source)
    }

    /// Compiles both stages, links them and releases the stages.
    ///
    /// Failures are logged and never abort construction; check [`ShaderProgram::is_linked`] to
    /// find out whether the program is usable.
    pub fn from_sources(gl: &Arc<dyn Backend>, vertex_source: &str, fragment_source: &str) -> Self {
        let vertex = Stage::compile(gl, ShaderStage::Vertex, vertex_source);
        let fragment = Stage::compile(gl, ShaderStage::Fragment, fragment_source);

        let id = match gl.create_program() {
            Ok(id) => id,
            Err(e) => {
                log::error!("Failed to create shader program: {}", e);
                return Self {
                    gl: Arc::clone(gl),
                    id: 0,
                    linked: false,
                };
            }
        };

        gl.attach_shader(id, vertex.id);
        gl.attach_shader(id, fragment.id);
        gl.link_program(id);

        let linked = gl.program_link_status(id);
        if !linked {
            let diagnostic = gl.program_info_log(id);
            log::error!(
                "Shader program linking failed: {}",
                truncate_diagnostic(&diagnostic)
            );
        }

        gl.detach_shader(id, vertex.id);
        gl.detach_shader(id, fragment.id);

        Self {
            gl: Arc::clone(gl),
            id,
            linked,
        }
    }

    /// Makes this program current.
    pub fn activate(&self) {
        self.gl.use_program(self.id);
    }

    /// Writes `value` to the uniform `name`. A name that does not resolve is ignored.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) {
        if let Some(location) = self.gl.uniform_location(self.id, name) {
            value.set_uniform(self.gl.as_ref(), location);
        }
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn id(&self) -> RawHandle {
        self.id
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if self.id != 0 {
            self.gl.delete_program(self.id);
        }
    }
}

fn read_source(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        log::error!("Failed to read shader {}: {}", path.display(), e);
        String::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::abs::recording::{COMPILE_ERROR_MARKER, Call, RecordingBackend, UniformValue};

    const VERTEX: &str = "#version 330 core\nvoid main() { gl_Position = vec4(0.0); }\n";
    const FRAGMENT: &str = "#version 330 core\nout vec4 c;\nvoid main() { c = vec4(1.0); }\n";

    fn backend() -> (Arc<RecordingBackend>, Arc<dyn Backend>) {
        let recorder = Arc::new(RecordingBackend::new());
        let gl: Arc<dyn Backend> = recorder.clone();
        (recorder, gl)
    }

    #[test]
    fn test_links_and_releases_stages() {
        let (recorder, gl) = backend();
        let program = ShaderProgram::from_sources(&gl, VERTEX, FRAGMENT);
        assert!(program.is_linked());
        assert_ne!(program.id(), 0);

        assert_eq!(recorder.count(|c| matches!(c, Call::CompileShader(_))), 2);
        assert_eq!(recorder.count(|c| matches!(c, Call::DetachShader(..))), 2);
        assert_eq!(recorder.count(|c| matches!(c, Call::DeleteShader(_))), 2);

        let id = program.id();
        drop(program);
        assert!(recorder.calls().contains(&Call::DeleteProgram(id)));
    }

    #[test]
    fn test_compile_failure_still_links() {
        let (recorder, gl) = backend();
        let broken = format!("{}\n{}", COMPILE_ERROR_MARKER, FRAGMENT);
        let program = ShaderProgram::from_sources(&gl, VERTEX, &broken);

        assert!(!program.is_linked());
        assert_eq!(recorder.count(|c| matches!(c, Call::LinkProgram(_))), 1);
        assert_eq!(recorder.count(|c| matches!(c, Call::DeleteShader(_))), 2);
    }

    #[test]
    fn test_missing_files_degrade() {
        let (recorder, gl) = backend();
        let program =
            ShaderProgram::from_files(&gl, "/nowhere/vertex.glsl", "/nowhere/fragment.glsl");
        assert!(!program.is_linked());
        assert_eq!(recorder.count(|c| matches!(c, Call::LinkProgram(_))), 1);
    }

    #[test]
    fn test_from_files_reads_sources() {
        let dir = std::env::temp_dir().join(format!("glclock-shader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("v.glsl"), VERTEX).unwrap();
        std::fs::write(dir.join("f.glsl"), FRAGMENT).unwrap();

        let (_recorder, gl) = backend();
        let program = ShaderProgram::from_files(&gl, dir.join("v.glsl"), dir.join("f.glsl"));
        assert!(program.is_linked());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_truncate_diagnostic() {
        assert_eq!(truncate_diagnostic("short"), "short");

        let long = "e".repeat(600);
        assert_eq!(truncate_diagnostic(&long).len(), DIAGNOSTIC_LIMIT);

        // 511 ASCII bytes then a two-byte character straddling the limit.
        let straddling = format!("{}é{}", "a".repeat(511), "b".repeat(10));
        assert_eq!(truncate_diagnostic(&straddling), "a".repeat(511));
    }

    #[test]
    fn test_uniform_writes() {
        let (recorder, gl) = backend();
        let program = ShaderProgram::from_sources(&gl, VERTEX, FRAGMENT);
        recorder.clear_calls();

        program.activate();
        program.set_uniform("flag", true);
        program.set_uniform("count", 3);
        program.set_uniform("radius", 0.5f32);
        program.set_uniform("single", [2.0f32]);
        program.set_uniform("color", Vec3::new(1.0, 0.5, 0.25));
        program.set_uniform("model", Mat4::IDENTITY);
        program.set_uniform("rotation", &Mat2::IDENTITY);

        assert_eq!(recorder.calls()[0], Call::UseProgram(program.id()));
        assert_eq!(
            recorder.uniforms(),
            vec![
                ("flag".to_string(), UniformValue::Int(1)),
                ("count".to_string(), UniformValue::Int(3)),
                ("radius".to_string(), UniformValue::Float(0.5)),
                ("single".to_string(), UniformValue::Vector(vec![2.0])),
                (
                    "color".to_string(),
                    UniformValue::Vector(vec![1.0, 0.5, 0.25])
                ),
                (
                    "model".to_string(),
                    UniformValue::Matrix(4, Mat4::IDENTITY.to_cols_array().to_vec())
                ),
                (
                    "rotation".to_string(),
                    UniformValue::Matrix(2, Mat2::IDENTITY.to_cols_array().to_vec())
                ),
            ]
        );
    }

    #[test]
    fn test_unknown_uniform_is_a_noop() {
        let (recorder, gl) = backend();
        recorder.hide_uniform("ghost");
        let program = ShaderProgram::from_sources(&gl, VERTEX, FRAGMENT);
        recorder.clear_calls();

        program.set_uniform("ghost", 1.0f32);
        assert!(recorder.calls().is_empty());
    }
}
