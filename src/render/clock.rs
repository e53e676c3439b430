//! The clock renderer.
//!
//! The face is a full-screen quad whose fragment shader cuts out a disc with hour marks. The
//! three hands are triangles sharing one buffer, each drawn with its own rotation.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use glclock_core::{
    CoreError,
    clock::{Hand, HandAngles, hand_transform},
    config::{ClockConfig, HandsConfig, Palette},
};

use crate::abs::{Backend, Geometry, ShaderProgram};

pub const QUAD_VERTICES: [Vec3; 4] = [
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(1.0, -1.0, 0.0),
    Vec3::new(-1.0, -1.0, 0.0),
    Vec3::new(-1.0, 1.0, 0.0),
];

pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 3, 0, 2];

/// One triangle per hand in [`Hand::ALL`] order, pointing at 12 o'clock with its base centred
/// on the origin.
pub fn hand_vertices(hands: &HandsConfig) -> Vec<Vec3> {
    let w = hands.half_width;
    Hand::ALL
        .iter()
        .flat_map(|&hand| {
            [
                Vec3::new(-w, -w, 0.0),
                Vec3::new(w, -w, 0.0),
                Vec3::new(0.0, hands.get(hand).length, 0.0),
            ]
        })
        .collect()
}

pub struct ClockRenderer {
    gl: Arc<dyn Backend>,
    face: Geometry,
    hands: Geometry,
    circle_program: ShaderProgram,
    triangle_program: ShaderProgram,
    palette: Palette,
    radius: f32,
    line_length: f32,
}

impl ClockRenderer {
    /// Builds the geometry and compiles both programs from the shader paths in `config`.
    pub fn new(gl: &Arc<dyn Backend>, config: &ClockConfig) -> Result<Self, CoreError> {
        let circle_program = ShaderProgram::from_files(
            gl,
            &config.shaders.circle_vertex,
            &config.shaders.circle_fragment,
        );
        let triangle_program = ShaderProgram::from_files(
            gl,
            &config.shaders.triangle_vertex,
            &config.shaders.triangle_fragment,
        );
        Self::with_programs(gl, config, circle_program, triangle_program)
    }

    pub fn with_programs(
        gl: &Arc<dyn Backend>,
        config: &ClockConfig,
        circle_program: ShaderProgram,
        triangle_program: ShaderProgram,
    ) -> Result<Self, CoreError> {
        let palette = config.palette()?;

        let face = Geometry::new(gl, &QUAD_VERTICES, &QUAD_INDICES);
        let hand_indices: Vec<u32> = (0..Hand::ALL.len() as u32 * 3).collect();
        let hands = Geometry::new(gl, &hand_vertices(&config.hands), &hand_indices);

        Ok(Self {
            gl: Arc::clone(gl),
            face,
            hands,
            circle_program,
            triangle_program,
            palette,
            radius: config.face.radius,
            line_length: config.face.line_length,
        })
    }

    /// Clears the frame and draws the face and the hands at `angles`.
    pub fn render(&self, angles: &HandAngles) {
        self.gl.clear(self.palette.clear);

        self.circle_program.activate();
        self.circle_program.set_uniform("model", Mat4::IDENTITY);
        self.circle_program.set_uniform("circle_color", self.palette.face);
        self.circle_program.set_uniform("radius", self.radius);
        self.circle_program.set_uniform("line_length", self.line_length);
        self.face.draw();

        self.triangle_program.activate();
        for hand in Hand::ALL {
            let i = hand.index();
            self.triangle_program
                .set_uniform("triangle_color", self.palette.hands[i]);
            self.triangle_program
                .set_uniform("model", hand_transform(angles.get(hand)));
            self.hands.draw_range(i * 3, 3);
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}
