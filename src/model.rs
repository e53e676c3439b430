//! Model loading.
//!
//! A [`Model`] is built from an OBJ file: every imported mesh becomes a [`Mesh`] and every
//! texture path its materials mention is decoded once into the model's texture cache.

use std::{path::Path, sync::Arc};

use fxhash::FxHashMap;
use glclock_core::scene::{
    ImportedMaterial, ImportedMesh, ImportedScene, MaterialSlot, PostProcess, import_obj,
};

use crate::{
    abs::{Backend, Mesh, ShaderProgram, Texture, TextureKind, TextureParams, TextureRef},
    error::ModelError,
};

/// Material slots in resolution order, with the kind each one is drawn as.
///
/// OBJ bump maps arrive in the height slot and are drawn as normal maps; ambient maps are drawn
/// as height maps.
const SLOT_KINDS: [(MaterialSlot, TextureKind); 4] = [
    (MaterialSlot::Diffuse, TextureKind::Diffuse),
    (MaterialSlot::Specular, TextureKind::Specular),
    (MaterialSlot::Height, TextureKind::Normal),
    (MaterialSlot::Ambient, TextureKind::Height),
];

/// The part of `path` before its last `/`, or an empty string when there is none.
pub fn directory_of(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..i])
}

pub struct Model {
    gl: Arc<dyn Backend>,
    meshes: Vec<Mesh>,
    textures: Vec<Texture>,
    cache: FxHashMap<String, usize>,
    directory: String,
    params: TextureParams,
}

impl Model {
    /// Loads the model at `path`. Any failure is logged and yields a model without meshes.
    pub fn load(gl: &Arc<dyn Backend>, path: &str) -> Self {
        match Self::try_load(gl, path) {
            Ok(model) => model,
            Err(e) => {
                log::error!("Failed to load model {}: {}", path, e);
                Self::empty(gl, "")
            }
        }
    }

    pub fn try_load(gl: &Arc<dyn Backend>, path: &str) -> Result<Self, ModelError> {
        let scene = import_obj(Path::new(path), PostProcess::MODEL_LOADING)?;
        let model = Self::from_scene(gl, &scene, directory_of(path))?;
        log::info!(
            "Loaded model {}: {} meshes, {} textures",
            path,
            model.meshes.len(),
            model.textures.len()
        );
        Ok(model)
    }

    /// Builds a model from an already imported scene. Texture paths are resolved against
    /// `directory`.
    pub fn from_scene(
        gl: &Arc<dyn Backend>,
        scene: &ImportedScene,
        directory: &str,
    ) -> Result<Self, ModelError> {
        Self::from_scene_with(gl, scene, directory, TextureParams::default())
    }

    pub fn from_scene_with(
        gl: &Arc<dyn Backend>,
        scene: &ImportedScene,
        directory: &str,
        params: TextureParams,
    ) -> Result<Self, ModelError> {
        scene.validate(directory)?;

        let mut model = Self::empty(gl, directory);
        model.params = params;
        for index in scene.mesh_order() {
            let Some(mesh) = scene.meshes.get(index) else {
                log::warn!("Scene node references missing mesh {}", index);
                continue;
            };
            let mesh = model.process_mesh(mesh, scene.material(mesh));
            model.meshes.push(mesh);
        }
        Ok(model)
    }

    fn empty(gl: &Arc<dyn Backend>, directory: &str) -> Self {
        Self {
            gl: Arc::clone(gl),
            meshes: Vec::new(),
            textures: Vec::new(),
            cache: FxHashMap::default(),
            directory: directory.to_string(),
            params: TextureParams::default(),
        }
    }

    fn process_mesh(&mut self, mesh: &ImportedMesh, material: Option<&ImportedMaterial>) -> Mesh {
        let (vertices, indices) = mesh.to_vertices();

        let mut textures = Vec::new();
        if let Some(material) = material {
            for (slot, kind) in SLOT_KINDS {
                for path in material.textures(slot) {
                    textures.push(self.texture(path, kind.clone()));
                }
            }
        }

        Mesh::new(&self.gl, vertices, indices, textures)
    }

    /// Returns a reference to the cached texture for `path`, decoding it on first use.
    fn texture(&mut self, path: &str, kind: TextureKind) -> TextureRef {
        if let Some(&index) = self.cache.get(path) {
            log::debug!("Texture cache hit for {}", path);
            return self.textures[index].reference();
        }

        let file = crate::abs::resolve_texture_path(&self.directory, path);
        let texture = Texture::from_file(&self.gl, &file, path, kind, &self.params);
        let reference = texture.reference();

        self.cache.insert(path.to_string(), self.textures.len());
        self.textures.push(texture);
        reference
    }

    /// Draws every mesh in load order.
    pub fn draw(&self, shader: &ShaderProgram) {
        for mesh in &self.meshes {
            mesh.draw(shader);
        }
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use image::{Rgb, RgbImage};

    use crate::abs::{
        HandleKind,
        recording::{Call, RecordingBackend, UniformValue},
    };

    const VERTEX: &str = "#version 330 core\nvoid main() {}\n";
    const FRAGMENT: &str = "#version 330 core\nvoid main() {}\n";

    const CRATES: &str = "\
mtllib crates.mtl
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
o lid
usemtl wood
f 1/1 2/2 3/3 4/4
o side
usemtl painted
f 1/1 2/2 5/3
";

    const CRATES_MTL: &str = "\
newmtl wood
map_Kd wood.png
map_bump bump.png
map_Ka wood.png
newmtl painted
map_Kd wood.png
map_Ks missing.png
";

    fn backend() -> (Arc<RecordingBackend>, Arc<dyn Backend>) {
        let recorder = Arc::new(RecordingBackend::new());
        let gl: Arc<dyn Backend> = recorder.clone();
        (recorder, gl)
    }

    fn fixture(name: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("glclock-model-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("crates.obj"), CRATES).unwrap();
        std::fs::write(dir.join("crates.mtl"), CRATES_MTL).unwrap();
        for image in ["wood.png", "bump.png"] {
            RgbImage::from_pixel(2, 2, Rgb([120, 80, 40]))
                .save(dir.join(image))
                .unwrap();
        }
        dir
    }

    #[test]
    fn test_directory_of() {
        assert_eq!(directory_of("assets/models/crate.obj"), "assets/models");
        assert_eq!(directory_of("/crate.obj"), "");
        assert_eq!(directory_of("crate.obj"), "");
    }

    #[test]
    fn test_load_deduplicates_textures() {
        let dir = fixture("dedup");
        let path = dir.join("crates.obj");
        let path = path.to_str().unwrap();
        let (recorder, gl) = backend();

        let model = Model::try_load(&gl, path).unwrap();
        assert_eq!(model.directory(), dir.to_str().unwrap());
        assert_eq!(model.meshes().len(), 2);

        // wood.png, bump.png and missing.png; the last one failed to decode.
        assert_eq!(model.textures().len(), 3);
        assert_eq!(recorder.creates(HandleKind::Texture), 2);
        assert!(model.textures()[2].is_null());

        let lid = model.meshes()[0].textures();
        let side = model.meshes()[1].textures();
        let wood = model.textures()[0].raw();
        assert_eq!(
            lid.iter().map(|t| (t.raw, t.kind.clone())).collect::<Vec<_>>(),
            vec![
                (wood, TextureKind::Diffuse),
                (model.textures()[1].raw(), TextureKind::Normal),
                // A cache hit keeps the kind of the first request.
                (wood, TextureKind::Diffuse),
            ]
        );
        assert_eq!(side[0].raw, wood);
        assert_eq!(
            side[1],
            TextureRef {
                raw: 0,
                kind: TextureKind::Specular
            }
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_index_total_matches_triangles() {
        let dir = fixture("indices");
        let path = dir.join("crates.obj");
        let (_recorder, gl) = backend();

        let scene = import_obj(&path, PostProcess::MODEL_LOADING).unwrap();
        let model = Model::from_scene(&gl, &scene, dir.to_str().unwrap()).unwrap();

        let total: usize = model.meshes().iter().map(|m| m.indices().len()).sum();
        assert_eq!(total, 3 * scene.triangle_count());
        assert_eq!(total, 9);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_failed_load_is_empty() {
        let (recorder, gl) = backend();
        let model = Model::load(&gl, "/nowhere/ghost.obj");
        assert!(model.meshes().is_empty());
        assert!(model.textures().is_empty());
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn test_file_without_geometry_loads_empty() {
        let dir = std::env::temp_dir().join(format!("glclock-blank-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("blank.obj");
        std::fs::write(&path, "# nothing here\n").unwrap();
        let file = path.to_str().unwrap();
        let (recorder, gl) = backend();

        assert!(matches!(Model::try_load(&gl, file), Err(ModelError::Import(_))));

        let model = Model::load(&gl, file);
        assert!(model.meshes().is_empty());
        assert!(model.textures().is_empty());
        assert_eq!(recorder.creates(HandleKind::VertexArray), 0);
        assert_eq!(recorder.creates(HandleKind::VertexBuffer), 0);
        assert_eq!(recorder.creates(HandleKind::IndexBuffer), 0);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_incomplete_scene_is_rejected() {
        let (_recorder, gl) = backend();
        let scene = ImportedScene {
            incomplete: true,
            ..Default::default()
        };
        assert!(matches!(
            Model::from_scene(&gl, &scene, ""),
            Err(ModelError::Import(_))
        ));
    }

    #[test]
    fn test_draw_visits_meshes_in_order() {
        let dir = fixture("draw");
        let path = dir.join("crates.obj");
        let (recorder, gl) = backend();
        let shader = ShaderProgram::from_sources(&gl, VERTEX, FRAGMENT);
        let model = Model::try_load(&gl, path.to_str().unwrap()).unwrap();
        recorder.clear_calls();

        model.draw(&shader);

        let draws: Vec<_> = recorder
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::DrawTriangles { .. }))
            .collect();
        assert_eq!(
            draws,
            vec![
                Call::DrawTriangles { count: 6, first: 0 },
                Call::DrawTriangles { count: 3, first: 0 },
            ]
        );
        assert_eq!(
            recorder.uniform("material.num_specular"),
            Some(UniformValue::Int(1))
        );

        let vertex_arrays: Vec<_> = model
            .meshes()
            .iter()
            .map(|m| m.geometry().vertex_array().raw())
            .collect();
        drop(model);
        for raw in vertex_arrays {
            assert!(recorder.calls().contains(&Call::Delete(HandleKind::VertexArray, raw)));
        }
        assert_eq!(recorder.deletes(HandleKind::Texture), 2);

        std::fs::remove_dir_all(&dir).ok();
    }
}
