//! Importer-neutral scene graph.
//!
//! Importers produce an [`ImportedScene`]: a flat list of meshes and materials plus a tree of
//! nodes that reference meshes by index. The model loader walks the tree and turns each mesh
//! into GPU geometry, so nothing here touches the graphics API.

use fxhash::FxHashMap;
use glam::{Vec2, Vec3};

use crate::{CoreError, vertex::Vertex};

pub mod obj;

pub use obj::import_obj;

/// Post-processing applied by an importer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostProcess {
    /// Split every polygon into triangles.
    pub triangulate: bool,
    /// Replace each texture coordinate `v` with `1 - v`.
    pub flip_uvs: bool,
    /// Generate smooth per-vertex normals for meshes that have none.
    pub gen_smooth_normals: bool,
}

impl PostProcess {
    /// The steps the model loader always asks for.
    pub const MODEL_LOADING: PostProcess = PostProcess {
        triangulate: true,
        flip_uvs: true,
        gen_smooth_normals: true,
    };
}

/// Texture slots as the source format names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialSlot {
    Diffuse,
    Specular,
    Height,
    Ambient,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedMaterial {
    pub name: String,
    textures: Vec<(MaterialSlot, String)>,
}

impl ImportedMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            textures: Vec::new(),
        }
    }

    /// Appends a texture path to `slot`. Paths are kept exactly as written in the source file.
    pub fn add_texture(&mut self, slot: MaterialSlot, path: impl Into<String>) {
        self.textures.push((slot, path.into()));
    }

    pub fn with_texture(mut self, slot: MaterialSlot, path: impl Into<String>) -> Self {
        self.add_texture(slot, path);
        self
    }

    pub fn texture_count(&self, slot: MaterialSlot) -> usize {
        self.textures(slot).count()
    }

    /// Texture paths in `slot`, in the order they were added.
    pub fn textures(&self, slot: MaterialSlot) -> impl Iterator<Item = &str> + '_ {
        self.textures
            .iter()
            .filter(move |(s, _)| *s == slot)
            .map(|(_, path)| path.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// The first texture coordinate channel, if the source has one.
    pub tex_coords: Option<Vec<Vec2>>,
    pub tangents: Option<Vec<Vec3>>,
    pub bitangents: Option<Vec<Vec3>>,
    pub faces: Vec<Vec<u32>>,
    pub material_index: Option<usize>,
}

impl ImportedMesh {
    /// Number of triangles, assuming the faces have been triangulated.
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().filter(|f| f.len() == 3).count()
    }

    /// Builds the GPU vertex list and the flattened index list.
    ///
    /// Missing texture coordinates, tangents and bitangents are zero-filled. Indices are
    /// emitted face by face, in vertex order within each face.
    pub fn to_vertices(&self) -> (Vec<Vertex>, Vec<u32>) {
        let vertices = (0..self.positions.len())
            .map(|i| Vertex {
                position: self.positions[i],
                normal: self.normals.get(i).copied().unwrap_or_default(),
                tex_coords: channel(&self.tex_coords, i),
                tangent: channel(&self.tangents, i),
                bitangent: channel(&self.bitangents, i),
            })
            .collect();

        let indices = self.faces.iter().flatten().copied().collect();

        (vertices, indices)
    }

    pub fn flip_uvs(&mut self) {
        if let Some(tex_coords) = self.tex_coords.as_mut() {
            for uv in tex_coords {
                uv.y = 1.0 - uv.y;
            }
        }
    }

    /// Fills in smooth normals when the mesh has none.
    ///
    /// Face normals are accumulated unnormalized, so larger triangles weigh more, and vertices
    /// sharing an exact position share the averaged normal.
    pub fn generate_smooth_normals(&mut self) {
        if self.normals.len() == self.positions.len() && !self.positions.is_empty() {
            return;
        }

        let key = |p: Vec3| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()];
        let mut accumulated: FxHashMap<[u32; 3], Vec3> = FxHashMap::default();

        for face in self.faces.iter().filter(|f| f.len() >= 3) {
            let Some(corners) = face
                .iter()
                .map(|&i| self.positions.get(i as usize).copied())
                .collect::<Option<Vec<Vec3>>>()
            else {
                continue;
            };

            let normal = (corners[1] - corners[0]).cross(corners[2] - corners[0]);
            for corner in corners {
                *accumulated.entry(key(corner)).or_insert(Vec3::ZERO) += normal;
            }
        }

        self.normals = self
            .positions
            .iter()
            .map(|&p| {
                accumulated
                    .get(&key(p))
                    .map(|n| n.normalize_or_zero())
                    .unwrap_or_default()
            })
            .collect();
    }

    pub fn apply(&mut self, post: PostProcess) {
        if post.flip_uvs {
            self.flip_uvs();
        }
        if post.gen_smooth_normals {
            self.generate_smooth_normals();
        }
    }
}

fn channel<T: Copy + Default>(data: &Option<Vec<T>>, i: usize) -> T {
    data.as_ref()
        .and_then(|values| values.get(i).copied())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedNode {
    pub name: String,
    /// Indices into [`ImportedScene::meshes`].
    pub meshes: Vec<usize>,
    pub children: Vec<ImportedNode>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedScene {
    pub meshes: Vec<ImportedMesh>,
    pub materials: Vec<ImportedMaterial>,
    pub root: Option<ImportedNode>,
    /// Set by importers when the scene could not be fully read (e.g. it holds no meshes).
    pub incomplete: bool,
}

impl ImportedScene {
    /// Checks that the scene is usable and returns its root node.
    pub fn validate(&self, source: &str) -> Result<&ImportedNode, CoreError> {
        if self.incomplete {
            return Err(CoreError::IncompleteScene(source.to_string()));
        }
        self.root
            .as_ref()
            .ok_or_else(|| CoreError::Import(format!("{source}: scene has no root node")))
    }

    /// Total triangle count over every mesh in the scene.
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(ImportedMesh::triangle_count).sum()
    }

    /// Mesh indices in pre-order: a node's own meshes in index order, then each child in turn.
    pub fn mesh_order(&self) -> Vec<usize> {
        fn visit(node: &ImportedNode, out: &mut Vec<usize>) {
            out.extend_from_slice(&node.meshes);
            for child in &node.children {
                visit(child, out);
            }
        }

        let mut order = Vec::new();
        if let Some(root) = &self.root {
            visit(root, &mut order);
        }
        order
    }

    pub fn material(&self, mesh: &ImportedMesh) -> Option<&ImportedMaterial> {
        mesh.material_index.and_then(|i| self.materials.get(i))
    }
}
