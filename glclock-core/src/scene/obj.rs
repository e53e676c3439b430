//! Wavefront OBJ/MTL import through `tobj`.

use std::path::Path;

use glam::{Vec2, Vec3};

use super::{
    ImportedMaterial, ImportedMesh, ImportedNode, ImportedScene, MaterialSlot, PostProcess,
};
use crate::CoreError;

/// Imports an OBJ file (and the MTL libraries it references) into an [`ImportedScene`].
///
/// Every OBJ object becomes one mesh hanging off its own child of the root node. A missing or
/// broken material library is logged and the meshes are kept without materials. A file with no
/// meshes yields a scene flagged as incomplete.
pub fn import_obj(path: &Path, post: PostProcess) -> Result<ImportedScene, CoreError> {
    let options = tobj::LoadOptions {
        single_index: true,
        triangulate: post.triangulate,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };

    let (models, materials) = tobj::load_obj(path, &options)
        .map_err(|e| CoreError::Import(format!("{}: {}", path.display(), e)))?;

    let materials = materials.unwrap_or_else(|e| {
        log::warn!("Material library for {} not loaded: {}", path.display(), e);
        Vec::new()
    });

    let mut scene = ImportedScene {
        materials: materials.iter().map(convert_material).collect(),
        ..Default::default()
    };

    let mut root = ImportedNode {
        name: path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        ..Default::default()
    };

    for model in models {
        if model.mesh.positions.is_empty() || model.mesh.indices.is_empty() {
            log::debug!("Skipping empty object '{}' in {}", model.name, path.display());
            continue;
        }

        let mut mesh = convert_mesh(&model);
        mesh.apply(post);
        if mesh
            .material_index
            .is_some_and(|i| i >= scene.materials.len())
        {
            mesh.material_index = None;
        }

        root.children.push(ImportedNode {
            name: model.name,
            meshes: vec![scene.meshes.len()],
            children: Vec::new(),
        });
        scene.meshes.push(mesh);
    }

    scene.incomplete = scene.meshes.is_empty();
    scene.root = Some(root);

    log::debug!(
        "Imported {}: {} meshes, {} materials, {} triangles",
        path.display(),
        scene.meshes.len(),
        scene.materials.len(),
        scene.triangle_count()
    );

    Ok(scene)
}

fn convert_mesh(model: &tobj::Model) -> ImportedMesh {
    let mesh = &model.mesh;

    let positions: Vec<Vec3> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| Vec3::new(p[0], p[1], p[2]))
        .collect();

    let normals = mesh
        .normals
        .chunks_exact(3)
        .map(|n| Vec3::new(n[0], n[1], n[2]))
        .collect();

    let tex_coords = (!mesh.texcoords.is_empty()).then(|| {
        mesh.texcoords
            .chunks_exact(2)
            .map(|t| Vec2::new(t[0], t[1]))
            .collect()
    });

    let faces = if mesh.face_arities.is_empty() {
        mesh.indices.chunks_exact(3).map(<[u32]>::to_vec).collect()
    } else {
        let mut start = 0;
        mesh.face_arities
            .iter()
            .map(|&arity| {
                let end = start + arity as usize;
                let face = mesh.indices[start..end].to_vec();
                start = end;
                face
            })
            .collect()
    };

    ImportedMesh {
        name: model.name.clone(),
        positions,
        normals,
        tex_coords,
        tangents: None,
        bitangents: None,
        faces,
        material_index: mesh.material_id,
    }
}

/// OBJ bump maps (`map_bump`, `bump`) land in the height slot and `map_Ka` in the ambient slot,
/// the same classification OBJ importers commonly use.
fn convert_material(material: &tobj::Material) -> ImportedMaterial {
    let mut imported = ImportedMaterial::new(material.name.clone());

    let slots = [
        (MaterialSlot::Diffuse, &material.diffuse_texture),
        (MaterialSlot::Specular, &material.specular_texture),
        (MaterialSlot::Height, &material.normal_texture),
        (MaterialSlot::Ambient, &material.ambient_texture),
    ];

    for (slot, texture) in slots {
        if let Some(path) = texture {
            imported.add_texture(slot, path.clone());
        }
    }

    imported
}
