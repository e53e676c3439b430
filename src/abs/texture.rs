//! Structs and functions for handling textures.
//!
//! The module provides the [`Texture`] struct which owns a GPU texture decoded from an image file,
//! and [`TextureRef`], a non-owning view of one used by meshes.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use image::{DynamicImage, GenericImageView};

use crate::abs::{Backend, GpuHandle, PixelFormat, RawHandle, TextureImage, TextureObject};

/// The semantic role of a texture in a material.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
    Normal,
    Height,
    Other(String),
}

impl TextureKind {
    pub fn as_str(&self) -> &str {
        match self {
            TextureKind::Diffuse => "diffuse",
            TextureKind::Specular => "specular",
            TextureKind::Normal => "normal",
            TextureKind::Height => "height",
            TextureKind::Other(name) => name,
        }
    }
}

impl fmt::Display for TextureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

impl Wrap {
    fn gl_enum(self) -> u32 {
        match self {
            Wrap::Repeat => glow::REPEAT,
            Wrap::MirroredRepeat => glow::MIRRORED_REPEAT,
            Wrap::ClampToEdge => glow::CLAMP_TO_EDGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
    LinearMipmapLinear,
}

impl Filter {
    fn gl_enum(self) -> u32 {
        match self {
            Filter::Nearest => glow::NEAREST,
            Filter::Linear => glow::LINEAR,
            Filter::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
        }
    }
}

/// Sampling parameters applied when a texture is uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureParams {
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
    pub wrap_r: Wrap,
    pub min_filter: Filter,
    pub mag_filter: Filter,
    /// Upload color data into an sRGB internal format.
    pub gamma: bool,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            wrap_s: Wrap::Repeat,
            wrap_t: Wrap::Repeat,
            wrap_r: Wrap::Repeat,
            min_filter: Filter::Linear,
            mag_filter: Filter::Linear,
            gamma: false,
        }
    }
}

/// A non-owning reference to a texture owned elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRef {
    pub raw: RawHandle,
    pub kind: TextureKind,
}

/// Represents a texture stored on the GPU side, together with the path it was loaded from.
#[derive(Debug)]
pub struct Texture {
    handle: GpuHandle<TextureObject>,
    kind: TextureKind,
    path: String,
}

impl Texture {
    /// Decodes the image at `file` and uploads it.
    ///
    /// `path` is the key the texture was requested under and is kept verbatim. A decode failure
    /// is logged and yields a texture holding the null handle.
    pub fn from_file(
        gl: &Arc<dyn Backend>,
        file: &Path,
        path: impl Into<String>,
        kind: TextureKind,
        params: &TextureParams,
    ) -> Self {
        let path = path.into();
        match image::open(file) {
            Ok(image) => Self::from_image(gl, &image, path, kind, params),
            Err(e) => {
                log::error!("Texture failed to load at path {}: {}", file.display(), e);
                Self {
                    handle: GpuHandle::null(),
                    kind,
                    path,
                }
            }
        }
    }

    /// Uploads an already decoded image with mipmaps.
    pub fn from_image(
        gl: &Arc<dyn Backend>,
        image: &DynamicImage,
        path: impl Into<String>,
        kind: TextureKind,
        params: &TextureParams,
    ) -> Self {
        let (width, height) = image.dimensions();
        let (format, data) = match image.color().channel_count() {
            1 => (PixelFormat::Red, image.to_luma8().into_raw()),
            3 => (PixelFormat::Rgb, image.to_rgb8().into_raw()),
            _ => (PixelFormat::Rgba, image.to_rgba8().into_raw()),
        };

        let handle = GpuHandle::<TextureObject>::new(gl);
        if !handle.is_null() {
            gl.bind_texture_2d(handle.raw());
            gl.upload_texture_2d(&TextureImage {
                width,
                height,
                format,
                srgb: params.gamma,
                data: &data,
            });
            gl.texture_parameter(glow::TEXTURE_WRAP_S, params.wrap_s.gl_enum() as i32);
            gl.texture_parameter(glow::TEXTURE_WRAP_T, params.wrap_t.gl_enum() as i32);
            gl.texture_parameter(glow::TEXTURE_WRAP_R, params.wrap_r.gl_enum() as i32);
            gl.texture_parameter(glow::TEXTURE_MIN_FILTER, params.min_filter.gl_enum() as i32);
            gl.texture_parameter(glow::TEXTURE_MAG_FILTER, params.mag_filter.gl_enum() as i32);
            gl.bind_texture_2d(0);
        }

        Self {
            handle,
            kind,
            path: path.into(),
        }
    }

    pub fn raw(&self) -> RawHandle {
        self.handle.raw()
    }

    pub fn is_null(&self) -> bool {
        self.handle.is_null()
    }

    pub fn kind(&self) -> &TextureKind {
        &self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// A non-owning reference to this texture.
    pub fn reference(&self) -> TextureRef {
        TextureRef {
            raw: self.raw(),
            kind: self.kind.clone(),
        }
    }
}

/// Joins a texture path from a material onto the model directory.
pub fn resolve_texture_path(directory: &str, path: &str) -> PathBuf {
    if directory.is_empty() {
        PathBuf::from(path)
    } else {
        PathBuf::from(format!("{}/{}", directory, path))
    }
}
