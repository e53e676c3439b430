//! Owned GPU resources.
//!
//! [`GpuHandle`] owns exactly one backend object and releases it on drop. The kind of object
//! is a compile-time tag, so a vertex array can never be passed where a texture is expected.

use std::{fmt, marker::PhantomData, sync::Arc};

use crate::abs::{Backend, HandleKind, RawHandle};

/// Compile-time tag naming the kind of resource a [`GpuHandle`] owns.
pub trait ResourceKind {
    const KIND: HandleKind;
}

#[derive(Debug)]
pub enum VertexArray {}
#[derive(Debug)]
pub enum VertexBuffer {}
#[derive(Debug)]
pub enum IndexBuffer {}
#[derive(Debug)]
pub enum TextureObject {}

impl ResourceKind for VertexArray {
    const KIND: HandleKind = HandleKind::VertexArray;
}

impl ResourceKind for VertexBuffer {
    const KIND: HandleKind = HandleKind::VertexBuffer;
}

impl ResourceKind for IndexBuffer {
    const KIND: HandleKind = HandleKind::IndexBuffer;
}

impl ResourceKind for TextureObject {
    const KIND: HandleKind = HandleKind::Texture;
}

/// Sole owner of one GPU resource of kind `K`.
///
/// The null handle (raw id `0`) owns nothing and dropping it makes no backend call. Handles are
/// move-only; [`GpuHandle::take`] moves the resource out and leaves the null handle behind.
pub struct GpuHandle<K: ResourceKind> {
    gl: Option<Arc<dyn Backend>>,
    raw: RawHandle,
    _kind: PhantomData<K>,
}

impl<K: ResourceKind> GpuHandle<K> {
    /// Allocates a new resource. An allocation failure is logged and yields the null handle.
    pub fn new(gl: &Arc<dyn Backend>) -> Self {
        match gl.create_resource(K::KIND) {
            Ok(raw) => Self {
                gl: Some(Arc::clone(gl)),
                raw,
                _kind: PhantomData,
            },
            Err(e) => {
                log::error!("Failed to allocate {:?}: {}", K::KIND, e);
                Self::null()
            }
        }
    }

    /// A handle that owns nothing.
    pub fn null() -> Self {
        Self {
            gl: None,
            raw: 0,
            _kind: PhantomData,
        }
    }

    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    pub fn is_null(&self) -> bool {
        self.raw == 0
    }

    /// Moves ownership into the returned handle, leaving `self` null.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl<K: ResourceKind> Default for GpuHandle<K> {
    fn default() -> Self {
        Self::null()
    }
}

impl<K: ResourceKind> Drop for GpuHandle<K> {
    fn drop(&mut self) {
        if self.raw != 0
            && let Some(gl) = self.gl.take()
        {
            gl.delete_resource(K::KIND, self.raw);
            self.raw = 0;
        }
    }
}

impl<K: ResourceKind> fmt::Debug for GpuHandle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GpuHandle")
            .field(&K::KIND)
            .field(&self.raw)
            .finish()
    }
}

impl<K: ResourceKind> From<&GpuHandle<K>> for RawHandle {
    fn from(handle: &GpuHandle<K>) -> Self {
        handle.raw
    }
}
