//! Model content
//!
//! Models are glTF documents. The cache keeps the parsed document summary
//! and the mesh names; vertex buffers are built by the renderer.

use crate::error::ContentError;
use crate::files::FileSource;
use crate::kind::ResourceKind;
use crate::loadable::Decode;

/// Parsed model document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    /// Mesh names, in document order (unnamed meshes are `None`)
    pub meshes: Vec<Option<String>>,
    /// Number of scene nodes
    pub nodes: usize,
    /// Number of materials declared by the document
    pub materials: usize,
    /// Number of animations declared by the document
    pub animations: usize,
    /// Whether binary data was embedded (GLB)
    pub has_embedded_blob: bool,
}

impl Model {
    /// Parse a glTF or GLB document
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid glTF document
    pub fn from_slice(bytes: &[u8]) -> Result<Self, gltf::Error> {
        let gltf = gltf::Gltf::from_slice(bytes)?;

        Ok(Self {
            meshes: gltf
                .meshes()
                .map(|mesh| mesh.name().map(str::to_string))
                .collect(),
            nodes: gltf.nodes().count(),
            materials: gltf.materials().count(),
            animations: gltf.animations().count(),
            has_embedded_blob: gltf.blob.is_some(),
        })
    }

    /// Number of meshes
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }
}

impl Decode for Model {
    const KIND: ResourceKind = ResourceKind::Model;

    fn decode(path: &str, files: &dyn FileSource) -> Result<Self, ContentError> {
        let bytes = files.read(path)?;
        Self::from_slice(&bytes)
            .map_err(|e| ContentError::DecodeError(format!("model '{path}': {e}")))
    }
}
