//! Material content
//!
//! A material is a small JSON document naming an effect and texture maps by
//! path, plus lighting attributes. Referenced content is not loaded here;
//! whoever binds the material resolves the paths through the cache.

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::error::ContentError;
use crate::files::FileSource;
use crate::kind::ResourceKind;
use crate::loadable::Decode;

/// Six faces of a cube map, by texture path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeMap {
    /// Negative X
    pub left: Option<String>,
    /// Positive X
    pub right: Option<String>,
    /// Positive Y
    pub top: Option<String>,
    /// Negative Y
    pub bottom: Option<String>,
    /// Positive Z
    pub front: Option<String>,
    /// Negative Z
    pub back: Option<String>,
}

impl CubeMap {
    /// Paths of all assigned faces
    pub fn faces(&self) -> impl Iterator<Item = &str> {
        [
            &self.left,
            &self.right,
            &self.top,
            &self.bottom,
            &self.front,
            &self.back,
        ]
        .into_iter()
        .filter_map(|face| face.as_deref())
    }
}

/// Surface description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Effect used to render this material
    pub effect: Option<String>,
    /// Base color texture
    pub diffuse_map: Option<String>,
    /// Normal map texture
    pub normal_map: Option<String>,
    /// Environment map
    pub cube_map: Option<CubeMap>,
    /// Emissive color (RGBA)
    pub emissive: Vec4,
    /// Diffuse color (RGBA)
    pub diffuse: Vec4,
    /// Ambient color (RGBA)
    pub ambient: Vec4,
    /// Specular color (RGBA)
    pub specular: Vec4,
    /// Specular strength
    pub specular_intensity: f32,
    /// Environment reflection amount (0.0 - 1.0)
    pub reflectivity: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            effect: None,
            diffuse_map: None,
            normal_map: None,
            cube_map: None,
            emissive: Vec4::ZERO,
            diffuse: Vec4::ONE,
            ambient: Vec4::ONE,
            specular: Vec4::ONE,
            specular_intensity: 1.0,
            reflectivity: 0.0,
        }
    }
}

impl Material {
    /// Every texture path this material references
    pub fn texture_paths(&self) -> impl Iterator<Item = &str> {
        self.diffuse_map
            .as_deref()
            .into_iter()
            .chain(self.normal_map.as_deref())
            .chain(self.cube_map.iter().flat_map(CubeMap::faces))
    }
}

impl Decode for Material {
    const KIND: ResourceKind = ResourceKind::Material;

    fn decode(path: &str, files: &dyn FileSource) -> Result<Self, ContentError> {
        let text = files.read_to_string(path)?;
        let material: Material = serde_json::from_str(&text)
            .map_err(|e| ContentError::DecodeError(format!("material '{path}': {e}")))?;

        if material.effect.is_none() {
            log::warn!("Material '{path}' has no 'effect' field");
        }
        Ok(material)
    }
}
