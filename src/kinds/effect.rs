//! Effect content
//!
//! An effect is a set of named techniques, each an ordered list of passes.
//! A pass names its shader by path and carries fixed-function state.
//!
//! ```json
//! {
//!   "techniques": {
//!     "Default": {
//!       "passes": [
//!         { "shader": "shaders/base.fx", "blend": "alpha", "depth": "read", "sampling": "point" }
//!       ]
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::ContentCache;
use crate::error::ContentError;
use crate::files::FileSource;
use crate::kind::ResourceKind;
use crate::kinds::Shader;
use crate::loadable::{Content, Decode, Shared};

/// Color blending of a pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// No blending
    #[default]
    Opaque,
    /// Source-alpha blending
    Alpha,
    /// Additive blending
    Additive,
}

/// Depth buffer usage of a pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthMode {
    /// Test and write
    #[default]
    Write,
    /// Test only
    Read,
    /// Ignore depth
    Off,
}

/// Texture filtering of a pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sampling {
    /// Nearest neighbour
    Point,
    /// Bilinear
    #[default]
    Linear,
    /// Anisotropic
    Anisotropic,
}

/// One render pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pass {
    /// Shader path
    pub shader: Option<String>,
    /// Blend state
    pub blend: BlendMode,
    /// Depth state
    pub depth: DepthMode,
    /// Sampler state
    pub sampling: Sampling,
}

/// Named list of passes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Technique {
    /// Passes in draw order
    pub passes: Vec<Pass>,
}

/// What a pass binds once its shader has been resolved
#[derive(Debug, Clone)]
pub struct PassBinding {
    /// Valid shader to bind, or `None` when shader binding is skipped
    pub shader: Option<Shared<Content<Shader>>>,
    /// Blend state
    pub blend: BlendMode,
    /// Depth state
    pub depth: DepthMode,
    /// Sampler state
    pub sampling: Sampling,
}

/// Decoded effect
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Effect {
    /// Techniques by name
    pub techniques: BTreeMap<String, Technique>,
}

impl Effect {
    /// Technique by name
    #[must_use]
    pub fn technique(&self, name: &str) -> Option<&Technique> {
        self.techniques.get(name)
    }

    /// Every shader path referenced by any pass, deduplicated and sorted
    #[must_use]
    pub fn shader_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self
            .techniques
            .values()
            .flat_map(|technique| &technique.passes)
            .filter_map(|pass| pass.shader.as_deref())
            .collect();
        paths.sort_unstable();
        paths.dedup();
        paths
    }

    /// Resolve a pass against the cache.
    ///
    /// The shader is looked up without loading. A missing or invalid shader
    /// is skipped while the rest of the pass state still applies. Returns
    /// `None` only if the technique or pass does not exist.
    #[must_use]
    pub fn apply(&self, technique: &str, pass: usize, cache: &ContentCache) -> Option<PassBinding> {
        let Some(found) = self.technique(technique).and_then(|t| t.passes.get(pass)) else {
            log::warn!("Effect has no pass {pass} in technique '{technique}'");
            return None;
        };

        let shader = found.shader.as_deref().and_then(|path| {
            let shader = cache
                .find::<Content<Shader>>(path)
                .filter(|shader| shader.borrow().get().is_some());
            if shader.is_none() {
                log::debug!("Skipping shader binding for invalid shader '{path}'");
            }
            shader
        });

        Some(PassBinding {
            shader,
            blend: found.blend,
            depth: found.depth,
            sampling: found.sampling,
        })
    }
}

impl Decode for Effect {
    const KIND: ResourceKind = ResourceKind::Effect;

    fn decode(path: &str, files: &dyn FileSource) -> Result<Self, ContentError> {
        let text = files.read_to_string(path)?;
        let json: Value = serde_json::from_str(&text)
            .map_err(|e| ContentError::DecodeError(format!("effect '{path}': {e}")))?;

        let Some(techniques) = json.get("techniques").and_then(Value::as_object) else {
            return Err(ContentError::DecodeError(format!(
                "'techniques' of effect '{path}' are not of an object type or undefined"
            )));
        };

        let mut effect = Effect::default();
        for (name, technique) in techniques {
            let Some(passes) = technique.get("passes").and_then(Value::as_array) else {
                log::error!(
                    "'passes' of technique '{name}' of effect '{path}' is not of an array type, skipping"
                );
                continue;
            };

            let mut parsed = Vec::with_capacity(passes.len());
            for (index, pass) in passes.iter().enumerate() {
                if !pass.is_object() {
                    log::error!(
                        "Pass {index} of technique '{name}' of effect '{path}' is not of an object type, skipping"
                    );
                    continue;
                }
                match Pass::deserialize(pass) {
                    Ok(pass) => parsed.push(pass),
                    Err(e) => log::error!(
                        "Pass {index} of technique '{name}' of effect '{path}' is malformed: {e}"
                    ),
                }
            }

            effect
                .techniques
                .insert(name.clone(), Technique { passes: parsed });
        }

        Ok(effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::MemoryFiles;
    use crate::kind::ResourceKind;
    use std::rc::Rc;

    const EFFECT: &str = r#"{
        "techniques": {
            "Default": {
                "passes": [
                    { "shader": "base.fx", "blend": "alpha", "depth": "read", "sampling": "point" },
                    42,
                    { "shader": "broken.fx", "blend": "additive" },
                    { "blend": "sideways" }
                ]
            },
            "Shadow": { "passes": "none" }
        }
    }"#;

    fn setup() -> (Rc<MemoryFiles>, ContentCache) {
        let files = Rc::new(MemoryFiles::new());
        files.insert("lit.effect", EFFECT);
        files.insert("base.fx", "float4 PS() : SV_TARGET { }");
        let cache = ContentCache::new(files.clone());
        (files, cache)
    }

    #[test]
    fn test_decode_skips_malformed_passes() {
        let (files, _cache) = setup();
        let effect = Effect::decode("lit.effect", files.as_ref()).unwrap();

        let technique = effect.technique("Default").unwrap();
        assert_eq!(technique.passes.len(), 2);
        assert_eq!(technique.passes[0].blend, BlendMode::Alpha);
        assert_eq!(technique.passes[0].depth, DepthMode::Read);
        assert_eq!(technique.passes[1].sampling, Sampling::Linear);
        assert!(effect.technique("Shadow").is_none());
        assert_eq!(effect.shader_paths(), vec!["base.fx", "broken.fx"]);
    }

    #[test]
    fn test_missing_techniques() {
        let files = MemoryFiles::new();
        files.insert("empty.effect", "{}");
        assert!(Effect::decode("empty.effect", &files).is_err());
    }

    #[test]
    fn test_apply_binds_valid_shader() {
        let (_files, mut cache) = setup();
        cache.load(ResourceKind::Shader, "base.fx").unwrap();
        let effect = cache.get::<Content<Effect>>("lit.effect").unwrap();

        let binding = effect.borrow().get().unwrap().apply("Default", 0, &cache).unwrap();
        assert!(binding.shader.is_some());
        assert_eq!(binding.blend, BlendMode::Alpha);
    }

    #[test]
    fn test_apply_skips_invalid_shader() {
        let (_files, mut cache) = setup();
        // broken.fx does not exist, so the cached shader is invalid
        cache.load(ResourceKind::Shader, "broken.fx").unwrap();
        let effect = cache.get::<Content<Effect>>("lit.effect").unwrap();

        let binding = effect.borrow().get().unwrap().apply("Default", 1, &cache).unwrap();
        assert!(binding.shader.is_none());
        assert_eq!(binding.blend, BlendMode::Additive);

        assert!(effect.borrow().get().unwrap().apply("Default", 9, &cache).is_none());
        assert!(effect.borrow().get().unwrap().apply("Missing", 0, &cache).is_none());
    }

    #[test]
    fn test_apply_sees_shader_reload() {
        let (files, mut cache) = setup();
        files.insert("broken.fx", "");
        cache.load(ResourceKind::Shader, "broken.fx").unwrap();
        let effect = cache.get::<Content<Effect>>("lit.effect").unwrap();
        let effect = effect.borrow();
        let effect = effect.get().unwrap();

        assert!(effect.apply("Default", 1, &cache).unwrap().shader.is_none());

        files.insert("broken.fx", "float4 PS() : SV_TARGET { }");
        assert!(cache.reload(ResourceKind::Shader, "broken.fx"));
        assert!(effect.apply("Default", 1, &cache).unwrap().shader.is_some());
    }
}
