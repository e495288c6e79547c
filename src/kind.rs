//! Resource kinds and their manifest names

use serde::{Deserialize, Serialize};

/// Category of a piece of content.
///
/// Kinds partition the cache: the same path loaded as a texture and as a
/// script produces two independent entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Script source
    Script,
    /// Image data
    Texture,
    /// Shader source
    Shader,
    /// Surface description referencing an effect and textures
    Material,
    /// Mesh hierarchy
    Model,
    /// Audio clip
    Sound,
    /// Sprite frame table
    Animation,
    /// Techniques and passes
    Effect,
    /// Emitter settings
    ParticleEffect,
    /// A manifest of other content
    Bundle,
    /// Sentinel for names that do not resolve
    Unknown,
}

impl ResourceKind {
    /// All resolvable kinds, in declaration order
    pub const ALL: [ResourceKind; 10] = [
        Self::Script,
        Self::Texture,
        Self::Shader,
        Self::Material,
        Self::Model,
        Self::Sound,
        Self::Animation,
        Self::Effect,
        Self::ParticleEffect,
        Self::Bundle,
    ];

    /// Canonical manifest name of this kind
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Texture => "texture",
            Self::Shader => "shader",
            Self::Material => "material",
            Self::Model => "model",
            Self::Sound => "sound",
            Self::Animation => "animation",
            Self::Effect => "effect",
            Self::ParticleEffect => "particle-effect",
            Self::Bundle => "bundle",
            Self::Unknown => "unknown",
        }
    }

    /// Resolve a manifest name, falling back to [`ResourceKind::Unknown`].
    ///
    /// Matching is case-insensitive and accepts a few historical aliases.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "script" => Self::Script,
            "texture" => Self::Texture,
            "shader" => Self::Shader,
            "material" => Self::Material,
            "model" => Self::Model,
            "sound" => Self::Sound,
            "animation" | "anim" => Self::Animation,
            "effect" => Self::Effect,
            "particle-effect" | "particle_effect" | "particles" => Self::ParticleEffect,
            "bundle" | "box" => Self::Bundle,
            _ => Self::Unknown,
        }
    }

    /// Whether this is a real kind rather than the sentinel
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for kind in ResourceKind::ALL {
            assert_eq!(ResourceKind::from_name(kind.name()), kind);
        }
    }

    #[test]
    fn test_aliases_and_case() {
        assert_eq!(ResourceKind::from_name("Texture"), ResourceKind::Texture);
        assert_eq!(ResourceKind::from_name("anim"), ResourceKind::Animation);
        assert_eq!(ResourceKind::from_name("box"), ResourceKind::Bundle);
        assert_eq!(
            ResourceKind::from_name("particle_effect"),
            ResourceKind::ParticleEffect
        );
    }

    #[test]
    fn test_unknown_sentinel() {
        let kind = ResourceKind::from_name("bogus");
        assert_eq!(kind, ResourceKind::Unknown);
        assert!(!kind.is_known());
        assert_eq!(kind.to_string(), "unknown");
    }
}
