//! Text-based content: scripts and shaders

use crate::error::ContentError;
use crate::files::FileSource;
use crate::kind::ResourceKind;
use crate::loadable::Decode;

/// Script source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    /// Full source
    pub source: String,
}

impl Decode for Script {
    const KIND: ResourceKind = ResourceKind::Script;

    fn decode(path: &str, files: &dyn FileSource) -> Result<Self, ContentError> {
        Ok(Self {
            source: files.read_to_string(path)?,
        })
    }
}

/// Shader source text.
///
/// Compilation happens on the render device; the cache only keeps the
/// source so a reload can hand the new text to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shader {
    /// Full source
    pub source: String,
}

impl Shader {
    /// Whether the source defines an entry point with this name
    #[must_use]
    pub fn has_entry_point(&self, name: &str) -> bool {
        self.source.match_indices(name).any(|(at, _)| {
            let before = self.source[..at].chars().next_back();
            let after = self.source[at + name.len()..].trim_start().chars().next();
            !before.is_some_and(|c| c.is_alphanumeric() || c == '_') && after == Some('(')
        })
    }
}

impl Decode for Shader {
    const KIND: ResourceKind = ResourceKind::Shader;

    fn decode(path: &str, files: &dyn FileSource) -> Result<Self, ContentError> {
        let source = files.read_to_string(path)?;
        if source.trim().is_empty() {
            return Err(ContentError::DecodeError(format!("shader '{path}' is empty")));
        }
        Ok(Self { source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::MemoryFiles;

    #[test]
    fn test_script_decode() {
        let files = MemoryFiles::new();
        files.insert("main.js", "Game.Init = function() {}");
        let script = Script::decode("main.js", &files).unwrap();
        assert_eq!(script.source, "Game.Init = function() {}");
    }

    #[test]
    fn test_empty_shader_rejected() {
        let files = MemoryFiles::new();
        files.insert("empty.fx", "  \n");
        assert!(matches!(
            Shader::decode("empty.fx", &files),
            Err(ContentError::DecodeError(_))
        ));
    }

    #[test]
    fn test_shader_entry_points() {
        let files = MemoryFiles::new();
        files.insert(
            "basic.fx",
            "VOut VS(VIn input) { }\nfloat4 PS (VOut input) : SV_TARGET { }\nvoid MyVS() {}",
        );
        let shader = Shader::decode("basic.fx", &files).unwrap();
        assert!(shader.has_entry_point("VS"));
        assert!(shader.has_entry_point("PS"));
        assert!(!shader.has_entry_point("GS"));
        assert!(!shader.has_entry_point("VOut"));
    }
}
