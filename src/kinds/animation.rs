//! Sprite animation content
//!
//! An animation file is a JSON array of frames, each a rectangle into a
//! sprite sheet plus how long to hold it.

use glam::{UVec2, Vec4};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ContentError;
use crate::files::FileSource;
use crate::kind::ResourceKind;
use crate::loadable::Decode;

/// One frame of a sprite animation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frame {
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Seconds to hold this frame
    pub wait: f32,
}

impl Frame {
    /// Normalized (u, v, width, height) rectangle for a sheet of `sheet_size`
    #[must_use]
    pub fn uv_rect(&self, sheet_size: UVec2) -> Vec4 {
        let size = sheet_size.max(UVec2::ONE).as_vec2();
        Vec4::new(
            self.x as f32 / size.x,
            self.y as f32 / size.y,
            self.width as f32 / size.x,
            self.height as f32 / size.y,
        )
    }
}

/// Decoded frame table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpriteAnimation {
    /// Frames in playback order
    pub frames: Vec<Frame>,
}

impl SpriteAnimation {
    /// Number of frames
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if there are no frames
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame by index
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Total duration of one pass through all frames, in seconds
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.frames.iter().map(|frame| frame.wait.max(0.0)).sum()
    }

    /// Index of the frame showing at `time` seconds
    #[must_use]
    pub fn frame_at(&self, time: f32, looping: bool) -> Option<usize> {
        let duration = self.duration();
        if self.frames.is_empty() {
            return None;
        }
        if duration <= 0.0 {
            return Some(0);
        }

        let mut t = time.max(0.0);
        if looping {
            t %= duration;
        } else if t >= duration {
            return Some(self.frames.len() - 1);
        }

        let mut elapsed = 0.0;
        for (index, frame) in self.frames.iter().enumerate() {
            elapsed += frame.wait.max(0.0);
            if t < elapsed {
                return Some(index);
            }
        }
        Some(self.frames.len() - 1)
    }
}

impl Decode for SpriteAnimation {
    const KIND: ResourceKind = ResourceKind::Animation;

    fn decode(path: &str, files: &dyn FileSource) -> Result<Self, ContentError> {
        let text = files.read_to_string(path)?;
        let json: Value = serde_json::from_str(&text)
            .map_err(|e| ContentError::DecodeError(format!("animation '{path}': {e}")))?;

        let Value::Array(items) = json else {
            return Err(ContentError::DecodeError(format!(
                "animation '{path}' is not of an array type"
            )));
        };

        let mut frames = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            if !item.is_object() {
                log::error!("Frame {index} of animation '{path}' is not of an object type, skipping");
                continue;
            }
            match serde_json::from_value::<Frame>(item) {
                Ok(frame) => frames.push(frame),
                Err(e) => log::error!("Frame {index} of animation '{path}' is malformed: {e}"),
            }
        }

        log::debug!("Animation '{path}' has {} frames", frames.len());
        Ok(Self { frames })
    }
}
