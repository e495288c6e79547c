//! Built-in content kinds
//!
//! Each kind is a payload type implementing [`Decode`](crate::Decode); the
//! cache stores it wrapped in [`Content`](crate::Content).

mod animation;
mod effect;
mod material;
mod model;
mod particles;
mod sound;
mod text;
mod texture;

pub use animation::{Frame, SpriteAnimation};
pub use effect::{BlendMode, DepthMode, Effect, Pass, PassBinding, Sampling, Technique};
pub use material::{CubeMap, Material};
pub use model::Model;
pub use particles::ParticleEffect;
pub use sound::{Sound, SoundFormat};
pub use text::{Script, Shader};
pub use texture::Texture;

#[cfg(test)]
pub(crate) use texture::png_bytes;
