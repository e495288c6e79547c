//! Particle effect content
//!
//! Emitter settings stored as JSON. Every field is optional and falls back
//! to a sensible default.

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::ContentError;
use crate::files::FileSource;
use crate::kind::ResourceKind;
use crate::loadable::Decode;

/// Emitter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleEffect {
    /// Texture drawn for each particle
    pub texture: Option<String>,
    /// Effect used to draw particles
    pub effect: Option<String>,
    /// Maximum number of live particles
    pub max_particles: u32,
    /// Particles spawned per second
    pub spawn_rate: f32,
    /// Lifetime range in seconds (min, max)
    pub lifetime: Vec2,
    /// Initial velocity range
    pub velocity_min: Vec3,
    /// Initial velocity range
    pub velocity_max: Vec3,
    /// Size range (min, max)
    pub size: Vec2,
    /// Start color
    pub start_color: Vec4,
    /// End color (fade to)
    pub end_color: Vec4,
    /// Constant acceleration
    pub gravity: Vec3,
    /// Whether the emitter restarts after finishing
    pub looping: bool,
}

impl Default for ParticleEffect {
    fn default() -> Self {
        Self {
            texture: None,
            effect: None,
            max_particles: 1000,
            spawn_rate: 100.0,
            lifetime: Vec2::new(1.0, 2.0),
            velocity_min: Vec3::new(-1.0, 1.0, -1.0),
            velocity_max: Vec3::new(1.0, 3.0, 1.0),
            size: Vec2::new(0.1, 0.3),
            start_color: Vec4::ONE,
            end_color: Vec4::new(1.0, 1.0, 1.0, 0.0),
            gravity: Vec3::new(0.0, -9.8, 0.0),
            looping: true,
        }
    }
}

impl ParticleEffect {
    /// Check ranges and limits
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting
    pub fn check(&self) -> Result<(), String> {
        if self.max_particles == 0 {
            return Err("'max_particles' must be greater than zero".to_string());
        }
        if self.spawn_rate < 0.0 {
            return Err("'spawn_rate' must not be negative".to_string());
        }
        if self.lifetime.x < 0.0 || self.lifetime.x > self.lifetime.y {
            return Err("'lifetime' must be a non-negative [min, max] range".to_string());
        }
        if self.size.x > self.size.y {
            return Err("'size' must be a [min, max] range".to_string());
        }
        if self.velocity_min.cmpgt(self.velocity_max).any() {
            return Err("'velocity_min' exceeds 'velocity_max'".to_string());
        }
        Ok(())
    }

    /// Upper bound on live particles implied by rate and lifetime
    #[must_use]
    pub fn steady_state_count(&self) -> u32 {
        let estimate = (self.spawn_rate * self.lifetime.y).ceil().max(0.0) as u32;
        estimate.min(self.max_particles)
    }
}

impl Decode for ParticleEffect {
    const KIND: ResourceKind = ResourceKind::ParticleEffect;

    fn decode(path: &str, files: &dyn FileSource) -> Result<Self, ContentError> {
        let text = files.read_to_string(path)?;
        let effect: ParticleEffect = serde_json::from_str(&text)
            .map_err(|e| ContentError::DecodeError(format!("particle effect '{path}': {e}")))?;
        effect
            .check()
            .map_err(|e| ContentError::DecodeError(format!("particle effect '{path}': {e}")))?;
        Ok(effect)
    }
}
