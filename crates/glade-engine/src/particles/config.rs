use glam::Vec3;
use thiserror::Error;

use crate::paint::Rgb;

/// How accumulated frame time is converted into emission events.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum EmissionPolicy {
    /// At most one particle per tick. The accumulator is reset to zero whenever it
    /// reaches the emission interval, so time beyond one interval is discarded.
    ///
    /// Long frames under-emit; this is the rate-limited behavior of the garden scene.
    #[default]
    ResetAccumulator,

    /// As many particles as whole intervals have elapsed, keeping the fractional
    /// remainder for the next tick.
    ///
    /// Emissions that do not fit in the pool are dropped, not deferred.
    CarryRemainder,
}

/// Construction-time parameters of a particle pool.
///
/// Defaults reproduce the garden blossom emitter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleConfig {
    /// Number of particle slots. Must be at least 2.
    pub capacity: usize,

    /// Particles per second.
    pub emission_rate: f32,

    /// Half-extent of the spawn box around the emitter origin, per axis.
    pub spawn_deviation: Vec3,

    /// Base downward speed in units per second.
    pub velocity_base: f32,

    /// Maximum deviation applied to `velocity_base`, in both directions.
    pub velocity_jitter: f32,

    /// Half-width of each billboard quad.
    pub particle_size: f32,

    /// Particles whose `y` drops below this value are retired.
    pub kill_threshold_y: f32,

    /// Flat color given to every emitted particle.
    pub color: Rgb,

    pub emission_policy: EmissionPolicy,

    /// Converts elapsed milliseconds into velocity time units.
    pub time_scale: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            emission_rate: 500.0,
            spawn_deviation: Vec3::new(2.0, 0.3, 2.2),
            velocity_base: 1.0,
            velocity_jitter: 0.2,
            particle_size: 0.15,
            kill_threshold_y: -3.0,
            color: Rgb::from_u8(255, 204, 248),
            emission_policy: EmissionPolicy::ResetAccumulator,
            time_scale: 0.001,
        }
    }
}

impl ParticleConfig {
    /// Milliseconds between two emission events.
    #[inline]
    pub fn emission_interval_ms(&self) -> f32 {
        1000.0 / self.emission_rate
    }

    /// Rejects values the pool cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity <= 1 {
            return Err(ConfigError::CapacityTooSmall(self.capacity));
        }
        if !(self.emission_rate.is_finite() && self.emission_rate > 0.0) {
            return Err(ConfigError::InvalidEmissionRate(self.emission_rate));
        }
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            return Err(ConfigError::InvalidTimeScale(self.time_scale));
        }

        let non_negative = [
            ("spawn_deviation.x", self.spawn_deviation.x),
            ("spawn_deviation.y", self.spawn_deviation.y),
            ("spawn_deviation.z", self.spawn_deviation.z),
            ("velocity_jitter", self.velocity_jitter),
            ("particle_size", self.particle_size),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::NegativeOrNonFinite { field, value });
            }
        }

        let finite = [
            ("velocity_base", self.velocity_base),
            ("kill_threshold_y", self.kill_threshold_y),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }

        if !self.color.is_finite() {
            return Err(ConfigError::NonFinite { field: "color", value: f32::NAN });
        }

        Ok(())
    }
}

/// Invalid particle configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("particle capacity must be at least 2, got {0}")]
    CapacityTooSmall(usize),

    #[error("emission rate must be positive and finite, got {0}")]
    InvalidEmissionRate(f32),

    #[error("time scale must be positive and finite, got {0}")]
    InvalidTimeScale(f32),

    #[error("{field} must be finite and non-negative, got {value}")]
    NegativeOrNonFinite { field: &'static str, value: f32 },

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },
}
