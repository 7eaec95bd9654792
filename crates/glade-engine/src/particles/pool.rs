use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{ConfigError, EmissionPolicy, Particle, ParticleConfig};

/// Per-tick counters, mostly for diagnostics.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct TickStats {
    pub retired: usize,
    pub emitted: usize,
}

/// Fixed-capacity, depth-sorted particle storage.
///
/// Invariants (hold after construction and after every `tick`):
/// - `live_count <= capacity`
/// - slots `[0, live_count)` are active, all later slots are inactive
/// - the live prefix is ordered by non-increasing `z` (furthest first), which is the
///   order the renderer needs for back-to-front blending
///
/// Frame contract of [`tick`](Self::tick): retire, then emit, then integrate.
/// Retirement therefore looks at positions produced by the previous tick.
pub struct ParticlePool {
    config: ParticleConfig,
    slots: Vec<Particle>,
    live_count: usize,
    accumulated_ms: f32,
    rng: StdRng,
}

impl ParticlePool {
    /// Creates an empty pool with an OS-seeded random source.
    pub fn new(config: ParticleConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Creates an empty pool whose spawn jitter is reproducible.
    pub fn with_seed(config: ParticleConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ParticleConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;

        log::debug!(
            "particle pool: capacity={} rate={}/s policy={:?}",
            config.capacity,
            config.emission_rate,
            config.emission_policy
        );

        Ok(Self {
            slots: vec![Particle::default(); config.capacity],
            config,
            live_count: 0,
            accumulated_ms: 0.0,
            rng,
        })
    }

    #[inline]
    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn live_count(&self) -> usize {
        self.live_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Time accrued towards the next emission, in milliseconds.
    #[inline]
    pub fn accumulated_ms(&self) -> f32 {
        self.accumulated_ms
    }

    /// Live particles, furthest first.
    #[inline]
    pub fn live(&self) -> &[Particle] {
        &self.slots[..self.live_count]
    }

    /// Every slot, including inactive ones past the live prefix.
    #[inline]
    pub fn slots(&self) -> &[Particle] {
        &self.slots
    }

    /// Deactivates every particle and clears pending emission time.
    pub fn reset(&mut self) {
        self.slots[..self.live_count].fill(Particle::default());
        self.live_count = 0;
        self.accumulated_ms = 0.0;
    }

    /// Advances the simulation by `elapsed_ms`.
    ///
    /// Negative or non-finite input is treated as zero. Never fails; a full pool
    /// only suppresses emission.
    pub fn tick(&mut self, elapsed_ms: f32) -> TickStats {
        let elapsed_ms = if elapsed_ms.is_finite() { elapsed_ms.max(0.0) } else { 0.0 };

        let retired = self.retire();
        let emitted = self.emit(elapsed_ms);
        self.integrate(elapsed_ms);

        TickStats { retired, emitted }
    }

    /// Inserts `particle` at the position that keeps the live prefix depth-sorted.
    ///
    /// The particle lands after every live particle with `z >=` its own, so equal
    /// depths keep their existing order. Returns `false` when the pool is full or the
    /// position is not finite.
    pub fn insert(&mut self, particle: Particle) -> bool {
        if self.live_count >= self.slots.len() || !particle.position.is_finite() {
            return false;
        }

        let z = particle.depth();
        let index = self.slots[..self.live_count]
            .iter()
            .position(|p| p.depth() < z)
            .unwrap_or(self.live_count);

        // Open a gap at `index`.
        self.slots.copy_within(index..self.live_count, index + 1);
        self.slots[index] = Particle { active: true, ..particle };
        self.live_count += 1;
        true
    }

    /// Removes every live particle below the kill threshold, compacting survivors
    /// towards the front in their existing order.
    fn retire(&mut self) -> usize {
        let threshold = self.config.kill_threshold_y;

        // Slots past `live_count` are always inactive, so only the prefix is scanned.
        let mut write = 0;
        for read in 0..self.live_count {
            if self.slots[read].position.y < threshold {
                continue;
            }
            if write != read {
                self.slots[write] = self.slots[read];
            }
            write += 1;
        }

        let retired = self.live_count - write;
        self.slots[write..self.live_count].fill(Particle::default());
        self.live_count = write;
        retired
    }

    fn emit(&mut self, elapsed_ms: f32) -> usize {
        self.accumulated_ms += elapsed_ms;

        let interval = self.config.emission_interval_ms();
        if self.accumulated_ms < interval {
            return 0;
        }

        let due = match self.config.emission_policy {
            EmissionPolicy::ResetAccumulator => {
                self.accumulated_ms = 0.0;
                1
            }
            EmissionPolicy::CarryRemainder => {
                let whole = (self.accumulated_ms / interval).floor();
                self.accumulated_ms = (self.accumulated_ms - whole * interval).max(0.0);
                whole as usize
            }
        };

        let mut emitted = 0;
        while emitted < due && self.has_room_to_emit() {
            let particle = self.spawn();
            if !self.insert(particle) {
                break;
            }
            emitted += 1;
        }

        if emitted < due {
            log::trace!("particle pool full; dropped {} emission(s)", due - emitted);
        }
        emitted
    }

    /// Emission keeps one slot in reserve: `live_count < capacity - 1`.
    #[inline]
    fn has_room_to_emit(&self) -> bool {
        self.live_count + 1 < self.slots.len()
    }

    fn spawn(&mut self) -> Particle {
        let deviation = self.config.spawn_deviation;
        let position = Vec3::new(
            self.signed_unit() * deviation.x,
            self.signed_unit() * deviation.y,
            self.signed_unit() * deviation.z,
        );
        let velocity = self.config.velocity_base + self.signed_unit() * self.config.velocity_jitter;

        Particle::new(position, self.config.color, velocity)
    }

    #[inline]
    fn signed_unit(&mut self) -> f32 {
        self.rng.random_range(-1.0..=1.0)
    }

    fn integrate(&mut self, elapsed_ms: f32) {
        let time_scale = self.config.time_scale;
        for p in &mut self.slots[..self.live_count] {
            p.position.y -= p.velocity * elapsed_ms * time_scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Rgb;

    fn config(capacity: usize) -> ParticleConfig {
        ParticleConfig { capacity, ..Default::default() }
    }

    fn pool(capacity: usize) -> ParticlePool {
        ParticlePool::with_seed(config(capacity), 7).unwrap()
    }

    /// Pool whose emission interval is far longer than any test runs.
    fn quiet_pool(capacity: usize) -> ParticlePool {
        let cfg = ParticleConfig { emission_rate: 1e-3, ..config(capacity) };
        ParticlePool::with_seed(cfg, 7).unwrap()
    }

    fn at(x: f32, y: f32, z: f32) -> Particle {
        Particle::new(Vec3::new(x, y, z), Rgb::white(), 1.0)
    }

    fn assert_invariants(pool: &ParticlePool) {
        assert!(pool.live_count() <= pool.capacity());
        for (i, p) in pool.slots().iter().enumerate() {
            assert_eq!(p.active, i < pool.live_count(), "slot {i} liveness");
        }
        for pair in pool.live().windows(2) {
            assert!(pair[0].position.z >= pair[1].position.z, "depth order: {pair:?}");
        }
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn new_pool_is_empty_and_inactive() {
        let pool = pool(16);
        assert!(pool.is_empty());
        assert_eq!(pool.capacity(), 16);
        assert!(pool.slots().iter().all(|p| !p.active));
    }

    #[test]
    fn capacity_one_is_rejected() {
        assert!(matches!(
            ParticlePool::new(config(1)),
            Err(ConfigError::CapacityTooSmall(1))
        ));
    }

    // ── emission ──────────────────────────────────────────────────────────

    #[test]
    fn forty_long_frames_emit_forty_particles() {
        let mut pool = pool(10_000);
        for _ in 0..40 {
            pool.tick(16.0);
        }
        assert_eq!(pool.live_count(), 40);
        assert_invariants(&pool);
    }

    #[test]
    fn two_ms_ticks_over_one_second_emit_five_hundred() {
        // Fall speed is zero so nothing retires during the second.
        let cfg = ParticleConfig {
            velocity_base: 0.0,
            velocity_jitter: 0.0,
            ..Default::default()
        };
        let mut pool = ParticlePool::with_seed(cfg, 1).unwrap();

        let mut emitted = 0;
        for _ in 0..500 {
            emitted += pool.tick(2.0).emitted;
        }
        assert_eq!(emitted, 500);
        assert_eq!(pool.live_count(), 500);
    }

    #[test]
    fn short_ticks_accumulate_before_emitting() {
        let mut pool = pool(64);
        assert_eq!(pool.tick(1.5).emitted, 0);
        assert_eq!(pool.accumulated_ms(), 1.5);
        assert_eq!(pool.tick(1.5).emitted, 1);
        assert_eq!(pool.accumulated_ms(), 0.0);
    }

    #[test]
    fn reset_policy_emits_once_per_stalled_frame() {
        let mut pool = pool(10_000);
        let stats = pool.tick(250.0);
        assert_eq!(stats.emitted, 1);
        assert_eq!(pool.accumulated_ms(), 0.0);
    }

    #[test]
    fn carry_policy_keeps_rate_across_stalls() {
        let cfg = ParticleConfig {
            emission_policy: EmissionPolicy::CarryRemainder,
            ..Default::default()
        };
        let mut pool = ParticlePool::with_seed(cfg, 3).unwrap();

        let stats = pool.tick(21.0);
        assert_eq!(stats.emitted, 10);
        assert!((pool.accumulated_ms() - 1.0).abs() < 1e-4);

        assert_eq!(pool.tick(1.0).emitted, 1);
        assert_invariants(&pool);
    }

    #[test]
    fn carry_policy_is_bounded_by_capacity() {
        let cfg = ParticleConfig {
            capacity: 8,
            emission_policy: EmissionPolicy::CarryRemainder,
            ..Default::default()
        };
        let mut pool = ParticlePool::with_seed(cfg, 3).unwrap();

        let stats = pool.tick(100.0);
        assert_eq!(stats.emitted, 7);
        assert_eq!(pool.live_count(), 7);
        assert_eq!(pool.accumulated_ms(), 0.0);

        // A long stall while full: nothing is emitted and the debt is dropped.
        // The stall also drops every particle below the kill threshold.
        assert_eq!(pool.tick(10_000.0).emitted, 0);
        assert_eq!(pool.accumulated_ms(), 0.0);

        // Once freed, the pool emits at the normal rate instead of bursting.
        let stats = pool.tick(2.0);
        assert_eq!(stats.retired, 7);
        assert_eq!(stats.emitted, 1);
        assert_eq!(pool.live_count(), 1);
        assert_invariants(&pool);
    }

    #[test]
    fn emission_stops_one_short_of_capacity() {
        let mut pool = pool(4);
        for _ in 0..10 {
            pool.tick(3.0);
        }
        // Emission requires live_count < capacity - 1.
        assert_eq!(pool.live_count(), 3);
        assert_invariants(&pool);
    }

    #[test]
    fn emission_resumes_after_retirement_frees_a_slot() {
        let mut pool = pool(4);
        for _ in 0..10 {
            pool.tick(3.0);
        }
        assert_eq!(pool.live_count(), 3);

        // Full: no emission, and everything falls past the kill threshold.
        assert_eq!(pool.tick(10_000.0).emitted, 0);

        let stats = pool.tick(3.0);
        assert_eq!(stats.retired, 3);
        assert_eq!(stats.emitted, 1);
        assert_eq!(pool.live_count(), 1);
        assert_invariants(&pool);
    }

    #[test]
    fn spawned_particles_stay_inside_the_spawn_box() {
        let cfg = config(1_000);
        let dev = cfg.spawn_deviation;
        let (base, jitter) = (cfg.velocity_base, cfg.velocity_jitter);
        let mut pool = ParticlePool::with_seed(cfg, 11).unwrap();

        for _ in 0..200 {
            pool.tick(3.0);
        }

        let fall_allowance = 200.0 * 3.0 * 0.001 * (base + jitter);
        for p in pool.live() {
            assert!(p.position.x.abs() <= dev.x);
            assert!(p.position.z.abs() <= dev.z);
            assert!(p.position.y <= dev.y);
            assert!(p.position.y >= -dev.y - fall_allowance);
            assert!(p.velocity >= base - jitter && p.velocity <= base + jitter);
            assert_eq!(p.color, Rgb::from_u8(255, 204, 248));
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_particles() {
        let mut a = pool(128);
        let mut b = pool(128);
        for _ in 0..50 {
            a.tick(4.0);
            b.tick(4.0);
        }
        assert_eq!(a.live(), b.live());
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn depth_order_holds_over_many_ticks() {
        let mut pool = pool(2_000);
        for i in 0..3_000 {
            pool.tick(if i % 7 == 0 { 33.0 } else { 16.0 });
            assert_invariants(&pool);
        }
    }

    #[test]
    fn insert_places_particle_by_depth() {
        let mut pool = pool(8);
        assert!(pool.insert(at(0.0, 0.0, 1.0)));
        assert!(pool.insert(at(0.0, 0.0, 3.0)));
        assert!(pool.insert(at(0.0, 0.0, 2.0)));

        let zs: Vec<f32> = pool.live().iter().map(|p| p.position.z).collect();
        assert_eq!(zs, vec![3.0, 2.0, 1.0]);
        assert_invariants(&pool);
    }

    #[test]
    fn insert_ties_keep_existing_particles_first() {
        let mut pool = pool(8);
        pool.insert(at(1.0, 0.0, 2.0));
        pool.insert(at(2.0, 0.0, 2.0));
        pool.insert(at(3.0, 0.0, 1.0));
        pool.insert(at(4.0, 0.0, 2.0));

        let xs: Vec<f32> = pool.live().iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 4.0, 3.0]);
    }

    #[test]
    fn insert_fails_when_full_or_not_finite() {
        let mut pool = pool(2);
        assert!(!pool.insert(at(0.0, f32::NAN, 0.0)));
        assert!(pool.insert(at(0.0, 0.0, 0.0)));
        assert!(pool.insert(at(0.0, 0.0, 0.0)));
        assert!(!pool.insert(at(0.0, 0.0, 0.0)));
        assert_eq!(pool.live_count(), 2);
    }

    // ── retirement ────────────────────────────────────────────────────────

    #[test]
    fn particle_below_threshold_is_retired_and_followers_shift() {
        let mut pool = quiet_pool(8);
        pool.insert(at(1.0, 0.0, 4.0));
        pool.insert(at(2.0, -3.0 - 1e-3, 3.0));
        pool.insert(at(3.0, 0.0, 2.0));
        pool.insert(at(4.0, 0.0, 1.0));

        let stats = pool.tick(0.0);
        assert_eq!(stats.retired, 1);
        assert_eq!(pool.live_count(), 3);

        let xs: Vec<f32> = pool.live().iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![1.0, 3.0, 4.0]);
        assert_invariants(&pool);
    }

    #[test]
    fn several_retirements_in_one_tick_keep_order() {
        let mut pool = quiet_pool(8);
        for (i, y) in [-4.0, 0.0, -5.0, -3.5, 0.0, 1.0].into_iter().enumerate() {
            pool.insert(at(i as f32, y, 10.0 - i as f32));
        }

        assert_eq!(pool.tick(0.0).retired, 3);
        let xs: Vec<f32> = pool.live().iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![1.0, 4.0, 5.0]);
        assert_invariants(&pool);
    }

    #[test]
    fn particle_exactly_at_threshold_survives() {
        let mut pool = quiet_pool(4);
        pool.insert(at(0.0, -3.0, 0.0));
        assert_eq!(pool.tick(0.0).retired, 0);
        assert_eq!(pool.live_count(), 1);
    }

    #[test]
    fn retirement_uses_position_from_previous_tick() {
        let mut pool = quiet_pool(4);
        pool.insert(at(0.0, -2.99, 0.0));

        // Retire runs before integrate: the particle survives this tick ...
        let stats = pool.tick(20.0);
        assert_eq!(stats.retired, 0);
        assert!((pool.live()[0].position.y - -3.01).abs() < 1e-5);

        // ... and is removed on the next one.
        let stats = pool.tick(0.0);
        assert_eq!(stats.retired, 1);
        assert!(pool.is_empty());
    }

    // ── integration ───────────────────────────────────────────────────────

    #[test]
    fn integration_moves_only_y() {
        let mut pool = quiet_pool(4);
        pool.insert(Particle::new(Vec3::new(0.5, 1.0, -0.5), Rgb::white(), 2.0));

        pool.tick(100.0);
        let p = pool.live()[0];
        assert_eq!(p.position.x, 0.5);
        assert_eq!(p.position.z, -0.5);
        assert!((p.position.y - 0.8).abs() < 1e-6);
    }

    #[test]
    fn zero_and_negative_elapsed_do_not_move_particles() {
        let mut pool = quiet_pool(4);
        pool.insert(at(0.0, 1.0, 0.0));
        pool.tick(0.0);
        pool.tick(-50.0);
        pool.tick(f32::NAN);
        pool.tick(f32::INFINITY);
        assert_eq!(pool.live()[0].position.y, 1.0);
        assert_eq!(pool.accumulated_ms(), 0.0);
    }

    #[test]
    fn falling_particles_are_retired_within_bounded_ticks() {
        let mut pool = quiet_pool(8);
        for z in [1.0, 2.0, 3.0] {
            pool.insert(at(0.0, 0.0, z));
        }

        let mut ticks = 0;
        while !pool.is_empty() && ticks < 10 {
            pool.tick(1000.0);
            ticks += 1;
        }
        assert!(pool.is_empty());
        assert!(ticks <= 5, "took {ticks} ticks");
    }

    // ── reset ─────────────────────────────────────────────────────────────

    #[test]
    fn reset_clears_everything() {
        let mut pool = pool(64);
        for _ in 0..10 {
            pool.tick(16.0);
        }
        pool.tick(1.0);
        pool.reset();

        assert!(pool.is_empty());
        assert_eq!(pool.accumulated_ms(), 0.0);
        assert!(pool.slots().iter().all(|p| !p.active));
    }
}
