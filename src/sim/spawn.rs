//! Item spawn scheduling
//!
//! Items arrive in bursts: 1-4 items a few milliseconds apart, then a long
//! pause. Burst size and both gaps are drawn once per burst from the seeded
//! RNG. The next-spawn delay is floored by the time the lane needs to clear
//! one item's width plus margin, and a spawn is skipped (and retried shortly)
//! while the previous item still blocks the spawn point.

use std::ops::RangeInclusive;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{Classification, Item, ItemId};
use crate::config::SimConfig;
use crate::settings::LaneGeometry;

/// Timing state for the current burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstSchedule {
    /// Items left to spawn in this burst
    pub remaining: u32,
    pub intra_gap_ms: f64,
    pub post_burst_gap_ms: f64,
}

/// Spawn parameters captured from config and geometry
#[derive(Debug, Clone)]
struct SpawnRules {
    malicious_probability: f64,
    burst_size: RangeInclusive<u32>,
    intra_gap: RangeInclusive<f64>,
    post_gap: RangeInclusive<f64>,
    /// Item width + margin: the tail's x must exceed this before the next spawn
    min_distance: f32,
    /// Time the lane needs to clear `min_distance` at travel speed
    min_interval_ms: f64,
    retry_ms: f64,
    spawn_pos: Vec2,
    item_width: f32,
}

/// Emits new items onto the lane
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    rules: SpawnRules,
    rng: Pcg32,
    next_spawn_ms: f64,
    burst: Option<BurstSchedule>,
    next_id: u32,
}

impl SpawnScheduler {
    pub fn new(config: &SimConfig, geometry: &LaneGeometry, seed: u64) -> Self {
        let min_distance = geometry.item_width + config.spawn_margin;
        Self {
            rules: SpawnRules {
                malicious_probability: config.malicious_probability,
                burst_size: config.burst_size_range.clone(),
                intra_gap: config.intra_burst_gap_range.clone(),
                post_gap: config.post_burst_gap_range.clone(),
                min_distance,
                min_interval_ms: (min_distance / config.travel_speed) as f64 * 1000.0,
                retry_ms: config.spawn_retry_ms,
                spawn_pos: Vec2::new(geometry.spawn_x, geometry.lane_y),
                item_width: geometry.item_width,
            },
            rng: Pcg32::seed_from_u64(seed),
            next_spawn_ms: 0.0,
            burst: None,
            next_id: 1,
        }
    }

    /// Time of the next spawn attempt
    pub fn next_spawn_ms(&self) -> f64 {
        self.next_spawn_ms
    }

    pub fn burst(&self) -> Option<&BurstSchedule> {
        self.burst.as_ref()
    }

    /// Minimum time between two spawns
    pub fn min_interval_ms(&self) -> f64 {
        self.rules.min_interval_ms
    }

    /// Forget timing and burst state. Keeps the RNG stream and id counter so
    /// ids stay unique across resets.
    pub fn reset(&mut self) {
        self.next_spawn_ms = 0.0;
        self.burst = None;
    }

    /// Possibly emit a new item. `lane_tail_x` is the x of the most recently
    /// spawned item still on the lane.
    pub fn tick(&mut self, now_ms: f64, lane_tail_x: Option<f32>) -> Option<Item> {
        if now_ms < self.next_spawn_ms {
            return None;
        }

        let clear = lane_tail_x.is_none_or(|x| x > self.rules.min_distance);
        if !clear {
            self.next_spawn_ms = now_ms + self.rules.retry_ms;
            return None;
        }

        let classification = if self.rng.random_bool(self.rules.malicious_probability) {
            Classification::Malicious
        } else {
            Classification::Safe
        };
        let id = ItemId(self.next_id);
        self.next_id += 1;
        let item = Item::new(
            id,
            self.rules.spawn_pos,
            self.rules.item_width,
            classification,
            now_ms,
        );

        let burst = match self.burst {
            Some(burst) if burst.remaining > 0 => burst,
            _ => self.draw_burst(),
        };
        let gap = if burst.remaining > 1 {
            burst.intra_gap_ms
        } else {
            burst.post_burst_gap_ms
        };
        self.burst = Some(BurstSchedule {
            remaining: burst.remaining - 1,
            ..burst
        });

        self.next_spawn_ms = now_ms + gap.max(self.rules.min_interval_ms);
        Some(item)
    }

    fn draw_burst(&mut self) -> BurstSchedule {
        let burst = BurstSchedule {
            remaining: self.rng.random_range(self.rules.burst_size.clone()),
            intra_gap_ms: self.rng.random_range(self.rules.intra_gap.clone()),
            post_burst_gap_ms: self.rng.random_range(self.rules.post_gap.clone()),
        };
        log::debug!(
            "New burst: {} items, {:.0}ms apart, then {:.0}ms pause",
            burst.remaining,
            burst.intra_gap_ms,
            burst.post_burst_gap_ms
        );
        burst
    }
}
