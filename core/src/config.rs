//! Immutable configuration consumed by the simulation at startup.
//!
//! Every structure deserializes with `#[serde(default)]`, so a scenario file
//! only needs to spell out the values it changes. [`Scenario::validate`]
//! rejects malformed content before the first tick runs.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ArchetypeId, CellCoord, CellRect, CellRectSize, EmplacementKind, Gold, PathId};

/// Upper bound on the number of mobs a single wave may contain.
pub const MAX_WAVE_MOBS: u32 = 10_000;

/// Startup precondition violations detected while validating configuration.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The playfield has a non-positive extent.
    #[error("playfield bounds must be positive, got {width}x{height}")]
    InvalidBounds {
        /// Configured width.
        width: f32,
        /// Configured height.
        height: f32,
    },
    /// Cells must have a positive edge length.
    #[error("cell size must be positive, got {0}")]
    InvalidCellSize(f32),
    /// No cell accepts emplacements.
    #[error("no valid placement cells are configured")]
    NoPlacementCells,
    /// No path polyline is configured.
    #[error("no enemy paths are configured")]
    NoPaths,
    /// A path has fewer than two points.
    #[error("path {path} has {points} points; at least two are required")]
    PathTooShort {
        /// Index of the offending path.
        path: usize,
        /// Number of points it contains.
        points: usize,
    },
    /// Two consecutive points coincide.
    #[error("path {path} repeats point {index}, producing a zero-length segment")]
    ZeroLengthSegment {
        /// Index of the offending path.
        path: usize,
        /// Index of the repeated point.
        index: usize,
    },
    /// A path point lies outside the playfield.
    #[error("path {path} point {index} lies outside the playfield")]
    PathOutOfBounds {
        /// Index of the offending path.
        path: usize,
        /// Index of the offending point.
        index: usize,
    },
    /// An explicitly selected path does not exist.
    #[error("selected path {0} does not exist")]
    UnknownPath(u32),
    /// Emplacement statistics are non-positive.
    #[error("{0:?} emplacement statistics must be positive")]
    InvalidEmplacementStats(EmplacementKind),
    /// Upgrade factors would not improve an emplacement.
    #[error("upgrade factors must improve damage, range and interval")]
    InvalidUpgradePolicy,
    /// Projectile parameters are non-positive.
    #[error("projectile speed, arrival threshold and radii must be positive")]
    InvalidProjectile,
    /// The sell ratio is outside `[0, 1]`.
    #[error("sell ratio {0} must lie within [0, 1]")]
    InvalidSellRatio(f32),
    /// Spawns would all happen on the same tick.
    #[error("spawn delay must be non-zero")]
    ZeroSpawnDelay,
    /// Neither authored nor procedural waves are configured.
    #[error("at least one wave is required")]
    NoWaves,
    /// An authored wave spawns nothing.
    #[error("wave {0} contains no mobs")]
    EmptyWave(usize),
    /// The archetype catalog is empty.
    #[error("mob archetype catalog is empty")]
    EmptyCatalog,
    /// An authored wave references a missing archetype.
    #[error("archetype {archetype} referenced by wave {wave} is not in the catalog")]
    UnknownArchetype {
        /// Wave containing the reference.
        wave: usize,
        /// Missing archetype index.
        archetype: u32,
    },
    /// A mob would never move or would start dead.
    #[error("mob speed and health must be positive ({0})")]
    InvalidMobStats(String),
    /// Procedural deviation is outside `[0, 1)`.
    #[error("deviation {0} must lie within [0, 1)")]
    InvalidDeviation(f32),
    /// Procedural mobs per level must be finite and positive.
    #[error("base count per level must be finite and positive, got {0}")]
    InvalidBaseCount(f32),
    /// Procedural per-level growth must be finite and non-negative.
    #[error("level scaling must be finite and non-negative, got {0}")]
    InvalidLevelScaling(f32),
    /// A wave could spawn more mobs than [`MAX_WAVE_MOBS`].
    #[error("wave {wave} may spawn {mobs} mobs, more than the limit of {}", MAX_WAVE_MOBS)]
    WaveTooLarge {
        /// Offending wave.
        wave: usize,
        /// Largest number of mobs the wave may contain.
        mobs: u64,
    },
}

/// Complete description of a run: arena, waves and the random seed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Seed for every random decision taken during the run.
    pub seed: u64,
    /// Explicit path selection. When absent, one path is drawn from the seed.
    pub path: Option<PathId>,
    /// Playfield, economy and emplacement configuration.
    pub arena: ArenaConfig,
    /// Wave schedule and enemy catalog.
    pub waves: WaveConfig,
}

impl Scenario {
    /// Checks every startup precondition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.arena.validate()?;
        self.waves.validate()?;
        if let Some(path) = self.path {
            if self.arena.path(path).is_none() {
                return Err(ConfigError::UnknownPath(path.get()));
            }
        }
        Ok(())
    }
}

/// Size of the playfield in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Bounds {
    /// Reports whether the point lies within the playfield, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: 1_200.0,
            height: 800.0,
        }
    }
}

/// Pre-authored polyline followed by mobs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathSpec {
    /// Ordered waypoints; the first is the spawn point and the last the breach point.
    pub points: Vec<Vec2>,
}

impl PathSpec {
    fn from_pairs(pairs: &[(f32, f32)]) -> Self {
        Self {
            points: pairs.iter().map(|&(x, y)| Vec2::new(x, y)).collect(),
        }
    }
}

/// Base statistics and price of one emplacement kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmplacementStats {
    /// Construction price.
    pub cost: Gold,
    /// Targeting radius. Ignored by income emplacements.
    pub range: f32,
    /// Damage per projectile, or gold per payout.
    pub damage: f32,
    /// Milliseconds between two shots or payouts.
    pub fire_interval_ms: u64,
}

impl EmplacementStats {
    /// Interval between two shots or payouts.
    #[must_use]
    pub const fn fire_interval(&self) -> Duration {
        Duration::from_millis(self.fire_interval_ms)
    }
}

/// Statistics for every constructible emplacement kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmplacementCatalog {
    /// Nearest-target emplacement.
    pub basic: EmplacementStats,
    /// Healthiest-target emplacement.
    pub sniper: EmplacementStats,
    /// Income emplacement.
    pub economy: EmplacementStats,
}

impl EmplacementCatalog {
    /// Retrieves the statistics of a kind.
    #[must_use]
    pub const fn stats(&self, kind: EmplacementKind) -> &EmplacementStats {
        match kind {
            EmplacementKind::Basic => &self.basic,
            EmplacementKind::Sniper => &self.sniper,
            EmplacementKind::Economy => &self.economy,
        }
    }
}

impl Default for EmplacementCatalog {
    fn default() -> Self {
        Self {
            basic: EmplacementStats {
                cost: Gold::new(100),
                range: 150.0,
                damage: 20.0,
                fire_interval_ms: 1_000,
            },
            sniper: EmplacementStats {
                cost: Gold::new(100),
                range: 300.0,
                damage: 40.0,
                fire_interval_ms: 2_000,
            },
            economy: EmplacementStats {
                cost: Gold::new(100),
                range: 0.0,
                damage: 50.0,
                fire_interval_ms: 10_000,
            },
        }
    }
}

/// Price and effect of upgrading an emplacement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradePolicy {
    /// Upgrade price per current level.
    pub cost_per_level: Gold,
    /// Multiplier applied to damage on every upgrade.
    pub damage_factor: f32,
    /// Multiplier applied to range on every upgrade.
    pub range_factor: f32,
    /// Multiplier applied to the fire interval on every upgrade.
    pub interval_factor: f32,
}

impl UpgradePolicy {
    /// Price of upgrading an emplacement currently at `level`.
    #[must_use]
    pub const fn cost_for(&self, level: u32) -> Gold {
        self.cost_per_level.saturating_mul(level)
    }
}

impl Default for UpgradePolicy {
    fn default() -> Self {
        Self {
            cost_per_level: Gold::new(100),
            damage_factor: 1.2,
            range_factor: 1.2,
            interval_factor: 0.8,
        }
    }
}

/// Flight parameters shared by every projectile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Distance travelled per tick.
    pub speed: f32,
    /// Distance to the destination below which a projectile expires.
    pub arrival_threshold: f32,
    /// Collision radius of a projectile.
    pub radius: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            arrival_threshold: 10.0,
            radius: 5.0,
        }
    }
}

/// Playfield, economy and emplacement configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Playfield extent; projectiles leaving it expire.
    pub bounds: Bounds,
    /// Edge length of a square placement cell.
    pub cell_size: f32,
    /// Regions of cells that accept emplacements.
    pub placement: Vec<CellRect>,
    /// Candidate enemy paths.
    pub paths: Vec<PathSpec>,
    /// Gold available when the run starts.
    pub starting_gold: Gold,
    /// Per-kind emplacement statistics.
    pub emplacements: EmplacementCatalog,
    /// Upgrade pricing and effect.
    pub upgrades: UpgradePolicy,
    /// Projectile flight parameters.
    pub projectile: ProjectileConfig,
    /// Collision radius of a mob.
    pub mob_radius: f32,
    /// Share of the invested gold refunded when selling.
    pub sell_ratio: f32,
}

impl ArenaConfig {
    /// Retrieves a configured path.
    #[must_use]
    pub fn path(&self, id: PathId) -> Option<&PathSpec> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.paths.get(index))
    }

    /// Enumerates every valid placement cell, including duplicates from overlapping regions.
    pub fn placement_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.placement.iter().flat_map(CellRect::cells)
    }

    /// Checks the arena's startup preconditions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.bounds.width > 0.0 && self.bounds.height > 0.0) {
            return Err(ConfigError::InvalidBounds {
                width: self.bounds.width,
                height: self.bounds.height,
            });
        }
        if !(self.cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        if self.placement_cells().next().is_none() {
            return Err(ConfigError::NoPlacementCells);
        }
        if self.paths.is_empty() {
            return Err(ConfigError::NoPaths);
        }
        for (path_index, path) in self.paths.iter().enumerate() {
            if path.points.len() < 2 {
                return Err(ConfigError::PathTooShort {
                    path: path_index,
                    points: path.points.len(),
                });
            }
            for (index, point) in path.points.iter().enumerate() {
                if !self.bounds.contains(*point) {
                    return Err(ConfigError::PathOutOfBounds {
                        path: path_index,
                        index,
                    });
                }
            }
            for (index, pair) in path.points.windows(2).enumerate() {
                if pair[0].distance_squared(pair[1]) <= f32::EPSILON {
                    return Err(ConfigError::ZeroLengthSegment {
                        path: path_index,
                        index: index + 1,
                    });
                }
            }
        }
        for kind in EmplacementKind::ALL {
            let stats = self.emplacements.stats(kind);
            let targets = kind.fire_mode() == crate::FireMode::Projectile;
            if !(stats.damage > 0.0) || stats.fire_interval_ms == 0 || (targets && !(stats.range > 0.0))
            {
                return Err(ConfigError::InvalidEmplacementStats(kind));
            }
        }
        let upgrades = &self.upgrades;
        if !(upgrades.damage_factor >= 1.0
            && upgrades.range_factor >= 1.0
            && upgrades.interval_factor > 0.0
            && upgrades.interval_factor <= 1.0)
        {
            return Err(ConfigError::InvalidUpgradePolicy);
        }
        let projectile = &self.projectile;
        if !(projectile.speed > 0.0
            && projectile.arrival_threshold > 0.0
            && projectile.radius > 0.0
            && self.mob_radius > 0.0)
        {
            return Err(ConfigError::InvalidProjectile);
        }
        if !(0.0..=1.0).contains(&self.sell_ratio) {
            return Err(ConfigError::InvalidSellRatio(self.sell_ratio));
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            cell_size: 64.0,
            placement: vec![CellRect::from_origin_and_size(
                CellCoord::new(1, 3),
                CellRectSize::new(14, 7),
            )],
            paths: vec![
                PathSpec::from_pairs(&[
                    (50.0, 400.0),
                    (300.0, 400.0),
                    (300.0, 200.0),
                    (600.0, 200.0),
                    (600.0, 600.0),
                    (900.0, 600.0),
                    (900.0, 300.0),
                    (1_150.0, 300.0),
                ]),
                PathSpec::from_pairs(&[
                    (30.0, 600.0),
                    (250.0, 400.0),
                    (350.0, 180.0),
                    (600.0, 200.0),
                    (500.0, 600.0),
                    (900.0, 600.0),
                    (800.0, 300.0),
                    (1_150.0, 500.0),
                ]),
                PathSpec::from_pairs(&[
                    (30.0, 300.0),
                    (600.0, 500.0),
                    (300.0, 300.0),
                    (600.0, 200.0),
                    (500.0, 600.0),
                    (900.0, 600.0),
                    (700.0, 300.0),
                    (1_150.0, 400.0),
                ]),
                PathSpec::from_pairs(&[
                    (30.0, 400.0),
                    (300.0, 200.0),
                    (600.0, 600.0),
                    (900.0, 200.0),
                    (1_150.0, 600.0),
                ]),
            ],
            starting_gold: Gold::new(500),
            emplacements: EmplacementCatalog::default(),
            upgrades: UpgradePolicy::default(),
            projectile: ProjectileConfig::default(),
            mob_radius: 20.0,
            sell_ratio: 0.75,
        }
    }
}

/// Catalog entry describing an enemy type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MobArchetype {
    /// Display name, also used to pick sprites.
    pub name: String,
    /// Base distance travelled per tick.
    pub speed: f32,
    /// Base starting health.
    pub health: f32,
    /// Base kill reward.
    pub reward: Gold,
}

impl MobArchetype {
    fn new(name: &str, speed: f32, health: f32, reward: u32) -> Self {
        Self {
            name: name.to_owned(),
            speed,
            health,
            reward: Gold::new(reward),
        }
    }
}

/// Run of identical mobs inside an authored wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnGroup {
    /// Catalog entry the mobs are drawn as.
    pub archetype: ArchetypeId,
    /// Number of mobs in the run.
    pub count: u32,
    /// Distance travelled per tick.
    pub speed: f32,
    /// Starting health.
    pub health: f32,
    /// Kill reward.
    pub reward: Gold,
}

/// Hand-written wave, spawned group by group in order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthoredWave {
    /// Groups spawned one after the other.
    pub groups: Vec<SpawnGroup>,
}

impl AuthoredWave {
    /// Total number of mobs the wave spawns.
    #[must_use]
    pub fn mob_count(&self) -> u64 {
        self.groups.iter().map(|group| u64::from(group.count)).sum()
    }
}

/// Wave schedule and enemy catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Minimum milliseconds between two spawns of the same wave.
    pub spawn_delay_ms: u64,
    /// Fixed prefix of hand-written waves.
    pub authored: Vec<AuthoredWave>,
    /// Enemy types procedural waves draw from.
    pub catalog: Vec<MobArchetype>,
    /// Number of generated waves following the authored prefix.
    pub procedural_waves: u32,
    /// Mobs per wave level before deviation is applied.
    pub base_count_per_level: f32,
    /// Relative spread applied to counts and statistics of generated waves.
    pub deviation: f32,
    /// Per-level growth applied to generated statistics.
    pub level_scaling: f32,
}

impl WaveConfig {
    /// Pause between two spawns of the same wave.
    #[must_use]
    pub const fn spawn_delay(&self) -> Duration {
        Duration::from_millis(self.spawn_delay_ms)
    }

    /// Total number of waves, authored and generated.
    #[must_use]
    pub fn total_waves(&self) -> usize {
        self.authored
            .len()
            .saturating_add(usize::try_from(self.procedural_waves).unwrap_or(usize::MAX))
    }

    /// Checks the schedule's startup preconditions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spawn_delay_ms == 0 {
            return Err(ConfigError::ZeroSpawnDelay);
        }
        if self.total_waves() == 0 {
            return Err(ConfigError::NoWaves);
        }
        if self.catalog.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        for archetype in &self.catalog {
            if !(archetype.speed > 0.0 && archetype.health > 0.0) {
                return Err(ConfigError::InvalidMobStats(archetype.name.clone()));
            }
        }
        for (wave, authored) in self.authored.iter().enumerate() {
            let mobs = authored.mob_count();
            if mobs == 0 {
                return Err(ConfigError::EmptyWave(wave));
            }
            if mobs > u64::from(MAX_WAVE_MOBS) {
                return Err(ConfigError::WaveTooLarge { wave, mobs });
            }
            for group in &authored.groups {
                let known = usize::try_from(group.archetype.get())
                    .map(|index| index < self.catalog.len())
                    .unwrap_or(false);
                if !known {
                    return Err(ConfigError::UnknownArchetype {
                        wave,
                        archetype: group.archetype.get(),
                    });
                }
                if !(group.speed > 0.0 && group.health > 0.0) {
                    return Err(ConfigError::InvalidMobStats(format!("wave {wave}")));
                }
            }
        }
        if !(0.0..1.0).contains(&self.deviation) {
            return Err(ConfigError::InvalidDeviation(self.deviation));
        }
        if !(self.base_count_per_level.is_finite() && self.base_count_per_level > 0.0) {
            return Err(ConfigError::InvalidBaseCount(self.base_count_per_level));
        }
        if !(self.level_scaling.is_finite() && self.level_scaling >= 0.0) {
            return Err(ConfigError::InvalidLevelScaling(self.level_scaling));
        }
        if self.procedural_waves > 0 {
            // The last wave is the largest: counts grow linearly with level.
            let wave = self.total_waves().saturating_sub(1);
            let largest = self.generated_mob_limit(wave);
            if largest > f64::from(MAX_WAVE_MOBS) {
                return Err(ConfigError::WaveTooLarge {
                    wave,
                    mobs: largest.min(u64::MAX as f64) as u64,
                });
            }
        }
        Ok(())
    }

    /// Most mobs the generated wave `index` can contain once deviation is applied.
    #[must_use]
    pub fn generated_mob_limit(&self, index: usize) -> f64 {
        let level = index.saturating_add(1) as f64;
        let base = level * f64::from(self.base_count_per_level);
        (base * (1.0 + f64::from(self.deviation))).round().max(1.0)
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        let group = |archetype: u32, count: u32, speed: f32, health: f32| SpawnGroup {
            archetype: ArchetypeId::new(archetype),
            count,
            speed,
            health,
            reward: Gold::new(50),
        };
        Self {
            spawn_delay_ms: 1_000,
            authored: vec![
                AuthoredWave {
                    groups: vec![group(0, 5, 1.0, 100.0)],
                },
                AuthoredWave {
                    groups: vec![group(1, 7, 1.5, 150.0)],
                },
                AuthoredWave {
                    groups: vec![group(2, 4, 0.75, 200.0)],
                },
            ],
            catalog: vec![
                MobArchetype::new("basic", 1.0, 100.0, 50),
                MobArchetype::new("fast", 1.5, 150.0, 50),
                MobArchetype::new("strong", 0.75, 200.0, 50),
                MobArchetype::new("croco", 1.25, 250.0, 75),
                MobArchetype::new("shark", 2.0, 120.0, 60),
            ],
            procedural_waves: 7,
            base_count_per_level: 2.5,
            deviation: 0.2,
            level_scaling: 0.0015,
        }
    }
}
