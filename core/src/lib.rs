#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Defence simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that renderers, audio notifiers and systems react to. Systems consume
//! read-only views such as [`MobView`] and [`EmplacementView`] and respond
//! exclusively with new command batches.

mod config;

pub use config::{
    ArenaConfig, AuthoredWave, Bounds, ConfigError, EmplacementCatalog, EmplacementStats,
    MobArchetype, PathSpec, ProjectileConfig, Scenario, SpawnGroup, UpgradePolicy, WaveConfig,
    MAX_WAVE_MOBS,
};

use std::{fmt, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Number of simulation ticks processed per second of simulated time.
pub const TICKS_PER_SECOND: u32 = 60;

/// Duration of simulated time covered by a single tick.
#[must_use]
pub fn tick_duration() -> Duration {
    Duration::from_secs(1) / TICKS_PER_SECOND
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Opens a new simulation tick at the provided timestamp.
    Tick {
        /// Time elapsed since the session started.
        now: Duration,
    },
    /// Moves every active mob and projectile by one tick's worth of travel.
    Advance,
    /// Requests that a mob described by the spawn specification enters the path.
    SpawnMob {
        /// Parameters of the mob to instantiate.
        spec: MobSpawnSpec,
    },
    /// Requests that an emplacement fires a projectile at a mob.
    FireProjectile {
        /// Emplacement that fires.
        emplacement: EmplacementId,
        /// Mob whose current position becomes the projectile's destination.
        target: MobId,
    },
    /// Requests that an income-producing emplacement pays out.
    GenerateIncome {
        /// Emplacement that pays out.
        emplacement: EmplacementId,
    },
    /// Intersects live projectiles with live mobs and removes finished entities.
    ResolveCollisions,
    /// Requests construction of an emplacement in the cell containing `point`.
    PlaceEmplacement {
        /// Type of emplacement to construct.
        kind: EmplacementKind,
        /// Playfield point selected by the player; snapped to its cell.
        point: Vec2,
    },
    /// Requests an upgrade of the emplacement in the cell containing `point`.
    UpgradeEmplacement {
        /// Playfield point selected by the player; snapped to its cell.
        point: Vec2,
    },
    /// Requests the sale of the emplacement in the cell containing `point`.
    SellEmplacement {
        /// Playfield point selected by the player; snapped to its cell.
        point: Vec2,
    },
    /// Reports that the wave scheduler observed the end of a wave.
    AnnounceWaveCleared {
        /// Wave that was cleared.
        wave: WaveId,
    },
    /// Reports that the wave scheduler exhausted every wave.
    AnnounceVictory,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Index of the tick that was opened.
        tick: u64,
        /// Time elapsed since the session started.
        now: Duration,
    },
    /// Confirms that a mob entered its path.
    MobSpawned {
        /// Identifier assigned to the mob.
        mob: MobId,
        /// Catalog entry the mob was created from.
        archetype: ArchetypeId,
        /// Path the mob follows.
        path: PathId,
    },
    /// Reports that a projectile struck a mob.
    MobDamaged {
        /// Mob that received damage.
        mob: MobId,
        /// Projectile that delivered the damage.
        projectile: ProjectileId,
        /// Damage applied.
        amount: f32,
        /// Health left after the hit.
        remaining: f32,
    },
    /// Reports that a mob's health was depleted and its reward credited.
    EnemyDestroyed {
        /// Mob that was destroyed.
        mob: MobId,
        /// Gold credited for the kill.
        reward: Gold,
    },
    /// Reports that a mob reached the end of its path.
    EnemyBreached {
        /// Mob that breached.
        mob: MobId,
    },
    /// Confirms that an emplacement launched a projectile.
    ShotFired {
        /// Emplacement that fired.
        emplacement: EmplacementId,
        /// Projectile that was created.
        projectile: ProjectileId,
        /// Mob that was aimed at.
        target: MobId,
    },
    /// Reports that a projectile reached its destination or left the playfield without a hit.
    ProjectileExpired {
        /// Projectile that expired.
        projectile: ProjectileId,
    },
    /// Confirms that an emplacement was constructed.
    TowerPlaced {
        /// Identifier assigned to the emplacement.
        emplacement: EmplacementId,
        /// Type of emplacement constructed.
        kind: EmplacementKind,
        /// Cell the emplacement occupies.
        cell: CellCoord,
        /// Gold charged for construction.
        cost: Gold,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Type of emplacement requested.
        kind: EmplacementKind,
        /// Cell the request resolved to.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that an emplacement was upgraded.
    TowerUpgraded {
        /// Emplacement that was upgraded.
        emplacement: EmplacementId,
        /// Level reached after the upgrade.
        level: u32,
        /// Gold charged for the upgrade.
        cost: Gold,
    },
    /// Reports that an upgrade request was rejected.
    UpgradeRejected {
        /// Cell the request resolved to.
        cell: CellCoord,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that an emplacement was sold and removed.
    TowerSold {
        /// Emplacement that was sold.
        emplacement: EmplacementId,
        /// Cell the emplacement occupied.
        cell: CellCoord,
        /// Gold refunded to the player.
        refund: Gold,
    },
    /// Reports that a sale request was rejected.
    SaleRejected {
        /// Cell the request resolved to.
        cell: CellCoord,
        /// Specific reason the sale failed.
        reason: SaleError,
    },
    /// Confirms that an income emplacement credited gold.
    MoneyGenerated {
        /// Emplacement that paid out.
        emplacement: EmplacementId,
        /// Gold credited.
        amount: Gold,
    },
    /// Announces that a wave was cleared.
    WaveCleared {
        /// Wave that was cleared.
        wave: WaveId,
    },
    /// Announces that a breach ended the run.
    GameOver,
    /// Announces that every wave was cleared.
    GameWon,
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }
    };
}

identifier!(
    /// Unique identifier assigned to a mob.
    MobId
);
identifier!(
    /// Unique identifier assigned to a projectile.
    ProjectileId
);
identifier!(
    /// Unique identifier assigned to an emplacement.
    EmplacementId
);
identifier!(
    /// Index of a path polyline within the arena configuration.
    PathId
);
identifier!(
    /// Index of a mob archetype within the wave catalog.
    ArchetypeId
);
identifier!(
    /// Zero-based index of a wave.
    WaveId
);

/// Amount of in-game currency.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Gold(u32);

impl Gold {
    /// An empty purse.
    pub const ZERO: Self = Self(0);

    /// Creates a new amount of gold.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric amount.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Rounds a fractional amount to whole gold. Non-positive and NaN inputs yield zero.
    #[must_use]
    pub fn from_rounded(amount: f32) -> Self {
        if amount.is_nan() || amount <= 0.0 {
            return Self::ZERO;
        }
        Self(amount.round().min(u32::MAX as f32) as u32)
    }

    /// Adds two amounts, saturating at the numeric bound.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts `other`, returning `None` when the purse would go negative.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Multiplies the amount by an integer factor, saturating at the numeric bound.
    #[must_use]
    pub const fn saturating_mul(self, factor: u32) -> Self {
        Self(self.0.saturating_mul(factor))
    }

    /// Scales the amount by `ratio`, rounding down.
    #[must_use]
    pub fn scaled_down(self, ratio: f32) -> Self {
        let scaled = (f64::from(self.0) * f64::from(ratio.clamp(0.0, 1.0))).floor();
        Self(scaled as u32)
    }
}

impl fmt::Display for Gold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Location of a single placement cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index of the cell. Points left of the playfield produce negative columns.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index of the cell. Points above the playfield produce negative rows.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Enumerates every cell covered by the rectangle in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let width = i32::try_from(self.size.width()).unwrap_or(i32::MAX);
        let height = i32::try_from(self.size.height()).unwrap_or(i32::MAX);
        (0..height).flat_map(move |dy| {
            (0..width).map(move |dx| {
                CellCoord::new(
                    origin.column().saturating_add(dx),
                    origin.row().saturating_add(dy),
                )
            })
        })
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Types of emplacements the player can construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmplacementKind {
    /// Fires at the nearest mob in range.
    Basic,
    /// Fires at the healthiest mob in range with long range and heavy damage.
    Sniper,
    /// Never fires; pays out gold on every interval instead.
    Economy,
}

impl EmplacementKind {
    /// Every constructible emplacement kind.
    pub const ALL: [Self; 3] = [Self::Basic, Self::Sniper, Self::Economy];

    /// Describes what the emplacement does when its interval elapses.
    #[must_use]
    pub const fn fire_mode(self) -> FireMode {
        match self {
            Self::Basic | Self::Sniper => FireMode::Projectile,
            Self::Economy => FireMode::Income,
        }
    }

    /// Stable lowercase label used by configuration files and command lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Sniper => "sniper",
            Self::Economy => "economy",
        }
    }

    /// Parses a label produced by [`EmplacementKind::label`].
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(label.trim()))
    }
}

/// Behaviour executed when an emplacement's interval elapses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FireMode {
    /// Select a target and launch a projectile at it.
    Projectile,
    /// Credit gold directly without targeting.
    Income,
}

/// Parameters required to instantiate a single mob.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MobSpawnSpec {
    /// Path the mob follows.
    pub path: PathId,
    /// Catalog entry the mob was derived from.
    pub archetype: ArchetypeId,
    /// Distance travelled per tick.
    pub speed: f32,
    /// Starting health.
    pub health: f32,
    /// Gold credited when the mob is destroyed.
    pub reward: Gold,
}

/// Terminal state of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The run is still being simulated.
    #[default]
    InProgress,
    /// A mob breached the end of its path.
    Lost,
    /// Every wave was cleared.
    Won,
}

/// Reasons an emplacement placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The cell is not part of the valid placement set.
    NotPlaceable,
    /// Another emplacement already occupies the cell.
    Occupied,
    /// The treasury cannot cover the construction cost.
    InsufficientFunds,
    /// The run has ended.
    SimulationOver,
}

/// Reasons an upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No emplacement occupies the requested cell.
    TargetMissing,
    /// The treasury cannot cover the upgrade cost.
    InsufficientFunds,
    /// The run has ended.
    SimulationOver,
}

/// Reasons a sale request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleError {
    /// No emplacement occupies the requested cell.
    TargetMissing,
    /// The run has ended.
    SimulationOver,
}

/// Immutable representation of a single mob's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MobSnapshot {
    /// Unique identifier assigned to the mob.
    pub id: MobId,
    /// Catalog entry the mob was created from.
    pub archetype: ArchetypeId,
    /// Current playfield position.
    pub position: Vec2,
    /// Remaining health.
    pub health: f32,
    /// Distance travelled per tick.
    pub speed: f32,
    /// Index of the path segment currently being traversed.
    pub path_index: usize,
    /// Whether the mob may be targeted this tick. Mobs spawned during the current tick are inactive.
    pub active: bool,
}

/// Read-only snapshot describing all live mobs.
#[derive(Clone, Debug, Default)]
pub struct MobView {
    snapshots: Vec<MobSnapshot>,
}

impl MobView {
    /// Creates a new mob view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MobSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured mob snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &MobSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a specific mob.
    #[must_use]
    pub fn get(&self, id: MobId) -> Option<&MobSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of live mobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no mob is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<MobSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Unique identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Current playfield position.
    pub position: Vec2,
    /// Point the projectile travels toward.
    pub target: Vec2,
    /// Constant displacement applied every tick.
    pub velocity: Vec2,
    /// Damage delivered on impact.
    pub damage: f32,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in launch order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectile is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a single emplacement used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmplacementSnapshot {
    /// Identifier allocated to the emplacement by the world.
    pub id: EmplacementId,
    /// Kind of emplacement that was constructed.
    pub kind: EmplacementKind,
    /// Cell occupied by the emplacement.
    pub cell: CellCoord,
    /// Centre of the occupied cell.
    pub position: Vec2,
    /// Targeting radius.
    pub range: f32,
    /// Damage per projectile, or gold per payout for income emplacements.
    pub damage: f32,
    /// Minimum time between two shots or payouts.
    pub fire_interval: Duration,
    /// Time of the last shot, payout or construction.
    pub last_fired: Duration,
    /// Upgrade counter, starting at one.
    pub level: u32,
    /// Gold required for the next upgrade.
    pub upgrade_cost: Gold,
}

impl EmplacementSnapshot {
    /// Reports whether strictly more than one interval has elapsed since the last shot.
    #[must_use]
    pub fn ready_at(&self, now: Duration) -> bool {
        now.saturating_sub(self.last_fired) > self.fire_interval
    }
}

/// Read-only snapshot describing all emplacements.
#[derive(Clone, Debug, Default)]
pub struct EmplacementView {
    snapshots: Vec<EmplacementSnapshot>,
}

impl EmplacementView {
    /// Creates a new emplacement view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EmplacementSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured emplacement snapshots in construction order.
    pub fn iter(&self) -> impl Iterator<Item = &EmplacementSnapshot> {
        self.snapshots.iter()
    }

    /// Number of emplacements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no emplacement exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EmplacementSnapshot> {
        self.snapshots
    }
}

/// Target selected for a single emplacement during the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmplacementTarget {
    /// Emplacement that selected the target.
    pub emplacement: EmplacementId,
    /// Mob that was selected.
    pub mob: MobId,
}
