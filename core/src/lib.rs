#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the horde spawning systems.
//!
//! This crate defines the message surface that connects the wave-progression
//! source, the pure spawning systems, and the session that owns the live
//! entities. The session broadcasts [`Event`] values (most importantly
//! [`Event::WaveStarted`]), systems consume them together with immutable
//! collaborator views such as [`CameraView`], and respond exclusively with
//! [`Command`] batches. Entity lifetime stays with the collaborators behind
//! [`EntityFactory`] and [`EntityHost`]; systems only ever hold
//! [`EntityHandle`] values.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod camera;
mod curve;
mod scaling;

pub use camera::{CameraView, OrthographicCamera};
pub use curve::{ConstantCurve, Curve, CurvePoint, LinearCurve, WaveCurve};
pub use scaling::{ScalingCurveSet, ScalingModifiers, MIN_MULTIPLIER};

/// Discrete difficulty step of a survival session.
///
/// Wave numbers are monotonically non-decreasing across a session. Zero is
/// representable and means "no wave has started yet".
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WaveNumber(u32);

impl WaveNumber {
    /// First wave of every session.
    pub const FIRST: Self = Self(1);

    /// Creates a new wave number with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the wave.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the wave is a real wave rather than the pre-session zero.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Returns the wave that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Value used when sampling curves, with the wave clamped to at least one.
    #[must_use]
    pub fn curve_input(&self) -> f64 {
        f64::from(self.0.max(1))
    }
}

/// Identifier of an immutable spawnable template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(u32);

impl TemplateId {
    /// Creates a new template identifier with the provided numeric value.
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

/// Category of entity a template produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Enemy unit that hunts the player.
    #[default]
    Hostile,
    /// Pickup crate dropped into the arena.
    SupplyCrate,
}

/// Opaque handle to a creatable entity kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityTemplate {
    id: TemplateId,
    kind: EntityKind,
}

impl EntityTemplate {
    /// Creates a template handle for a hostile unit.
    #[must_use]
    pub const fn hostile(id: TemplateId) -> Self {
        Self {
            id,
            kind: EntityKind::Hostile,
        }
    }

    /// Creates a template handle for a supply crate.
    #[must_use]
    pub const fn supply_crate(id: TemplateId) -> Self {
        Self {
            id,
            kind: EntityKind::SupplyCrate,
        }
    }

    /// Creates a template handle with an explicit kind.
    #[must_use]
    pub const fn new(id: TemplateId, kind: EntityKind) -> Self {
        Self { id, kind }
    }

    /// Identifier of the template.
    #[must_use]
    pub const fn id(&self) -> TemplateId {
        self.id
    }

    /// Category of entity produced by the template.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }
}

/// Generational handle to a live entity owned by the session.
///
/// The index may be recycled by the owner once the entity is gone; the
/// generation distinguishes the successive occupants of the same slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle {
    index: u32,
    generation: u32,
}

impl EntityHandle {
    /// Creates a handle from a slot index and generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index of the entity within its owner.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot occupant.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Identifier shared by every member of one pack spawn within a plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackId(u32);

impl PackId {
    /// Creates a new pack identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the pack identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Fully resolved request to create one entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnInstruction {
    /// Template the entity is created from.
    pub template: EntityTemplate,
    /// World position the entity appears at.
    pub position: Vec2,
    /// Heading in radians; faces the reference point the wave was planned around.
    pub orientation: f32,
    /// Attribute multipliers frozen at spawn time.
    pub modifiers: ScalingModifiers,
    /// Pack the entity belongs to, if it was placed as part of a pack.
    pub pack: Option<PackId>,
}

/// Events broadcast by the session.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the frame.
        dt: Duration,
    },
    /// Announces that a new wave has begun.
    WaveStarted {
        /// Wave that just began.
        wave: WaveNumber,
    },
    /// Confirms that the entity-creation collaborator produced an entity.
    EntitySpawned {
        /// Handle assigned to the new entity.
        entity: EntityHandle,
        /// Template the entity was created from.
        template: EntityTemplate,
        /// Position the entity appeared at.
        position: Vec2,
    },
    /// Confirms that an entity left the population.
    EntityDespawned {
        /// Handle of the entity that is gone.
        entity: EntityHandle,
    },
}

/// Commands emitted by systems for the session to execute.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests creation of a single entity.
    SpawnEntity(SpawnInstruction),
}

/// Result of one update call on a registered entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TickOutcome {
    /// The entity keeps participating in future passes.
    #[default]
    Continue,
    /// The entity died or despawned during the update and must be dropped.
    Finished,
}

/// Object-pool style collaborator that turns instructions into live entities.
pub trait EntityFactory {
    /// Creates an entity from the template at the provided position and heading.
    ///
    /// Returning `None` means nothing was created; callers treat this as a
    /// skipped spawn rather than an error.
    fn create(
        &mut self,
        template: EntityTemplate,
        position: Vec2,
        orientation: f32,
    ) -> Option<EntityHandle>;

    /// Hands the freshly created entity its spawn-time attribute multipliers.
    fn initialize_scaling(&mut self, entity: EntityHandle, modifiers: ScalingModifiers);
}

/// Collaborator that owns live entities and runs their per-tick behaviour.
pub trait EntityHost {
    /// Reports whether the entity still exists and is enabled.
    fn is_alive(&self, entity: EntityHandle) -> bool;

    /// Runs the variable-rate update for the entity.
    fn update(&mut self, entity: EntityHandle, dt: Duration) -> TickOutcome;

    /// Runs the fixed-rate physics update for the entity.
    fn fixed_update(&mut self, entity: EntityHandle, dt: Duration) -> TickOutcome;
}
