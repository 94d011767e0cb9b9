//! Headless entity pool standing in for the game scene.
//!
//! Slots are recycled with a generation counter so stale handles held by the
//! dispatcher are detected through [`EntityHost::is_alive`].

use std::time::Duration;

use glam::Vec2;
use horde_core::{
    EntityFactory, EntityHandle, EntityHost, EntityKind, EntityTemplate, Event, ScalingModifiers,
    TickOutcome,
};

use crate::config::ArenaConfig;

#[derive(Clone, Copy, Debug)]
struct Body {
    template: EntityTemplate,
    position: Vec2,
    heading: Vec2,
    velocity: Vec2,
    modifiers: ScalingModifiers,
    age: f32,
    lifetime: f32,
}

#[derive(Clone, Copy, Debug, Default)]
struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// Why an entity left the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Departure {
    Expired,
    ReachedPlayer,
    Collected,
}

/// Running totals reported at the end of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ArenaStats {
    pub(crate) created: u32,
    pub(crate) declined: u32,
    pub(crate) expired: u32,
    pub(crate) reached_player: u32,
    pub(crate) collected: u32,
}

#[derive(Debug)]
pub(crate) struct Arena {
    tuning: ArenaConfig,
    slots: Vec<Slot>,
    free: Vec<u32>,
    player: Vec2,
    departures: Vec<EntityHandle>,
    stats: ArenaStats,
}

impl Arena {
    pub(crate) fn new(tuning: ArenaConfig) -> Self {
        Self {
            tuning,
            slots: Vec::new(),
            free: Vec::new(),
            player: Vec2::ZERO,
            departures: Vec::new(),
            stats: ArenaStats::default(),
        }
    }

    pub(crate) fn stats(&self) -> ArenaStats {
        self.stats
    }

    pub(crate) fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.body.is_some()).count()
    }

    /// Moves the player and collects every crate within reach.
    ///
    /// Collected crates are reported through [`Arena::drain_departures`].
    pub(crate) fn move_player(&mut self, player: Vec2) {
        self.player = player;
        let reach = self.tuning.pickup_radius;
        let collected: Vec<EntityHandle> = self
            .bodies()
            .filter(|(_, body)| {
                body.template.kind() == EntityKind::SupplyCrate
                    && body.position.distance(player) <= reach
            })
            .map(|(entity, _)| entity)
            .collect();
        for entity in collected {
            self.despawn(entity, Departure::Collected);
        }
    }

    /// Moves the despawn notifications accumulated since the last call into `out`.
    pub(crate) fn drain_departures(&mut self, out: &mut Vec<Event>) {
        out.extend(
            self.departures
                .drain(..)
                .map(|entity| Event::EntityDespawned { entity }),
        );
    }

    fn bodies(&self) -> impl Iterator<Item = (EntityHandle, &Body)> + '_ {
        self.slots.iter().zip(0u32..).filter_map(|(slot, index)| {
            slot.body
                .as_ref()
                .map(|body| (EntityHandle::new(index, slot.generation), body))
        })
    }

    fn body_mut(&mut self, entity: EntityHandle) -> Option<&mut Body> {
        let slot = self.slots.get_mut(entity.index() as usize)?;
        if slot.generation != entity.generation() {
            return None;
        }
        slot.body.as_mut()
    }

    fn despawn(&mut self, entity: EntityHandle, departure: Departure) {
        let Some(slot) = self.slots.get_mut(entity.index() as usize) else {
            return;
        };
        if slot.generation != entity.generation() || slot.body.take().is_none() {
            return;
        }

        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(entity.index());
        self.departures.push(entity);
        match departure {
            Departure::Expired => self.stats.expired += 1,
            Departure::ReachedPlayer => self.stats.reached_player += 1,
            Departure::Collected => self.stats.collected += 1,
        }
    }

    fn allocate(&mut self) -> Option<u32> {
        if let Some(index) = self.free.pop() {
            return Some(index);
        }
        let index = u32::try_from(self.slots.len()).ok()?;
        if index >= self.tuning.capacity {
            return None;
        }
        self.slots.push(Slot::default());
        Some(index)
    }
}

impl EntityFactory for Arena {
    fn create(
        &mut self,
        template: EntityTemplate,
        position: Vec2,
        orientation: f32,
    ) -> Option<EntityHandle> {
        let Some(index) = self.allocate() else {
            self.stats.declined += 1;
            return None;
        };

        let slot = &mut self.slots[index as usize];
        slot.body = Some(Body {
            template,
            position,
            heading: Vec2::from_angle(orientation),
            velocity: Vec2::ZERO,
            modifiers: ScalingModifiers::IDENTITY,
            age: 0.0,
            lifetime: 0.0,
        });
        self.stats.created += 1;
        Some(EntityHandle::new(index, slot.generation))
    }

    fn initialize_scaling(&mut self, entity: EntityHandle, modifiers: ScalingModifiers) {
        let tuning = self.tuning;
        if let Some(body) = self.body_mut(entity) {
            body.modifiers = modifiers;
            body.lifetime = match body.template.kind() {
                EntityKind::Hostile => tuning.hostile_lifetime * modifiers.health,
                EntityKind::SupplyCrate => tuning.crate_lifetime,
            };
        }
    }
}

impl EntityHost for Arena {
    fn is_alive(&self, entity: EntityHandle) -> bool {
        self.slots
            .get(entity.index() as usize)
            .map_or(false, |slot| {
                slot.generation == entity.generation() && slot.body.is_some()
            })
    }

    fn update(&mut self, entity: EntityHandle, dt: Duration) -> TickOutcome {
        let player = self.player;
        let speed = self.tuning.hostile_speed;
        let Some(body) = self.body_mut(entity) else {
            return TickOutcome::Finished;
        };

        body.age += dt.as_secs_f32();
        if body.age >= body.lifetime {
            self.despawn(entity, Departure::Expired);
            return TickOutcome::Finished;
        }

        if body.template.kind() == EntityKind::Hostile {
            if let Some(toward) = (player - body.position).try_normalize() {
                body.heading = toward;
            }
            body.velocity = body.heading * speed * body.modifiers.move_speed;
        }
        TickOutcome::Continue
    }

    fn fixed_update(&mut self, entity: EntityHandle, dt: Duration) -> TickOutcome {
        let player = self.player;
        let contact = self.tuning.contact_radius;
        let Some(body) = self.body_mut(entity) else {
            return TickOutcome::Finished;
        };

        body.position += body.velocity * dt.as_secs_f32();
        if body.template.kind() == EntityKind::Hostile && body.position.distance(player) <= contact
        {
            self.despawn(entity, Departure::ReachedPlayer);
            return TickOutcome::Finished;
        }
        TickOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horde_core::TemplateId;

    const GRUNT: EntityTemplate = EntityTemplate::hostile(TemplateId::new(1));
    const SUPPLY: EntityTemplate = EntityTemplate::supply_crate(TemplateId::new(2));

    fn arena() -> Arena {
        Arena::new(ArenaConfig {
            capacity: 2,
            ..ArenaConfig::default()
        })
    }

    #[test]
    fn recycled_slots_invalidate_old_handles() {
        let mut arena = arena();
        let first = arena.create(GRUNT, Vec2::ZERO, 0.0).expect("capacity");
        arena.despawn(first, Departure::Expired);
        let second = arena.create(GRUNT, Vec2::ZERO, 0.0).expect("capacity");

        assert_eq!(first.index(), second.index());
        assert!(!arena.is_alive(first));
        assert!(arena.is_alive(second));
    }

    #[test]
    fn full_arena_declines_creation() {
        let mut arena = arena();
        assert!(arena.create(GRUNT, Vec2::ZERO, 0.0).is_some());
        assert!(arena.create(GRUNT, Vec2::ZERO, 0.0).is_some());
        assert!(arena.create(GRUNT, Vec2::ZERO, 0.0).is_none());
        assert_eq!(arena.stats().declined, 1);
    }

    #[test]
    fn hostile_lifetime_scales_with_health() {
        let mut arena = arena();
        let entity = arena
            .create(GRUNT, Vec2::new(100.0, 0.0), 0.0)
            .expect("capacity");
        arena.initialize_scaling(
            entity,
            ScalingModifiers {
                health: 2.0,
                ..ScalingModifiers::IDENTITY
            },
        );

        let lifetime = ArenaConfig::default().hostile_lifetime * 2.0;
        let step = Duration::from_secs_f32(lifetime / 4.0);
        for _ in 0..3 {
            assert_eq!(arena.update(entity, step), TickOutcome::Continue);
        }
        assert_eq!(arena.update(entity, step * 2), TickOutcome::Finished);
        assert!(!arena.is_alive(entity));
        assert_eq!(arena.stats().expired, 1);
    }

    #[test]
    fn hostiles_chase_the_player_until_contact() {
        let mut arena = arena();
        let entity = arena
            .create(GRUNT, Vec2::new(1.0, 0.0), 0.0)
            .expect("capacity");
        arena.initialize_scaling(entity, ScalingModifiers::IDENTITY);
        arena.move_player(Vec2::ZERO);

        assert_eq!(
            arena.update(entity, Duration::from_millis(16)),
            TickOutcome::Continue
        );
        assert_eq!(
            arena.fixed_update(entity, Duration::from_millis(200)),
            TickOutcome::Finished
        );
        assert_eq!(arena.stats().reached_player, 1);

        let mut events = Vec::new();
        arena.drain_departures(&mut events);
        assert_eq!(events, vec![Event::EntityDespawned { entity }]);
    }

    #[test]
    fn walking_over_a_crate_collects_it() {
        let mut arena = arena();
        let entity = arena
            .create(SUPPLY, Vec2::new(5.0, 5.0), 0.0)
            .expect("capacity");
        arena.initialize_scaling(entity, ScalingModifiers::IDENTITY);

        arena.move_player(Vec2::new(5.5, 5.0));
        assert!(!arena.is_alive(entity));
        assert_eq!(arena.stats().collected, 1);
        assert_eq!(arena.live_count(), 0);
    }
}
