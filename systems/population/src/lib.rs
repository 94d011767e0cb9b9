#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Batched update loop for every live hostile in the session.
//!
//! Entities are registered by handle; the dispatcher tracks membership only
//! and never creates or destroys entities. Removals requested while a pass is
//! iterating are deferred to the drain points at the start and end of every
//! pass, so the live list is never mutated mid-iteration.

use std::{collections::HashMap, time::Duration};

use horde_core::{EntityHandle, EntityHost, TickOutcome};

/// Lifecycle of a registered entity. Removed entities are forgotten entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MembershipState {
    /// Receives update calls on every pass.
    Active,
    /// Excised at the next drain point.
    PendingRemoval,
}

/// Membership record of a registered entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegisteredEntity {
    handle: EntityHandle,
    state: MembershipState,
}

impl RegisteredEntity {
    const fn new(handle: EntityHandle) -> Self {
        Self {
            handle,
            state: MembershipState::Active,
        }
    }

    /// Handle of the registered entity.
    #[must_use]
    pub const fn handle(&self) -> EntityHandle {
        self.handle
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> MembershipState {
        self.state
    }
}

/// Summary of a single dispatch pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Number of entities that received an update call.
    pub updated: usize,
    /// Number of entities excised by the two drain points.
    pub removed: usize,
}

/// Authoritative per-frame and per-physics-step update loop.
#[derive(Debug, Default)]
pub struct PopulationDispatcher {
    live: Vec<EntityHandle>,
    membership: HashMap<EntityHandle, RegisteredEntity>,
    pending: Vec<EntityHandle>,
}

impl PopulationDispatcher {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entity` to the live set.
    ///
    /// Registering a member again is a no-op, except that an entity pending
    /// removal is revived and keeps receiving updates.
    pub fn register(&mut self, entity: EntityHandle) {
        match self.membership.get_mut(&entity) {
            Some(record) if record.state == MembershipState::Active => {}
            Some(record) => {
                record.state = MembershipState::Active;
                self.pending.retain(|pending| *pending != entity);
                tracing::trace!(?entity, "pending removal cancelled");
            }
            None => {
                let _ = self.membership.insert(entity, RegisteredEntity::new(entity));
                self.live.push(entity);
            }
        }
    }

    /// Marks `entity` for removal at the next drain point.
    ///
    /// Unknown entities and entities already pending removal are ignored.
    pub fn unregister(&mut self, entity: EntityHandle) {
        if let Some(record) = self.membership.get_mut(&entity) {
            if record.state == MembershipState::Active {
                record.state = MembershipState::PendingRemoval;
                self.pending.push(entity);
            }
        }
    }

    /// Runs the variable-rate update for every live entity.
    pub fn tick<H>(&mut self, host: &mut H, dt: Duration) -> DispatchReport
    where
        H: EntityHost + ?Sized,
    {
        self.dispatch(host, |host, entity| host.update(entity, dt))
    }

    /// Runs the fixed-rate physics update for every live entity.
    pub fn fixed_tick<H>(&mut self, host: &mut H, dt: Duration) -> DispatchReport
    where
        H: EntityHost + ?Sized,
    {
        self.dispatch(host, |host, entity| host.fixed_update(entity, dt))
    }

    /// Number of registered entities, including those pending removal.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Reports whether no entity is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Reports whether `entity` is registered.
    #[must_use]
    pub fn contains(&self, entity: EntityHandle) -> bool {
        self.membership.contains_key(&entity)
    }

    /// Membership record of `entity`, if registered.
    #[must_use]
    pub fn get(&self, entity: EntityHandle) -> Option<&RegisteredEntity> {
        self.membership.get(&entity)
    }

    /// Membership state of `entity`, if registered.
    #[must_use]
    pub fn state(&self, entity: EntityHandle) -> Option<MembershipState> {
        self.get(entity).map(RegisteredEntity::state)
    }

    /// Registered entities in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredEntity> + '_ {
        self.live
            .iter()
            .filter_map(|entity| self.membership.get(entity))
    }

    /// Forgets every registration without touching the entities themselves.
    pub fn clear(&mut self) {
        if !self.live.is_empty() {
            tracing::debug!(registered = self.live.len(), "population dispatcher cleared");
        }
        self.live.clear();
        self.membership.clear();
        self.pending.clear();
    }

    fn dispatch<H, F>(&mut self, host: &mut H, mut update: F) -> DispatchReport
    where
        H: EntityHost + ?Sized,
        F: FnMut(&mut H, EntityHandle) -> TickOutcome,
    {
        let mut report = DispatchReport {
            removed: self.drain(),
            ..DispatchReport::default()
        };

        for index in 0..self.live.len() {
            let entity = self.live[index];
            if self.state(entity) != Some(MembershipState::Active) {
                continue;
            }
            if !host.is_alive(entity) {
                self.unregister(entity);
                continue;
            }

            report.updated += 1;
            if update(&mut *host, entity) == TickOutcome::Finished {
                self.unregister(entity);
            }
        }

        report.removed += self.drain();
        report
    }

    fn drain(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }

        let mut removed = 0;
        for entity in self.pending.drain(..) {
            if self.membership.remove(&entity).is_some() {
                removed += 1;
            }
        }

        let membership = &self.membership;
        self.live.retain(|entity| membership.contains_key(entity));
        tracing::trace!(removed, "pending removals drained");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::{MembershipState, PopulationDispatcher};
    use horde_core::EntityHandle;

    #[test]
    fn unregister_only_marks_until_drained() {
        let mut dispatcher = PopulationDispatcher::new();
        let entity = EntityHandle::new(1, 0);
        dispatcher.register(entity);
        dispatcher.unregister(entity);

        assert_eq!(dispatcher.len(), 1);
        assert_eq!(
            dispatcher.state(entity),
            Some(MembershipState::PendingRemoval)
        );
        assert_eq!(dispatcher.drain(), 1);
        assert!(dispatcher.is_empty());
        assert!(!dispatcher.contains(entity));
    }

    #[test]
    fn double_unregister_queues_once() {
        let mut dispatcher = PopulationDispatcher::new();
        let entity = EntityHandle::new(4, 2);
        dispatcher.register(entity);
        dispatcher.unregister(entity);
        dispatcher.unregister(entity);
        dispatcher.unregister(EntityHandle::new(9, 9));

        assert_eq!(dispatcher.pending.len(), 1);
    }

    #[test]
    fn reregistering_revives_pending_entity() {
        let mut dispatcher = PopulationDispatcher::new();
        let entity = EntityHandle::new(2, 1);
        dispatcher.register(entity);
        dispatcher.unregister(entity);
        dispatcher.register(entity);

        assert_eq!(dispatcher.drain(), 0);
        assert_eq!(dispatcher.state(entity), Some(MembershipState::Active));
    }
}
