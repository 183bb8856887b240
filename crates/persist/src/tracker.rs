use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use voidspace_common::EntityId;

/// A change record produced by every tracker mutation.
///
/// These are the deltas that cross the wire: the server drains them and
/// clients [`WorldChanges::apply`] them to mirror its overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// Entity was depleted and should come back at `respawn_at` (ms).
    Depleted { id: EntityId, respawn_at: u64 },
    /// Entity is available again.
    Respawned { id: EntityId },
}

/// Depletion overlay on top of generated content.
///
/// Keyed by stable entity ids, so it is unaffected by sectors being evicted
/// and regenerated. Presence of an id means depleted; there is no implicit
/// expiry, a record stays until [`WorldChanges::mark_respawned`].
///
/// BTreeMap keeps iteration (and therefore saved files) in a canonical order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldChanges {
    depleted: BTreeMap<EntityId, u64>,
    #[serde(skip)]
    events: Vec<ChangeEvent>,
}

impl WorldChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `id` is depleted until `respawn_at`. Re-marking overwrites
    /// the timestamp.
    pub fn mark_depleted(&mut self, id: EntityId, respawn_at: u64) {
        self.depleted.insert(id.clone(), respawn_at);
        self.events.push(ChangeEvent::Depleted { id, respawn_at });
    }

    /// Clear a depletion record. Returns whether one existed.
    pub fn mark_respawned(&mut self, id: &EntityId) -> bool {
        let existed = self.depleted.remove(id).is_some();
        if existed {
            self.events.push(ChangeEvent::Respawned { id: id.clone() });
        }
        existed
    }

    /// Unknown ids are simply not depleted.
    pub fn is_depleted(&self, id: &EntityId) -> bool {
        self.depleted.contains_key(id)
    }

    pub fn respawn_at(&self, id: &EntityId) -> Option<u64> {
        self.depleted.get(id).copied()
    }

    /// Depleted ids whose respawn time is at or before `now`.
    ///
    /// Read-only: the caller decides whether to actually respawn them.
    pub fn due_for_respawn(&self, now: u64) -> Vec<EntityId> {
        self.depleted
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Number of depleted entities.
    pub fn len(&self) -> usize {
        self.depleted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depleted.is_empty()
    }

    /// Depleted ids with their respawn times, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, u64)> {
        self.depleted.iter().map(|(id, at)| (id, *at))
    }

    /// Read-only access to pending change events.
    pub fn events(&self) -> &[ChangeEvent] {
        &self.events
    }

    /// Drain and return pending change events.
    pub fn drain_events(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Apply a change received from elsewhere without logging it again.
    pub fn apply(&mut self, event: &ChangeEvent) {
        match event {
            ChangeEvent::Depleted { id, respawn_at } => {
                self.depleted.insert(id.clone(), *respawn_at);
            }
            ChangeEvent::Respawned { id } => {
                self.depleted.remove(id);
            }
        }
    }

    /// Rebuild an overlay from a sequence of events.
    pub fn replay(events: &[ChangeEvent]) -> Self {
        let mut changes = Self::new();
        for event in events {
            changes.apply(event);
        }
        changes
    }
}
