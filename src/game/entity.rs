//! Entity Arena
//!
//! Projectiles and lasers live in one generational arena. Each kind keeps
//! its own ordered handle list so the world can run every projectile before
//! any laser, oldest first. Destroyed entities stay addressable until the
//! end-of-tick sweep.

use serde::{Deserialize, Serialize};

use crate::game::laser::Laser;
use crate::game::projectile::Projectile;

/// Stable reference to an arena slot.
///
/// A handle goes stale once its entity is swept; the generation guards
/// against a recycled slot answering for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityHandle {
    index: u32,
    generation: u32,
}

impl EntityHandle {
    /// Slot number.
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation at insertion time.
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Entity kinds, in world update order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Ballistic projectile
    Projectile,
    /// Bouncing laser beam
    Laser,
}

/// A world entity.
#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    /// Ballistic projectile
    Projectile(Projectile),
    /// Bouncing laser beam
    Laser(Laser),
}

impl Entity {
    /// Kind tag.
    #[inline]
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Projectile(_) => EntityKind::Projectile,
            Entity::Laser(_) => EntityKind::Laser,
        }
    }

    /// The projectile, if this is one.
    pub fn as_projectile(&self) -> Option<&Projectile> {
        match self {
            Entity::Projectile(p) => Some(p),
            Entity::Laser(_) => None,
        }
    }

    /// The laser, if this is one.
    pub fn as_laser(&self) -> Option<&Laser> {
        match self {
            Entity::Laser(l) => Some(l),
            Entity::Projectile(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Clone, Debug, PartialEq)]
struct Entry {
    entity: Entity,
    destroyed: bool,
}

/// Generational entity storage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    projectiles: Vec<EntityHandle>,
    lasers: Vec<EntityHandle>,
}

impl EntityArena {
    /// Empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entity at the back of its kind's order.
    pub fn insert(&mut self, entity: Entity) -> EntityHandle {
        let kind = entity.kind();
        let entry = Some(Entry { entity, destroyed: false });
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = entry;
                EntityHandle { index, generation: slot.generation }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot { generation: 0, entry });
                EntityHandle { index, generation: 0 }
            }
        };
        self.order_mut(kind).push(handle);
        handle
    }

    fn entry(&self, handle: EntityHandle) -> Option<&Entry> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    fn entry_mut(&mut self, handle: EntityHandle) -> Option<&mut Entry> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.as_mut()
    }

    /// Entity behind `handle`, including ones marked for destruction.
    pub fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        self.entry(handle).map(|e| &e.entity)
    }

    /// Mutable entity behind `handle`.
    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        self.entry_mut(handle).map(|e| &mut e.entity)
    }

    /// Whether `handle` is live and not marked for destruction.
    pub fn is_alive(&self, handle: EntityHandle) -> bool {
        self.entry(handle).is_some_and(|e| !e.destroyed)
    }

    /// Flag an entity for removal at the next sweep.
    pub fn mark_destroyed(&mut self, handle: EntityHandle) -> bool {
        match self.entry_mut(handle) {
            Some(entry) => {
                entry.destroyed = true;
                true
            }
            None => false,
        }
    }

    /// Remove every flagged entity. Returns how many went.
    pub fn sweep(&mut self) -> usize {
        let mut removed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.entry.as_ref().is_some_and(|e| e.destroyed) {
                slot.entry = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
                removed += 1;
            }
        }
        if removed > 0 {
            let slots = &self.slots;
            let live = |h: &EntityHandle| slots[h.index as usize].generation == h.generation;
            self.projectiles.retain(live);
            self.lasers.retain(live);
        }
        removed
    }

    /// Handles of one kind, oldest first.
    pub fn handles(&self, kind: EntityKind) -> &[EntityHandle] {
        match kind {
            EntityKind::Projectile => &self.projectiles,
            EntityKind::Laser => &self.lasers,
        }
    }

    fn order_mut(&mut self, kind: EntityKind) -> &mut Vec<EntityHandle> {
        match kind {
            EntityKind::Projectile => &mut self.projectiles,
            EntityKind::Laser => &mut self.lasers,
        }
    }

    /// Number of stored entities of `kind`, flagged ones included.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.handles(kind).len()
    }

    /// Total number of stored entities.
    pub fn len(&self) -> usize {
        self.projectiles.len() + self.lasers.len()
    }

    /// Whether the arena holds nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live entities in update order: projectiles then lasers.
    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &Entity)> {
        self.projectiles
            .iter()
            .chain(self.lasers.iter())
            .filter_map(move |&h| self.entry(h).filter(|e| !e.destroyed).map(|e| (h, &e.entity)))
    }
}

// =============================================================================
// TESTS
// =============================================================================
