//! The authoritative set of live objects
//!
//! Liveness is decided here and nowhere else. Iteration during a tick goes
//! through a [`Snapshot`]: a frozen, id-ordered list taken up front, so
//! objects spawned or deleted mid-pass never disturb the pass itself.

use std::collections::BTreeMap;

use super::entity::{ObjectId, SimObject};

/// Point-in-time list of live ids, ascending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot(Vec<ObjectId>);

impl Snapshot {
    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    pub fn as_slice(&self) -> &[ObjectId] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = ObjectId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, ObjectId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    objects: BTreeMap<ObjectId, SimObject>,
    next_id: u32,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Id the next `add` will hand out
    pub fn peek_next_id(&self) -> ObjectId {
        ObjectId(self.next_id)
    }

    /// Insert with a fresh id; returns it
    pub fn add(&mut self, mut obj: SimObject) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        obj.id = id;
        self.objects.insert(id, obj);
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SimObject> {
        self.objects.remove(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SimObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SimObject> {
        self.objects.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimObject> {
        self.objects.values()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.objects.keys().copied().collect())
    }

    /// Snapshot filtered by a predicate over the objects as they are now
    pub fn snapshot_where(&self, mut keep: impl FnMut(&SimObject) -> bool) -> Snapshot {
        Snapshot(
            self.objects
                .values()
                .filter(|o| keep(o))
                .map(|o| o.id)
                .collect(),
        )
    }
}
