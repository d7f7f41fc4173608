//! Ordered, name-keyed collection of schema resources.
//!
//! Storage is built on persistent `im` structures, so taking a snapshot is
//! cheap and iteration never observes a mutation made after it started.

pub mod filters;

use crate::core::{Result, SchemaError};
use crate::resource::SharedResource;
use std::fmt;

pub use filters::{Accept, GroupFilter, GroupSet, NeedsUpdate, NeedsUpdateFilter, ResourceFilter};

/// Registry of resources of one kind.
///
/// Keys are unique and the last `add`/`set` for a key wins, keeping the
/// key's original position. Iteration follows first-insertion order.
///
/// Mutation needs `&mut self`. Register everything during startup, before
/// the registry is shared.
#[derive(Clone, Default)]
pub struct Collection {
    order: im::Vector<String>,
    entries: im::HashMap<String, SharedResource>,
    /// Every group ever registered. Not pruned on removal.
    groups: Vec<String>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `resource` under its own name and returns the stored entry.
    pub fn add(&mut self, resource: SharedResource) -> SharedResource {
        let name = resource.name().to_string();
        self.set(name, resource)
    }

    /// Adds `resource` under an explicit key, which may differ from its name.
    pub fn set(&mut self, name: impl Into<String>, resource: SharedResource) -> SharedResource {
        let name = name.into();
        self.register_group(resource.group());
        self.put(name.clone(), resource);
        self.entries[&name].clone()
    }

    /// Removes `name`. Absent names are ignored.
    pub fn remove(&mut self, name: &str) {
        self.unset(name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Looks up `name`, failing with [`SchemaError::NotFound`] when absent.
    pub fn get(&self, name: &str) -> Result<SharedResource> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))
    }

    /// Raw keyed insert. Unlike [`Collection::set`] the group set is left alone.
    pub fn put(&mut self, name: impl Into<String>, resource: SharedResource) {
        let name = name.into();
        if self.entries.insert(name.clone(), resource).is_none() {
            self.order.push_back(name);
        }
    }

    /// Raw keyed delete.
    pub fn unset(&mut self, name: &str) {
        if self.entries.remove(name).is_some() {
            if let Some(idx) = self.order.index_of(&name.to_string()) {
                self.order.remove(idx);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.order.iter().cloned().collect()
    }

    /// Groups in first-registration order, including groups whose members
    /// have all been removed since.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Groups with at least one registered member.
    pub fn live_groups(&self) -> Vec<String> {
        self.groups
            .iter()
            .filter(|group| self.entries.values().any(|r| r.group() == group.as_str()))
            .cloned()
            .collect()
    }

    /// Immutable view of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            order: self.order.clone(),
            entries: self.entries.clone(),
        }
    }

    pub fn iter(&self) -> SnapshotIter {
        self.snapshot().into_iter()
    }

    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.snapshot())
    }

    /// Resources of this collection whose group is in `groups`.
    pub fn get_by_group(&self, groups: impl Into<GroupSet>) -> GroupFilter<SnapshotIter> {
        ResourceFilter::new(groups.into(), self.iter())
    }

    /// Resources of `source` whose group is in `groups`.
    pub fn get_by_group_in<S>(
        &self,
        groups: impl Into<GroupSet>,
        source: S,
    ) -> GroupFilter<S::IntoIter>
    where
        S: IntoIterator<Item = SharedResource>,
        S::IntoIter: Clone,
    {
        ResourceFilter::new(groups.into(), source)
    }

    /// Resources of this collection whose stored version lags the declared one.
    pub fn get_tables_needing_updates(&self) -> NeedsUpdateFilter<SnapshotIter> {
        ResourceFilter::new(NeedsUpdate, self.iter())
    }

    /// Resources of `source` whose stored version lags the declared one.
    pub fn get_tables_needing_updates_in<S>(&self, source: S) -> NeedsUpdateFilter<S::IntoIter>
    where
        S: IntoIterator<Item = SharedResource>,
        S::IntoIter: Clone,
    {
        ResourceFilter::new(NeedsUpdate, source)
    }

    fn register_group(&mut self, group: &str) {
        if !self.groups.iter().any(|g| g == group) {
            self.groups.push(group.to_string());
        }
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("names", &self.order)
            .field("groups", &self.groups)
            .finish()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = SharedResource;
    type IntoIter = SnapshotIter;

    fn into_iter(self) -> SnapshotIter {
        self.iter()
    }
}

/// Point-in-time copy of a [`Collection`], sharing structure with it.
#[derive(Clone)]
pub struct Snapshot {
    order: im::Vector<String>,
    entries: im::HashMap<String, SharedResource>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SharedResource> {
        self.entries.get(name)
    }

    fn entry_at(&self, pos: usize) -> Option<(&String, &SharedResource)> {
        let name = self.order.get(pos)?;
        self.entries.get(name).map(|resource| (name, resource))
    }
}

impl IntoIterator for Snapshot {
    type Item = SharedResource;
    type IntoIter = SnapshotIter;

    fn into_iter(self) -> SnapshotIter {
        SnapshotIter {
            snapshot: self,
            pos: 0,
        }
    }
}

/// Forward iterator over a [`Snapshot`]. Cloning restarts nothing: a clone
/// continues from the same position.
#[derive(Clone)]
pub struct SnapshotIter {
    snapshot: Snapshot,
    pos: usize,
}

impl Iterator for SnapshotIter {
    type Item = SharedResource;

    fn next(&mut self) -> Option<SharedResource> {
        let (_, resource) = self.snapshot.entry_at(self.pos)?;
        let resource = resource.clone();
        self.pos += 1;
        Some(resource)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.snapshot.len().saturating_sub(self.pos);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SnapshotIter {}

/// Positional traversal over a snapshot: `current`/`key` read the entry
/// under the cursor, `move_next` advances, `rewind` returns to the start.
pub struct Cursor {
    snapshot: Snapshot,
    pos: usize,
}

impl Cursor {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot, pos: 0 }
    }

    pub fn current(&self) -> Option<&SharedResource> {
        self.snapshot.entry_at(self.pos).map(|(_, resource)| resource)
    }

    pub fn key(&self) -> Option<&str> {
        self.snapshot.entry_at(self.pos).map(|(name, _)| name.as_str())
    }

    pub fn move_next(&mut self) {
        if self.pos < self.snapshot.len() {
            self.pos += 1;
        }
    }

    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    pub fn valid(&self) -> bool {
        self.pos < self.snapshot.len()
    }
}
