//! Lazy, restartable views over a resource sequence.

use crate::resource::{Resource, SharedResource};

/// Filtering decision for a single resource.
pub trait Accept {
    fn accept(&self, candidate: &dyn Resource) -> bool;
}

/// Accepts resources whose stored version is missing or behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeedsUpdate;

impl Accept for NeedsUpdate {
    fn accept(&self, candidate: &dyn Resource) -> bool {
        candidate.needs_update()
    }
}

/// Accepts resources tagged with one of a set of groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSet {
    groups: Vec<String>,
}

impl GroupSet {
    pub fn new<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for group in groups {
            let group = group.into();
            if !set.groups.contains(&group) {
                set.groups.push(group);
            }
        }
        set
    }

    pub fn contains(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.groups
    }
}

impl Accept for GroupSet {
    fn accept(&self, candidate: &dyn Resource) -> bool {
        self.contains(candidate.group())
    }
}

impl From<&str> for GroupSet {
    fn from(group: &str) -> Self {
        Self::new([group])
    }
}

impl From<String> for GroupSet {
    fn from(group: String) -> Self {
        Self::new([group])
    }
}

impl From<&[&str]> for GroupSet {
    fn from(groups: &[&str]) -> Self {
        Self::new(groups.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for GroupSet {
    fn from(groups: [&str; N]) -> Self {
        Self::new(groups)
    }
}

impl From<Vec<&str>> for GroupSet {
    fn from(groups: Vec<&str>) -> Self {
        Self::new(groups)
    }
}

impl From<Vec<String>> for GroupSet {
    fn from(groups: Vec<String>) -> Self {
        Self::new(groups)
    }
}

/// Yields the resources of a source iterator accepted by `predicate`.
///
/// The predicate runs as items are pulled. `rewind` restarts from a clone
/// of the source taken at construction.
#[derive(Clone)]
pub struct ResourceFilter<I, P> {
    source: I,
    cursor: I,
    predicate: P,
}

pub type NeedsUpdateFilter<I> = ResourceFilter<I, NeedsUpdate>;
pub type GroupFilter<I> = ResourceFilter<I, GroupSet>;

impl<I, P> ResourceFilter<I, P>
where
    I: Iterator<Item = SharedResource> + Clone,
    P: Accept,
{
    pub fn new<S>(predicate: P, source: S) -> Self
    where
        S: IntoIterator<Item = SharedResource, IntoIter = I>,
    {
        let source = source.into_iter();
        Self {
            cursor: source.clone(),
            source,
            predicate,
        }
    }

    pub fn accept(&self, candidate: &dyn Resource) -> bool {
        self.predicate.accept(candidate)
    }

    pub fn predicate(&self) -> &P {
        &self.predicate
    }

    pub fn rewind(&mut self) {
        self.cursor = self.source.clone();
    }
}

impl<I, P> Iterator for ResourceFilter<I, P>
where
    I: Iterator<Item = SharedResource> + Clone,
    P: Accept,
{
    type Item = SharedResource;

    fn next(&mut self) -> Option<SharedResource> {
        let predicate = &self.predicate;
        self.cursor.by_ref().find(|r| predicate.accept(r.as_ref()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.cursor.size_hint().1)
    }
}

/// Filters any resource sequence down to pending resources.
pub fn needing_updates<S>(source: S) -> NeedsUpdateFilter<S::IntoIter>
where
    S: IntoIterator<Item = SharedResource>,
    S::IntoIter: Clone,
{
    ResourceFilter::new(NeedsUpdate, source)
}

/// Filters any resource sequence down to members of `groups`.
pub fn by_group<S>(groups: impl Into<GroupSet>, source: S) -> GroupFilter<S::IntoIter>
where
    S: IntoIterator<Item = SharedResource>,
    S::IntoIter: Clone,
{
    ResourceFilter::new(groups.into(), source)
}
