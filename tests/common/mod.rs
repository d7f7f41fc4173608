#![allow(dead_code)]

use rustschema::{Resource, ResourceKind, Result, SchemaError, SchemaVersion};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared record of every apply/drop, in call order.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// Resource that records calls and keeps its stored version in memory.
pub struct Recorded {
    name: String,
    group: String,
    kind: ResourceKind,
    declared: SchemaVersion,
    stored: Mutex<Option<SchemaVersion>>,
    applies: AtomicUsize,
    drops: AtomicUsize,
    fail_apply: AtomicBool,
    fail_drop: AtomicBool,
    journal: Journal,
}

impl Recorded {
    pub fn table(name: &str, group: &str, declared: &str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self::build(name, group, ResourceKind::Table, declared, journal))
    }

    pub fn field(name: &str, group: &str, declared: &str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self::build(name, group, ResourceKind::Field, declared, journal))
    }

    fn build(
        name: &str,
        group: &str,
        kind: ResourceKind,
        declared: &str,
        journal: &Journal,
    ) -> Self {
        Self {
            name: name.to_string(),
            group: group.to_string(),
            kind,
            declared: declared.parse().expect("valid test version"),
            stored: Mutex::new(None),
            applies: AtomicUsize::new(0),
            drops: AtomicUsize::new(0),
            fail_apply: AtomicBool::new(false),
            fail_drop: AtomicBool::new(false),
            journal: journal.clone(),
        }
    }

    pub fn with_stored(self: Arc<Self>, version: &str) -> Arc<Self> {
        *self.stored.lock().unwrap() = Some(version.parse().expect("valid test version"));
        self
    }

    pub fn fail_apply(&self, fail: bool) {
        self.fail_apply.store(fail, Ordering::SeqCst);
    }

    pub fn fail_drop(&self, fail: bool) {
        self.fail_drop.store(fail, Ordering::SeqCst);
    }

    pub fn applies(&self) -> usize {
        self.applies.load(Ordering::SeqCst)
    }

    pub fn drops(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }
}

impl Resource for Recorded {
    fn name(&self) -> &str {
        &self.name
    }

    fn group(&self) -> &str {
        &self.group
    }

    fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn declared_version(&self) -> SchemaVersion {
        self.declared
    }

    fn stored_version(&self) -> Option<SchemaVersion> {
        *self.stored.lock().unwrap()
    }

    fn create_or_upgrade(&self) -> Result<()> {
        self.applies.fetch_add(1, Ordering::SeqCst);
        self.journal.lock()?.push(format!("apply:{}", self.name));
        if self.fail_apply.load(Ordering::SeqCst) {
            return Err(SchemaError::apply(&self.name, "simulated failure"));
        }
        *self.stored.lock()? = Some(self.declared);
        Ok(())
    }

    fn drop_schema(&self) -> Result<()> {
        self.drops.fetch_add(1, Ordering::SeqCst);
        self.journal.lock()?.push(format!("drop:{}", self.name));
        if self.fail_drop.load(Ordering::SeqCst) {
            return Err(SchemaError::drop_failed(&self.name, "simulated failure"));
        }
        *self.stored.lock()? = None;
        Ok(())
    }
}

pub fn names<I>(resources: I) -> Vec<String>
where
    I: IntoIterator<Item = rustschema::SharedResource>,
{
    resources.into_iter().map(|r| r.name().to_string()).collect()
}
