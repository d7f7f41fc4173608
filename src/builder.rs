//! Migration driver: applies pending resources and drops registered ones.
//!
//! Passes are fail-fast. The first resource error stops the pass and is
//! returned as-is. Resources applied earlier in the pass stay applied, and
//! the rest stay pending for the next call. Nothing is rolled back.

use crate::core::Result;
use crate::registry::{Collection, GroupSet};
use crate::resource::{Resource, SharedResource};
use tracing::{Level, event, info_span};

/// Outcome of a successful [`Builder::up`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Names of the resources applied, in application order.
    pub applied: Vec<String>,
    /// Resources looked at and found up to date.
    pub skipped: usize,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Runs migration passes over a table registry and a field registry.
///
/// Tables go first since fields live on tables.
pub struct Builder<'a> {
    tables: &'a Collection,
    fields: &'a Collection,
    force: bool,
}

impl<'a> Builder<'a> {
    pub fn new(tables: &'a Collection, fields: &'a Collection) -> Self {
        Self {
            tables,
            fields,
            force: false,
        }
    }

    /// Reapply every resource instead of only pending ones.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Names of pending resources, tables first.
    pub fn pending(&self) -> Vec<String> {
        self.tables
            .get_tables_needing_updates()
            .chain(self.fields.get_tables_needing_updates())
            .map(|r| r.name().to_string())
            .collect()
    }

    /// Applies every pending resource once.
    ///
    /// Running `up` again right after a successful pass applies nothing,
    /// given resources record their version on success.
    pub fn up(&self) -> Result<MigrationReport> {
        let span = info_span!("schema.up", force = self.force);
        let _enter = span.enter();

        let mut report = MigrationReport::default();
        for registry in [self.tables, self.fields] {
            let candidates: Box<dyn Iterator<Item = SharedResource>> = if self.force {
                Box::new(registry.iter())
            } else {
                Box::new(registry.get_tables_needing_updates())
            };
            self.apply_all(registry.len(), candidates, &mut report)?;
        }

        event!(
            Level::INFO,
            applied = report.applied.len(),
            skipped = report.skipped,
            "schema up complete"
        );
        Ok(report)
    }

    /// Like [`Builder::up`], restricted to resources in `groups`.
    pub fn up_groups(&self, groups: impl Into<GroupSet>) -> Result<MigrationReport> {
        let groups = groups.into();
        let span = info_span!("schema.up", groups = ?groups.as_slice(), force = self.force);
        let _enter = span.enter();

        let mut report = MigrationReport::default();
        for registry in [self.tables, self.fields] {
            let members = registry.get_by_group(groups.clone());
            let total = members.clone().count();
            let candidates: Box<dyn Iterator<Item = SharedResource>> = if self.force {
                Box::new(members)
            } else {
                Box::new(registry.get_tables_needing_updates_in(members))
            };
            self.apply_all(total, candidates, &mut report)?;
        }

        Ok(report)
    }

    /// Drops every registered resource: fields first, then tables, each in
    /// reverse registration order. Nothing is unregistered.
    pub fn down(&self) -> Result<Vec<String>> {
        let span = info_span!("schema.down");
        let _enter = span.enter();

        let mut dropped = Vec::new();
        for registry in [self.fields, self.tables] {
            let resources: Vec<SharedResource> = registry.iter().collect();
            for resource in resources.into_iter().rev() {
                if let Err(err) = resource.drop_schema() {
                    event!(
                        Level::ERROR,
                        resource = resource.name(),
                        error = %err,
                        "drop failed"
                    );
                    return Err(err);
                }
                event!(Level::DEBUG, resource = resource.name(), "dropped");
                dropped.push(resource.name().to_string());
            }
        }

        Ok(dropped)
    }

    fn apply_all(
        &self,
        total: usize,
        candidates: impl Iterator<Item = SharedResource>,
        report: &mut MigrationReport,
    ) -> Result<()> {
        let mut applied = 0;
        for resource in candidates {
            apply_one(resource.as_ref())?;
            report.applied.push(resource.name().to_string());
            applied += 1;
        }
        report.skipped += total.saturating_sub(applied);
        Ok(())
    }
}

fn apply_one(resource: &dyn Resource) -> Result<()> {
    let from = resource.stored_version();
    let to = resource.declared_version();

    match resource.create_or_upgrade() {
        Ok(()) => {
            event!(
                Level::INFO,
                resource = resource.name(),
                group = resource.group(),
                kind = %resource.kind(),
                from = ?from,
                to = %to,
                "applied"
            );
            Ok(())
        }
        Err(err) => {
            event!(
                Level::ERROR,
                resource = resource.name(),
                group = resource.group(),
                error = %err,
                "create_or_upgrade failed"
            );
            Err(err)
        }
    }
}
