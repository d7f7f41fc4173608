/// Registration facade tests
///
/// Run with: cargo test --test register_tests
mod common;

use common::{Recorded, journal, names};
use rustschema::{
    ReadySignal, Register, Resource, ResourceClass, ResourceKind, Result, SchemaConfig,
    SchemaError, SchemaVersion,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

static SETTINGS_DROPS: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct SettingsTable {
    stored: Mutex<Option<SchemaVersion>>,
}

impl Resource for SettingsTable {
    fn name(&self) -> &str {
        "settings"
    }

    fn group(&self) -> &str {
        "core"
    }

    fn declared_version(&self) -> SchemaVersion {
        SchemaVersion::new(3, 0, 0)
    }

    fn stored_version(&self) -> Option<SchemaVersion> {
        *self.stored.lock().unwrap()
    }

    fn create_or_upgrade(&self) -> Result<()> {
        *self.stored.lock()? = Some(self.declared_version());
        Ok(())
    }

    fn drop_schema(&self) -> Result<()> {
        SETTINGS_DROPS.fetch_add(1, Ordering::SeqCst);
        *self.stored.lock()? = None;
        Ok(())
    }
}

fn register_with(signal: &ReadySignal, config: SchemaConfig) -> Register {
    Register::new(config, Arc::new(signal.clone())).unwrap()
}

#[test]
fn test_registration_before_ready_is_deferred() {
    let j = journal();
    let signal = ReadySignal::new();
    let mut register = register_with(&signal, SchemaConfig::default());

    let orders = Recorded::table("orders", "shop", "1.1", &j);
    register.table(orders.clone()).unwrap();
    assert_eq!(orders.applies(), 0);
    assert!(register.tables_registry().contains("orders"));

    signal.fire();
    let report = register.handle_ready().unwrap();
    assert_eq!(report.applied, vec!["orders"]);
    assert_eq!(orders.applies(), 1);
}

#[test]
fn test_registration_after_ready_applies_everything_pending() {
    let j = journal();
    let signal = ReadySignal::new();
    let mut register = register_with(&signal, SchemaConfig::default());

    let early = Recorded::table("early", "shop", "1", &j);
    register.table(early.clone()).unwrap();
    signal.fire();

    let late = Recorded::field("late_note", "shop", "1", &j);
    register.field(late.clone()).unwrap();

    // The pass triggered by `late_note` also picked up `early`.
    assert_eq!(early.applies(), 1);
    assert_eq!(late.applies(), 1);
    assert_eq!(*j.lock().unwrap(), vec!["apply:early", "apply:late_note"]);
}

#[test]
fn test_apply_on_register_can_be_disabled() {
    let j = journal();
    let signal = ReadySignal::fired();
    let mut register = register_with(&signal, SchemaConfig::new().apply_on_register(false));

    let orders = Recorded::table("orders", "shop", "1", &j);
    register.table(orders.clone()).unwrap();
    assert_eq!(orders.applies(), 0);
    assert_eq!(register.builder().pending(), vec!["orders"]);
}

#[test]
fn test_registration_error_surfaces_to_caller() {
    let j = journal();
    let signal = ReadySignal::fired();
    let mut register = register_with(&signal, SchemaConfig::default());

    let broken = Recorded::table("broken", "shop", "1", &j);
    broken.fail_apply(true);

    let err = register.table(broken.clone()).unwrap_err();
    assert!(matches!(err, SchemaError::ResourceApply { .. }));
    // Registration itself stuck; the resource stays pending for the next pass.
    assert!(register.tables_registry().contains("broken"));
    assert!(broken.needs_update());

    broken.fail_apply(false);
    register.handle_ready().unwrap();
    assert!(!broken.needs_update());
}

#[test]
fn test_remove_before_ready_skips_drop() {
    let j = journal();
    let signal = ReadySignal::new();
    let mut register = register_with(&signal, SchemaConfig::default());

    let orders = Recorded::table("orders", "shop", "1", &j);
    register.table(orders.clone()).unwrap();
    register.remove_table(orders.clone()).unwrap();

    assert_eq!(orders.drops(), 0);
    assert!(register.tables_registry().is_empty());
}

#[test]
fn test_remove_after_ready_drops_then_unregisters() {
    let j = journal();
    let signal = ReadySignal::fired();
    let mut register = register_with(&signal, SchemaConfig::default());

    let note = Recorded::field("orders_note", "shop", "1", &j);
    register.field(note.clone()).unwrap();
    register.remove_field(note.clone()).unwrap();

    assert_eq!(note.drops(), 1);
    assert!(!register.fields_registry().contains("orders_note"));
    assert_eq!(*j.lock().unwrap(), vec!["apply:orders_note", "drop:orders_note"]);
}

#[test]
fn test_remove_drops_the_registered_instance() {
    let j = journal();
    let signal = ReadySignal::fired();
    let mut register = register_with(&signal, SchemaConfig::default());

    let registered = Recorded::table("orders", "shop", "1", &j);
    register.table(registered.clone()).unwrap();
    assert!(registered.stored_version().is_some());

    let fresh = Recorded::table("orders", "shop", "1", &j);
    let removed = register.remove_table(fresh.clone()).unwrap();

    assert_eq!(registered.drops(), 1);
    assert_eq!(fresh.drops(), 0);
    assert!(registered.stored_version().is_none());
    assert!(Arc::ptr_eq(&removed, &(registered.clone() as Arc<dyn Resource>)));
    assert!(register.tables_registry().is_empty());
}

#[test]
fn test_failed_drop_still_unregisters() {
    let j = journal();
    let signal = ReadySignal::fired();
    let mut register = register_with(&signal, SchemaConfig::default());

    let orders = Recorded::table("orders", "shop", "1", &j);
    register.table(orders.clone()).unwrap();
    orders.fail_drop(true);

    let err = register.remove_table(orders.clone()).unwrap_err();
    assert!(matches!(err, SchemaError::ResourceDrop { .. }));
    assert!(!register.tables_registry().contains("orders"));
    // Storage was never dropped, so the stored version is still there.
    assert!(orders.stored_version().is_some());
}

#[test]
fn test_drop_on_remove_can_be_disabled() {
    let j = journal();
    let signal = ReadySignal::fired();
    let mut register = register_with(&signal, SchemaConfig::new().drop_on_remove(false));

    let orders = Recorded::table("orders", "shop", "1", &j);
    register.table(orders.clone()).unwrap();
    register.remove_table(orders.clone()).unwrap();

    assert_eq!(orders.drops(), 0);
    assert!(register.tables_registry().is_empty());
}

#[test]
fn test_remove_of_unregistered_resource_is_harmless() {
    let j = journal();
    let mut register = Register::default();
    register.table(Recorded::table("orders", "shop", "1", &j)).unwrap();

    register.remove_table(Recorded::table("ghost", "shop", "1", &j)).unwrap();
    assert_eq!(names(register.tables_registry()), vec!["orders"]);
}

#[test]
fn test_class_identifiers_are_normalized() {
    let signal = ReadySignal::fired();
    let mut register = register_with(&signal, SchemaConfig::default());

    let first = register.table(ResourceClass::of::<SettingsTable>()).unwrap();
    let second = register.table(ResourceClass::of::<SettingsTable>()).unwrap();

    assert_eq!(register.tables_registry().len(), 1);
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&register.tables_registry().get("settings").unwrap(), &second));
    assert!(!second.needs_update());

    let before = SETTINGS_DROPS.load(Ordering::SeqCst);
    let removed = register.remove_table(ResourceClass::of::<SettingsTable>()).unwrap();
    assert_eq!(SETTINGS_DROPS.load(Ordering::SeqCst), before + 1);
    assert!(register.tables_registry().is_empty());
    // The registered instance was dropped, not the one built for the lookup.
    assert!(Arc::ptr_eq(&removed, &second));
    assert!(second.needs_update());
}

#[test]
fn test_register_dispatches_on_kind() {
    let j = journal();
    let mut register = Register::default();

    let registered = register
        .register_many([
            Recorded::table("orders", "shop", "1", &j),
            Recorded::field("orders_note", "shop", "1", &j),
            Recorded::table("customers", "crm", "1", &j),
        ])
        .unwrap();

    assert_eq!(names(registered), vec!["orders", "orders_note", "customers"]);
    assert_eq!(names(register.registry(ResourceKind::Table)), vec!["orders", "customers"]);
    assert_eq!(names(register.registry(ResourceKind::Field)), vec!["orders_note"]);

    register.remove(Recorded::field("orders_note", "shop", "1", &j)).unwrap();
    assert!(register.fields_registry().is_empty());
    assert_eq!(register.tables_registry().groups(), ["shop".to_string(), "crm".to_string()]);
}

#[test]
fn test_bulk_table_registration_returns_registry() {
    let j = journal();
    let mut register = Register::default();

    let registry = register
        .tables(vec![
            Recorded::table("a", "g", "1", &j),
            Recorded::table("b", "g", "1", &j),
        ])
        .unwrap();
    assert_eq!(registry.len(), 2);

    let fields = register
        .fields([Recorded::field("a_note", "g", "1", &j)])
        .unwrap();
    assert_eq!(fields.names(), vec!["a_note"]);
}
